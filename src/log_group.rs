//! Log group discovery
//!
//! One harness run leaves up to three logs in the log directory, named
//! `<type>-<date>T<time>.log`. Files sharing `<date>T<time>` form a group.
//! Files without a timestamp belong to the `default` group and use their
//! file stem as type.

use crate::error::{AnalyzeError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Group id of logs without a timestamp in their name
pub const DEFAULT_GROUP: &str = "default";

/// Controller message printed once a dynamic test ran at least one case
pub const DYNAMIC_TEST_MARKER: &str = "Finished running testcase";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    GeneratedSut,
    Logcat,
    TestController,
}

impl LogType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "generated-sut" => Some(LogType::GeneratedSut),
            "logcat" => Some(LogType::Logcat),
            "test-controller" => Some(LogType::TestController),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::GeneratedSut => "generated-sut",
            LogType::Logcat => "logcat",
            LogType::TestController => "test-controller",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log files of one harness run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogGroup {
    pub id: String,
    pub sut: Option<PathBuf>,
    pub logcat: Option<PathBuf>,
    pub controller: Option<PathBuf>,
}

impl LogGroup {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn set(&mut self, log_type: LogType, path: PathBuf) {
        match log_type {
            LogType::GeneratedSut => self.sut = Some(path),
            LogType::Logcat => self.logcat = Some(path),
            LogType::TestController => self.controller = Some(path),
        }
    }

    /// Controller transcript of a group that ran a dynamic test
    ///
    /// Returns `None` (with a log) when the group has no controller log or
    /// the controller never finished a test case.
    pub fn dynamic_test_log(&self) -> Result<Option<String>> {
        let Some(controller) = &self.controller else {
            tracing::error!(group = %self.id, "Missing test-controller log");
            return Ok(None);
        };
        if self.sut.is_none() {
            tracing::warn!(group = %self.id, "Missing generated-sut log");
        }

        let content = fs::read_to_string(controller)?;
        if !is_dynamic_test(&content) {
            tracing::info!(group = %self.id, "No testcase finished, skipping group");
            return Ok(None);
        }
        Ok(Some(content))
    }
}

pub fn is_dynamic_test(controller_log: &str) -> bool {
    controller_log.contains(DYNAMIC_TEST_MARKER)
}

/// Group the `*.log` files of a directory by run
///
/// # Errors
/// [`AnalyzeError::UnknownLogType`] for a log whose type is not one of
/// `generated-sut`, `logcat`, `test-controller`.
pub fn discover<P: AsRef<Path>>(log_dir: P) -> Result<BTreeMap<String, LogGroup>> {
    let name_rule = Regex::new(r"^(?P<type>[A-Za-z0-9-]+)-(?P<date>\d+)T(?P<time>\d+)\.log")?;

    let mut names: Vec<String> = fs::read_dir(log_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".log"))
        .collect();
    names.sort();

    let mut groups: BTreeMap<String, LogGroup> = BTreeMap::new();
    for name in names {
        let (type_name, group_id) = match name_rule.captures(&name) {
            Some(caps) => (
                caps["type"].to_string(),
                format!("{}T{}", &caps["date"], &caps["time"]),
            ),
            None => (
                name.trim_end_matches(".log").to_string(),
                DEFAULT_GROUP.to_string(),
            ),
        };

        let Some(log_type) = LogType::parse(&type_name) else {
            tracing::error!("Error: unknown log type: {}, filename={}", type_name, name);
            return Err(AnalyzeError::UnknownLogType {
                log_type: type_name,
                file_name: name,
            });
        };

        let path = log_dir.as_ref().join(&name);
        groups
            .entry(group_id.clone())
            .or_insert_with(|| LogGroup::new(&group_id))
            .set(log_type, path);
    }

    tracing::info!("There are {} group(s) of log", groups.len());
    Ok(groups)
}

/// Run `task` over `items` on at most `workers` threads
///
/// Workers pull the next item from a shared queue, so at most `workers`
/// transcripts are in memory at once. Results come back in item order;
/// `None` marks items lost to a panicked worker.
pub fn run_bounded<T, R, F>(items: &[T], workers: usize, task: F) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    let queue = Mutex::new(items.iter().enumerate());

    let finished: Vec<Vec<(usize, R)>> = std::thread::scope(|s| {
        let joins: Vec<_> = (0..workers)
            .map(|_| {
                s.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let next = queue
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner())
                            .next();
                        let Some((idx, item)) = next else {
                            break;
                        };
                        done.push((idx, task(item)));
                    }
                    done
                })
            })
            .collect();
        joins
            .into_iter()
            .map(|join| join.join().unwrap_or_default())
            .collect()
    });

    let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();
    for (idx, result) in finished.into_iter().flatten() {
        results[idx] = Some(result);
    }
    results
}
