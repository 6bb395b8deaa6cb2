//! Unique crash / unique error reports and the run's JSON summaries
//!
//! Artifacts written to the output directory:
//!
//! | file                    | content                                       |
//! |-------------------------|-----------------------------------------------|
//! | `unique-crash.txt`      | one entry per unique crash id                 |
//! | `unique-error.txt`      | one entry per unique error id                 |
//! | `exc-types-unique.json` | type → unique clusters containing it          |
//! | `exc-types-err.json`    | type → unique clusters with it at error level |
//! | `exc-types-crash.json`  | type → unique crash clusters containing it    |
//! | `comp-summary.json`     | package → component → [`ComponentSummary`]    |
//!
//! [`ComponentSummary`]: crate::summary::ComponentSummary

use crate::analyzer::LogAnalyzer;
use crate::error::Result;
use crate::json_output::to_pretty_string;
use crate::model::{display_opt, CaseResult};
use crate::params::ParamResolver;
use crate::summary::summarize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const UNIQUE_CRASH_FILE: &str = "unique-crash.txt";
pub const UNIQUE_ERROR_FILE: &str = "unique-error.txt";
pub const EXC_TYPES_UNIQUE_FILE: &str = "exc-types-unique.json";
pub const EXC_TYPES_ERR_FILE: &str = "exc-types-err.json";
pub const EXC_TYPES_CRASH_FILE: &str = "exc-types-crash.json";
pub const COMP_SUMMARY_FILE: &str = "comp-summary.json";

/// Report text per unique id, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueReports {
    pub crashes: BTreeMap<u32, String>,
    pub errors: BTreeMap<u32, String>,
}

impl UniqueReports {
    /// Route every case to its report entry
    ///
    /// The first case of an id writes the entry header; later cases append
    /// one test-case line each.
    pub fn build(cases: &[CaseResult], resolver: &ParamResolver) -> Self {
        let mut reports = Self::default();

        for case in cases {
            let index = display_opt(&case.case_index);
            let component = &case.comp_qualified_name;
            if case.exc_types.is_empty() {
                tracing::debug!("Success: case {} of [{}]", index, component);
            } else if case.exc_types_err.is_empty() {
                tracing::debug!("Ignored: case {} of [{}]", index, component);
            } else if let Some(id) = case.uniq_crash_id {
                tracing::debug!("Unique crash #{}: case {} of [{}]", id, index, component);
                append_case(&mut reports.crashes, id, case, true, resolver);
            } else if let Some(id) = case.uniq_err_id {
                tracing::debug!("Unique error #{}: case {} of [{}]", id, index, component);
                append_case(&mut reports.errors, id, case, false, resolver);
            } else {
                tracing::info!(
                    case_index = ?case.case_index,
                    component = %case.comp_qualified_name,
                    "Error-level case was never clustered, skipping"
                );
            }
        }

        reports
    }
}

fn append_case(
    entries: &mut BTreeMap<u32, String>,
    id: u32,
    case: &CaseResult,
    is_crash: bool,
    resolver: &ParamResolver,
) {
    let line = format!("{}: {}\n", case.case_label(), resolver.format_case(case));
    entries
        .entry(id)
        .or_insert_with(|| entry_header(case, id, is_crash))
        .push_str(&line);
}

/// Everything of an entry up to and including `Testcases:`
fn entry_header(case: &CaseResult, id: u32, is_crash: bool) -> String {
    let exc_types: Vec<&str> = case.exc_types_err.iter().map(String::as_str).collect();
    format!(
        "Unique {} #{}\n\
         =====================\n\
         Component: {}\n\
         Exception Types: {}\n\
         Stacktrace:\n\
         {}\n\
         Index: apkIndex={}, compIndex={}\n\
         Testcases:\n",
        if is_crash { "Crash" } else { "Error" },
        id,
        case.comp_qualified_name,
        exc_types.join(","),
        case.full_trace.join("\n"),
        display_opt(&case.apk_index),
        display_opt(&case.comp_index),
    )
}

/// Concatenate entries in id order, each followed by a blank line
pub fn render_entries(entries: &BTreeMap<u32, String>) -> String {
    entries.values().fold(String::new(), |mut out, entry| {
        out.push_str(entry);
        out.push('\n');
        out
    })
}

fn write_json<T: Serialize>(out_dir: &Path, name: &str, value: &T) -> Result<()> {
    fs::write(out_dir.join(name), to_pretty_string(value)?)?;
    Ok(())
}

/// Write all report artifacts of an analyzed transcript into `out_dir`
pub fn write_reports(
    out_dir: &Path,
    analyzer: &LogAnalyzer,
    resolver: &ParamResolver,
) -> Result<UniqueReports> {
    let cases = analyzer.cases();
    tracing::info!("Parsed totally {} testcases", cases.len());
    tracing::info!("Generating report for unique error and unique crash...");
    let reports = UniqueReports::build(cases, resolver);

    fs::create_dir_all(out_dir)?;
    tracing::info!(out_dir = %out_dir.display(), "Writing report for unique error and unique crash...");
    fs::write(out_dir.join(UNIQUE_CRASH_FILE), render_entries(&reports.crashes))?;
    fs::write(out_dir.join(UNIQUE_ERROR_FILE), render_entries(&reports.errors))?;

    tracing::info!("Writing exception types summary...");
    let engine = analyzer.engine();
    write_json(out_dir, EXC_TYPES_UNIQUE_FILE, engine.exc_tally())?;
    write_json(out_dir, EXC_TYPES_ERR_FILE, engine.err_tally())?;
    write_json(out_dir, EXC_TYPES_CRASH_FILE, engine.crash_tally())?;

    tracing::info!("Writing component test summary...");
    write_json(out_dir, COMP_SUMMARY_FILE, &summarize(cases))?;

    tracing::info!(
        crashes = reports.crashes.len(),
        errors = reports.errors.len(),
        "Finished writing report"
    );
    Ok(reports)
}
