// Analyzer configuration
//
// Defaults reproduce the harness conventions: 32 cached test-case tables,
// 6 leading records in every table, `$#NULL#$` as the absent-value marker,
// and the deny-lists used by the stack trace filters.

use crate::error::AnalyzeError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Absent-value marker written by the test-case generator
pub const NULL_PLACEHOLDER: &str = "$#NULL#$";

/// Configuration for one analysis run
///
/// # Example TOML
/// ```toml
/// cache_capacity = 64
///
/// [filters]
/// ignored_tags = ["BroadcastQueue", "MyNoisyService"]
/// ```
///
/// # Example
/// ```
/// use tracesift::config::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.cache_capacity, 32);
/// assert_eq!(config.header_records, 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Number of parsed test-case tables kept in memory
    pub cache_capacity: usize,

    /// Leading records of a test-case table that precede the header row
    pub header_records: usize,

    /// Cell value meaning "parameter absent"
    pub null_placeholder: String,

    /// Stack trace filters
    pub filters: FilterConfig,
}

/// Deny-lists and markers applied while segmenting stack traces
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Log tags whose blocks are dropped
    pub ignored_tags: Vec<String>,

    /// Exception types whose blocks are dropped
    pub ignored_exception_types: Vec<String>,

    /// Header substrings whose blocks are dropped
    pub ignored_header_markers: Vec<String>,

    /// Header substrings that make a trace relevant to any component
    pub always_relevant_markers: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 32,
            header_records: 6,
            null_placeholder: NULL_PLACEHOLDER.to_string(),
            filters: FilterConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored_tags: [
                "BroadcastQueue",
                "BufferQueueProducer",
                "cr_CompositorSurfaceMgr",
                "RunCaseHandler",
                "EGL_adreno",
                "CSVTestCaseUtil",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ignored_exception_types: [
                "java.lang.UnsatisfiedLinkError",
                "android.os.FileUriExposedException",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ignored_header_markers: [
                "java.lang.Exception: Toast callstack!",
                "W System.err: java.lang.Exception",
                "org.square16.ictdroid.testbridge.utils.CSVTestCaseMgr$1",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            always_relevant_markers: vec!["android.util.SuperNotCalledException".to_string()],
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: AnalyzerConfig =
            toml::from_str(&content).with_context(|| "Failed to parse analyzer config")?;
        config.validate().map_err(AnalyzeError::Config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be >= 1, got 0".to_string());
        }
        if self.null_placeholder.is_empty() {
            return Err("null_placeholder must not be empty".to_string());
        }
        Ok(())
    }
}
