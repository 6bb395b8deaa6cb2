//! Error types for log analysis
//!
//! Only conditions that abort a transcript live here. Malformed lines,
//! incomplete stack traces and missing test-case tables are recovered
//! in place and reported through `tracing`.

use thiserror::Error;

/// Errors that abort the analysis of a transcript
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Case result at line {line_no} has no preceding case start: {line}")]
    ResultWithoutCase { line_no: usize, line: String },

    #[error("Case {case_index:?} of {component} is already a member of its cluster")]
    DuplicateMembership {
        component: String,
        case_index: Option<u32>,
    },

    #[error("Invalid log grammar rule: {0}")]
    Grammar(#[from] regex::Error),

    #[error("Unknown log type: {log_type}, filename={file_name}")]
    UnknownLogType { log_type: String, file_name: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
