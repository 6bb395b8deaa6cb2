//! Test-case records reconstructed from a controller transcript

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Position of a case in the run's ordered case list
pub type CaseId = usize;

/// Final state reported by the harness for one case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompState {
    Passed,
    Failed,
    Jumped,
}

impl CompState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompState::Passed => "PASSED",
            CompState::Failed => "FAILED",
            CompState::Jumped => "JUMPED",
        }
    }
}

impl fmt::Display for CompState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSED" => Ok(CompState::Passed),
            "FAILED" => Ok(CompState::Failed),
            "JUMPED" => Ok(CompState::Jumped),
            other => Err(format!("Unknown case state: {}", other)),
        }
    }
}

/// One execution of one test input against one component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseResult {
    /// App package name
    pub pkg_name: String,
    /// Component name, with relative manifest names resolved against the package
    pub comp_name: String,
    /// `pkg/comp`
    pub comp_qualified_name: String,

    pub apk_index: Option<u32>,
    pub comp_index: Option<u32>,
    pub case_index: Option<u32>,
    pub strategy: Option<String>,

    /// Final state; `None` until the result line is seen
    pub comp_state: Option<CompState>,
    /// Label from the misexposure classifier
    pub mist_type: Option<String>,
    /// Raw result line
    pub state_line: Option<String>,

    pub uniq_err_id: Option<u32>,
    pub uniq_crash_id: Option<u32>,

    /// Chronological trace lines kept by extraction; empty when none survived
    pub full_trace: Vec<String>,

    /// Every exception type seen in accepted trace blocks
    pub exc_types: BTreeSet<String>,
    /// Types this case contributed as the first occurrence of its cluster
    pub exc_types_uniq: BTreeSet<String>,
    /// Types from error- and fatal-level blocks
    pub exc_types_err: BTreeSet<String>,
}

impl CaseResult {
    /// Build a case from a `pkg/name` component path
    ///
    /// Returns `None` when the path has no `/` separator.
    ///
    /// # Example
    /// ```
    /// use tracesift::model::CaseResult;
    ///
    /// let case = CaseResult::from_component_path("com.example.app/.MainActivity").unwrap();
    /// assert_eq!(case.comp_name, "com.example.app.MainActivity");
    /// assert_eq!(case.comp_qualified_name, "com.example.app/com.example.app.MainActivity");
    /// ```
    pub fn from_component_path(comp_path: &str) -> Option<Self> {
        let (pkg_name, unqualified) = comp_path.split_once('/')?;
        let comp_name = if unqualified.starts_with('.') {
            format!("{}{}", pkg_name, unqualified)
        } else {
            unqualified.to_string()
        };

        Some(Self {
            comp_qualified_name: format!("{}/{}", pkg_name, comp_name),
            pkg_name: pkg_name.to_string(),
            comp_name,
            ..Default::default()
        })
    }

    pub fn is_failed(&self) -> bool {
        self.comp_state == Some(CompState::Failed)
    }

    /// `(caseIndex=3, strategy=random)`, the prefix of every report case line
    pub fn case_label(&self) -> String {
        format!(
            "(caseIndex={}, strategy={})",
            display_opt(&self.case_index),
            display_opt(&self.strategy)
        )
    }
}

pub(crate) fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_component_name() {
        let case = CaseResult::from_component_path("com.example.app/.ui.Settings").unwrap();
        assert_eq!(case.pkg_name, "com.example.app");
        assert_eq!(case.comp_name, "com.example.app.ui.Settings");
    }

    #[test]
    fn test_absolute_component_name() {
        let case = CaseResult::from_component_path("com.example.app/org.lib.Receiver").unwrap();
        assert_eq!(case.comp_name, "org.lib.Receiver");
        assert_eq!(case.comp_qualified_name, "com.example.app/org.lib.Receiver");
    }

    #[test]
    fn test_component_path_without_separator() {
        assert!(CaseResult::from_component_path("com.example.app").is_none());
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!("FAILED".parse::<CompState>(), Ok(CompState::Failed));
        assert_eq!("JUMPED".parse::<CompState>(), Ok(CompState::Jumped));
        assert!("ERROR".parse::<CompState>().is_err());
        assert_eq!(CompState::Passed.to_string(), "PASSED");
    }

    #[test]
    fn test_case_label() {
        let mut case = CaseResult::from_component_path("a.b/.C").unwrap();
        assert_eq!(case.case_label(), "(caseIndex=None, strategy=None)");
        case.case_index = Some(7);
        case.strategy = Some("random".to_string());
        assert_eq!(case.case_label(), "(caseIndex=7, strategy=random)");
    }
}
