//! Per-component statistics folded from the cases of one run

use crate::model::{CaseResult, CompState};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome counts and exception-type breakdowns of one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub passed_times: u64,
    pub jumped_times: u64,
    pub failed_times: u64,
    /// Types contributed by cases that opened a cluster
    pub unique_exc_count: u64,
    pub unique_exc_details: BTreeMap<String, u64>,
    /// Error-level types over all cases
    pub unique_err_count: u64,
    pub unique_err_details: BTreeMap<String, u64>,
    /// Error-level types of FAILED cases
    pub unique_crash_count: u64,
    pub unique_crash_details: BTreeMap<String, u64>,
}

impl ComponentSummary {
    /// Fold one case into the summary
    pub fn record(&mut self, case: &CaseResult) {
        match case.comp_state {
            Some(CompState::Passed) => self.passed_times += 1,
            Some(CompState::Failed) => self.failed_times += 1,
            Some(CompState::Jumped) => self.jumped_times += 1,
            None => {}
        }

        self.unique_exc_count += case.exc_types_uniq.len() as u64;
        count_types(&mut self.unique_exc_details, &case.exc_types_uniq);

        self.unique_err_count += case.exc_types_err.len() as u64;
        count_types(&mut self.unique_err_details, &case.exc_types_err);

        if case.is_failed() {
            self.unique_crash_count += case.exc_types_err.len() as u64;
            count_types(&mut self.unique_crash_details, &case.exc_types_err);
        }
    }
}

fn count_types<'a, I>(details: &mut BTreeMap<String, u64>, types: I)
where
    I: IntoIterator<Item = &'a String>,
{
    for t in types {
        *details.entry(t.clone()).or_insert(0) += 1;
    }
}

/// Package → component → summary, key-sorted at every level
pub type SummaryTree = BTreeMap<String, BTreeMap<String, ComponentSummary>>;

/// Build the summary tree of a run
pub fn summarize(cases: &[CaseResult]) -> SummaryTree {
    let mut tree = SummaryTree::new();
    for case in cases {
        tree.entry(case.pkg_name.clone())
            .or_default()
            .entry(case.comp_name.clone())
            .or_default()
            .record(case);
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(comp_path: &str, state: Option<CompState>, err: &[&str], uniq: &[&str]) -> CaseResult {
        let mut case = CaseResult::from_component_path(comp_path).unwrap();
        case.comp_state = state;
        case.exc_types_err = err.iter().map(|s| s.to_string()).collect();
        case.exc_types = case.exc_types_err.clone();
        case.exc_types_uniq = uniq.iter().map(|s| s.to_string()).collect();
        case
    }

    #[test]
    fn test_state_counts() {
        let cases = vec![
            case("a.b/.C", Some(CompState::Passed), &[], &[]),
            case("a.b/.C", Some(CompState::Passed), &[], &[]),
            case("a.b/.C", Some(CompState::Jumped), &[], &[]),
            case("a.b/.C", None, &[], &[]),
        ];
        let tree = summarize(&cases);
        let summary = &tree["a.b"]["a.b.C"];

        assert_eq!(summary.passed_times, 2);
        assert_eq!(summary.jumped_times, 1);
        assert_eq!(summary.failed_times, 0);
    }

    #[test]
    fn test_type_breakdowns() {
        let npe = "java.lang.NullPointerException";
        let ise = "java.lang.IllegalStateException";
        let cases = vec![
            case("a.b/.C", Some(CompState::Failed), &[npe], &[npe]),
            // Inherited: error types counted again, unique types not
            case("a.b/.C", Some(CompState::Failed), &[npe], &[]),
            case("a.b/.C", Some(CompState::Passed), &[ise], &[ise]),
        ];
        let summary = &summarize(&cases)["a.b"]["a.b.C"];

        assert_eq!(summary.unique_exc_count, 2);
        assert_eq!(summary.unique_exc_details[npe], 1);
        assert_eq!(summary.unique_err_count, 3);
        assert_eq!(summary.unique_err_details[npe], 2);
        assert_eq!(summary.unique_crash_count, 2);
        assert_eq!(summary.unique_crash_details.get(ise), None);
    }

    #[test]
    fn test_tree_groups_by_package() {
        let cases = vec![
            case("a.b/.C", Some(CompState::Passed), &[], &[]),
            case("a.b/.D", Some(CompState::Passed), &[], &[]),
            case("x.y/.Z", Some(CompState::Failed), &[], &[]),
        ];
        let tree = summarize(&cases);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree["a.b"].len(), 2);
        assert_eq!(tree["x.y"]["x.y.Z"].failed_times, 1);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(ComponentSummary::default()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "passed_times",
            "jumped_times",
            "failed_times",
            "unique_exc_count",
            "unique_exc_details",
            "unique_err_count",
            "unique_err_details",
            "unique_crash_count",
            "unique_crash_details",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
    }
}
