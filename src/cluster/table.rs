use super::signature::ClusterSignature;
use super::tally::{TypeTally, UniqueCounters};
use crate::error::{AnalyzeError, Result};
use crate::model::{CaseId, CaseResult, CompState};
use crate::stacktrace::TraceBlock;
use std::collections::HashMap;

/// Per-run cluster memberships: qualified component → cluster key → cases
///
/// The first member of each list is the cluster's representative.
#[derive(Debug, Clone, Default)]
pub struct ClusterTable {
    components: HashMap<String, HashMap<String, Vec<CaseId>>>,
}

impl ClusterTable {
    /// Members of a cluster in table order
    pub fn members(&self, component: &str, key: &str) -> Option<&[CaseId]> {
        self.components
            .get(component)
            .and_then(|clusters| clusters.get(key))
            .map(|m| m.as_slice())
    }

    pub fn representative(&self, component: &str, key: &str) -> Option<CaseId> {
        self.members(component, key).and_then(|m| m.first().copied())
    }

    /// Number of distinct cluster keys seen for a component
    pub fn cluster_count(&self, component: &str) -> usize {
        self.components.get(component).map_or(0, |c| c.len())
    }

    fn members_mut(&mut self, component: &str, key: &str) -> &mut Vec<CaseId> {
        self.components
            .entry(component.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
    }
}

/// Outcome of clustering one case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// No error-level frames survived filtering
    Abandoned,
    /// The case opened a cluster (or took one over) and drew a new id
    Unique {
        crash: bool,
        id: u32,
        /// Previous representative demoted by this case
        promoted_over: Option<CaseId>,
    },
    /// The case copied the ids of the cluster's representative
    Inherited { representative: CaseId },
}

/// Cluster table, id counters and type tallies of one analysis run
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    table: ClusterTable,
    counters: UniqueCounters,
    exc_tally: TypeTally,
    err_tally: TypeTally,
    crash_tally: TypeTally,
}

impl ClusterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign unique ids to `cases[current]` from its accepted trace blocks
    ///
    /// # Errors
    /// [`AnalyzeError::DuplicateMembership`] when the case is already a
    /// member of the cluster its signature maps to.
    pub fn assign(
        &mut self,
        cases: &mut [CaseResult],
        current: CaseId,
        blocks: &[TraceBlock],
    ) -> Result<Assignment> {
        let case = &cases[current];
        let sig = ClusterSignature::from_blocks(blocks, case.is_failed());
        if sig.is_empty() {
            tracing::warn!(
                case_index = ?case.case_index,
                component = %case.comp_qualified_name,
                "No error-level stacktrace after filtering"
            );
            return Ok(Assignment::Abandoned);
        }

        let current_state = case.comp_state;
        let members = self.table.members_mut(&case.comp_qualified_name, &sig.key);
        let mut known = members.first().copied();
        if members.contains(&current) {
            tracing::error!(
                case_index = ?case.case_index,
                component = %case.comp_qualified_name,
                "Case is already a member of its cluster"
            );
            return Err(AnalyzeError::DuplicateMembership {
                component: case.comp_qualified_name.clone(),
                case_index: case.case_index,
            });
        }
        members.push(current);

        let mut promoted_over = None;
        if let Some(rep) = known {
            let rep_state = cases[rep].comp_state;
            if rep_state != Some(CompState::Failed) && current_state == Some(CompState::Failed) {
                tracing::warn!(
                    case_index = ?cases[current].case_index,
                    component = %cases[current].comp_qualified_name,
                    "comp_state changed from {:?} to FAILED, promoting case to representative",
                    rep_state
                );
                let last = members.len() - 1;
                members[0] = current;
                members[last] = rep;
                promoted_over = Some(rep);
                known = None;
            } else if rep_state != current_state {
                tracing::debug!(
                    case_index = ?cases[current].case_index,
                    component = %cases[current].comp_qualified_name,
                    "Inconsistent comp_state! known={:?}, current={:?}",
                    rep_state,
                    current_state
                );
            }
        }

        match known {
            Some(representative) => {
                let (err_id, crash_id) = (
                    cases[representative].uniq_err_id,
                    cases[representative].uniq_crash_id,
                );
                let case = &mut cases[current];
                case.uniq_err_id = err_id;
                case.uniq_crash_id = crash_id;
                Ok(Assignment::Inherited { representative })
            }
            None => {
                let case = &mut cases[current];
                self.counters.exceptions += sig.exc_types.len();
                case.exc_types_uniq.extend(sig.exc_types.iter().cloned());

                let crash = case.is_failed();
                let id = if crash {
                    let id = self.counters.next_crash_id();
                    case.uniq_crash_id = Some(id);
                    id
                } else {
                    let id = self.counters.next_error_id();
                    case.uniq_err_id = Some(id);
                    id
                };

                self.exc_tally.add_all(&sig.exc_types);
                self.err_tally.add_all(&sig.err_types);
                self.crash_tally.add_all(&sig.crash_types);

                Ok(Assignment::Unique {
                    crash,
                    id,
                    promoted_over,
                })
            }
        }
    }

    pub fn table(&self) -> &ClusterTable {
        &self.table
    }

    pub fn counters(&self) -> &UniqueCounters {
        &self.counters
    }

    /// Unique-cluster counts per exception type
    pub fn exc_tally(&self) -> &TypeTally {
        &self.exc_tally
    }

    /// Unique-cluster counts per error-level exception type
    pub fn err_tally(&self) -> &TypeTally {
        &self.err_tally
    }

    /// Unique-cluster counts per exception type of FAILED cases
    pub fn crash_tally(&self) -> &TypeTally {
        &self.crash_tally
    }
}
