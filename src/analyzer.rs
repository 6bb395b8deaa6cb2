//! Single-pass scanner over one controller transcript
//!
//! Each line is tried as a case start, then as a case result. A result line
//! triggers the per-case pipeline:
//!
//! 1. backward trace extraction up to the previous controller line
//! 2. segmentation into filtered trace blocks
//! 3. relevance check against the case's component and package
//! 4. clustering into a unique error or unique crash
//!
//! The scan is sequential and owns all of its state, so independent
//! transcripts can be analyzed on separate threads.

use crate::cluster::{Assignment, ClusterEngine};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzeError, Result};
use crate::grammar::{LogGrammar, NO_STACKTRACE_MARKER};
use crate::mist::MistMap;
use crate::model::{CaseId, CaseResult, CompState};
use crate::stacktrace::{extract_trace, segment_trace, TraceFilter};

/// Fields of a case result line, detached from the line buffer
struct ParsedResult {
    state: String,
    apk_index: u32,
    comp_index: u32,
    case_index: u32,
    strategy: String,
}

/// Analyzer for one transcript
#[derive(Debug)]
pub struct LogAnalyzer {
    lines: Vec<String>,
    grammar: LogGrammar,
    filter: TraceFilter,
    engine: ClusterEngine,
    cases: Vec<CaseResult>,
    current: Option<CaseId>,
    mist: Option<MistMap>,
}

impl LogAnalyzer {
    pub fn new(log_content: &str, config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            lines: log_content.lines().map(str::to_string).collect(),
            grammar: LogGrammar::new()?,
            filter: TraceFilter::new(config.filters.clone()),
            engine: ClusterEngine::new(),
            cases: Vec::new(),
            current: None,
            mist: None,
        })
    }

    /// Attach misexposure labels to every case started from now on
    pub fn with_mist(mut self, mist: MistMap) -> Self {
        self.mist = Some(mist);
        self
    }

    /// Scan the whole transcript
    ///
    /// # Errors
    /// Stops at the first invariant violation: a result line with no case
    /// started before it, or a case joining a cluster twice.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(lines = self.lines.len(), "Reading and preprocessing test-controller log...");
        for idx in 0..self.lines.len() {
            self.parse_line(idx)?;
        }
        tracing::info!(
            cases = self.cases.len(),
            "Finished analyzing, detected totally {} unique exceptions",
            self.engine.counters().exceptions
        );
        Ok(())
    }

    fn parse_line(&mut self, idx: usize) -> Result<()> {
        if self.parse_case_start(idx) {
            return Ok(());
        }
        self.parse_case_result(idx)?;
        Ok(())
    }

    fn parse_case_start(&mut self, idx: usize) -> bool {
        let Some(comp_path) = self.grammar.case_start(&self.lines[idx]) else {
            return false;
        };

        let Some(mut case) = CaseResult::from_component_path(comp_path) else {
            tracing::error!(
                line_no = idx + 1,
                "Malformed component path in case start: {}",
                comp_path
            );
            self.current = None;
            return true;
        };

        if let Some(mist) = &self.mist {
            case.mist_type = mist
                .label(&case.pkg_name, &case.comp_name)
                .map(str::to_string);
        }
        tracing::trace!(component = %case.comp_qualified_name, "Detected case start");

        self.cases.push(case);
        self.current = Some(self.cases.len() - 1);
        true
    }

    fn parse_case_result(&mut self, idx: usize) -> Result<bool> {
        let line = &self.lines[idx];
        let Some(result) = self.grammar.case_result(line) else {
            if line.contains(crate::grammar::RESULT_MARKER) {
                tracing::debug!(line_no = idx + 1, "Unparsed case result line: {}", line);
            }
            return Ok(false);
        };
        let parsed = ParsedResult {
            state: result.state.to_string(),
            apk_index: result.apk_index,
            comp_index: result.comp_index,
            case_index: result.case_index,
            strategy: result.strategy.to_string(),
        };

        let Some(current) = self.current else {
            return Err(AnalyzeError::ResultWithoutCase {
                line_no: idx + 1,
                line: line.clone(),
            });
        };

        let state = match parsed.state.parse::<CompState>() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(line_no = idx + 1, "{}: {}", e, line);
                return Ok(true);
            }
        };

        let case = &mut self.cases[current];
        case.state_line = Some(line.clone());
        case.comp_state = Some(state);
        case.apk_index = Some(parsed.apk_index);
        case.comp_index = Some(parsed.comp_index);
        case.case_index = Some(parsed.case_index);
        case.strategy = Some(parsed.strategy);

        if state == CompState::Failed {
            tracing::debug!(
                apk_index = parsed.apk_index,
                comp_index = parsed.comp_index,
                case_index = parsed.case_index,
                component = %case.comp_qualified_name,
                "Detected FAILED result"
            );
        }

        self.fetch_stacktrace(idx, current);
        self.check_stacktrace(current)?;
        Ok(true)
    }

    /// Store the trace printed before the result line at `idx`
    fn fetch_stacktrace(&mut self, idx: usize, current: CaseId) {
        let trace = extract_trace(&self.grammar, &self.lines, idx);
        let case = &mut self.cases[current];

        if trace.reached_log_start() {
            tracing::warn!("Incomplete stacktrace! Maybe the test-controller log is broken!");
        }
        if case.is_failed() && trace.lines.is_empty() {
            let boundary = trace.boundary.map(|b| self.lines[b].as_str());
            if boundary.is_some_and(|l| l.contains(NO_STACKTRACE_MARKER)) {
                tracing::info!(
                    case_index = ?case.case_index,
                    component = %case.comp_qualified_name,
                    "test-controller reported no stacktrace caught"
                );
            } else {
                tracing::warn!(
                    case_index = ?case.case_index,
                    component = %case.comp_qualified_name,
                    "No stacktrace after filtering"
                );
            }
        }

        if !trace.lines.is_empty() {
            tracing::debug!("Got {} lines of stacktrace", trace.lines.len());
            case.full_trace = trace.lines;
        }
    }

    /// Segment, check and cluster the current case's trace
    fn check_stacktrace(&mut self, current: CaseId) -> Result<Option<Assignment>> {
        let blocks = segment_trace(&self.grammar, &self.filter, &self.cases[current]);

        let case = &mut self.cases[current];
        for block in &blocks {
            case.exc_types.extend(block.exc_types.iter().cloned());
            if block.level.is_error() {
                case.exc_types_err.extend(block.exc_types.iter().cloned());
            }
        }

        if blocks.is_empty() {
            return Ok(None);
        }

        if !self.filter.is_relevant(case, &blocks) {
            tracing::warn!(
                component = %case.comp_qualified_name,
                "Neither package nor component name exists in stacktrace!"
            );
            return Ok(None);
        }

        let assignment = self.engine.assign(&mut self.cases, current, &blocks)?;
        tracing::debug!(?assignment, case_index = ?self.cases[current].case_index, "Clustered case");
        Ok(Some(assignment))
    }

    /// Cases in transcript order
    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    pub fn engine(&self) -> &ClusterEngine {
        &self.engine
    }

    pub fn current(&self) -> Option<&CaseResult> {
        self.current.map(|id| &self.cases[id])
    }
}
