use crate::grammar::LogGrammar;

/// Lines recovered for one case result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTrace {
    /// Kept lines in chronological order
    pub lines: Vec<String>,

    /// Index of the controller line that ended the backward walk;
    /// `None` when the walk ran into the start of the log
    pub boundary: Option<usize>,

    /// Lines that did not look like `<LEVEL> <TAG>...`
    pub unrecognized: usize,
}

impl ExtractedTrace {
    pub fn reached_log_start(&self) -> bool {
        self.boundary.is_none()
    }
}

/// Collect the trace printed between the previous controller line and the
/// result line at `result_idx` (exclusive)
///
/// Debug-level lines are dropped.
pub fn extract_trace<S: AsRef<str>>(
    grammar: &LogGrammar,
    lines: &[S],
    result_idx: usize,
) -> ExtractedTrace {
    let mut trace = ExtractedTrace::default();
    let end = result_idx.min(lines.len());

    for idx in (0..end).rev() {
        let line = lines[idx].as_ref();
        if line.starts_with('[') {
            trace.boundary = Some(idx);
            break;
        }

        match grammar.trace_line(line) {
            None => {
                tracing::error!(line_no = idx + 1, "Unrecognized trace line in log: {}", line);
                trace.unrecognized += 1;
            }
            Some(("D", _)) => {}
            Some(_) => trace.lines.push(line.to_string()),
        }
    }

    trace.lines.reverse();
    trace
}
