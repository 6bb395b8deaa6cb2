use super::filter::TraceFilter;
use crate::grammar::{is_cause_line, is_frame_line, LogGrammar, Level};
use crate::model::CaseResult;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// One exception occurrence inside a case's trace
///
/// Two blocks are the same occurrence when header and frames match,
/// whichever case produced them.
#[derive(Debug, Clone)]
pub struct TraceBlock {
    pub pkg_name: String,
    pub comp_name: String,
    pub level: Level,
    /// Header line, e.g. `E AndroidRuntime: java.lang.NullPointerException: ...`
    pub header: String,
    /// Frame texts joined by newlines, newest line first
    pub frames: String,
    /// Header type plus every `Caused by:` type
    pub exc_types: BTreeSet<String>,
}

impl PartialEq for TraceBlock {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.frames == other.frames
    }
}

impl Eq for TraceBlock {}

impl Hash for TraceBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.header.hash(state);
        self.frames.hash(state);
    }
}

/// Block under construction: frames and causes seen before its header
#[derive(Debug, Default)]
struct PendingBlock {
    frames: Vec<String>,
    exc_types: BTreeSet<String>,
}

/// Split a case's trace into accepted blocks
///
/// Cases that did not fail and logged no error line are not segmented.
/// Lines are walked newest-first so that a header closes the frames printed
/// after it.
pub fn segment_trace(
    grammar: &LogGrammar,
    filter: &TraceFilter,
    case: &CaseResult,
) -> Vec<TraceBlock> {
    let mut blocks = Vec::new();
    if !case.is_failed() && !case.full_trace.iter().any(|l| l.starts_with("E ")) {
        return blocks;
    }

    let mut pending: Option<PendingBlock> = None;

    for line in case.full_trace.iter().rev() {
        if is_frame_line(line) {
            let frame = line.find(": ").map_or("", |pos| &line[pos + 2..]);
            pending
                .get_or_insert_with(PendingBlock::default)
                .frames
                .push(frame.to_string());
            continue;
        }

        if is_cause_line(line) {
            if let Some(block) = pending.as_mut() {
                match grammar.caused_by(line) {
                    Some(cause) => {
                        block.exc_types.insert(cause.exc.to_string());
                    }
                    None => tracing::error!("Unrecognized `caused by` line: {}", line),
                }
                continue;
            }
        }

        // Header of the pending block
        let Some(block) = pending.take() else {
            tracing::error!("Unrecognized isolated stacktrace line: {}", line);
            continue;
        };

        let Some(header) = grammar.header(line) else {
            tracing::error!("Unrecognized stacktrace header: {}", line);
            continue;
        };

        if filter.filter_tag(header.tag) {
            tracing::debug!(
                tag = header.tag,
                component = %case.comp_name,
                "Filtered trace block by log tag"
            );
            continue;
        }

        let mut exc_types = block.exc_types;
        exc_types.insert(header.exc.to_string());
        let candidate = TraceBlock {
            pkg_name: case.pkg_name.clone(),
            comp_name: case.comp_name.clone(),
            level: header.level,
            header: line.clone(),
            frames: block.frames.join("\n"),
            exc_types,
        };

        if filter.filter_exc(&candidate) {
            tracing::debug!(
                component = %case.comp_name,
                "Filtered exception {:?}",
                candidate.exc_types
            );
            continue;
        }

        blocks.push(candidate);
    }

    if let Some(block) = pending {
        tracing::error!(
            component = %case.comp_qualified_name,
            "Incomplete trace block with {} frame(s) and types {:?}",
            block.frames.len(),
            block.exc_types
        );
    }

    blocks
}
