use crate::grammar::Level;
use crate::stacktrace::TraceBlock;
use std::collections::BTreeSet;

/// Cluster key of one case plus the exception types it contributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSignature {
    /// Error-level frame texts, each followed by a newline
    pub key: String,
    /// Types of every accepted block
    pub exc_types: BTreeSet<String>,
    /// Types of error-level blocks
    pub err_types: BTreeSet<String>,
    /// Error-level types of a FAILED case
    pub crash_types: BTreeSet<String>,
}

impl ClusterSignature {
    /// Fold accepted trace blocks into a signature
    ///
    /// A block's frame text is appended only when it is not already part of
    /// the key, so repeated or nested traces collapse.
    pub fn from_blocks(blocks: &[TraceBlock], failed: bool) -> Self {
        let mut sig = Self::default();
        for block in blocks {
            let is_error = block.level == Level::Error;
            if is_error && !sig.key.contains(block.frames.as_str()) {
                sig.key.push_str(&block.frames);
                sig.key.push('\n');
            }

            sig.exc_types.extend(block.exc_types.iter().cloned());
            if is_error {
                sig.err_types.extend(block.exc_types.iter().cloned());
                if failed {
                    sig.crash_types.extend(block.exc_types.iter().cloned());
                }
            }
        }
        sig
    }

    /// No error-level frames survived filtering
    pub fn is_empty(&self) -> bool {
        self.key.trim().is_empty()
    }
}
