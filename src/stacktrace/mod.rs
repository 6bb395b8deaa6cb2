// Stack trace recovery and segmentation
//
// Two bounded passes over a case's lines:
// 1. extract: walk backward from the result line to the previous controller
//    line (`[`-prefixed), keeping non-debug logcat lines
// 2. segment: walk the kept lines newest-first, grouping `at ...` frames
//    under the header that owns them, then drop noisy or benign blocks
//
// Relevance to the tested component is decided last, over the accepted blocks.

mod extract;
mod filter;
mod segment;

pub use extract::{extract_trace, ExtractedTrace};
pub use filter::{package_group_id, TraceFilter};
pub use segment::{segment_trace, TraceBlock};

#[cfg(test)]
mod tests;
