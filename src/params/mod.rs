// Test-case parameter recovery
//
// The test-case generator flattens every intent into one CSV row per case.
// Column names carry base32-encoded parts:
// - `category_<name>`: one boolean column per intent category
// - `extra_<parentId>_<id>_<name>_<type>`: one column per extra, where
//   bundle-typed extras open a nested node that later columns attach to
//
// The resolver reverses that flattening for the case a report refers to.

mod base32;
mod resolver;
mod table;

pub use base32::{base32_decode, MAX_EXTRA_PADDING};
pub use resolver::{ParamResolver, FALLBACK_MARKER};
pub use table::CaseTable;
