// Failure clustering: stable unique-error / unique-crash identities
//
// A case's signature is the ordered, de-duplicated concatenation of the frame
// texts of its error-level trace blocks. Within one component, cases sharing
// a signature form a cluster whose first member is its representative. Only
// representatives draw new ids; everyone else inherits.
//
// A FAILED case joining a cluster represented by a non-FAILED case takes
// over as representative and draws a fresh crash id, so every crash
// signature gets a crash identity even when it was first seen without one.

mod signature;
mod table;
mod tally;

pub use signature::ClusterSignature;
pub use table::{Assignment, ClusterEngine, ClusterTable};
pub use tally::{TypeTally, UniqueCounters};
