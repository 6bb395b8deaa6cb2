//! tracesift - failure clustering for component-testing harness logs
//!
//! This library scans test-controller transcripts, recovers the stack trace
//! printed for every test case, drops noise and irrelevant traces, and
//! clusters the rest into stable unique-error and unique-crash identities.
//! Reports resolve the literal test-case parameters of each failure from
//! the generated test-case tables.

pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod grammar;
pub mod json_output;
pub mod log_group;
pub mod mist;
pub mod model;
pub mod params;
pub mod report;
pub mod stacktrace;
pub mod summary;
