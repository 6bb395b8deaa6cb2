use serde::Serialize;
use std::collections::BTreeMap;

/// Run-wide id sequences for unique errors and unique crashes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueCounters {
    /// Exception types attributed to unique clusters, counted with repetition
    pub exceptions: usize,
    /// Last unique-error id handed out
    pub errors: u32,
    /// Last unique-crash id handed out
    pub crashes: u32,
}

impl UniqueCounters {
    pub fn next_error_id(&mut self) -> u32 {
        self.errors += 1;
        self.errors
    }

    pub fn next_crash_id(&mut self) -> u32 {
        self.crashes += 1;
        self.crashes
    }
}

/// Exception type → number of unique clusters it appeared in
///
/// Serializes as a plain key-sorted JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeTally(BTreeMap<String, u64>);

impl TypeTally {
    /// Count each type once
    pub fn add_all<'a, I>(&mut self, types: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for t in types {
            *self.0.entry(t.clone()).or_insert(0) += 1;
        }
    }

    pub fn get(&self, exc_type: &str) -> u64 {
        self.0.get(exc_type).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }
}
