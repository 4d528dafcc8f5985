//! Identifier generation.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates opaque unique identifiers (used for ad-hoc correlation IDs,
/// not for instance names — see [`generate_suffix`] for those).
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based generator for production use.
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        format!("{:x}", rand::random::<u128>())
    }
}

/// Sequential generator for deterministic tests.
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// Draw a random decimal digit string of `length` digits, used to
/// disambiguate a new instance name from an existing blueprint-named one
/// (§4.8 `generate_name`). Not cryptographically meaningful — collisions are
/// expected occasionally and the caller redraws.
pub fn generate_suffix(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| std::char::from_digit(rng.gen_range(0..10), 10).unwrap_or('0'))
        .collect()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
