use crate::Generator;
use linkhop_core::ShortToken;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic sequential tokens like "lh000000", "lh000001", ...
///
/// Intended for tests and local development, where predictable tokens are
/// easier to work with than random ones.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Starts counting from `offset` instead of zero.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> ShortToken {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortToken::new_unchecked(format!("{}{:06}", self.prefix, count))
    }
}
