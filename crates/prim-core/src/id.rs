use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one evaluator instance.
///
/// Attribute handles carry the id of the evaluator that issued them so a
/// handle cannot silently index into another evaluator's buffers. Ids are
/// never reused within a process and are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EvaluatorId(NonZeroU64);

impl EvaluatorId {
    /// Allocate an id no other evaluator in this process holds.
    pub fn fresh() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let raw = COUNTER.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        // Wrapping would take 2^64 evaluators; zero is skipped regardless.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EvaluatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluator#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_distinct_and_increasing() {
        let a = EvaluatorId::fresh();
        let b = EvaluatorId::fresh();
        assert_ne!(a, b);
        assert!(a < b);
        assert_ne!(a.get(), 0);
        assert_eq!(format!("{}", a), format!("evaluator#{}", a.get()));
    }
}
