use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How many threads a batch of work may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// Use all CPUs
    Fastest,
    /// Use half of CPUs
    Polite,
    /// Exactly this many workers, at least one
    Bounded(usize),
}

impl Parallelism {
    pub fn num_workers(self) -> usize {
        let cpus = num_cpus::get().max(1);
        match self {
            Parallelism::Fastest => cpus,
            Parallelism::Polite => (cpus / 2).max(1),
            Parallelism::Bounded(n) => n.max(1),
        }
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Fastest
    }
}

/// A flag shared between whoever requests work and the workers doing it.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Cancellation {
        Cancellation(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers() {
        assert_eq!(Parallelism::Bounded(0).num_workers(), 1);
        assert_eq!(Parallelism::Bounded(3).num_workers(), 3);
        assert!(Parallelism::Polite.num_workers() >= 1);

        let cancel = Cancellation::new();
        let shared = cancel.clone();
        assert!(!shared.is_cancelled());
        cancel.cancel();
        assert!(shared.is_cancelled());
    }
}
