//! Monotonic client order id generation.

use std::sync::atomic::{AtomicU32, Ordering};

/// Generator for unique client order ids.
///
/// Client order ids correlate a placed order with its later cancellation.
/// Ids are monotonically increasing and never reused within a session;
/// one generator instance is shared process-wide.
#[derive(Debug)]
pub struct OrderIdGenerator {
    counter: AtomicU32,
}

impl OrderIdGenerator {
    /// Create a new generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(1),
        }
    }

    /// Generate the next client order id.
    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::AcqRel)
    }

    /// Peek at the next id without consuming it.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.counter.load(Ordering::Acquire)
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let gen = OrderIdGenerator::new();
        assert_eq!(gen.next(), 1);
        assert_eq!(gen.next(), 2);
        assert_eq!(gen.peek(), 3);
    }

    #[test]
    fn test_concurrent_draws_are_unique() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let gen = Arc::new(OrderIdGenerator::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let gen = Arc::clone(&gen);
                std::thread::spawn(move || {
                    (0..PER_THREAD).map(|_| gen.next()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("worker panicked") {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }
}
