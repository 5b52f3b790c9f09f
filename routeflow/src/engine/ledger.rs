//! Pooled ledgers for cyclic-call detection.
//!
//! A ledger is an append-only list of transition names visited in one run.
//! Buffers are recycled through a free list so high call volumes do not
//! allocate a fresh `Vec` per run.

use crate::errors::CyclicError;
use parking_lot::Mutex;

/// Upper bound on idle buffers kept by a pool.
pub const MAX_POOLED_LEDGERS: usize = 64;

/// Buffers that grew beyond this capacity are freed instead of pooled.
pub const MAX_RETAINED_CAPACITY: usize = 256;

static GLOBAL_POOL: LedgerPool = LedgerPool::new(MAX_POOLED_LEDGERS, MAX_RETAINED_CAPACITY);

/// A free list of reusable ledger buffers.
pub struct LedgerPool {
    free: Mutex<Vec<Vec<String>>>,
    max_pooled: usize,
    max_capacity: usize,
}

impl LedgerPool {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new(max_pooled: usize, max_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_pooled,
            max_capacity,
        }
    }

    /// Returns the process-wide pool used by the driver.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_POOL
    }

    /// Checks out a ledger, reusing an idle buffer when one is available.
    pub fn checkout(&self) -> CycleLedger<'_> {
        let visited = self.free.lock().pop().unwrap_or_default();
        CycleLedger {
            pool: self,
            visited,
        }
    }

    /// Returns the number of idle buffers.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.free.lock().len()
    }

    fn give_back(&self, mut buffer: Vec<String>) {
        if buffer.capacity() > self.max_capacity {
            return;
        }
        buffer.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_pooled {
            free.push(buffer);
        }
    }
}

impl std::fmt::Debug for LedgerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerPool")
            .field("pooled", &self.pooled())
            .field("max_pooled", &self.max_pooled)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

/// The visited-name ledger for a single run.
///
/// Not shareable across runs; the buffer returns to its pool on drop.
#[derive(Debug)]
pub struct CycleLedger<'p> {
    pool: &'p LedgerPool,
    visited: Vec<String>,
}

impl CycleLedger<'_> {
    /// Records a visit to `name`.
    ///
    /// Fails with the full call trace if `name` was already visited.
    pub fn visit(&mut self, name: &str) -> Result<(), CyclicError> {
        if self.visited.iter().any(|seen| seen == name) {
            return Err(CyclicError::from_trace(&self.visited, name));
        }
        self.visited.push(name.to_string());
        Ok(())
    }

    /// Returns the names visited so far, in order.
    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Returns the number of names visited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// Returns true if nothing was visited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

impl Drop for CycleLedger<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.visited));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_detects_repeat() {
        let pool = LedgerPool::new(4, 16);
        let mut ledger = pool.checkout();

        ledger.visit("A").unwrap();
        ledger.visit("B").unwrap();
        let err = ledger.visit("A").unwrap_err();

        assert_eq!(err.stages, "A -> B -> A");
        assert_eq!(ledger.visited(), ["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_ledger_never_shrinks() {
        let pool = LedgerPool::new(4, 16);
        let mut ledger = pool.checkout();
        ledger.visit("A").unwrap();
        let _ = ledger.visit("A");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_buffer_is_reset_and_reused() {
        let pool = LedgerPool::new(4, 16);
        {
            let mut ledger = pool.checkout();
            ledger.visit("A").unwrap();
            ledger.visit("B").unwrap();
        }
        assert_eq!(pool.pooled(), 1);

        let ledger = pool.checkout();
        assert!(ledger.is_empty());
        assert!(ledger.visited.capacity() >= 2);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = LedgerPool::new(2, 16);
        let ledgers: Vec<_> = (0..5).map(|_| pool.checkout()).collect();
        drop(ledgers);
        assert_eq!(pool.pooled(), 2);
    }

    #[test]
    fn test_oversized_buffers_are_freed() {
        let pool = LedgerPool::new(4, 2);
        {
            let mut ledger = pool.checkout();
            for name in ["A", "B", "C", "D", "E"] {
                ledger.visit(name).unwrap();
            }
        }
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_global_pool_is_shared() {
        let a = LedgerPool::global();
        let b = LedgerPool::global();
        assert!(std::ptr::eq(a, b));
    }
}
