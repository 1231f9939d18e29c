//! Progress reporting for sweeps.
//!
//! Progress is a side channel: counters are relaxed atomics that workers bump
//! after each completed invocation, and nothing in the sweep ever waits on them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::value::Value;

/// Progress tracking for a sweep
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// Completed invocations counter
    completed: Arc<AtomicUsize>,
    /// Total invocations
    total: Arc<AtomicUsize>,
}

impl SweepProgress {
    /// Create a new progress tracker
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
        }
    }

    /// Create from existing atomics (for UI integration)
    pub fn from_atomics(completed: Arc<AtomicUsize>, total: Arc<AtomicUsize>) -> Self {
        Self { completed, total }
    }

    /// Get the number of completed invocations
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get the total number of invocations
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completed share in `[0, 1]`; an empty sweep counts as done
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            self.completed() as f64 / total as f64
        }
    }

    /// Increment the completed counter
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset the progress
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Reports when every point under one value of a leading axis has finished.
///
/// With a depth of `d`, the first `d` axes each get one counter per block of
/// the grid they own. A block is done when its counter reaches the number of
/// points beneath it, regardless of the order workers complete them in.
pub(crate) struct BlockTracker {
    levels: Vec<BlockLevel>,
}

struct BlockLevel {
    axis: String,
    values: Vec<Value>,
    block_size: usize,
    counters: Vec<AtomicUsize>,
}

impl BlockTracker {
    pub(crate) fn new(axes: &[(String, Vec<Value>)], depth: usize) -> Option<Self> {
        let depth = depth.min(axes.len());
        if depth == 0 {
            return None;
        }
        let shape: Vec<usize> = axes.iter().map(|(_, values)| values.len()).collect();
        let levels = (0..depth)
            .map(|level| {
                let block_size = shape[level + 1..].iter().product();
                let blocks: usize = shape[..=level].iter().product();
                BlockLevel {
                    axis: axes[level].0.clone(),
                    values: axes[level].1.clone(),
                    block_size,
                    counters: (0..blocks).map(|_| AtomicUsize::new(0)).collect(),
                }
            })
            .collect();
        Some(Self { levels })
    }

    /// Record completion of the point at `flat` (row-major grid index).
    pub(crate) fn complete(&self, flat: usize) {
        for (depth, level) in self.levels.iter().enumerate() {
            let block = flat / level.block_size;
            let Some(counter) = level.counters.get(block) else {
                continue;
            };
            if counter.fetch_add(1, Ordering::Relaxed) + 1 == level.block_size {
                let value = &level.values[block % level.values.len()];
                tracing::debug!(
                    axis = %level.axis,
                    value = %value,
                    depth,
                    points = level.block_size,
                    "sweep block finished"
                );
            }
        }
    }

    #[cfg(test)]
    fn finished_blocks(&self, depth: usize) -> usize {
        let level = &self.levels[depth];
        level
            .counters
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) == level.block_size)
            .count()
    }
}
