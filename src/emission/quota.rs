//! Exact distribution of a fixed global insertion count over tasks.
//!
//! When the run asks for exactly `target` insertions per step, every task in
//! the distributed task set is placed in one global ordering (rank order,
//! then local task order). Each task receives `floor(target / total)`
//! insertions, and the last `target mod total` tasks in the ordering receive
//! one extra. Each rank derives a single local threshold from its prefix-sum
//! position, so no communication is needed beyond the driver's initial
//! reduce and inclusive scan of task counts.

/// Per-rank slice of the global insertion quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSplit {
    /// Insertions for local tasks below [QuotaSplit::threshold].
    pub base: usize,
    /// Local tasks at or above this index insert one extra particle.
    pub threshold: usize,
}

impl QuotaSplit {
    /// Insertion count of the local task at index `i`.
    pub fn count_for(&self, i: usize) -> usize {
        if i < self.threshold {
            self.base
        } else {
            self.base + 1
        }
    }
}

/// Results of the driver's collective over per-rank task counts: the global
/// total and this rank's inclusive prefix sum. Insert as a resource before
/// building tasks on a multi-rank run; a single-rank run needs neither.
pub struct RankScan {
    pub total: usize,
    pub upto: usize,
}

/// Computes this rank's quota split.
///
/// # Arguments
///
/// `local`: number of tasks on this rank.
///
/// `total`: global task count (sum-reduce over ranks).
///
/// `upto`: inclusive prefix sum of task counts up to and including this rank.
///
/// `target`: global number of insertions required per step.
///
/// A run with no tasks anywhere yields a zero split rather than an error.
pub fn split_insertions(local: usize, total: usize, upto: usize, target: usize) -> QuotaSplit {
    if total == 0 {
        return QuotaSplit {
            base: 0,
            threshold: local,
        };
    }

    let base = target / total;
    let without_extra = total - target % total;

    // Global index of the first local task is upto - local; tasks with
    // global index >= without_extra carry the extra insertion.
    let threshold = if without_extra < upto - local {
        0
    } else if without_extra >= upto {
        local
    } else {
        without_extra - (upto - local)
    };

    QuotaSplit { base, threshold }
}
