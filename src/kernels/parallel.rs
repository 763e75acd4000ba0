//! # **Parallel helper** - *Work distribution for the slice builder's transpose*
//!
//! The only parallelism in this crate lives here, confined to the CSC
//! transpose's budget and scatter passes, both of which dispatch through
//! [`parallel_for`]. View/iteration code never calls into this module.
//! Gated behind the `parallel_proc` feature.

#[cfg(feature = "parallel_proc")]
use rayon::prelude::*;

/// Runs `f(worker, row)` over every worker's private row of `rows`,
/// distributing workers across threads when `parallel_proc` is enabled. Each
/// worker touches only its own row, so this is sound without synchronization.
pub fn parallel_for<T, F>(rows: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    #[cfg(feature = "parallel_proc")]
    {
        rows.par_iter_mut().enumerate().for_each(|(worker, row)| f(worker, row));
    }
    #[cfg(not(feature = "parallel_proc"))]
    {
        rows.iter_mut().enumerate().for_each(|(worker, row)| f(worker, row));
    }
}

/// Bucketed accumulator: each worker owns a private row in the budget/storage
/// matrices, so the budget pass and the scatter pass are both embarrassingly
/// parallel across workers with no shared mutable state.
///
/// Buckets are merged worker-id ascending during `finalize`, which gives the
/// transpose its stable tie-break: workers are assigned increasing row
/// ranges, so worker order is row order and bucket order is construction
/// order.
pub struct BucketAccumulator<T> {
    n_buckets: usize,
    budgets: Vec<Vec<u64>>,
    storage: Vec<Vec<Vec<T>>>,
}

impl<T> BucketAccumulator<T> {
    pub fn init_budget(n_buckets: usize, n_workers: usize) -> Self {
        Self { n_buckets, budgets: vec![vec![0u64; n_buckets]; n_workers], storage: Vec::new() }
    }

    pub fn add_budget(&mut self, bucket: usize, worker: usize) {
        self.budgets[worker][bucket] += 1;
    }

    /// Pre-allocates each worker's per-bucket storage from the budget pass,
    /// so the scatter pass below never reallocates under concurrent writers.
    pub fn init_storage(&mut self) {
        self.storage = self
            .budgets
            .iter()
            .map(|worker_budget| worker_budget.iter().map(|&c| Vec::with_capacity(c as usize)).collect())
            .collect();
    }

    pub fn push(&mut self, bucket: usize, item: T, worker: usize) {
        self.storage[worker][bucket].push(item);
    }

    /// Concatenates each bucket's entries across workers, in ascending worker order.
    pub fn finalize(mut self) -> Vec<Vec<T>> {
        let n_workers = self.storage.len();
        let mut out: Vec<Vec<T>> = (0..self.n_buckets).map(|_| Vec::new()).collect();
        for worker in 0..n_workers {
            for (bucket, total) in out.iter_mut().enumerate() {
                total.append(&mut self.storage[worker][bucket]);
            }
        }
        out
    }

    /// Mutable access to one worker's budget row, for parallel budget passes.
    pub fn budgets_mut(&mut self) -> &mut [Vec<u64>] {
        &mut self.budgets
    }

    /// Mutable access to one worker's storage row, for parallel scatter passes.
    pub fn storage_mut(&mut self) -> &mut [Vec<Vec<T>>] {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_accumulator_preserves_worker_order() {
        let mut acc: BucketAccumulator<i32> = BucketAccumulator::init_budget(2, 3);
        acc.add_budget(0, 0);
        acc.add_budget(0, 1);
        acc.add_budget(1, 2);
        acc.init_storage();
        acc.push(0, 10, 0);
        acc.push(0, 20, 1);
        acc.push(1, 30, 2);

        let out = acc.finalize();
        assert_eq!(out[0], vec![10, 20]);
        assert_eq!(out[1], vec![30]);
    }

    #[test]
    fn parallel_for_visits_every_worker_row_exactly_once() {
        let mut rows = vec![0i32; 4];
        parallel_for(&mut rows, |worker, row| {
            *row = worker as i32 * 10;
        });
        assert_eq!(rows, vec![0, 10, 20, 30]);
    }
}
