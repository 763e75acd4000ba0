//! # **View** - *Composed row/column window over an active subset of slices*
//!
//! A `View` never copies CSR/CSC data. It declares an ordered subset of a
//! pool's slices, aggregates their `MetaInfo`, and hands out two kinds of
//! iterators: rows (always safe, no reindex required) and columns (requires
//! the active slices to be reindexed into the view's own contiguous layout
//! first — see `kernels::reindex`).

use crate::enums::error::{SliceError, SliceResult};
use crate::kernels::reindex::ensure_reindexed;
use crate::structs::meta::MetaInfo;
use crate::structs::page::{ColEntry, Entry};
use crate::structs::pool::{ColumnAccess, SlicePool};
use crate::structs::slice::ConfigState;

/// One row-batch descriptor: which slice it came from, and where its rows
/// land in the view's contiguous row numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBatch {
    pub base_rowid: u64,
    pub size: u64,
    pub(crate) slice_index: usize,
}

pub struct View {
    pool: SlicePool,
    /// Sorted ascending and de-duplicated.
    active: Vec<u64>,
    desired_state: ConfigState,
    info: MetaInfo,
    /// Aggregated non-zero count per feature, across all active slices.
    col_sizes: Vec<u64>,
    row_batches: Vec<RowBatch>,
}

impl View {
    /// Validates `active`, sorts it, and aggregates metadata across the
    /// referenced slices. Column structure (which feature holds how many
    /// entries) is stable regardless of reindex state, so this never touches
    /// the single-column-reader guard.
    pub fn new(pool: SlicePool, mut active: Vec<u64>) -> SliceResult<View> {
        if active.is_empty() {
            return Err(SliceError::EmptyActiveSet);
        }
        for &a in &active {
            if a as usize >= pool.len() {
                return Err(SliceError::ActiveIndexOutOfRange { index: a, pool_size: pool.len() });
            }
        }
        active.sort_unstable();
        active.dedup();

        let desired_state = ConfigState::from_indices(&active);

        let mut info = MetaInfo::new();
        let mut col_sizes: Vec<u64> = Vec::new();
        let mut row_batches = Vec::with_capacity(active.len());
        let mut running_offset = 0u64;

        let mut labels_empty = false;
        let mut weights_empty = false;
        let mut base_margin_empty = false;
        let mut group_ptr_empty = false;
        let mut root_index_empty = false;

        for (i, &a) in active.iter().enumerate() {
            pool.with_slice(a as usize, |s| {
                if i == 0 {
                    info.num_col = s.info.num_col;
                    col_sizes = vec![0u64; s.info.num_col as usize];
                    labels_empty = s.info.labels.is_empty();
                    weights_empty = s.info.weights.is_empty();
                    base_margin_empty = s.info.base_margin.is_empty();
                    group_ptr_empty = s.info.group_ptr.is_empty();
                    root_index_empty = s.info.root_index.is_empty();
                } else if s.info.num_col != info.num_col {
                    return Err(SliceError::ColumnCountMismatch { expected: info.num_col, found: s.info.num_col });
                }

                info.num_row += s.info.num_row;
                info.num_nonzero += s.info.num_nonzero;
                if !labels_empty {
                    info.labels.extend_from_slice(&s.info.labels);
                }
                if !weights_empty {
                    info.weights.extend_from_slice(&s.info.weights);
                }
                if !base_margin_empty {
                    info.base_margin.extend_from_slice(&s.info.base_margin);
                }
                if !group_ptr_empty {
                    info.group_ptr.extend_from_slice(&s.info.group_ptr);
                }
                if !root_index_empty {
                    info.root_index.extend_from_slice(&s.info.root_index);
                }

                for (c, total) in col_sizes.iter_mut().enumerate() {
                    *total += s.col_count(c);
                }

                let size = s.row_count() as u64;
                row_batches.push(RowBatch { base_rowid: running_offset, size, slice_index: a as usize });
                running_offset += size;
                Ok(())
            })?;
        }

        Ok(View { pool, active, desired_state, info, col_sizes, row_batches })
    }

    pub fn info(&self) -> &MetaInfo {
        &self.info
    }

    pub fn active(&self) -> &[u64] {
        &self.active
    }

    /// Total non-zero count for feature `c` across the whole view.
    pub fn col_size(&self, c: usize) -> u64 {
        self.col_sizes[c]
    }

    /// Fraction of rows in the view for which feature `c` is non-zero.
    pub fn col_density(&self, c: usize) -> f64 {
        if self.info.num_row == 0 {
            return 0.0;
        }
        self.col_sizes[c] as f64 / self.info.num_row as f64
    }

    /// A restartable row iterator; never requires reindexing.
    pub fn row_iterator(&self) -> RowIterator<'_> {
        RowIterator { view: self, cursor: 0 }
    }

    /// True only when exactly one slice is active and it covers the view's
    /// entire row range in a single CSC page — the cheap path callers can
    /// check before falling back to `column_iterator`.
    pub fn single_col_block(&self) -> bool {
        self.active.len() == 1 && self.pool.with_slice(self.active[0] as usize, |s| s.cols.len() == 1)
    }

    /// Reindexes the active slices against this view (if not already done)
    /// and returns a column iterator walking `features` (or every feature,
    /// if `None`) page by page, slice by slice, in active order.
    pub fn column_iterator(&self, features: Option<Vec<u64>>) -> SliceResult<ColumnIterator<'_>> {
        for &a in &self.active {
            let unavailable = self.pool.with_slice(a as usize, |s| s.row_count() > 0 && s.cols.is_empty());
            if unavailable {
                return Err(SliceError::ColumnAccessUnavailable);
            }
        }

        let access = ensure_reindexed(&self.pool, &self.active, self.desired_state)?;
        let features = features.unwrap_or_else(|| (0..self.info.num_col).collect());
        Ok(ColumnIterator { view: self, _access: access, features, active_cursor: 0, page_cursor: 0 })
    }
}

/// Restartable cursor over a view's `RowBatch` descriptors.
pub struct RowIterator<'v> {
    view: &'v View,
    cursor: usize,
}

impl<'v> RowIterator<'v> {
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Not `std::iter::Iterator` — callers need a live `&self` (via `row`)
    /// alongside each batch, which a lending iterator can't express on stable.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<RowBatch> {
        let batch = *self.view.row_batches.get(self.cursor)?;
        self.cursor += 1;
        Some(batch)
    }

    /// Borrows the entries for local row `local_i` (`0..batch.size`) within `batch`.
    pub fn row(&self, batch: RowBatch, local_i: usize) -> RowEntries<'v> {
        RowEntries { guard: self.view.pool.borrow_slices(), slice_index: batch.slice_index, local_i }
    }
}

pub struct RowEntries<'a> {
    guard: std::cell::Ref<'a, Vec<crate::structs::slice::Slice>>,
    slice_index: usize,
    local_i: usize,
}

impl<'a> RowEntries<'a> {
    pub fn as_slice(&self) -> &[Entry] {
        self.guard[self.slice_index].rows.inst(self.local_i)
    }
}

/// Column-iteration cursor. Holding this alive proves, via the embedded
/// `ColumnAccess` guard, that no other view is concurrently iterating
/// columns over the same pool.
pub struct ColumnIterator<'v> {
    view: &'v View,
    _access: ColumnAccess,
    features: Vec<u64>,
    active_cursor: usize,
    page_cursor: usize,
}

impl<'v> ColumnIterator<'v> {
    /// Advances to the next CSC page in active-slice order, or `None` once
    /// every active slice's pages have been visited. Not `std::iter::Iterator`
    /// for the same reason as `RowIterator::next`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<ColBatch<'_>> {
        loop {
            if self.active_cursor >= self.view.active.len() {
                return None;
            }
            let slice_index = self.view.active[self.active_cursor] as usize;
            let num_pages = self.view.pool.with_slice(slice_index, |s| s.cols.len());

            if self.page_cursor >= num_pages {
                self.active_cursor += 1;
                self.page_cursor = 0;
                continue;
            }

            let page_index = self.page_cursor;
            self.page_cursor += 1;
            let guard = self.view.pool.borrow_slices();
            return Some(ColBatch { guard, slice_index, page_index, features: &self.features });
        }
    }
}

pub struct ColBatch<'a> {
    guard: std::cell::Ref<'a, Vec<crate::structs::slice::Slice>>,
    slice_index: usize,
    page_index: usize,
    features: &'a [u64],
}

impl<'a> ColBatch<'a> {
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Entries for the `i`-th requested feature, in this page.
    pub fn feature(&self, i: usize) -> &[ColEntry] {
        let c = self.features[i] as usize;
        self.guard[self.slice_index].cols[self.page_index].inst(c)
    }

    /// The row offset this page's entries are currently indexed against.
    pub fn row_offset(&self) -> u64 {
        self.guard[self.slice_index].col_offsets[self.page_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::builder::build_slices_synthetic;

    fn identity_col(idx: usize) -> crate::kernels::builder::ColumnCreatorFn {
        Box::new(move |row_id: u64| if row_id as usize == idx { 1.0 } else { 0.0 })
    }

    fn build_pool(nrow: u64, num_col: usize, partition: &[Vec<u64>]) -> SlicePool {
        let creators: Vec<_> = (0..num_col).map(identity_col).collect();
        let labels = vec![0.0f32; nrow as usize];
        build_slices_synthetic(nrow, &creators, &labels, None, partition).unwrap()
    }

    #[test]
    fn new_rejects_empty_and_out_of_range() {
        let pool = build_pool(4, 1, &[vec![0, 1], vec![2, 3]]);
        assert!(matches!(View::new(pool.clone(), vec![]), Err(SliceError::EmptyActiveSet)));
        assert!(matches!(
            View::new(pool, vec![5]),
            Err(SliceError::ActiveIndexOutOfRange { index: 5, pool_size: 2 })
        ));
    }

    #[test]
    fn aggregates_row_and_nonzero_counts() {
        let pool = build_pool(4, 2, &[vec![0, 1], vec![2, 3]]);
        let view = View::new(pool, vec![0, 1]).unwrap();
        assert_eq!(view.info().num_row, 4);
        assert_eq!(view.info().num_col, 2);
        assert_eq!(view.col_size(0) + view.col_size(1), view.info().num_nonzero);
    }

    #[test]
    fn row_iterator_visits_every_batch_in_order() {
        let pool = build_pool(5, 1, &[vec![0, 1, 2], vec![3, 4]]);
        let view = View::new(pool, vec![0, 1]).unwrap();
        let mut it = view.row_iterator();
        let b0 = it.next().unwrap();
        assert_eq!(b0, RowBatch { base_rowid: 0, size: 3, slice_index: 0 });
        let b1 = it.next().unwrap();
        assert_eq!(b1, RowBatch { base_rowid: 3, size: 2, slice_index: 1 });
        assert!(it.next().is_none());
        assert_eq!(it.row(b0, 0).as_slice(), &[Entry { column_index: 0, value: 1.0 }]);
        assert!(it.row(b0, 1).as_slice().is_empty());
    }

    #[test]
    fn column_iterator_covers_every_active_page() {
        let pool = build_pool(5, 1, &[vec![0, 1, 2], vec![3, 4]]);
        let view = View::new(pool, vec![0, 1]).unwrap();
        let mut it = view.column_iterator(None).unwrap();
        let mut total = 0usize;
        while let Some(batch) = it.next() {
            total += batch.feature(0).len();
        }
        assert_eq!(total, view.col_size(0) as usize);
    }
}
