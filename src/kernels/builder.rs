//! # **Slice builder** - *Partitions a source matrix into a SlicePool*
//!
//! Two entry points: [`build_slices`] extracts rows from a [`SourceMatrix`]
//! collaborator; [`build_slices_synthetic`] generates rows directly from
//! per-column value functions, letting callers synthesize sparse data with
//! no source matrix at all.

use std::collections::HashMap;

use vec64::Vec64;

use crate::enums::error::{SliceError, SliceResult};
use crate::kernels::parallel::{parallel_for, BucketAccumulator};
use crate::structs::meta::MetaInfo;
use crate::structs::page::{ColEntry, ColPage, Entry, Page};
use crate::structs::pool::SlicePool;
use crate::structs::slice::{ConfigState, Slice};
use crate::traits::source::SourceMatrix;

/// Maximum rows in one CSC page before a slice pages its column access.
/// Overridable per build via [`BuildConfig::max_rows_per_col_page`].
pub const MAX_ROWS_PER_COL_PAGE: usize = 32_768;

/// Number of worker buckets used for the transpose's budget/scatter passes.
/// Not user-configurable — it only bounds parallel fan-out, not semantics.
const TRANSPOSE_WORKERS: usize = 8;

/// Build-time knobs threaded through both `build_slices` entry points.
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    pub max_rows_per_col_page: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { max_rows_per_col_page: MAX_ROWS_PER_COL_PAGE }
    }
}

/// Per-column value generator for the synthetic builder path: given a row
/// id, returns that column's value for the row (0.0 is elided as absent).
pub type ColumnCreatorFn = Box<dyn Fn(u64) -> f32 + Sync>;

/// Builds a [`SlicePool`] by extracting `partition`'s row subsets from `source`.
///
/// `partition[i]` must be a set of distinct, ascending row-ids; the elements
/// across all of `partition` must be pairwise disjoint — overlap is
/// rejected, not left undefined.
pub fn build_slices(source: &dyn SourceMatrix, partition: &[Vec<u64>]) -> SliceResult<SlicePool> {
    build_slices_with_config(source, partition, BuildConfig::default())
}

pub fn build_slices_with_config(
    source: &dyn SourceMatrix,
    partition: &[Vec<u64>],
    config: BuildConfig,
) -> SliceResult<SlicePool> {
    let owner = validate_partition(partition, source.num_row())?;

    let mut csr_pages: Vec<Page> = (0..partition.len()).map(|_| Page::new()).collect();
    let mut consumed = vec![0usize; partition.len()];

    source.for_each_row(&mut |row| {
        if let Some(&bucket) = owner.get(&row.row_id) {
            csr_pages[bucket].push_row(row.entries.iter().copied());
            consumed[bucket] += 1;
        }
    });

    for (bucket, idx) in partition.iter().enumerate() {
        if consumed[bucket] != idx.len() {
            return Err(SliceError::SourceExhausted { expected_row_id: idx[consumed[bucket]] });
        }
    }

    let num_col = source.num_col();
    let src_info = source.info();

    let mut slices = Vec::with_capacity(partition.len());
    for (i, (idx, rows)) in partition.iter().zip(csr_pages).enumerate() {
        if rows.row_count() != idx.len() {
            return Err(SliceError::PageBookkeepingCorrupt {
                detail: format!("slice {i} expected {} rows, built {}", idx.len(), rows.row_count()),
            });
        }

        let mut info = MetaInfo::new();
        info.num_row = rows.row_count() as u64;
        info.num_col = num_col;
        info.num_nonzero = rows.nnz() as u64;
        info.gather_from(src_info, idx);

        let (cols, col_offsets, col_sizes) = transpose_slice(&rows, num_col, config.max_rows_per_col_page);

        slices.push(Slice {
            info,
            rows,
            cols,
            col_offsets,
            col_sizes,
            config_state: ConfigState::from_indices(&[i as u64]),
            row_base_rowid: 0,
        });
    }

    Ok(SlicePool::from_slices(slices))
}

/// Builds a [`SlicePool`] by generating rows directly from per-column value
/// functions, with no source matrix at all. `col_widths` (multiple
/// underlying feature ids per logical column, present in some matrix
/// builders) is not carried forward — every logical column here occupies
/// exactly one feature id.
pub fn build_slices_synthetic(
    nrow: u64,
    column_creators: &[ColumnCreatorFn],
    labels: &[f32],
    weights: Option<&[f32]>,
    partition: &[Vec<u64>],
) -> SliceResult<SlicePool> {
    build_slices_synthetic_with_config(nrow, column_creators, labels, weights, partition, BuildConfig::default())
}

pub fn build_slices_synthetic_with_config(
    nrow: u64,
    column_creators: &[ColumnCreatorFn],
    labels: &[f32],
    weights: Option<&[f32]>,
    partition: &[Vec<u64>],
    config: BuildConfig,
) -> SliceResult<SlicePool> {
    validate_partition(partition, nrow)?;
    let num_col = column_creators.len() as u64;

    let mut slices = Vec::with_capacity(partition.len());
    for (i, idx) in partition.iter().enumerate() {
        let mut rows = Page::new();
        for &row_id in idx {
            let entries: Vec<Entry> = column_creators
                .iter()
                .enumerate()
                .filter_map(|(c, creator)| {
                    let value = creator(row_id);
                    (value != 0.0).then_some(Entry { column_index: c as u32, value })
                })
                .collect();
            rows.push_row(entries);
        }

        let mut info = MetaInfo::new();
        info.num_row = idx.len() as u64;
        info.num_col = num_col;
        info.num_nonzero = rows.nnz() as u64;
        info.labels = idx.iter().map(|&r| labels[r as usize]).collect();
        if let Some(w) = weights {
            info.weights = idx.iter().map(|&r| w[r as usize]).collect();
        }

        let (cols, col_offsets, col_sizes) = transpose_slice(&rows, num_col, config.max_rows_per_col_page);

        slices.push(Slice {
            info,
            rows,
            cols,
            col_offsets,
            col_sizes,
            config_state: ConfigState::from_indices(&[i as u64]),
            row_base_rowid: 0,
        });
    }

    Ok(SlicePool::from_slices(slices))
}

fn validate_partition(partition: &[Vec<u64>], num_row: u64) -> SliceResult<HashMap<u64, usize>> {
    if partition.len() > 64 {
        return Err(SliceError::TooManySlices { count: partition.len() });
    }

    let mut owner: HashMap<u64, usize> = HashMap::new();
    for (bucket, idx) in partition.iter().enumerate() {
        let mut prev: Option<u64> = None;
        for &row_id in idx {
            if row_id >= num_row {
                return Err(SliceError::RowIdOutOfRange { row_id });
            }
            if let Some(p) = prev
                && row_id <= p
            {
                return Err(SliceError::PageBookkeepingCorrupt {
                    detail: format!("partition element {bucket} is not strictly ascending at row {row_id}"),
                });
            }
            prev = Some(row_id);
            if owner.insert(row_id, bucket).is_some() {
                return Err(SliceError::PageBookkeepingCorrupt {
                    detail: format!("row {row_id} claimed by more than one partition element"),
                });
            }
        }
    }
    Ok(owner)
}

/// Transposes one slice's CSR rows into one or more CSC pages: budget pass,
/// reduce, scatter pass, then sort each column by value (stable, so tie-break
/// is construction/row order).
fn transpose_slice(rows: &Page, num_col: u64, max_rows_per_page: usize) -> (Vec<ColPage>, Vec<u64>, Vec<u64>) {
    let row_count = rows.row_count();
    let mut cols = Vec::new();
    let mut col_offsets = Vec::new();
    let mut col_sizes = Vec::new();

    let mut p0 = 0usize;
    while p0 < row_count {
        let p1 = (p0 + max_rows_per_page).min(row_count);
        cols.push(transpose_page(rows, p0, p1, num_col as usize));
        col_offsets.push(p0 as u64);
        col_sizes.push((p1 - p0) as u64);
        p0 = p1;
    }

    (cols, col_offsets, col_sizes)
}

fn transpose_page(rows: &Page, p0: usize, p1: usize, num_col: usize) -> ColPage {
    let page_rows = p1 - p0;
    let worker_count = page_rows.clamp(1, TRANSPOSE_WORKERS);
    let chunk = page_rows.div_ceil(worker_count).max(1);

    let mut acc: BucketAccumulator<ColEntry> = BucketAccumulator::init_budget(num_col, worker_count);

    let assign_range = |worker: usize| -> (usize, usize) {
        let start = p0 + worker * chunk;
        let end = (start + chunk).min(p1);
        (start, end)
    };

    parallel_for(acc.budgets_mut(), |worker, budget_row| {
        let (start, end) = assign_range(worker);
        for r in start..end {
            for e in rows.inst(r) {
                budget_row[e.column_index as usize] += 1;
            }
        }
    });

    acc.init_storage();

    parallel_for(acc.storage_mut(), |worker, bucket_rows| {
        let (start, end) = assign_range(worker);
        for r in start..end {
            for e in rows.inst(r) {
                bucket_rows[e.column_index as usize].push(ColEntry { row_id: r as u32, value: e.value });
            }
        }
    });

    let mut per_col = acc.finalize();
    for col in per_col.iter_mut() {
        col.sort_by(|a, b| a.value.partial_cmp(&b.value).expect("NaN in sparse matrix value"));
    }

    let mut col_ptr = Vec64::with_capacity(num_col + 1);
    col_ptr.push(0u64);
    let mut running = 0u64;
    for col in &per_col {
        running += col.len() as u64;
        col_ptr.push(running);
    }

    let mut entries = Vec64::with_capacity(running as usize);
    for col in per_col {
        entries.extend(col);
    }

    ColPage::from_parts(col_ptr, entries)
}
