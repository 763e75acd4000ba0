//! # **Reindex engine** - *Rewrites slice offsets in place for a view*
//!
//! CSC entries carry row-ids relative to whichever view's active-set
//! ordering last touched them. Before a view reads columns, every active
//! slice's CSC pages (and, belt-and-braces, its CSR page's own base row-id)
//! are shifted in place to match *this* view's ordering — unless
//! `config_state` already equals this view's identity tag, in which case
//! the walk is a no-op.

use crate::structs::pool::{ColumnAccess, SlicePool};
use crate::structs::slice::ConfigState;
use crate::enums::error::SliceResult;

/// Acquires the single-column-reader guard for `desired_state` and, if
/// needed, reindexes every slice in `active` to match it. `active` must
/// already be sorted ascending (the view constructor guarantees this).
pub(crate) fn ensure_reindexed(
    pool: &SlicePool,
    active: &[u64],
    desired_state: ConfigState,
) -> SliceResult<ColumnAccess> {
    let guard = pool.acquire_column_access(desired_state)?;

    let coherent = active.iter().all(|&a| pool.with_slice(a as usize, |s| s.config_state == desired_state));
    if !coherent {
        pool.with_slices_mut(|slices| {
            let mut new_offset = 0u64;
            for &a in active {
                let s = &mut slices[a as usize];
                let offset_at_slice_start = new_offset;

                for k in 0..s.cols.len() {
                    let delta = new_offset as i64 - s.col_offsets[k] as i64;
                    s.cols[k].shift_row_ids(delta);
                    s.col_offsets[k] = new_offset;
                    new_offset += s.col_sizes[k];
                }

                s.row_base_rowid = offset_at_slice_start;
                s.config_state = desired_state;
            }
        });
    }

    Ok(guard)
}
