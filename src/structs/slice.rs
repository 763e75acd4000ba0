//! # **Slice** - *Immutable bundle of rows, their CSC transpose, and metadata*
//!
//! A `Slice` is the unit of storage in a `SlicePool`. Everything about it is
//! frozen at build time except `rows`' base offset, the row-ids inside its
//! `cols` pages, and `config_state` — those three are rewritten in place by
//! the reindex engine on behalf of whichever view is currently iterating
//! columns.

use crate::structs::meta::MetaInfo;
use crate::structs::page::{ColPage, Page};

/// Bitmask identity token: one bit per slice in the owning pool.
///
/// Doubles as the view-identity tag used by the reindex engine's
/// `config_state == desired_state` cache check. The pool is hard-capped at
/// 64 slices by this representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigState(pub(crate) u64);

impl ConfigState {
    pub const EMPTY: ConfigState = ConfigState(0);

    pub fn set(&mut self, slice_index: usize) {
        self.0 |= 1u64 << slice_index;
    }

    pub fn test(&self, slice_index: usize) -> bool {
        self.0 & (1u64 << slice_index) != 0
    }

    pub fn from_indices(indices: &[u64]) -> Self {
        let mut s = ConfigState::EMPTY;
        for &i in indices {
            s.set(i as usize);
        }
        s
    }
}

#[derive(Debug, Clone)]
pub struct Slice {
    pub info: MetaInfo,
    pub rows: Page,
    pub cols: Vec<ColPage>,
    /// Row offset each CSC page was last indexed against; aligned with `cols`.
    pub col_offsets: Vec<u64>,
    /// Row count carried by each CSC page; aligned with `cols`.
    pub col_sizes: Vec<u64>,
    /// Identity of the view that last reindexed this slice's CSC pages.
    pub(crate) config_state: ConfigState,
    /// `rows`' own base row-id, maintained in lockstep with `config_state`
    /// as a belt-and-braces consistency measure — views do not consult this
    /// for row iteration, which uses its own `RowBatch` offsets.
    pub(crate) row_base_rowid: u64,
}

impl Slice {
    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    /// Total non-zero count for feature `c` across all of this slice's CSC pages.
    pub fn col_count(&self, c: usize) -> u64 {
        self.cols.iter().map(|p| p.inst(c).len() as u64).sum()
    }
}
