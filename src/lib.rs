//! # **slicematrix** - *Sliceable sparse-matrix data engine*
//!
//! Partitions a sparse row-major corpus into immutable `Slice`s, each
//! carrying its own CSR page and paginated CSC transpose, and composes
//! lightweight `View`s over an ordered subset of a pool's slices without
//! ever re-materializing the underlying data.
//!
//! ## Layout
//! - [`structs::page`] — CSR/CSC block storage (`Page`, `ColPage`).
//! - [`structs::meta`] — per-row aligned metadata (`MetaInfo`).
//! - [`structs::slice`] — `Slice` and its `ConfigState` identity tag.
//! - [`structs::pool`] — `SlicePool`, the reference-counted slice arena, and
//!   the single-column-reader guard (`ColumnAccess`).
//! - [`structs::view`] — `View`, row/column iterators.
//! - [`kernels::builder`] — partitions a `SourceMatrix` (or synthetic column
//!   generators) into a `SlicePool`.
//! - [`kernels::reindex`] — rewrites a view's active slices in place so
//!   their CSC pages present contiguous offsets.
//! - [`kernels::diff`] — structural equality check between two views.
//! - [`kernels::parallel`] — work distribution for the builder's transpose,
//!   gated behind the `parallel_proc` feature.
//! - [`traits::source`] — `SourceMatrix`, the collaborator contract row
//!   producers implement.
//! - [`enums::error`] — `SliceError`, the crate's single error type.
//!
//! ## Feature flags
//! - `parallel_proc` (default): parallelizes the slice builder's CSC
//!   transpose with `rayon`. Disabling it runs the same passes sequentially;
//!   output is identical either way.

pub mod enums {
    pub mod error;
}

pub mod structs {
    pub mod meta;
    pub mod page;
    pub mod pool;
    pub mod slice;
    pub mod view;
}

pub mod traits {
    pub mod source;
}

pub mod kernels {
    pub mod builder;
    pub mod diff;
    pub mod parallel;
    pub mod reindex;
}

pub use enums::error::{SliceError, SliceResult};
pub use kernels::builder::{
    build_slices, build_slices_synthetic, build_slices_synthetic_with_config, build_slices_with_config,
    BuildConfig, ColumnCreatorFn, MAX_ROWS_PER_COL_PAGE,
};
pub use kernels::diff::{diff_matrix, DiffReport};
pub use structs::meta::MetaInfo;
pub use structs::page::{ColEntry, ColPage, Entry, Page};
pub use structs::pool::{ColumnAccess, SlicePool};
pub use structs::slice::{ConfigState, Slice};
pub use structs::view::{ColBatch, ColumnIterator, RowBatch, RowEntries, RowIterator, View};
pub use traits::source::{SourceMatrix, SourceRow};
