//! # **diff_matrix** - *Structural equality check between two views*
//!
//! Walks both views row by row comparing entries and aligned metadata,
//! short-circuiting on the first mismatch. Row iteration never requires
//! reindexing, so this never touches the single-column-reader guard.

use crate::enums::error::{SliceError, SliceResult};
use crate::structs::view::View;

/// First point of divergence found between two views, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub row: u64,
    pub detail: String,
}

/// Compares `a` and `b` for structural equality: shape, row entries in
/// order, and aligned metadata fields. Returns `Ok(None)` when identical,
/// `Ok(Some(report))` at the first mismatch found.
///
/// Errors with `SelfComparison` if `a` and `b` are the same view instance —
/// diffing a view against itself is always a caller bug, never a real check.
pub fn diff_matrix(a: &View, b: &View) -> SliceResult<Option<DiffReport>> {
    if std::ptr::eq(a, b) {
        return Err(SliceError::SelfComparison);
    }

    if a.info().num_row != b.info().num_row {
        return Ok(Some(DiffReport {
            row: 0,
            detail: format!("num_row differs: {} vs {}", a.info().num_row, b.info().num_row),
        }));
    }
    if a.info().num_col != b.info().num_col {
        return Ok(Some(DiffReport {
            row: 0,
            detail: format!("num_col differs: {} vs {}", a.info().num_col, b.info().num_col),
        }));
    }

    let mut row_a = a.row_iterator();
    let mut row_b = b.row_iterator();
    let mut row_id = 0u64;

    loop {
        match (row_a.next(), row_b.next()) {
            (None, None) => break,
            (Some(ba), Some(bb)) => {
                if ba.size != bb.size {
                    return Ok(Some(DiffReport {
                        row: row_id,
                        detail: format!("row batch size differs: {} vs {}", ba.size, bb.size),
                    }));
                }
                for local in 0..ba.size as usize {
                    let ea = row_a.row(ba, local);
                    let eb = row_b.row(bb, local);
                    if ea.as_slice() != eb.as_slice() {
                        return Ok(Some(DiffReport { row: row_id, detail: "row entries differ".to_string() }));
                    }
                    row_id += 1;
                }
            }
            _ => {
                return Ok(Some(DiffReport { row: row_id, detail: "row batch counts differ".to_string() }));
            }
        }
    }

    if a.info().labels != b.info().labels {
        return Ok(Some(DiffReport { row: 0, detail: "labels differ".to_string() }));
    }
    if a.info().weights != b.info().weights {
        return Ok(Some(DiffReport { row: 0, detail: "weights differ".to_string() }));
    }
    if a.info().base_margin != b.info().base_margin {
        return Ok(Some(DiffReport { row: 0, detail: "base_margin differs".to_string() }));
    }
    if a.info().group_ptr != b.info().group_ptr {
        return Ok(Some(DiffReport { row: 0, detail: "group_ptr differs".to_string() }));
    }
    if a.info().root_index != b.info().root_index {
        return Ok(Some(DiffReport { row: 0, detail: "root_index differs".to_string() }));
    }

    Ok(None)
}
