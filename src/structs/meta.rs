//! # **MetaInfo** - *Per-row aligned metadata*
//!
//! Parallel vectors describing each row, plus the scalar shape counts.
//! Every field is possibly empty: an empty vector means the source never
//! supplied that field, not that every row's value is absent.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaInfo {
    pub num_row: u64,
    pub num_col: u64,
    pub num_nonzero: u64,

    pub labels: Vec<f32>,
    pub weights: Vec<f32>,
    pub base_margin: Vec<f32>,
    pub group_ptr: Vec<u64>,
    pub root_index: Vec<u32>,
}

impl MetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gathers `src.field.at(idx[k])` for each `k`, mirroring the original's
    /// `CopyInfoBatch`. Leaves `dst` empty if `src` is empty (absent field).
    pub(crate) fn gather_from(&mut self, src: &MetaInfo, idx: &[u64]) {
        self.labels = gather(&src.labels, idx);
        self.weights = gather(&src.weights, idx);
        self.base_margin = gather(&src.base_margin, idx);
        self.group_ptr = gather(&src.group_ptr, idx);
        self.root_index = gather(&src.root_index, idx);
    }
}

fn gather<T: Copy>(src: &[T], idx: &[u64]) -> Vec<T> {
    if src.is_empty() {
        return Vec::new();
    }
    idx.iter().map(|&i| src[i as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_respects_empty_fields() {
        let mut src = MetaInfo::new();
        src.labels = vec![10.0, 20.0, 30.0];
        let mut dst = MetaInfo::new();
        dst.gather_from(&src, &[2, 0]);
        assert_eq!(dst.labels, vec![30.0, 10.0]);
        assert!(dst.weights.is_empty());
    }

    #[test]
    fn gather_carries_group_ptr() {
        let mut src = MetaInfo::new();
        src.group_ptr = vec![100, 200, 300];
        let mut dst = MetaInfo::new();
        dst.gather_from(&src, &[2, 0]);
        assert_eq!(dst.group_ptr, vec![300, 100]);
    }
}
