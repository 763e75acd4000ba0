//! Integration tests for the end-to-end build/view/reindex/diff scenarios,
//! covering the behaviors that cut across multiple modules. Scenarios that
//! only exercise a single module are covered instead by unit tests alongside
//! that module.

use slicematrix::{
    build_slices, build_slices_synthetic, build_slices_with_config, diff_matrix, BuildConfig, ColumnCreatorFn,
    Entry, MetaInfo, SliceError, SourceMatrix, SourceRow, View,
};

struct Matrix {
    rows: Vec<Vec<Entry>>,
    info: MetaInfo,
    num_col: u64,
}

impl SourceMatrix for Matrix {
    fn num_row(&self) -> u64 {
        self.rows.len() as u64
    }
    fn num_col(&self) -> u64 {
        self.num_col
    }
    fn num_nonzero(&self) -> u64 {
        self.rows.iter().map(|r| r.len() as u64).sum()
    }
    fn info(&self) -> &MetaInfo {
        &self.info
    }
    fn for_each_row(&self, visit: &mut dyn FnMut(SourceRow<'_>)) {
        for (i, entries) in self.rows.iter().enumerate() {
            visit(SourceRow { row_id: i as u64, entries });
        }
    }
}

/// Deterministic pseudo-random fill: density-0.5 sparse matrix with
/// reproducible values, no external RNG dependency.
fn random_matrix(num_row: u64, num_col: u64) -> Matrix {
    let rows: Vec<Vec<Entry>> = (0..num_row)
        .map(|r| {
            (0..num_col)
                .filter(|&c| (r * 131 + c * 17) % 2 == 0)
                .map(|c| {
                    let v = (((r * 7 + c * 3) % 97) as f32 + 1.0) / 97.0;
                    Entry { column_index: c as u32, value: v }
                })
                .collect()
        })
        .collect();
    Matrix { rows, info: MetaInfo::new(), num_col }
}

#[test]
fn trivial_two_by_two_round_trips() {
    let src = Matrix {
        rows: vec![
            vec![Entry { column_index: 0, value: 1.0 }, Entry { column_index: 1, value: 0.5 }],
            vec![Entry { column_index: 0, value: 2.0 }],
        ],
        info: MetaInfo::new(),
        num_col: 2,
    };
    let pool = build_slices(&src, &[vec![0], vec![1]]).unwrap();
    assert_eq!(pool.len(), 2);

    let view = View::new(pool, vec![0, 1]).unwrap();
    assert_eq!(view.info().num_row, 2);
    assert_eq!(view.col_size(0), 2);
    assert_eq!(view.col_size(1), 1);
    assert_eq!(view.col_density(0), 1.0);
    assert_eq!(view.col_density(1), 0.5);
}

#[test]
fn diff_round_trip_detects_single_value_change() {
    let src_a = random_matrix(20, 100);
    let src_b = random_matrix(20, 100);

    let idx: Vec<u64> = (0..20).collect();
    let pool_a = build_slices(&src_a, std::slice::from_ref(&idx)).unwrap();
    let pool_b = build_slices(&src_b, &[idx]).unwrap();

    let view_a = View::new(pool_a, vec![0]).unwrap();
    let view_b = View::new(pool_b, vec![0]).unwrap();

    assert_eq!(diff_matrix(&view_a, &view_b).unwrap(), None);
}

#[test]
fn reindex_is_deterministic_under_interleaved_views() {
    let partition = || vec![(0..7).collect::<Vec<u64>>(), (7..14).collect(), (14..20).collect()];

    let src_ref = random_matrix(20, 100);
    let pool_ref = build_slices(&src_ref, &partition()).unwrap();
    let view_a_ref = View::new(pool_ref, vec![0, 1]).unwrap();
    let reference = materialize_columns(&view_a_ref);

    let src_test = random_matrix(20, 100);
    let pool_test = build_slices(&src_test, &partition()).unwrap();
    let view_a = View::new(pool_test.clone(), vec![0, 1]).unwrap();
    let view_b = View::new(pool_test, vec![1, 2]).unwrap();

    assert_eq!(materialize_columns(&view_a), reference);
    materialize_columns(&view_b);
    assert_eq!(materialize_columns(&view_a), reference);
}

fn materialize_columns(view: &View) -> Vec<Vec<slicematrix::ColEntry>> {
    let mut it = view.column_iterator(None).unwrap();
    let mut pages = Vec::new();
    while let Some(batch) = it.next() {
        for f in 0..batch.num_features() {
            pages.push(batch.feature(f).to_vec());
        }
    }
    pages
}

#[test]
fn synthetic_builder_elides_zero_values() {
    // Column 0: row index as float (row 0's value is exactly 0.0, which
    // zero-elision drops from the built column entirely).
    let col0: ColumnCreatorFn = Box::new(|row_id: u64| row_id as f32);
    // Column 1: zero on odd rows, 1.0 on even rows.
    let col1: ColumnCreatorFn = Box::new(|row_id: u64| if row_id.is_multiple_of(2) { 1.0 } else { 0.0 });

    let labels = vec![0.0f32; 8];
    let pool = build_slices_synthetic(8, &[col0, col1], &labels, None, &[(0..8).collect()]).unwrap();

    let view = View::new(pool, vec![0]).unwrap();
    assert_eq!(view.info().num_nonzero, 11);
    assert_eq!(view.col_density(1), 0.5);
}

#[test]
fn empty_metadata_stays_empty() {
    let mut src = Matrix {
        rows: vec![vec![Entry { column_index: 0, value: 1.0 }]; 4],
        info: MetaInfo::new(),
        num_col: 1,
    };
    src.info.labels = vec![1.0, 2.0, 3.0, 4.0];
    // weights and base_margin intentionally left empty.

    let idx: Vec<u64> = (0..4).collect();
    let pool = build_slices(&src, &[idx]).unwrap();
    let view = View::new(pool, vec![0]).unwrap();

    assert!(view.info().weights.is_empty());
    assert!(view.info().base_margin.is_empty());
    assert_eq!(view.info().labels.len(), 4);
}

#[test]
fn group_ptr_gathers_and_merges_across_slices() {
    let mut src = Matrix {
        rows: vec![vec![Entry { column_index: 0, value: 1.0 }]; 6],
        info: MetaInfo::new(),
        num_col: 1,
    };
    src.info.group_ptr = vec![10, 11, 12, 13, 14, 15];

    let pool = build_slices(&src, &[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
    let view = View::new(pool, vec![0, 1]).unwrap();

    assert_eq!(view.info().group_ptr, vec![10, 11, 12, 13, 14, 15]);
}

#[test]
fn single_col_block_detects_single_page_single_slice() {
    let col0: ColumnCreatorFn = Box::new(|row_id: u64| row_id as f32 + 1.0);
    let labels = vec![0.0f32; 4];

    let single = build_slices_synthetic(4, &[col0], &labels, None, &[(0..4).collect()]).unwrap();
    let view = View::new(single, vec![0]).unwrap();
    assert!(view.single_col_block());

    let col1: ColumnCreatorFn = Box::new(|row_id: u64| row_id as f32 + 1.0);
    let two_slices = build_slices_synthetic(4, &[col1], &labels, None, &[vec![0, 1], vec![2, 3]]).unwrap();
    let multi_view = View::new(two_slices, vec![0, 1]).unwrap();
    assert!(!multi_view.single_col_block());

    let col2: ColumnCreatorFn = Box::new(|row_id: u64| row_id as f32 + 1.0);
    let paged = build_slices_with_config(
        &{
            let rows: Vec<Vec<Entry>> = (0..10).map(|r| vec![Entry { column_index: 0, value: col2(r) }]).collect();
            Matrix { rows, info: MetaInfo::new(), num_col: 1 }
        },
        &[(0..10).collect()],
        BuildConfig { max_rows_per_col_page: 4 },
    )
    .unwrap();
    let paged_view = View::new(paged, vec![0]).unwrap();
    assert!(!paged_view.single_col_block());
}

#[test]
fn active_index_errors_are_reported() {
    let src = random_matrix(4, 2);
    let pool = build_slices(&src, &[vec![0, 1], vec![2, 3]]).unwrap();

    assert!(matches!(View::new(pool.clone(), vec![]), Err(SliceError::EmptyActiveSet)));
    assert!(matches!(
        View::new(pool, vec![9]),
        Err(SliceError::ActiveIndexOutOfRange { index: 9, pool_size: 2 })
    ));

    let too_many: Vec<Vec<u64>> = (0..65).map(|_| vec![]).collect();
    assert!(matches!(build_slices(&src, &too_many), Err(SliceError::TooManySlices { count: 65 })));
}
