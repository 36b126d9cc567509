//! Helpers over the CSR matrices returned by every vectorizer.
//!
//! Rows are documents. Column indices inside a row are strictly ascending and
//! explicit zeros are never stored.

use sprs::CsMat;

use crate::{
    error::{Result, VectorizeError},
    vectorizer::Norm,
};

/// Norm of a row given its stored values. `Norm::None` yields 1.0.
pub fn row_norm<'a>(values: impl IntoIterator<Item = &'a f64>, norm: Norm) -> f64 {
    match norm {
        Norm::L1 => values.into_iter().map(|v| v.abs()).sum(),
        Norm::L2 => values.into_iter().map(|v| v * v).sum::<f64>().sqrt(),
        Norm::None => 1.0,
    }
}

/// Normalize every row in place. All-zero rows are left untouched.
pub fn normalize_rows(matrix: &mut CsMat<f64>, norm: Norm) {
    if norm == Norm::None {
        return;
    }
    for mut row_vec in matrix.outer_iterator_mut() {
        let magnitude = row_norm(row_vec.data(), norm);
        if magnitude > 0.0 {
            for (_, val) in row_vec.iter_mut() {
                *val /= magnitude;
            }
        }
    }
}

/// Build a CSR matrix from per-row `(column, value)` entries.
///
/// Columns are sorted per row and zero values dropped. A column `>= n_cols`
/// or repeated within a row is an `InvalidConfiguration` error.
pub fn csr_from_rows(rows: Vec<Vec<(usize, f64)>>, n_cols: usize) -> Result<CsMat<f64>> {
    let num_rows = rows.len();
    let mut indptr = Vec::with_capacity(num_rows + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();

    indptr.push(0);
    for mut row_entries in rows {
        row_entries.sort_by_key(|(col_idx, _)| *col_idx);
        for (col_idx, value) in row_entries {
            if value != 0.0 {
                indices.push(col_idx);
                data.push(value);
            }
        }
        indptr.push(indices.len());
    }
    CsMat::try_new((num_rows, n_cols), indptr, indices, data).map_err(|(_, _, _, e)| {
        VectorizeError::InvalidConfiguration(format!("malformed sparse rows: {e}"))
    })
}

/// Non-zero `(column, value)` pairs of one row. Empty when `row` is out of range.
#[must_use]
pub fn row_pairs(matrix: &CsMat<f64>, row: usize) -> Vec<(usize, f64)> {
    matrix
        .outer_view(row)
        .map(|row_vec| row_vec.iter().map(|(col, &val)| (col, val)).collect())
        .unwrap_or_default()
}

/// Dense copy of the matrix, one `Vec` per row.
#[must_use]
pub fn to_dense_rows(matrix: &CsMat<f64>) -> Vec<Vec<f64>> {
    matrix
        .outer_iterator()
        .map(|row_vec| {
            let mut dense = vec![0.0; matrix.cols()];
            for (col, &val) in row_vec.iter() {
                dense[col] = val;
            }
            dense
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_from_rows_sorts_and_drops_zeros() {
        let matrix = csr_from_rows(vec![vec![(3, 1.0), (0, 2.0), (1, 0.0)], vec![]], 4).unwrap();
        assert_eq!(matrix.shape(), (2, 4));
        assert_eq!(row_pairs(&matrix, 0), vec![(0, 2.0), (3, 1.0)]);
        assert!(row_pairs(&matrix, 1).is_empty());
        assert!(row_pairs(&matrix, 7).is_empty());
    }

    #[test]
    fn test_csr_from_rows_rejects_bad_columns() {
        let out_of_range = csr_from_rows(vec![vec![(5, 1.0)]], 2);
        assert!(matches!(
            out_of_range,
            Err(VectorizeError::InvalidConfiguration(_))
        ));

        let repeated = csr_from_rows(vec![vec![(1, 1.0), (1, 2.0)]], 2);
        assert!(matches!(repeated, Err(VectorizeError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_l2_normalization() {
        let mut matrix = csr_from_rows(vec![vec![(0, 3.0), (1, 4.0)], vec![]], 2).unwrap();
        normalize_rows(&mut matrix, Norm::L2);
        let dense = to_dense_rows(&matrix);
        assert!((dense[0][0] - 0.6).abs() < 1e-12);
        assert!((dense[0][1] - 0.8).abs() < 1e-12);
        assert_eq!(dense[1], vec![0.0, 0.0]);
    }

    #[test]
    fn test_l1_normalization_with_negative_values() {
        let mut matrix = csr_from_rows(vec![vec![(0, -1.0), (2, 3.0)]], 3).unwrap();
        normalize_rows(&mut matrix, Norm::L1);
        assert_eq!(row_pairs(&matrix, 0), vec![(0, -0.25), (2, 0.75)]);
    }

    #[test]
    fn test_no_normalization() {
        let mut matrix = csr_from_rows(vec![vec![(1, 5.0)]], 2).unwrap();
        normalize_rows(&mut matrix, Norm::None);
        assert_eq!(row_pairs(&matrix, 0), vec![(1, 5.0)]);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = csr_from_rows(vec![], 5).unwrap();
        assert_eq!(matrix.shape(), (0, 5));
        assert!(to_dense_rows(&matrix).is_empty());
    }
}
