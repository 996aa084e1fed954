//! Column-named feature table.

use ndarray::{Array2, ArrayView1, Axis};
use thiserror::Error;

/// Errors raised during table construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A dimension does not agree with the rest of the container.
    #[error("{field}: expected {expected} entries, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        field: &'static str,
    },
}

/// Ordered rows of named feature columns.
///
/// # Storage Layout
///
/// Values are stored **sample-major**: `[n_samples, n_features]`. Row order
/// is significant only insofar as split masks refer to row position; the hot
/// operation on a table is row selection, which maps directly onto
/// `select(Axis(0), …)` in this orientation.
///
/// # Example
///
/// ```
/// use dataprep::data::Table;
/// use ndarray::array;
///
/// let table = Table::new(
///     array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]],
///     vec!["x".into(), "y".into()],
/// )
/// .unwrap();
///
/// assert_eq!(table.n_samples(), 3);
/// assert_eq!(table.n_features(), 2);
/// assert_eq!(table.column(1).to_vec(), vec![4.0, 5.0, 6.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    values: Array2<f32>,
}

impl Table {
    /// Create a table from sample-major values and per-column names.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ShapeMismatch`] if the name count differs from
    /// the column count.
    pub fn new(values: Array2<f32>, names: Vec<String>) -> Result<Self, DataError> {
        if names.len() != values.ncols() {
            return Err(DataError::ShapeMismatch {
                expected: values.ncols(),
                got: names.len(),
                field: "column names",
            });
        }
        Ok(Self { names, values })
    }

    /// Create a table with generated column names `f0, f1, …`.
    pub fn unnamed(values: Array2<f32>) -> Self {
        let names = (0..values.ncols()).map(|i| format!("f{}", i)).collect();
        Self { names, values }
    }

    /// Number of rows.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Column names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The full value matrix, `[n_samples, n_features]`.
    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// One feature column.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f32> {
        self.values.column(index)
    }

    /// A new table containing the given rows, re-indexed contiguously from 0.
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            values: self.values.select(Axis(0), indices),
        }
    }
}
