//! Data containers for labeled tables.
//!
//! [`Table`] holds feature values in sample-major layout together with the
//! column names. Label vectors are plain [`ndarray::Array1<f32>`] aligned
//! positionally with the table rows.

mod table;

pub use table::{DataError, Table};
