//! Artifact construction for prepared splits.
//!
//! An artifact is whatever structure the downstream training library wants
//! to consume. The core treats it as opaque: [`DatasetView`] hands the
//! filtered split to an [`ArtifactBuilder`] and caches whatever comes back.
//!
//! [`DatasetView`]: super::DatasetView

use ndarray::{Array1, Array2};

use crate::data::Table;

/// Builds a training-library artifact from one split's data.
///
/// Implemented by [`MatrixBuilder`] for the default dense representation,
/// and blanket-implemented for closures so callers can inject arbitrary
/// constructors:
///
/// ```
/// use dataprep::data::Table;
/// use dataprep::dataset::ArtifactBuilder;
/// use ndarray::Array1;
///
/// let row_counter = |features: &Table, _labels: &Array1<f32>| features.n_samples();
/// let table = Table::unnamed(ndarray::array![[1.0], [2.0]]);
/// let labels = ndarray::array![0.0, 1.0];
/// assert_eq!(row_counter.build(&table, &labels), 2);
/// ```
pub trait ArtifactBuilder {
    /// The structure handed to the training routine.
    type Artifact;

    /// Construct the artifact from filtered (and processed) split data.
    fn build(&self, features: &Table, labels: &Array1<f32>) -> Self::Artifact;
}

impl<A, F> ArtifactBuilder for F
where
    F: Fn(&Table, &Array1<f32>) -> A,
{
    type Artifact = A;

    fn build(&self, features: &Table, labels: &Array1<f32>) -> A {
        self(features, labels)
    }
}

/// Dense matrix-plus-labels pair, the shape a boosting trainer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainMatrix {
    features: Array2<f32>,
    labels: Array1<f32>,
}

impl TrainMatrix {
    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Feature matrix, `[n_rows, n_features]`.
    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    /// Label vector, length `n_rows`.
    pub fn labels(&self) -> &Array1<f32> {
        &self.labels
    }
}

/// Default [`ArtifactBuilder`] producing a [`TrainMatrix`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixBuilder;

impl ArtifactBuilder for MatrixBuilder {
    type Artifact = TrainMatrix;

    fn build(&self, features: &Table, labels: &Array1<f32>) -> TrainMatrix {
        TrainMatrix {
            features: features.values().clone(),
            labels: labels.clone(),
        }
    }
}
