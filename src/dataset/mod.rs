//! Prepared dataset views over a partitioned table.
//!
//! [`DatasetView`] is the caller-facing container produced by the registry:
//! it owns the loaded table, the label vector, the computed [`SplitPlan`],
//! an optional [`Processor`], and one lazily-built artifact per split.
//!
//! # Artifact caching
//!
//! Artifacts are built on first access through the injected
//! [`ArtifactBuilder`] and cached in [`std::cell::OnceCell`] slots for the
//! lifetime of the view. The slots are deliberately not synchronized: the
//! view is `!Sync`, so sharing it across threads requires external locking
//! layered by the caller. Reads of the raw table, labels, and masks are safe
//! to replicate by cloning the view's inputs; only the cache write path
//! needs exclusion.

mod artifact;

pub use artifact::{ArtifactBuilder, MatrixBuilder, TrainMatrix};

use std::cell::OnceCell;

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Table;
use crate::split::{SplitKind, SplitPlan};

// =============================================================================
// TaskKind
// =============================================================================

/// Type of learning task a dataset targets.
///
/// The task decides the partitioning strategy: classification datasets are
/// stratified by label so class proportions carry over into every split,
/// regression datasets are shuffled globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Classification,
    Regression,
}

impl TaskKind {
    /// Returns true for classification tasks.
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification)
    }

    /// Returns true for regression tasks.
    pub fn is_regression(&self) -> bool {
        matches!(self, Self::Regression)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification => f.write_str("classification"),
            Self::Regression => f.write_str("regression"),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised by [`DatasetView`] construction and split access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// Label vector does not line up with the table rows.
    #[error("label vector covers {labels} rows but the table has {table_rows}")]
    LabelMismatch { table_rows: usize, labels: usize },

    /// Split plan was computed for a different sample count.
    #[error("split plan covers {plan_rows} rows but the table has {table_rows}")]
    PlanMismatch { table_rows: usize, plan_rows: usize },

    /// Processor output broke the row-count contract.
    #[error(
        "processor returned {feature_rows} feature rows and {label_rows} labels \
         for the {split} split, expected {expected} of each"
    )]
    ProcessorContract {
        split: SplitKind,
        expected: usize,
        feature_rows: usize,
        label_rows: usize,
    },
}

// =============================================================================
// Processor
// =============================================================================

/// Optional pure transform applied to a split before artifact construction.
///
/// Must preserve the row count of both outputs; [`DatasetView::split`]
/// enforces this and fails with [`DatasetError::ProcessorContract`] on
/// violation.
pub type Processor = Box<dyn Fn(Table, Array1<f32>) -> (Table, Array1<f32>)>;

// =============================================================================
// SampleCounts
// =============================================================================

/// Exact population counts of the three split masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SampleCounts {
    /// Sum over all three splits.
    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

// =============================================================================
// DatasetView
// =============================================================================

/// A loaded, partitioned dataset with lazily-built per-split artifacts.
///
/// The table, labels, task, and plan are fixed at construction. Each split's
/// artifact transitions from absent to present exactly once, on the first
/// [`artifact`](DatasetView::artifact) call for that split.
pub struct DatasetView<B: ArtifactBuilder> {
    name: String,
    task: TaskKind,
    table: Table,
    labels: Array1<f32>,
    plan: SplitPlan,
    processor: Option<Processor>,
    builder: B,
    artifacts: [OnceCell<B::Artifact>; 3],
}

impl<B: ArtifactBuilder> std::fmt::Debug for DatasetView<B>
where
    B: std::fmt::Debug,
    B::Artifact: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetView")
            .field("name", &self.name)
            .field("task", &self.task)
            .field("table", &self.table)
            .field("labels", &self.labels)
            .field("plan", &self.plan)
            .field("processor", &self.processor.is_some())
            .field("builder", &self.builder)
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

impl<B: ArtifactBuilder> DatasetView<B> {
    /// Assemble a view over a loaded table.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::LabelMismatch`] or
    /// [`DatasetError::PlanMismatch`] if the labels or plan do not cover the
    /// table's rows.
    pub fn new(
        name: impl Into<String>,
        task: TaskKind,
        table: Table,
        labels: Array1<f32>,
        plan: SplitPlan,
        processor: Option<Processor>,
        builder: B,
    ) -> Result<Self, DatasetError> {
        if labels.len() != table.n_samples() {
            return Err(DatasetError::LabelMismatch {
                table_rows: table.n_samples(),
                labels: labels.len(),
            });
        }
        if plan.n_samples() != table.n_samples() {
            return Err(DatasetError::PlanMismatch {
                table_rows: table.n_samples(),
                plan_rows: plan.n_samples(),
            });
        }

        Ok(Self {
            name: name.into(),
            task,
            table,
            labels,
            plan,
            processor,
            builder,
            artifacts: [OnceCell::new(), OnceCell::new(), OnceCell::new()],
        })
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Learning task.
    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// The full, unfiltered table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The full, unfiltered label vector.
    pub fn labels(&self) -> &Array1<f32> {
        &self.labels
    }

    /// The partition this view was built with.
    pub fn plan(&self) -> &SplitPlan {
        &self.plan
    }

    /// Total number of samples.
    pub fn n_samples(&self) -> usize {
        self.table.n_samples()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.table.n_features()
    }

    /// Exact per-split sample counts.
    pub fn sample_counts(&self) -> SampleCounts {
        SampleCounts {
            train: self.plan.train.count(),
            val: self.plan.val.count(),
            test: self.plan.test.count(),
        }
    }

    /// Filtered data for one split, re-indexed contiguously from 0, with the
    /// processor applied if present.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ProcessorContract`] if the processor output
    /// row counts disagree with each other or with the mask's population.
    pub fn split(&self, kind: SplitKind) -> Result<(Table, Array1<f32>), DatasetError> {
        let indices = self.plan.mask(kind).indices();
        let expected = indices.len();

        let features = self.table.select(&indices);
        let labels = self.labels.select(Axis(0), &indices);

        let (features, labels) = match &self.processor {
            Some(processor) => processor(features, labels),
            None => (features, labels),
        };

        if features.n_samples() != expected || labels.len() != expected {
            return Err(DatasetError::ProcessorContract {
                split: kind,
                expected,
                feature_rows: features.n_samples(),
                label_rows: labels.len(),
            });
        }

        Ok((features, labels))
    }

    /// The artifact for one split, built on first access and cached for the
    /// lifetime of the view. The injected builder runs at most once per
    /// split no matter how often this is called.
    ///
    /// # Errors
    ///
    /// Propagates [`DatasetError::ProcessorContract`] from the underlying
    /// split access; a failed build leaves the slot empty.
    pub fn artifact(&self, kind: SplitKind) -> Result<&B::Artifact, DatasetError> {
        let slot = &self.artifacts[kind.index()];
        if let Some(artifact) = slot.get() {
            return Ok(artifact);
        }

        let (features, labels) = self.split(kind)?;
        tracing::debug!(
            dataset = %self.name,
            split = %kind,
            rows = labels.len(),
            "building artifact"
        );
        let built = self.builder.build(&features, &labels);

        Ok(slot.get_or_init(|| built))
    }

    /// Human-readable description: name, task, per-split counts, feature
    /// count.
    pub fn summary(&self) -> String {
        let counts = self.sample_counts();
        format!(
            "{} ({})\n  Samples: {} (train={}, val={}, test={})\n  Features: {}",
            self.name,
            self.task,
            self.n_samples(),
            counts.train,
            counts.val,
            counts.test,
            self.n_features(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
