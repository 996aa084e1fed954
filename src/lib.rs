//! dataprep: deterministic dataset partitioning for training pipelines.
//!
//! Turns a raw labeled table into reproducible train/validation/test
//! subsets, ready for a downstream training library.
//!
//! # Key Types
//!
//! - [`Registry`] - Named dataset presets with end-to-end preparation
//! - [`DatasetView`] - Partitioned data with lazily-cached artifacts
//! - [`SplitConfig`] - Ratios, seed, and optional processor
//! - [`plan_splits`] / [`SplitPlan`] - The partitioning core
//! - [`Table`] - Sample-major feature table with named columns
//!
//! # Partitioning
//!
//! Masks are computed once, from a per-call seeded generator, and are
//! disjoint and exhaustive over the sample range. Classification datasets
//! are stratified by label so class proportions survive the split; floor
//! rounding remainders are absorbed by the test split.
//!
//! # Example
//!
//! ```
//! use dataprep::registry::{Registry, SplitConfig};
//! use dataprep::split::SplitKind;
//! use dataprep::testing::SyntheticLoader;
//!
//! let registry = Registry::new(SyntheticLoader::default());
//! let ds = registry.get("iris", SplitConfig::default()).unwrap();
//!
//! println!("{}", ds.summary());
//! let train = ds.artifact(SplitKind::Train).unwrap();
//! assert_eq!(train.n_rows(), ds.sample_counts().train);
//! ```

pub mod data;
pub mod dataset;
pub mod registry;
pub mod split;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// End-to-end entry points
pub use registry::{
    builtin_presets, DatasetPreset, LoadError, Loader, Registry, RegistryError, SplitConfig,
};

// Prepared views and artifacts
pub use dataset::{
    ArtifactBuilder, DatasetError, DatasetView, MatrixBuilder, Processor, SampleCounts, TaskKind,
    TrainMatrix,
};

// Partition planning
pub use split::{
    plan_splits, SplitError, SplitKind, SplitMask, SplitPlan, SplitRatios, DEFAULT_SEED,
};

// Data containers
pub use data::{DataError, Table};
