//! Named dataset presets and end-to-end wiring.
//!
//! The registry maps dataset names to data-only [`DatasetPreset`]
//! descriptors and drives the full preparation pipeline: resolve the preset,
//! invoke the [`Loader`] collaborator, plan the partition, and assemble a
//! [`DatasetView`].
//!
//! Stratification is never configured directly; it is implied by the
//! preset's [`TaskKind`]. Classification datasets are stratified by label,
//! regression datasets are shuffled globally.
//!
//! # Example
//!
//! ```
//! use dataprep::registry::{Registry, SplitConfig};
//! use dataprep::split::SplitKind;
//! use dataprep::testing::SyntheticLoader;
//!
//! let registry = Registry::new(SyntheticLoader::default());
//! let view = registry.get("iris", SplitConfig::default()).unwrap();
//!
//! assert_eq!(view.sample_counts().total(), 150);
//! let train = view.artifact(SplitKind::Train).unwrap();
//! assert_eq!(train.n_rows(), 105);
//! ```

use bon::Builder;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Table;
use crate::dataset::{
    ArtifactBuilder, DatasetError, DatasetView, MatrixBuilder, Processor, TaskKind,
};
use crate::split::{plan_splits, SplitError, SplitRatios, DEFAULT_SEED};

/// Opaque error type produced by [`Loader`] implementations.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while resolving and preparing a named dataset.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested name is not registered.
    #[error("unknown dataset: {name}. Valid options: {valid}")]
    UnknownDataset { name: String, valid: String },

    /// The loader collaborator failed.
    #[error("loader failed for dataset `{name}`")]
    Loader {
        name: String,
        #[source]
        source: LoadError,
    },

    /// Partition planning failed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// View assembly or split access failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

// =============================================================================
// DatasetPreset & Loader
// =============================================================================

/// Data-only descriptor for a registered dataset.
///
/// Presets carry no behavior; datasets differ only in name and task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPreset {
    pub name: String,
    pub task: TaskKind,
}

impl DatasetPreset {
    pub fn new(name: impl Into<String>, task: TaskKind) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }
}

/// Loads the raw table and label vector for a preset.
///
/// Invoked exactly once per [`Registry::get`] call. The registry requires
/// only that the returned table row count equals the label count; everything
/// else about the source is opaque to the core.
pub trait Loader {
    fn load(&self, preset: &DatasetPreset) -> Result<(Table, Array1<f32>), LoadError>;
}

/// The stock preset set: four classification and two regression datasets.
pub fn builtin_presets() -> Vec<DatasetPreset> {
    vec![
        DatasetPreset::new("iris", TaskKind::Classification),
        DatasetPreset::new("wine", TaskKind::Classification),
        DatasetPreset::new("breast_cancer", TaskKind::Classification),
        DatasetPreset::new("digits", TaskKind::Classification),
        DatasetPreset::new("diabetes", TaskKind::Regression),
        DatasetPreset::new("linnerud", TaskKind::Regression),
    ]
}

// =============================================================================
// SplitConfig
// =============================================================================

/// Per-request configuration: split ratios, seed, and optional processor.
///
/// All members default, so `SplitConfig::default()` gives the conventional
/// 70/15/15 split with the fixed reproducible seed:
///
/// ```
/// use dataprep::registry::SplitConfig;
///
/// let config = SplitConfig::builder()
///     .train_ratio(0.8)
///     .val_ratio(0.1)
///     .test_ratio(0.1)
///     .build();
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Builder)]
pub struct SplitConfig {
    /// Proportion of samples assigned to training. Default: 0.7.
    #[builder(default = 0.7)]
    pub train_ratio: f64,

    /// Proportion of samples assigned to validation. Default: 0.15.
    #[builder(default = 0.15)]
    pub val_ratio: f64,

    /// Proportion of samples assigned to test. Default: 0.15.
    #[builder(default = 0.15)]
    pub test_ratio: f64,

    /// Seed for the partition generator. Default: 42.
    #[builder(default = DEFAULT_SEED)]
    pub seed: u64,

    /// Optional transform applied to each split before artifact
    /// construction.
    pub processor: Option<Processor>,
}

impl SplitConfig {
    /// The three ratios as a [`SplitRatios`] value (not yet validated;
    /// validation happens during planning).
    pub fn ratios(&self) -> SplitRatios {
        SplitRatios {
            train: self.train_ratio,
            val: self.val_ratio,
            test: self.test_ratio,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Maps dataset names to presets and wires loader, planner, and view.
pub struct Registry<L: Loader> {
    presets: Vec<DatasetPreset>,
    loader: L,
}

impl<L: Loader> Registry<L> {
    /// Registry pre-populated with [`builtin_presets`].
    pub fn new(loader: L) -> Self {
        Self {
            presets: builtin_presets(),
            loader,
        }
    }

    /// Registry with a caller-provided preset set.
    pub fn with_presets(loader: L, presets: Vec<DatasetPreset>) -> Self {
        Self { presets, loader }
    }

    /// Add a preset. Later registrations shadow earlier ones of the same
    /// name in [`names`](Registry::names) order only; lookup takes the first
    /// match, so re-registering an existing name has no effect.
    pub fn register(&mut self, preset: DatasetPreset) {
        self.presets.push(preset);
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    /// Look up a preset by name.
    pub fn preset(&self, name: &str) -> Option<&DatasetPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Prepare a named dataset with the default dense-matrix artifacts.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownDataset`] for unregistered names.
    /// - [`RegistryError::Loader`] if the loader collaborator fails.
    /// - [`RegistryError::Split`] for invalid ratios or an empty dataset.
    /// - [`RegistryError::Dataset`] if table and labels disagree.
    pub fn get(
        &self,
        name: &str,
        config: SplitConfig,
    ) -> Result<DatasetView<MatrixBuilder>, RegistryError> {
        self.get_with_builder(name, config, MatrixBuilder)
    }

    /// Prepare a named dataset with a caller-supplied artifact builder.
    pub fn get_with_builder<B: ArtifactBuilder>(
        &self,
        name: &str,
        config: SplitConfig,
        builder: B,
    ) -> Result<DatasetView<B>, RegistryError> {
        let preset = self
            .preset(name)
            .ok_or_else(|| RegistryError::UnknownDataset {
                name: name.to_owned(),
                valid: self.names().join(", "),
            })?;

        let (table, labels) = self
            .loader
            .load(preset)
            .map_err(|source| RegistryError::Loader {
                name: name.to_owned(),
                source,
            })?;

        if labels.len() != table.n_samples() {
            return Err(DatasetError::LabelMismatch {
                table_rows: table.n_samples(),
                labels: labels.len(),
            }
            .into());
        }

        // Stratify iff the task is classification. Labels are keyed by raw
        // bits so stratification only needs exact equality, never ordering.
        let plan = if preset.task.is_classification() {
            let keys: Vec<u32> = labels.iter().map(|v| v.to_bits()).collect();
            plan_splits(table.n_samples(), Some(&keys[..]), config.ratios(), config.seed)?
        } else {
            plan_splits::<u32>(table.n_samples(), None, config.ratios(), config.seed)?
        };

        tracing::debug!(
            dataset = %preset.name,
            task = %preset.task,
            n_samples = table.n_samples(),
            n_features = table.n_features(),
            seed = config.seed,
            "prepared dataset"
        );

        Ok(DatasetView::new(
            preset.name.clone(),
            preset.task,
            table,
            labels,
            plan,
            config.processor,
            builder,
        )?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Loader returning a fixed-size table regardless of preset.
    struct FixedLoader {
        rows: usize,
    }

    impl Loader for FixedLoader {
        fn load(&self, preset: &DatasetPreset) -> Result<(Table, Array1<f32>), LoadError> {
            let values: Vec<f32> = (0..self.rows * 2).map(|v| v as f32).collect();
            let table = Table::unnamed(Array2::from_shape_vec((self.rows, 2), values)?);
            let labels = (0..self.rows)
                .map(|i| if preset.task.is_classification() { (i % 2) as f32 } else { i as f32 })
                .collect();
            Ok((table, labels))
        }
    }

    /// Loader whose labels never line up with the table.
    struct MisalignedLoader;

    impl Loader for MisalignedLoader {
        fn load(&self, _preset: &DatasetPreset) -> Result<(Table, Array1<f32>), LoadError> {
            let table = Table::unnamed(Array2::zeros((10, 2)));
            Ok((table, Array1::zeros(4)))
        }
    }

    #[test]
    fn unknown_name_lists_valid_options() {
        let registry = Registry::new(FixedLoader { rows: 20 });
        let err = registry
            .get("not_a_dataset", SplitConfig::default())
            .unwrap_err();

        match err {
            RegistryError::UnknownDataset { name, valid } => {
                assert_eq!(name, "not_a_dataset");
                assert!(valid.contains("iris"));
                assert!(valid.contains("linnerud"));
            }
            other => panic!("expected UnknownDataset, got {:?}", other),
        }
    }

    #[test]
    fn invalid_ratios_surface_as_split_error() {
        let registry = Registry::new(FixedLoader { rows: 20 });
        let config = SplitConfig::builder()
            .train_ratio(0.5)
            .val_ratio(0.3)
            .test_ratio(0.3)
            .build();

        let err = registry.get("iris", config).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Split(SplitError::InvalidRatios { .. })
        ));
    }

    #[test]
    fn misaligned_loader_output_is_rejected() {
        let registry = Registry::new(MisalignedLoader);
        let err = registry.get("iris", SplitConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Dataset(DatasetError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn classification_presets_are_stratified() {
        // 20 samples, two interleaved classes of 10 each. Stratified floors:
        // 7 train / 1 val / 2 test per class.
        let registry = Registry::new(FixedLoader { rows: 20 });
        let view = registry.get("iris", SplitConfig::default()).unwrap();

        for class in [0.0f32, 1.0] {
            let train_in_class = view
                .plan()
                .train
                .indices()
                .iter()
                .filter(|&&i| view.labels()[i] == class)
                .count();
            assert_eq!(train_in_class, 7);
        }
    }

    #[test]
    fn regression_presets_are_not_stratified() {
        // All labels distinct: stratified planning would put floor(1 * 0.7)
        // = 0 samples in train. Global slicing must give 14.
        let registry = Registry::new(FixedLoader { rows: 20 });
        let view = registry.get("diabetes", SplitConfig::default()).unwrap();

        assert_eq!(view.sample_counts().train, 14);
    }

    #[test]
    fn same_config_is_reproducible() {
        let registry = Registry::new(FixedLoader { rows: 50 });

        let a = registry.get("wine", SplitConfig::default()).unwrap();
        let b = registry.get("wine", SplitConfig::default()).unwrap();
        assert_eq!(a.plan(), b.plan());

        let c = registry
            .get("wine", SplitConfig::builder().seed(7).build())
            .unwrap();
        assert_ne!(a.plan(), c.plan());
    }

    #[test]
    fn register_extends_the_preset_set() {
        let mut registry = Registry::with_presets(FixedLoader { rows: 12 }, Vec::new());
        assert!(registry.get("custom", SplitConfig::default()).is_err());

        registry.register(DatasetPreset::new("custom", TaskKind::Regression));
        let view = registry.get("custom", SplitConfig::default()).unwrap();
        assert_eq!(view.n_samples(), 12);
        assert_eq!(view.task(), TaskKind::Regression);
    }

    #[test]
    fn custom_artifact_builder_is_used() {
        let registry = Registry::new(FixedLoader { rows: 20 });
        let view = registry
            .get_with_builder(
                "iris",
                SplitConfig::default(),
                |features: &Table, _labels: &Array1<f32>| features.n_samples(),
            )
            .unwrap();

        let train_rows = *view.artifact(crate::split::SplitKind::Train).unwrap();
        assert_eq!(train_rows, view.sample_counts().train);
    }

    #[test]
    fn preset_serde_roundtrip() {
        let preset = DatasetPreset::new("iris", TaskKind::Classification);
        let json = serde_json::to_string(&preset).unwrap();
        let restored: DatasetPreset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, preset);
    }
}
