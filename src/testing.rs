//! Synthetic data helpers for tests and examples.

use ndarray::{Array1, Array2};
use rand::prelude::*;

use crate::data::Table;
use crate::dataset::TaskKind;
use crate::registry::{DatasetPreset, LoadError, Loader};

/// Generate a table of uniform random features in `[0, max)`.
pub fn random_table(rows: usize, cols: usize, seed: u64, max: f32) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f32> = (0..rows * cols).map(|_| rng.gen::<f32>() * max).collect();
    Table::unnamed(Array2::from_shape_vec((rows, cols), values).expect("rows * cols values"))
}

/// Balanced class labels `0, 1, …, n_classes - 1`, cycling over the rows.
pub fn class_labels(rows: usize, n_classes: usize) -> Array1<f32> {
    assert!(n_classes >= 1);
    (0..rows).map(|i| (i % n_classes) as f32).collect()
}

/// Regression targets as a seeded linear model of the features plus uniform
/// noise.
pub fn linear_targets(table: &Table, seed: u64, noise_amplitude: f32) -> Array1<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights: Vec<f32> = (0..table.n_features())
        .map(|_| rng.gen::<f32>() * 2.0 - 1.0)
        .collect();

    table
        .values()
        .rows()
        .into_iter()
        .map(|row| {
            let mut y: f32 = row.iter().zip(&weights).map(|(x, w)| x * w).sum();
            if noise_amplitude > 0.0 {
                y += (rng.gen::<f32>() * 2.0 - 1.0) * noise_amplitude;
            }
            y
        })
        .collect()
}

/// [`Loader`] producing seeded synthetic data for the built-in presets.
///
/// Shapes mirror the classic sklearn datasets the preset names refer to
/// (`iris` is 150×4 with 3 classes, `digits` 1797×64 with 10, and so on), so
/// tests exercise realistic class structure without any file I/O.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticLoader {
    pub seed: u64,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self { seed: 7 }
    }
}

impl Loader for SyntheticLoader {
    fn load(&self, preset: &DatasetPreset) -> Result<(Table, Array1<f32>), LoadError> {
        let (rows, cols, classes) = shape_for(&preset.name)
            .ok_or_else(|| LoadError::from(format!("no synthetic shape for `{}`", preset.name)))?;

        let table = random_table(rows, cols, self.seed, 10.0);
        let labels = match preset.task {
            TaskKind::Classification => class_labels(rows, classes),
            TaskKind::Regression => linear_targets(&table, self.seed, 0.1),
        };

        Ok((table, labels))
    }
}

/// `(rows, cols, classes)` for each built-in preset; classes is 0 for
/// regression.
fn shape_for(name: &str) -> Option<(usize, usize, usize)> {
    match name {
        "iris" => Some((150, 4, 3)),
        "wine" => Some((178, 13, 3)),
        "breast_cancer" => Some((569, 30, 2)),
        "digits" => Some((1797, 64, 10)),
        "diabetes" => Some((442, 10, 0)),
        "linnerud" => Some((20, 3, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_table_is_seeded() {
        let a = random_table(5, 3, 42, 1.0);
        let b = random_table(5, 3, 42, 1.0);
        assert_eq!(a, b);

        let c = random_table(5, 3, 43, 1.0);
        assert_ne!(a, c);
    }

    #[test]
    fn class_labels_are_balanced() {
        let labels = class_labels(9, 3);
        for class in 0..3 {
            let count = labels.iter().filter(|&&l| l == class as f32).count();
            assert_eq!(count, 3);
        }
    }

    #[test]
    fn linear_targets_align_with_rows() {
        let table = random_table(17, 4, 1, 1.0);
        let targets = linear_targets(&table, 1, 0.0);
        assert_eq!(targets.len(), 17);
    }

    #[test]
    fn loader_covers_every_builtin_preset() {
        let loader = SyntheticLoader::default();
        for preset in crate::registry::builtin_presets() {
            let (table, labels) = loader.load(&preset).unwrap();
            assert_eq!(table.n_samples(), labels.len());
            assert!(table.n_features() > 0);
        }
    }

    #[test]
    fn loader_rejects_unknown_shapes() {
        let loader = SyntheticLoader::default();
        let preset = DatasetPreset::new("mystery", TaskKind::Regression);
        assert!(loader.load(&preset).is_err());
    }
}
