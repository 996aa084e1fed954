//! End-to-end dataset preparation example.
//!
//! Prepares a classification dataset through the registry, inspects the
//! resulting splits, and builds the training matrices a boosting library
//! would consume.
//!
//! Run with:
//! ```bash
//! cargo run --example prepare_dataset
//! ```

use dataprep::data::Table;
use dataprep::dataset::Processor;
use dataprep::registry::{Registry, SplitConfig};
use dataprep::split::SplitKind;
use dataprep::testing::SyntheticLoader;

fn main() {
    let registry = Registry::new(SyntheticLoader::default());

    // =========================================================================
    // 1. Prepare with Defaults
    // =========================================================================
    // 70/15/15 split, seed 42. Classification datasets stratify by label.
    let ds = registry
        .get("iris", SplitConfig::default())
        .expect("preparing iris");

    println!("{}\n", ds.summary());

    // Per-class counts in the training split.
    for class in [0.0f32, 1.0, 2.0] {
        let in_train = ds
            .plan()
            .train
            .indices()
            .iter()
            .filter(|&&i| ds.labels()[i] == class)
            .count();
        println!("  class {}: {} training samples", class, in_train);
    }

    // =========================================================================
    // 2. Build Training Artifacts
    // =========================================================================
    // Artifacts are built on first access and cached on the view.
    let train = ds.artifact(SplitKind::Train).expect("building train matrix");
    let val = ds.artifact(SplitKind::Val).expect("building val matrix");

    println!("\nTrain matrix: {} x {}", train.n_rows(), train.n_features());
    println!("Val matrix:   {} x {}", val.n_rows(), val.n_features());

    // =========================================================================
    // 3. Custom Ratios and a Processor
    // =========================================================================
    // The processor runs on each split before its artifact is built.
    let normalize: Processor = Box::new(|table, labels| {
        let max = table.values().iter().cloned().fold(f32::MIN, f32::max);
        (Table::unnamed(table.values() / max), labels)
    });

    let config = SplitConfig::builder()
        .train_ratio(0.8)
        .val_ratio(0.1)
        .test_ratio(0.1)
        .seed(7)
        .processor(normalize)
        .build();

    let ds = registry.get("wine", config).expect("preparing wine");
    let train = ds.artifact(SplitKind::Train).expect("building train matrix");

    let peak = train.features().iter().cloned().fold(f32::MIN, f32::max);
    println!("\n{}", ds.summary());
    println!("Normalized train peak: {:.3}", peak);
}
