//! Deterministic train/validation/test partitioning.
//!
//! This module computes three disjoint boolean masks over `[0, n)` that
//! together cover every sample exactly once. Slicing is floor-based: train
//! and validation receive `floor(n * ratio)` samples each and the test split
//! absorbs the rounding remainder.
//!
//! # Determinism
//!
//! [`plan_splits`] seeds a fresh [`Xoshiro256PlusPlus`] generator from the
//! caller's seed on every call. Identical inputs produce bitwise-identical
//! masks no matter what other partitioning happens elsewhere in the process.
//!
//! # Stratification
//!
//! Passing label keys via `stratify_by` partitions each label class
//! independently, which keeps per-class train proportions within
//! `1 / class_count` of the requested ratio. Classes are processed in
//! first-appearance order so the result stays deterministic.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use thiserror::Error;

/// Absolute tolerance for the ratio-sum check.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// Default seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 42;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while planning a partition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// The three ratios must sum to 1.0 within [`RATIO_TOLERANCE`].
    #[error("split ratios must sum to 1.0, got {sum} (train={train}, val={val}, test={test})")]
    InvalidRatios {
        train: f64,
        val: f64,
        test: f64,
        sum: f64,
    },

    /// There is nothing to partition.
    #[error("cannot partition an empty sample set")]
    EmptyInput,
}

// =============================================================================
// SplitRatios
// =============================================================================

/// Requested proportions for the train, validation, and test splits.
///
/// The proportions must sum to 1.0 within [`RATIO_TOLERANCE`]. Validation
/// happens in [`SplitRatios::new`] and again in [`plan_splits`], so ratios
/// built via struct literal are still checked before any mask is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    /// Create validated ratios.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidRatios`] if the sum deviates from 1.0
    /// by more than [`RATIO_TOLERANCE`].
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self, SplitError> {
        let ratios = Self { train, val, test };
        ratios.validate()?;
        Ok(ratios)
    }

    /// Check the sum-to-one invariant.
    pub fn validate(&self) -> Result<(), SplitError> {
        let sum = self.train + self.val + self.test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(SplitError::InvalidRatios {
                train: self.train,
                val: self.val,
                test: self.test,
                sum,
            });
        }
        Ok(())
    }
}

impl Default for SplitRatios {
    /// The conventional 70/15/15 split.
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.15,
            test: 0.15,
        }
    }
}

// =============================================================================
// SplitKind
// =============================================================================

/// Identifies one of the three splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Train,
    Val,
    Test,
}

impl SplitKind {
    /// All kinds, in canonical order.
    pub const ALL: [SplitKind; 3] = [SplitKind::Train, SplitKind::Val, SplitKind::Test];

    /// Stable index into per-split storage.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            SplitKind::Train => 0,
            SplitKind::Val => 1,
            SplitKind::Test => 2,
        }
    }

    /// Lowercase name used in summaries and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Val => "val",
            SplitKind::Test => "test",
        }
    }
}

impl std::fmt::Display for SplitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SplitMask
// =============================================================================

/// Boolean membership vector for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMask {
    bits: Vec<bool>,
}

impl SplitMask {
    fn zeros(n: usize) -> Self {
        Self {
            bits: vec![false; n],
        }
    }

    fn set(&mut self, index: usize) {
        self.bits[index] = true;
    }

    /// Total vector length (the dataset's sample count).
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if the vector has length zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of selected samples.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Whether `index` belongs to this split.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Selected row positions, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    /// Raw boolean slice.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

// =============================================================================
// SplitPlan
// =============================================================================

/// The three masks of one partition. Immutable once computed.
///
/// Invariant: the masks are pairwise disjoint and their union covers every
/// index in `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub train: SplitMask,
    pub val: SplitMask,
    pub test: SplitMask,
}

impl SplitPlan {
    /// Total number of samples covered by the plan.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.train.len()
    }

    /// The mask for `kind`.
    pub fn mask(&self, kind: SplitKind) -> &SplitMask {
        match kind {
            SplitKind::Train => &self.train,
            SplitKind::Val => &self.val,
            SplitKind::Test => &self.test,
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

/// Compute train/validation/test masks over `[0, n)`.
///
/// When `stratify_by` is `Some`, indices are grouped by label key and each
/// class is sliced independently; otherwise a single shuffled slicing is
/// applied to the whole range. Keys only need equality, not ordering.
///
/// The generator is seeded from `seed` inside this call, so repeated calls
/// with identical arguments yield identical plans.
///
/// # Errors
///
/// - [`SplitError::InvalidRatios`] if the ratios do not sum to 1.0.
/// - [`SplitError::EmptyInput`] if `n == 0`.
///
/// # Example
///
/// ```
/// use dataprep::split::{plan_splits, SplitRatios};
///
/// let plan = plan_splits::<u32>(100, None, SplitRatios::default(), 42).unwrap();
/// assert_eq!(plan.train.count(), 70);
/// assert_eq!(plan.val.count(), 15);
/// assert_eq!(plan.test.count(), 15);
/// ```
pub fn plan_splits<K>(
    n: usize,
    stratify_by: Option<&[K]>,
    ratios: SplitRatios,
    seed: u64,
) -> Result<SplitPlan, SplitError>
where
    K: Eq + Hash,
{
    ratios.validate()?;
    if n == 0 {
        return Err(SplitError::EmptyInput);
    }

    // Fresh generator per call: plans do not depend on unrelated calls.
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let mut plan = SplitPlan {
        train: SplitMask::zeros(n),
        val: SplitMask::zeros(n),
        test: SplitMask::zeros(n),
    };

    match stratify_by {
        Some(keys) => {
            debug_assert_eq!(keys.len(), n, "label keys must cover every sample");
            for class in group_by_key(keys) {
                assign_sliced(&mut plan, class, ratios, &mut rng);
            }
        }
        None => {
            let indices: Vec<usize> = (0..n).collect();
            assign_sliced(&mut plan, indices, ratios, &mut rng);
        }
    }

    tracing::debug!(
        n,
        train = plan.train.count(),
        val = plan.val.count(),
        test = plan.test.count(),
        stratified = stratify_by.is_some(),
        seed,
        "planned splits"
    );

    Ok(plan)
}

/// Shuffle `indices` and assign floor-based slices to train and val, with the
/// remainder going to test.
fn assign_sliced(
    plan: &mut SplitPlan,
    mut indices: Vec<usize>,
    ratios: SplitRatios,
    rng: &mut Xoshiro256PlusPlus,
) {
    indices.shuffle(rng);

    let len = indices.len();
    let n_train = ((len as f64 * ratios.train) as usize).min(len);
    let n_val = ((len as f64 * ratios.val) as usize).min(len - n_train);

    for &i in &indices[..n_train] {
        plan.train.set(i);
    }
    for &i in &indices[n_train..n_train + n_val] {
        plan.val.set(i);
    }
    for &i in &indices[n_train + n_val..] {
        plan.test.set(i);
    }
}

/// Group sample positions by label key, preserving first-appearance order of
/// the keys. The order matters: it is part of the determinism contract.
fn group_by_key<K: Eq + Hash>(keys: &[K]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<&K, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, key) in keys.iter().enumerate() {
        match slots.entry(key) {
            Entry::Occupied(slot) => groups[*slot.get()].push(i),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(vec![i]);
            }
        }
    }

    groups
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(plan: &SplitPlan) {
        for i in 0..plan.n_samples() {
            let hits = [&plan.train, &plan.val, &plan.test]
                .iter()
                .filter(|m| m.contains(i))
                .count();
            assert_eq!(hits, 1, "index {} must belong to exactly one split", i);
        }
    }

    #[test]
    fn ratios_must_sum_to_one() {
        let result = SplitRatios::new(0.5, 0.3, 0.3);
        assert!(matches!(result, Err(SplitError::InvalidRatios { .. })));

        assert!(SplitRatios::new(0.7, 0.15, 0.15).is_ok());
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = plan_splits::<u32>(0, None, SplitRatios::default(), 42);
        assert!(matches!(result, Err(SplitError::EmptyInput)));
    }

    #[test]
    fn invalid_ratios_are_rejected_before_planning() {
        let ratios = SplitRatios {
            train: 0.5,
            val: 0.3,
            test: 0.3,
        };
        let result = plan_splits::<u32>(10, None, ratios, 42);
        assert!(matches!(result, Err(SplitError::InvalidRatios { .. })));
    }

    #[test]
    fn unstratified_counts_are_floor_based() {
        let ratios = SplitRatios {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        };
        let plan = plan_splits::<u32>(10, None, ratios, 42).unwrap();

        assert_partition(&plan);
        assert_eq!(plan.train.count(), 6);
        assert_eq!(plan.val.count(), 2);
        assert_eq!(plan.test.count(), 2);
    }

    #[test]
    fn remainder_goes_to_test() {
        // 7 * 0.7 = 4.9 -> 4 train, 7 * 0.15 = 1.05 -> 1 val, remainder 2 test
        let plan = plan_splits::<u32>(7, None, SplitRatios::default(), 0).unwrap();

        assert_partition(&plan);
        assert_eq!(plan.train.count(), 4);
        assert_eq!(plan.val.count(), 1);
        assert_eq!(plan.test.count(), 2);
    }

    #[test]
    fn stratified_partition_is_exhaustive_and_disjoint() {
        let labels = [0u8, 0, 0, 0, 1, 1, 1, 1, 2, 2];
        let ratios = SplitRatios {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        };
        let plan = plan_splits(10, Some(&labels[..]), ratios, 42).unwrap();

        assert_partition(&plan);
        // Per-class floors: 4-member classes give 2 train / 0 val / 2 test,
        // the 2-member class gives 1 train / 0 val / 1 test.
        assert_eq!(plan.train.count(), 5);
        assert_eq!(plan.val.count(), 0);
        assert_eq!(plan.test.count(), 5);
    }

    #[test]
    fn stratified_slicing_is_per_class() {
        let labels = [0u8, 0, 0, 0, 1, 1, 1, 1, 2, 2];
        let ratios = SplitRatios {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        };
        let plan = plan_splits(10, Some(&labels[..]), ratios, 7).unwrap();

        for (class, members) in [(0usize, 0..4usize), (1, 4..8), (2, 8..10)] {
            let in_train = members.clone().filter(|&i| plan.train.contains(i)).count();
            let expected = (members.len() as f64 * ratios.train) as usize;
            assert_eq!(in_train, expected, "class {} train count", class);
        }
    }

    #[test]
    fn single_member_class_lands_in_test() {
        let labels = [0u8, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let plan = plan_splits(10, Some(&labels[..]), SplitRatios::default(), 42).unwrap();

        assert_partition(&plan);
        // floor(1 * 0.7) = 0 train, floor(1 * 0.15) = 0 val, remainder -> test
        assert!(plan.test.contains(9));
    }

    #[test]
    fn same_seed_gives_identical_plans() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 3) as u8).collect();

        let a = plan_splits(50, Some(&labels[..]), SplitRatios::default(), 42).unwrap();
        let b = plan_splits(50, Some(&labels[..]), SplitRatios::default(), 42).unwrap();
        assert_eq!(a, b);

        let c = plan_splits(50, Some(&labels[..]), SplitRatios::default(), 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn plans_do_not_depend_on_call_order() {
        let first = plan_splits::<u32>(20, None, SplitRatios::default(), 42).unwrap();

        // Interleave unrelated planning with different seeds and shapes.
        let _ = plan_splits::<u32>(500, None, SplitRatios::default(), 1).unwrap();
        let _ = plan_splits::<u32>(3, None, SplitRatios::default(), 99).unwrap();

        let again = plan_splits::<u32>(20, None, SplitRatios::default(), 42).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn group_by_key_preserves_first_appearance_order() {
        let keys = ["b", "a", "b", "c", "a"];
        let groups = group_by_key(&keys);

        assert_eq!(groups, vec![vec![0, 2], vec![1, 4], vec![3]]);
    }

    #[test]
    fn mask_indices_are_ascending() {
        let plan = plan_splits::<u32>(30, None, SplitRatios::default(), 42).unwrap();
        let indices = plan.train.indices();

        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(indices.len(), plan.train.count());
    }
}
