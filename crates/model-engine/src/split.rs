use detection_core::FeatureMatrix;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed for the training shuffle and for synthesized labels. Fixed so that
/// cold starts without a cached artifact reproduce the same model.
pub const SPLIT_SEED: u64 = 42;

/// Fraction of reference rows held out for evaluation.
pub const HELD_OUT_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub held_out: Vec<usize>,
}

/// Shuffle row indices with a seeded RNG and cut off the held-out tail.
///
/// The held-out partition rounds up, but training always keeps at least one
/// row for any non-empty input.
pub fn train_test_split(n_rows: usize, held_out_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut held_out_len = (n_rows as f64 * held_out_fraction).ceil() as usize;
    if held_out_len >= n_rows {
        held_out_len = n_rows.saturating_sub(1);
    }
    let train_len = n_rows - held_out_len;

    SplitIndices {
        held_out: indices.split_off(train_len),
        train: indices,
    }
}

/// Materialize the rows and labels selected by one partition.
pub fn subset(features: &FeatureMatrix, labels: &[u8], indices: &[usize]) -> (FeatureMatrix, Vec<u8>) {
    let rows = indices.iter().map(|&i| features.rows[i].clone()).collect();
    let selected_labels = indices.iter().map(|&i| labels[i]).collect();
    (
        FeatureMatrix::new(features.feature_names.clone(), rows),
        selected_labels,
    )
}
