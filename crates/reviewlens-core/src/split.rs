//! Seeded train/test partitioning

use crate::error::{Error, Result};
use crate::types::{Dataset, TrainTestSplit};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Seed used when none is configured
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Shuffle `dataset` with a seeded RNG and split off `ceil(test_size * n)`
/// rows as the test partition.
pub fn train_test_split(dataset: Dataset, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    let (n_train, n_test) = split_sizes(dataset.len(), test_size)?;

    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut slots: Vec<Option<_>> = dataset.reviews.into_iter().map(Some).collect();
    let mut take = |idx: &[usize]| -> Dataset {
        idx.iter().filter_map(|&i| slots[i].take()).collect()
    };

    let test = take(&indices[..n_test]);
    let train = take(&indices[n_test..]);

    debug!(n_train, n_test, seed, "Split dataset");
    Ok(TrainTestSplit { train, test })
}

/// Compute `(n_train, n_test)` for `n` samples
pub fn split_sizes(n: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::data(format!(
            "test_size must be between 0 and 1, got {test_size}"
        )));
    }

    let n_test = (n as f64 * test_size).ceil() as usize;
    let n_train = n.saturating_sub(n_test);

    if n_test == 0 || n_train == 0 {
        return Err(Error::data(format!(
            "split would leave an empty partition (n_samples={n}, n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}
