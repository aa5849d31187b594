//! reviewlens Core
//!
//! Core types, error handling and data preparation shared across reviewlens crates.
//!
//! This crate provides:
//! - The error type and result alias
//! - Review, dataset and split types
//! - CSV loading with missing-value cleaning, parallel sampling and label coercion
//! - Seeded train/test splitting
//! - Raw export preparation (column dropping)
//! - Filtering and summary statistics over a clean hotel review export

pub mod dataset;
pub mod error;
pub mod explore;
pub mod prepare;
pub mod split;
pub mod types;

pub use dataset::{load_dataset, ColumnNames, DatasetOptions};
pub use error::{Error, Result};
pub use explore::{load_hotel_reviews, ExploreSummary, HotelReview, ReviewFilter};
pub use prepare::{prepare_csv, PrepareSummary, DEFAULT_DROP_COLUMNS};
pub use split::{train_test_split, DEFAULT_SPLIT_SEED};
pub use types::{Dataset, Label, RawRow, Review, TrainTestSplit};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Dataset, Label, Review, TrainTestSplit};
}
