//! Shared domain types

use serde::{Deserialize, Serialize};

/// Integer sentiment label as found in the source data
pub type Label = i64;

/// A review after cleaning and type coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Free-form review text
    pub text: String,

    /// Sentiment label
    pub label: Label,
}

impl Review {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// The two required fields of a CSV record before cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line of the record in the source file
    pub line: u64,

    /// Review field, `None` when the column was absent from the record
    pub text: Option<String>,

    /// Sentiment field as read, before coercion
    pub label: Option<String>,
}

/// An in-memory collection of reviews
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub reviews: Vec<Review>,
}

impl Dataset {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Borrow all review texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.reviews.iter().map(|r| r.text.as_str()).collect()
    }

    /// Copy all labels in order
    pub fn labels(&self) -> Vec<Label> {
        self.reviews.iter().map(|r| r.label).collect()
    }
}

impl FromIterator<Review> for Dataset {
    fn from_iter<T: IntoIterator<Item = Review>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Train and test partitions of a dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}
