//! Training run configuration

use crate::logistic::LogisticParams;
use crate::tfidf::TfidfOptions;
use reviewlens_core::{ColumnNames, DatasetOptions, Error, Result, DEFAULT_SPLIT_SEED};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a full training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Input data and sampling
    #[serde(default)]
    pub data: DataConfig,

    /// Train/test partitioning
    #[serde(default)]
    pub split: SplitConfig,

    /// TF-IDF vectorizer settings
    #[serde(default)]
    pub vectorizer: TfidfOptions,

    /// Logistic regression settings
    #[serde(default)]
    pub model: LogisticParams,

    /// Report rendering
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with review and sentiment columns
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    #[serde(default = "default_text_column")]
    pub text_column: String,

    #[serde(default = "default_label_column")]
    pub label_column: String,

    /// Fraction of clean rows kept for the run
    #[serde(default = "default_sample_fraction")]
    pub sample_fraction: f64,

    /// Sampling seed; unset draws a new sample every run
    #[serde(default)]
    pub sample_seed: Option<u64>,

    /// Sampling partitions; unset uses one per CPU
    #[serde(default)]
    pub partitions: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            text_column: default_text_column(),
            label_column: default_label_column(),
            sample_fraction: default_sample_fraction(),
            sample_seed: None,
            partitions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    #[serde(default = "default_split_seed")]
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            seed: default_split_seed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Decimal places in the printed report
    #[serde(default = "default_digits")]
    pub digits: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            digits: default_digits(),
        }
    }
}

impl TrainingConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid YAML: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let fraction = self.data.sample_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(Error::config(format!(
                "data.sample_fraction must be in (0, 1], got {fraction}"
            )));
        }
        if self.data.partitions == Some(0) {
            return Err(Error::config("data.partitions must be at least 1"));
        }
        let test_size = self.split.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(Error::config(format!(
                "split.test_size must be in (0, 1), got {test_size}"
            )));
        }
        if self.vectorizer.max_features == 0 {
            return Err(Error::config("vectorizer.max_features must be at least 1"));
        }
        if !(self.vectorizer.max_df > 0.0 && self.vectorizer.max_df <= 1.0) {
            return Err(Error::config(format!(
                "vectorizer.max_df must be in (0, 1], got {}",
                self.vectorizer.max_df
            )));
        }
        if self.model.c.is_nan() || self.model.c <= 0.0 {
            return Err(Error::config(format!("model.c must be positive, got {}", self.model.c)));
        }
        if self.model.max_iter == 0 {
            return Err(Error::config("model.max_iter must be at least 1"));
        }
        Ok(())
    }

    /// Dataset loading options derived from the `data` section
    pub fn dataset_options(&self) -> DatasetOptions {
        DatasetOptions {
            columns: ColumnNames {
                text: self.data.text_column.clone(),
                label: self.data.label_column.clone(),
            },
            sample_fraction: self.data.sample_fraction,
            sample_seed: self.data.sample_seed,
            partitions: self.data.partitions,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("output.csv")
}

fn default_text_column() -> String {
    "review".to_string()
}

fn default_label_column() -> String {
    "sentiment".to_string()
}

fn default_sample_fraction() -> f64 {
    0.2
}

fn default_test_size() -> f64 {
    0.2
}

fn default_split_seed() -> u64 {
    DEFAULT_SPLIT_SEED
}

fn default_digits() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = TrainingConfig::from_yaml("{}").unwrap();
        assert_eq!(config, TrainingConfig::default());
        assert_eq!(config.data.path, PathBuf::from("output.csv"));
        assert_eq!(config.data.sample_fraction, 0.2);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.vectorizer.max_features, 1000);
        assert_eq!(config.model.c, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_training_config_yaml() {
        let yaml = r#"
data:
  path: ./data/Hotel_Reviews_Clean.csv
  text_column: Positive_Review
  sample_fraction: 0.5
  sample_seed: 7

split:
  test_size: 0.25

vectorizer:
  max_features: 500
  min_df: 2

model:
  c: 0.5
  max_iter: 200

report:
  digits: 3
"#;

        let config = TrainingConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data.path, PathBuf::from("./data/Hotel_Reviews_Clean.csv"));
        assert_eq!(config.data.text_column, "Positive_Review");
        assert_eq!(config.data.label_column, "sentiment");
        assert_eq!(config.data.sample_seed, Some(7));
        assert_eq!(config.split.test_size, 0.25);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.vectorizer.max_features, 500);
        assert_eq!(config.vectorizer.min_df, 2);
        assert!(config.vectorizer.lowercase);
        assert_eq!(config.model.max_iter, 200);
        assert!(config.model.fit_intercept);
        assert_eq!(config.report.digits, 3);

        let options = config.dataset_options();
        assert_eq!(options.columns.text, "Positive_Review");
        assert_eq!(options.sample_seed, Some(7));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = TrainingConfig::default();
        config.data.sample_fraction = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = TrainingConfig::default();
        config.split.test_size = 1.0;
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.vectorizer.max_features = 0;
        assert!(config.validate().is_err());

        let mut config = TrainingConfig::default();
        config.model.c = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = TrainingConfig::from_yaml("data: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
