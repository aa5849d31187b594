//! reviewlens Classifiers
//!
//! Text features, a linear sentiment model and its evaluation.
//!
//! - `tfidf`: frequency-capped TF-IDF vectorizer producing sparse rows
//! - `logistic`: L2-regularized binary logistic regression fitted with L-BFGS (`optim`)
//! - `metrics`: per-class precision/recall/F1 report
//! - `sentiment`: fitted vectorizer + regression, persisted as JSON, served through `Classifier`
//! - `training`: the end-to-end run driven by a YAML `TrainingConfig`

pub mod classifier;
pub mod config;
pub mod logistic;
pub mod metrics;
pub mod optim;
pub mod sentiment;
pub mod tfidf;
pub mod tokenizer;
pub mod training;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use config::{DataConfig, ReportConfig, SplitConfig, TrainingConfig};
pub use logistic::{LogisticParams, LogisticRegression};
pub use metrics::{AverageMetrics, ClassMetrics, ClassificationReport};
pub use sentiment::{SentimentClassifier, SentimentModel, MODEL_FORMAT_VERSION};
pub use tfidf::{TfidfOptions, TfidfVectorizer};
pub use training::{TrainingOutcome, TrainingPipeline};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::TrainingConfig;
    pub use crate::metrics::ClassificationReport;
    pub use crate::sentiment::{SentimentClassifier, SentimentModel};
    pub use crate::training::TrainingPipeline;
}
