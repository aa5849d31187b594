//! End-to-end training run
//!
//! Load → clean → sample → coerce → split → vectorize → fit → predict → report,
//! once and in order.

use crate::config::TrainingConfig;
use crate::logistic::LogisticRegression;
use crate::metrics::ClassificationReport;
use crate::sentiment::SentimentModel;
use crate::tfidf::TfidfVectorizer;
use reviewlens_core::{load_dataset, train_test_split, Dataset, Result};
use std::time::Instant;
use tracing::info;

/// Everything produced by a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub report: ClassificationReport,
    pub model: SentimentModel,
    pub n_train: usize,
    pub n_test: usize,
}

pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    /// Create a pipeline; fails if the configuration is out of range
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run on the configured CSV file
    pub fn run(&self) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let dataset = load_dataset(&self.config.data.path, &self.config.dataset_options())?;
        info!(
            rows = dataset.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stage complete: load"
        );
        self.run_on(dataset)
    }

    /// Run on an already loaded and sampled dataset
    pub fn run_on(&self, dataset: Dataset) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let split = train_test_split(dataset, self.config.split.test_size, self.config.split.seed)?;
        let (n_train, n_test) = (split.train.len(), split.test.len());
        info!(n_train, n_test, seed = self.config.split.seed, "Stage complete: split");

        let stage = Instant::now();
        let mut vectorizer = TfidfVectorizer::new(self.config.vectorizer.clone());
        let x_train = vectorizer.fit_transform(&split.train.texts())?;
        let x_test = vectorizer.transform(&split.test.texts())?;
        info!(
            features = vectorizer.vocabulary_len(),
            train_nnz = x_train.nnz(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "Stage complete: vectorize"
        );

        let stage = Instant::now();
        let mut regression = LogisticRegression::new(self.config.model.clone());
        regression.fit(&x_train, &split.train.labels())?;
        info!(
            iterations = regression.n_iter().unwrap_or(0),
            converged = regression.converged().unwrap_or(false),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "Stage complete: fit"
        );

        let y_pred = regression.predict(&x_test)?;
        let report = ClassificationReport::from_predictions(&split.test.labels(), &y_pred)?
            .with_digits(self.config.report.digits);
        info!(
            accuracy = report.accuracy,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stage complete: evaluate"
        );

        let model = SentimentModel::from_parts(vectorizer, regression)?;
        Ok(TrainingOutcome {
            report,
            model,
            n_train,
            n_test,
        })
    }
}
