//! Fitted TF-IDF + logistic regression sentiment model
//!
//! `SentimentModel` owns the fitted vectorizer and regression and can be
//! written to / read from a JSON file. `SentimentClassifier` exposes a shared
//! model through the `Classifier` trait.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::logistic::{sigmoid, LogisticParams, LogisticRegression};
use crate::tfidf::{TfidfOptions, TfidfVectorizer};
use futures::future::join_all;
use reviewlens_core::{Error, Label, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Version written into saved model files
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentModel {
    format_version: u32,
    vectorizer: TfidfVectorizer,
    regression: LogisticRegression,
}

/// Prediction for a single text
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub label: Label,
    /// Probability of the positive class
    pub positive_probability: f64,
    /// Vocabulary terms present in the text
    pub active_features: usize,
}

impl SentimentModel {
    /// Fit vectorizer and regression on the given training texts
    pub fn fit<S: AsRef<str> + Sync>(
        texts: &[S],
        labels: &[Label],
        vectorizer_options: TfidfOptions,
        params: LogisticParams,
    ) -> Result<Self> {
        let mut vectorizer = TfidfVectorizer::new(vectorizer_options);
        let features = vectorizer.fit_transform(texts)?;

        let mut regression = LogisticRegression::new(params);
        regression.fit(&features, labels)?;

        Self::from_parts(vectorizer, regression)
    }

    /// Assemble a model from an already fitted vectorizer and regression
    pub fn from_parts(vectorizer: TfidfVectorizer, regression: LogisticRegression) -> Result<Self> {
        if !vectorizer.is_fitted() || !regression.is_fitted() {
            return Err(Error::model("sentiment model parts must be fitted"));
        }
        vectorizer.validate()?;
        let n_coef = regression.coefficients()?.len();
        if n_coef != vectorizer.vocabulary_len() {
            return Err(Error::model(format!(
                "regression has {n_coef} coefficients but the vocabulary has {} terms",
                vectorizer.vocabulary_len()
            )));
        }

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer,
            regression,
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn regression(&self) -> &LogisticRegression {
        &self.regression
    }

    pub fn classes(&self) -> Result<[Label; 2]> {
        self.regression.classes()
    }

    pub fn predict<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Label>> {
        let features = self.vectorizer.transform(texts)?;
        self.regression.predict(&features)
    }

    /// Probability of the positive class for every text
    pub fn predict_proba<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<f64>> {
        let features = self.vectorizer.transform(texts)?;
        Ok(self.regression.predict_proba(&features)?.to_vec())
    }

    /// Score a single text without building a feature matrix
    pub fn score(&self, text: &str) -> Result<Scored> {
        let row = self.vectorizer.transform_one(text)?;
        let z = self.regression.decision_row(&row)?;
        let [negative, positive] = self.classes()?;

        Ok(Scored {
            label: if z > 0.0 { positive } else { negative },
            positive_probability: sigmoid(z),
            active_features: row.len(),
        })
    }

    /// Write the model as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;

        info!(path = %path.display(), features = self.vectorizer.vocabulary_len(), "Saved sentiment model");
        Ok(())
    }

    /// Read a model written by `save`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let model: Self = serde_json::from_reader(reader)?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::model(format!(
                "unsupported model format version {} (expected {MODEL_FORMAT_VERSION})",
                model.format_version
            )));
        }
        let model = Self::from_parts(model.vectorizer, model.regression)?;

        info!(path = %path.display(), features = model.vectorizer.vocabulary_len(), "Loaded sentiment model");
        Ok(model)
    }
}

/// `Classifier` over a shared, fitted `SentimentModel`
pub struct SentimentClassifier {
    name: String,
    model: Arc<SentimentModel>,
}

impl SentimentClassifier {
    pub fn new(model: Arc<SentimentModel>) -> Self {
        Self::with_name("sentiment", model)
    }

    pub fn with_name(name: impl Into<String>, model: Arc<SentimentModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    /// Load a saved model from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(SentimentModel::load(path)?)))
    }

    pub fn model(&self) -> &Arc<SentimentModel> {
        &self.model
    }

    /// Classify many texts concurrently, preserving input order
    pub async fn classify_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ClassificationResult>> {
        join_all(texts.iter().map(|t| self.classify(t.as_ref())))
            .await
            .into_iter()
            .collect()
    }
}

#[async_trait::async_trait]
impl Classifier for SentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let scored = self.model.score(text)?;
        let [negative, positive] = self.model.classes()?;
        let p = scored.positive_probability as f32;
        let score = if scored.label == positive { p } else { 1.0 - p };

        Ok(ClassificationResult {
            label: scored.label,
            score,
            metadata: ClassificationMetadata {
                model: Some("tfidf-logistic".to_string()),
                all_scores: Some(vec![(negative, 1.0 - p), (positive, p)]),
                extra: vec![(
                    "active_features".to_string(),
                    scored.active_features.to_string(),
                )],
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
