//! TF-IDF vectorizer
//!
//! Fits a frequency-ranked vocabulary on training text and maps documents to
//! L2-normalized sparse rows of `count * idf` weights, with smoothed idf:
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`.

use crate::tokenizer::WordTokenizer;
use rayon::prelude::*;
use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Vectorizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfOptions {
    /// Keep at most this many terms, ranked by corpus frequency
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Ignore terms present in fewer documents than this
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Ignore terms present in more than this fraction of documents
    #[serde(default = "default_max_df")]
    pub max_df: f64,

    /// Lowercase text before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,
}

impl Default for TfidfOptions {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
            lowercase: true,
        }
    }
}

fn default_max_features() -> usize {
    1000
}

fn default_min_df() -> usize {
    1
}

fn default_max_df() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Learned vocabulary; `terms` is sorted so a term's position is its column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Vocabulary {
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl Vocabulary {
    fn column(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }
}

/// Sparse row as `(column, weight)` pairs in column order
pub type SparseRow = Vec<(usize, f64)>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    options: TfidfOptions,
    vocabulary: Option<Vocabulary>,
}

impl TfidfVectorizer {
    pub fn new(options: TfidfOptions) -> Self {
        Self {
            options,
            vocabulary: None,
        }
    }

    pub fn options(&self) -> &TfidfOptions {
        &self.options
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Number of output columns, 0 before fitting
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, |v| v.terms.len())
    }

    /// Fitted terms in column order
    pub fn terms(&self) -> &[String] {
        self.vocabulary
            .as_ref()
            .map(|v| v.terms.as_slice())
            .unwrap_or_default()
    }

    /// Fitted idf weight per column
    pub fn idf(&self) -> &[f64] {
        self.vocabulary
            .as_ref()
            .map(|v| v.idf.as_slice())
            .unwrap_or_default()
    }

    /// Learn vocabulary and idf weights from `docs`
    pub fn fit<S: AsRef<str> + Sync>(&mut self, docs: &[S]) -> Result<()> {
        if docs.is_empty() {
            return Err(Error::model("cannot fit TF-IDF vectorizer on zero documents"));
        }

        let tokenizer = WordTokenizer::new(self.options.lowercase);
        // term -> (corpus frequency, document frequency)
        let stats: HashMap<String, (usize, usize)> = docs
            .par_iter()
            .fold(HashMap::new, |mut acc: HashMap<String, (usize, usize)>, doc| {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for token in tokenizer.tokenize(doc.as_ref()) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                for (term, count) in counts {
                    let entry = acc.entry(term).or_insert((0, 0));
                    entry.0 += count;
                    entry.1 += 1;
                }
                acc
            })
            .reduce(HashMap::new, |mut a, b| {
                for (term, (tf, df)) in b {
                    let entry = a.entry(term).or_insert((0, 0));
                    entry.0 += tf;
                    entry.1 += df;
                }
                a
            });

        let n_docs = docs.len();
        let max_doc_count = self.options.max_df * n_docs as f64;
        let mut candidates: Vec<(String, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (_, df))| *df >= self.options.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, (tf, df))| (term, tf, df))
            .collect();

        let seen = candidates.len();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.options.max_features);
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        if candidates.is_empty() {
            return Err(Error::model(
                "empty vocabulary: no term survived tokenization and document-frequency filters",
            ));
        }

        let n = n_docs as f64;
        let (terms, idf) = candidates
            .into_iter()
            .map(|(term, _, df)| (term, ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0))
            .unzip();

        self.vocabulary = Some(Vocabulary { terms, idf });
        debug!(
            documents = n_docs,
            distinct_terms = seen,
            features = self.vocabulary_len(),
            "Fitted TF-IDF vocabulary"
        );
        Ok(())
    }

    /// Map `docs` to a `docs.len() x vocabulary_len()` CSR matrix
    pub fn transform<S: AsRef<str> + Sync>(&self, docs: &[S]) -> Result<CsMat<f64>> {
        let vocabulary = self.fitted()?;

        let rows: Vec<SparseRow> = docs
            .par_iter()
            .map(|doc| self.weigh(vocabulary, doc.as_ref()))
            .collect();

        let mut triplets = TriMat::new((docs.len(), vocabulary.terms.len()));
        for (r, row) in rows.iter().enumerate() {
            for &(c, v) in row {
                triplets.add_triplet(r, c, v);
            }
        }
        Ok(triplets.to_csr())
    }

    pub fn fit_transform<S: AsRef<str> + Sync>(&mut self, docs: &[S]) -> Result<CsMat<f64>> {
        self.fit(docs)?;
        self.transform(docs)
    }

    /// Weights for a single document
    pub fn transform_one(&self, text: &str) -> Result<SparseRow> {
        let vocabulary = self.fitted()?;
        Ok(self.weigh(vocabulary, text))
    }

    /// Check the fitted vocabulary: one finite idf weight per term, and
    /// terms strictly ascending so column lookup by binary search is sound
    pub fn validate(&self) -> Result<()> {
        let vocabulary = self.fitted()?;
        let (terms, idf) = (&vocabulary.terms, &vocabulary.idf);

        if terms.is_empty() {
            return Err(Error::model("TF-IDF vocabulary is empty"));
        }
        if idf.len() != terms.len() {
            return Err(Error::model(format!(
                "TF-IDF vocabulary has {} terms but {} idf weights",
                terms.len(),
                idf.len()
            )));
        }
        if let Some(pos) = terms.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::model(format!(
                "TF-IDF terms must be sorted and unique, {:?} is followed by {:?}",
                terms[pos],
                terms[pos + 1]
            )));
        }
        if let Some(col) = idf.iter().position(|w| !w.is_finite()) {
            return Err(Error::model(format!("idf weight of column {col} is not finite")));
        }
        Ok(())
    }

    fn fitted(&self) -> Result<&Vocabulary> {
        self.vocabulary
            .as_ref()
            .ok_or_else(|| Error::model("TF-IDF vectorizer has not been fitted"))
    }

    fn weigh(&self, vocabulary: &Vocabulary, text: &str) -> SparseRow {
        let tokenizer = WordTokenizer::new(self.options.lowercase);
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenizer.tokenize(text) {
            if let Some(col) = vocabulary.column(&token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(col, count)| (col, count * vocabulary.idf[col]))
            .collect();

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: &[&str] = &[
        "great room great staff",
        "terrible room",
        "great location",
        "staff was rude",
    ];

    #[test]
    fn test_fit_vocabulary_is_alphabetical() {
        let mut v = TfidfVectorizer::default();
        v.fit(DOCS).unwrap();
        assert_eq!(
            v.terms(),
            &["great", "location", "room", "rude", "staff", "terrible", "was"]
        );
    }

    #[test]
    fn test_idf_is_smoothed() {
        let mut v = TfidfVectorizer::default();
        v.fit(DOCS).unwrap();
        // "great" appears in 2 of 4 documents
        let col = v.terms().iter().position(|t| t == "great").unwrap();
        let expected = (5.0f64 / 3.0).ln() + 1.0;
        assert!((v.idf()[col] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut v = TfidfVectorizer::new(TfidfOptions {
            max_features: 2,
            ..Default::default()
        });
        v.fit(DOCS).unwrap();
        // great=3, room=2, staff=2: tie broken alphabetically
        assert_eq!(v.terms(), &["great", "room"]);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let mut v = TfidfVectorizer::default();
        let m = v.fit_transform(DOCS).unwrap();
        assert_eq!(m.rows(), 4);
        assert_eq!(m.cols(), v.vocabulary_len());

        for row in m.outer_iterator() {
            let norm: f64 = row.iter().map(|(_, &x)| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unknown_words_give_empty_row() {
        let mut v = TfidfVectorizer::default();
        v.fit(DOCS).unwrap();
        assert!(v.transform_one("zzz qqq").unwrap().is_empty());

        let m = v.transform(&["zzz"]).unwrap();
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn test_min_and_max_df_filters() {
        let mut v = TfidfVectorizer::new(TfidfOptions {
            min_df: 2,
            max_df: 0.5,
            ..Default::default()
        });
        v.fit(DOCS).unwrap();
        assert_eq!(v.terms(), &["great", "room", "staff"]);
    }

    #[test]
    fn test_validate_vocabulary() {
        let mut v = TfidfVectorizer::default();
        assert!(v.validate().is_err());
        v.fit(DOCS).unwrap();
        assert!(v.validate().is_ok());

        let mut short_idf = v.clone();
        short_idf.vocabulary.as_mut().unwrap().idf.truncate(1);
        assert!(matches!(short_idf.validate(), Err(Error::Model(_))));

        let mut unsorted = v.clone();
        unsorted.vocabulary.as_mut().unwrap().terms.reverse();
        assert!(matches!(unsorted.validate(), Err(Error::Model(_))));

        let mut duplicated = v.clone();
        let terms = &mut duplicated.vocabulary.as_mut().unwrap().terms;
        terms[1] = terms[0].clone();
        assert!(matches!(duplicated.validate(), Err(Error::Model(_))));

        let mut nan_idf = v;
        nan_idf.vocabulary.as_mut().unwrap().idf[0] = f64::NAN;
        assert!(matches!(nan_idf.validate(), Err(Error::Model(_))));
    }

    #[test]
    fn test_unfitted_and_empty_errors() {
        let v = TfidfVectorizer::default();
        assert!(matches!(v.transform(&["a"]), Err(Error::Model(_))));

        let mut v = TfidfVectorizer::default();
        let empty: &[&str] = &[];
        assert!(v.fit(empty).is_err());
        assert!(v.fit(&["a b c"]).is_err());
    }
}
