//! CSV loading, cleaning, sampling and type coercion
//!
//! Rows go through four steps before they reach the vectorizer:
//! - `load_csv` reads the two required columns of every record
//! - `drop_missing` removes records with an absent or NA value in either column
//! - `sample_fraction` keeps a random fraction, sampled per partition in parallel
//! - `coerce` turns the surviving fields into typed `Review`s

use crate::error::{Error, Result};
use crate::types::{Dataset, Label, RawRow, Review};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Strings treated as missing values, matching pandas' default NA set
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Names of the columns holding review text and sentiment label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub text: String,
    pub label: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            text: "review".to_string(),
            label: "sentiment".to_string(),
        }
    }
}

/// Options for `load_dataset`
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub columns: ColumnNames,

    /// Fraction of clean rows to keep, in (0, 1]
    pub sample_fraction: f64,

    /// Base seed for sampling; a fresh one is drawn per run when unset
    pub sample_seed: Option<u64>,

    /// Number of sampling partitions; one per CPU when unset
    pub partitions: Option<usize>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            sample_fraction: 0.2,
            sample_seed: None,
            partitions: None,
        }
    }
}

/// Load, clean, sample and coerce a review CSV in one go
pub fn load_dataset(path: impl AsRef<Path>, options: &DatasetOptions) -> Result<Dataset> {
    let path = path.as_ref();

    let rows = load_csv(path, &options.columns)?;
    let total = rows.len();

    let rows = drop_missing(rows);
    let clean = rows.len();

    let partitions = options.partitions.unwrap_or_else(num_cpus::get);
    let rows = sample_fraction(&rows, options.sample_fraction, options.sample_seed, partitions)?;
    let dataset = coerce(rows)?;

    info!(
        path = %path.display(),
        total,
        clean,
        sampled = dataset.len(),
        fraction = options.sample_fraction,
        "Loaded review dataset"
    );

    Ok(dataset)
}

/// Read the review and label fields of every record in a CSV file with headers
pub fn load_csv(path: impl AsRef<Path>, columns: &ColumnNames) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let text_idx = column_index(&headers, &columns.text)?;
    let label_idx = column_index(&headers, &columns.label)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(RawRow {
            line,
            text: record.get(text_idx).map(str::to_string),
            label: record.get(label_idx).map(str::to_string),
        });
    }

    debug!(rows = rows.len(), "Read CSV records");
    Ok(rows)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::data(format!("required column '{name}' not found in CSV header")))
}

/// Whether a raw field counts as a missing value.
///
/// Surrounding whitespace is ignored, so `" NA "` and `"   "` are missing.
/// Token matching is case-sensitive: `"Na"` is a value.
pub fn is_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => {
            let v = v.trim();
            v.is_empty() || NA_TOKENS.contains(&v)
        }
    }
}

/// Drop rows with a missing value in either required column
pub fn drop_missing(rows: Vec<RawRow>) -> Vec<RawRow> {
    let before = rows.len();
    let kept: Vec<RawRow> = rows
        .into_iter()
        .filter(|r| !is_missing(r.text.as_deref()) && !is_missing(r.label.as_deref()))
        .collect();

    debug!(dropped = before - kept.len(), kept = kept.len(), "Dropped rows with missing values");
    kept
}

/// Keep a random `fraction` of rows.
///
/// Exactly `round(fraction * rows.len())` rows are kept, whatever the
/// partition count. Rows are cut into `partitions` contiguous chunks; each
/// chunk gets `floor(fraction * len)` rows and the remainder goes to the
/// chunks with the largest fractional share, ties broken at random. Chunks
/// are sampled without replacement in parallel, each with an RNG derived
/// from the base seed and the chunk index, so a fixed seed and partition
/// count reproduce the same sample. Output preserves input order.
pub fn sample_fraction(
    rows: &[RawRow],
    fraction: f64,
    seed: Option<u64>,
    partitions: usize,
) -> Result<Vec<RawRow>> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(Error::config(format!(
            "sample fraction must be in (0, 1], got {fraction}"
        )));
    }
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let partitions = partitions.max(1);
    let chunk_size = rows.len().div_ceil(partitions).max(1);
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    let chunks: Vec<&[RawRow]> = rows.chunks(chunk_size).collect();
    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    let quotas = partition_quotas(&lens, fraction, base_seed);

    let sampled: Vec<Vec<RawRow>> = chunks
        .par_iter()
        .zip(quotas.par_iter())
        .enumerate()
        .map(|(idx, (chunk, &keep))| {
            let mut rng = StdRng::seed_from_u64(partition_seed(base_seed, idx));
            let mut picked = rand::seq::index::sample(&mut rng, chunk.len(), keep).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| chunk[i].clone()).collect()
        })
        .collect();

    Ok(sampled.into_iter().flatten().collect())
}

/// Split `round(fraction * sum(lens))` across chunks by largest remainder
fn partition_quotas(lens: &[usize], fraction: f64, seed: u64) -> Vec<usize> {
    let n: usize = lens.iter().sum();
    let total = ((fraction * n as f64).round() as usize).min(n);

    let exact: Vec<f64> = lens.iter().map(|&len| fraction * len as f64).collect();
    let mut quotas: Vec<usize> = exact
        .iter()
        .zip(lens)
        .map(|(e, &len)| (e.floor() as usize).min(len))
        .collect();

    let mut remaining = total.saturating_sub(quotas.iter().sum());
    if remaining == 0 {
        return quotas;
    }

    let mut order: Vec<usize> = (0..lens.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    // stable sort keeps the shuffled order among equal remainders
    order.sort_by(|&a, &b| (exact[b] - exact[b].floor()).total_cmp(&(exact[a] - exact[a].floor())));

    for idx in order {
        if remaining == 0 {
            break;
        }
        if quotas[idx] < lens[idx] {
            quotas[idx] += 1;
            remaining -= 1;
        }
    }
    quotas
}

fn partition_seed(base: u64, partition: usize) -> u64 {
    base ^ (partition as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Coerce cleaned rows into typed reviews
pub fn coerce(rows: Vec<RawRow>) -> Result<Dataset> {
    let reviews = rows
        .into_par_iter()
        .map(coerce_row)
        .collect::<Result<Vec<Review>>>()?;
    Ok(Dataset::new(reviews))
}

fn coerce_row(row: RawRow) -> Result<Review> {
    let text = row
        .text
        .ok_or_else(|| Error::data(format!("line {}: missing review text", row.line)))?;
    let raw = row
        .label
        .ok_or_else(|| Error::data(format!("line {}: missing sentiment label", row.line)))?;

    let label = parse_label(&raw)
        .ok_or_else(|| Error::data(format!("line {}: sentiment {raw:?} is not an integer", row.line)))?;

    Ok(Review { text, label })
}

/// Parse an integer label, accepting integral floats such as `"1.0"`
pub fn parse_label(raw: &str) -> Option<Label> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }

    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
