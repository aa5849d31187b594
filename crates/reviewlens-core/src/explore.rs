//! Exploration of a clean hotel review export
//!
//! Reviews are filtered by hotel name, reviewer nationality and score, then
//! summarized: totals, average score, the score distribution and the most
//! frequent hotels and nationalities.

use crate::error::{Error, Result};
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Reviewer score scale of the hotel export
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Number of entries in the top hotel and nationality rankings
pub const DEFAULT_TOP: usize = 10;

/// The explored columns of one hotel review record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelReview {
    #[serde(rename = "Hotel_Name", default)]
    pub hotel_name: Option<String>,

    #[serde(rename = "Reviewer_Nationality", default)]
    pub nationality: Option<String>,

    /// Unparsable scores read as absent
    #[serde(rename = "Reviewer_Score", default, deserialize_with = "csv::invalid_option")]
    pub score: Option<f64>,

    #[serde(rename = "Positive_Review", default)]
    pub positive_review: Option<String>,
}

impl HotelReview {
    /// Positive review text cut to `max_chars` characters, with `...` when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        match &self.positive_review {
            None => "N/A".to_string(),
            Some(text) if text.chars().count() > max_chars => {
                let mut cut: String = text.chars().take(max_chars).collect();
                cut.push_str("...");
                cut
            }
            Some(text) => text.clone(),
        }
    }
}

/// Read every record of a hotel review CSV.
///
/// Missing columns, empty fields and non-finite scores read as `None`.
/// Hotel names and nationalities are trimmed; the export pads nationalities
/// with spaces.
pub fn load_hotel_reviews(path: impl AsRef<Path>) -> Result<Vec<HotelReview>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut reviews = Vec::new();
    for record in reader.deserialize() {
        let mut review: HotelReview = record?;
        review.hotel_name = trimmed(review.hotel_name);
        review.nationality = trimmed(review.nationality);
        review.score = review.score.filter(|s| s.is_finite());
        reviews.push(review);
    }

    debug!(rows = reviews.len(), "Read hotel review records");
    Ok(reviews)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hotel, nationality and score filter over `HotelReview`s.
///
/// Name patterns are case-insensitive regular expressions matched anywhere
/// in the field. The score range is inclusive and only applies once it is
/// narrower than the full scale, so unscored reviews pass the default filter.
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    hotel: Option<Regex>,
    nationality: Option<Regex>,
    min_score: f64,
    max_score: f64,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            hotel: None,
            nationality: None,
            min_score: SCORE_MIN,
            max_score: SCORE_MAX,
        }
    }
}

impl ReviewFilter {
    /// Keep reviews whose hotel name matches `pattern`; empty means any hotel
    pub fn with_hotel(mut self, pattern: &str) -> Result<Self> {
        self.hotel = compile(pattern)?;
        Ok(self)
    }

    /// Keep reviews whose nationality matches `pattern`; empty means any
    pub fn with_nationality(mut self, pattern: &str) -> Result<Self> {
        self.nationality = compile(pattern)?;
        Ok(self)
    }

    /// Keep reviews scored within `[min, max]`
    pub fn with_score_range(mut self, min: f64, max: f64) -> Result<Self> {
        let on_scale = |s: f64| (SCORE_MIN..=SCORE_MAX).contains(&s);
        if !on_scale(min) || !on_scale(max) || min > max {
            return Err(Error::config(format!(
                "score range must satisfy {SCORE_MIN} <= min <= max <= {SCORE_MAX}, got [{min}, {max}]"
            )));
        }
        self.min_score = min;
        self.max_score = max;
        Ok(self)
    }

    fn narrows_score(&self) -> bool {
        self.min_score > SCORE_MIN || self.max_score < SCORE_MAX
    }

    pub fn matches(&self, review: &HotelReview) -> bool {
        field_matches(self.hotel.as_ref(), review.hotel_name.as_deref())
            && field_matches(self.nationality.as_ref(), review.nationality.as_deref())
            && (!self.narrows_score()
                || review
                    .score
                    .is_some_and(|s| s >= self.min_score && s <= self.max_score))
    }

    /// Matching reviews, in input order
    pub fn apply(&self, reviews: Vec<HotelReview>) -> Vec<HotelReview> {
        reviews.into_par_iter().filter(|r| self.matches(r)).collect()
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| Error::config(format!("invalid filter pattern {pattern:?}: {e}")))
}

fn field_matches(pattern: Option<&Regex>, value: Option<&str>) -> bool {
    match (pattern, value) {
        (None, _) => true,
        (Some(re), Some(v)) => re.is_match(v),
        (Some(_), None) => false,
    }
}

/// Summary statistics over a set of hotel reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreSummary {
    pub total_reviews: usize,

    /// Mean over scored reviews; `None` when nothing is scored
    pub average_score: Option<f64>,

    pub most_common_nationality: Option<String>,
    pub most_reviewed_hotel: Option<String>,

    /// `(score, count)` for every distinct score, ascending
    pub score_distribution: Vec<(f64, usize)>,

    /// Most reviewed hotels, most frequent first
    pub top_hotels: Vec<(String, usize)>,

    /// Most frequent nationalities, most frequent first
    pub top_nationalities: Vec<(String, usize)>,
}

impl ExploreSummary {
    /// Summarize `reviews`, keeping `top` entries per ranking
    pub fn from_reviews(reviews: &[HotelReview], top: usize) -> Self {
        let mut scores: Vec<f64> = reviews.iter().filter_map(|r| r.score).collect();
        let average_score =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        scores.sort_by(f64::total_cmp);
        let mut score_distribution: Vec<(f64, usize)> = Vec::new();
        for score in scores {
            if let Some((last, count)) = score_distribution.last_mut() {
                if *last == score {
                    *count += 1;
                    continue;
                }
            }
            score_distribution.push((score, 1));
        }

        let hotels = ranked(reviews.iter().filter_map(|r| r.hotel_name.as_deref()));
        let nationalities = ranked(reviews.iter().filter_map(|r| r.nationality.as_deref()));

        Self {
            total_reviews: reviews.len(),
            average_score,
            most_common_nationality: nationalities.first().map(|(n, _)| n.clone()),
            most_reviewed_hotel: hotels.first().map(|(h, _)| h.clone()),
            score_distribution,
            top_hotels: hotels.into_iter().take(top).collect(),
            top_nationalities: nationalities.into_iter().take(top).collect(),
        }
    }
}

/// Values by descending count; equal counts keep first-seen order
fn ranked<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    // value -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, value) in values.enumerate() {
        counts.entry(value).or_insert((0, pos)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .map(|(value, (count, _))| (value.to_string(), count))
        .collect()
}

impl fmt::Display for ExploreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

        writeln!(f, "{:<25}{}", "Total reviews", self.total_reviews)?;
        writeln!(f, "{:<25}{:.2}", "Average score", self.average_score.unwrap_or(0.0))?;
        writeln!(f, "{:<25}{}", "Most common nationality", or_na(&self.most_common_nationality))?;
        writeln!(f, "{:<25}{}", "Most reviewed hotel", or_na(&self.most_reviewed_hotel))?;

        writeln!(f)?;
        writeln!(f, "Score distribution")?;
        for (score, count) in &self.score_distribution {
            writeln!(f, "  {score:>5.1}  {count}")?;
        }

        write_ranking(f, "Top hotels", &self.top_hotels)?;
        write_ranking(f, "Top nationalities", &self.top_nationalities)
    }
}

fn write_ranking(f: &mut fmt::Formatter<'_>, title: &str, ranking: &[(String, usize)]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    let width = ranking.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
    for (name, count) in ranking {
        writeln!(f, "  {name:<width$}  {count}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn review(hotel: &str, nationality: &str, score: Option<f64>) -> HotelReview {
        HotelReview {
            hotel_name: Some(hotel.to_string()),
            nationality: Some(nationality.to_string()),
            score,
            positive_review: None,
        }
    }

    fn reviews() -> Vec<HotelReview> {
        vec![
            review("Hotel Arena", "United Kingdom", Some(7.5)),
            review("Savoy", "Germany", Some(9.6)),
            review("Hotel Arena", "Germany", Some(4.2)),
            review("The Ritz", "United Kingdom", None),
            review("Savoy", "France", Some(9.6)),
            review("Hotel Arena", "United Kingdom", Some(10.0)),
        ]
    }

    #[test]
    fn test_load_hotel_reviews() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "Hotel_Name,Reviewer_Nationality,Positive_Review,Reviewer_Score\n\
             Savoy, United Kingdom ,Lovely view,9.6\n\
             Ritz,,Nice bar,NaN\n\
             Arena,Germany,,\n"
        )
        .unwrap();

        let loaded = load_hotel_reviews(file.path()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].nationality.as_deref(), Some("United Kingdom"));
        assert_eq!(loaded[0].score, Some(9.6));
        assert_eq!(loaded[1].nationality, None);
        assert_eq!(loaded[1].score, None);
        assert_eq!(loaded[2].positive_review, None);
    }

    #[test]
    fn test_load_tolerates_missing_columns() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Hotel_Name\nSavoy\n").unwrap();

        let loaded = load_hotel_reviews(file.path()).unwrap();
        assert_eq!(loaded[0].hotel_name.as_deref(), Some("Savoy"));
        assert_eq!(loaded[0].score, None);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let filter = ReviewFilter::default()
            .with_hotel("arena")
            .unwrap()
            .with_nationality("KINGDOM")
            .unwrap();

        let kept = filter.apply(reviews());
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.hotel_name.as_deref() == Some("Hotel Arena")));
    }

    #[test]
    fn test_score_range_is_inclusive_and_drops_unscored() {
        let filter = ReviewFilter::default().with_score_range(7.5, 9.6).unwrap();
        let scores: Vec<_> = filter.apply(reviews()).iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![Some(7.5), Some(9.6), Some(9.6)]);
    }

    #[test]
    fn test_full_score_range_keeps_unscored() {
        let filter = ReviewFilter::default()
            .with_score_range(SCORE_MIN, SCORE_MAX)
            .unwrap();
        assert_eq!(filter.apply(reviews()).len(), 6);
    }

    #[test]
    fn test_filter_rejects_bad_input() {
        assert!(matches!(ReviewFilter::default().with_hotel("("), Err(Error::Config(_))));
        assert!(ReviewFilter::default().with_score_range(8.0, 2.0).is_err());
        assert!(ReviewFilter::default().with_score_range(-1.0, 5.0).is_err());
        assert!(ReviewFilter::default().with_score_range(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_summary() {
        let summary = ExploreSummary::from_reviews(&reviews(), 2);

        assert_eq!(summary.total_reviews, 6);
        let avg = summary.average_score.unwrap();
        assert!((avg - 40.9 / 5.0).abs() < 1e-9);
        assert_eq!(summary.most_reviewed_hotel.as_deref(), Some("Hotel Arena"));
        assert_eq!(summary.most_common_nationality.as_deref(), Some("United Kingdom"));
        assert_eq!(
            summary.score_distribution,
            vec![(4.2, 1), (7.5, 1), (9.6, 2), (10.0, 1)]
        );
        assert_eq!(
            summary.top_hotels,
            vec![("Hotel Arena".to_string(), 3), ("Savoy".to_string(), 2)]
        );
        assert_eq!(summary.top_nationalities[0], ("United Kingdom".to_string(), 3));
        assert_eq!(summary.top_nationalities[1], ("Germany".to_string(), 2));
    }

    #[test]
    fn test_ranking_ties_keep_first_seen_order() {
        let ranking = ranked(["b", "a", "a", "b", "c"].into_iter());
        assert_eq!(
            ranking,
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = ExploreSummary::from_reviews(&[], DEFAULT_TOP);
        assert_eq!(summary.total_reviews, 0);
        assert_eq!(summary.average_score, None);
        assert!(summary.top_hotels.is_empty());

        let rendered = summary.to_string();
        assert!(rendered.contains("Average score            0.00"));
        assert!(rendered.contains("Most reviewed hotel      N/A"));
    }

    #[test]
    fn test_excerpt() {
        let mut r = review("Savoy", "France", None);
        assert_eq!(r.excerpt(5), "N/A");
        r.positive_review = Some("Lovely".to_string());
        assert_eq!(r.excerpt(10), "Lovely");
        assert_eq!(r.excerpt(4), "Love...");
    }
}
