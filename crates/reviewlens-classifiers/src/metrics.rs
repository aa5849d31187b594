//! Precision / recall / F1 classification report

use reviewlens_core::{Error, Label, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

const HEADERS: [&str; 4] = ["precision", "recall", "f1-score", "support"];
const COLUMN_WIDTH: usize = 9;

/// Scores for a single class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// True instances of this class
    pub support: usize,
}

/// Averaged scores across classes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// Decimal places used by `Display`
    #[serde(skip)]
    pub digits: usize,
}

impl ClassificationReport {
    /// Build a report comparing predictions against true labels.
    ///
    /// Classes are the sorted union of both label sets. Ratios with a zero
    /// denominator are reported as 0.0.
    pub fn from_predictions(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(Error::data(format!(
                "y_true and y_pred differ in length ({} vs {})",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(Error::data("cannot build a classification report from zero samples"));
        }

        let labels: BTreeSet<Label> = y_true.iter().chain(y_pred.iter()).copied().collect();
        let total = y_true.len();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| class_metrics(label, y_true, y_pred))
            .collect();

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let accuracy = correct as f64 / total as f64;

        let k = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Ok(Self {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
            digits: 2,
        })
    }

    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    /// Sum of per-class supports; equals the number of evaluated samples
    pub fn total_support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }

    /// Render as an aligned text table
    pub fn render(&self, digits: usize) -> String {
        let labels: Vec<String> = self.classes.iter().map(|c| c.label.to_string()).collect();
        let width = labels
            .iter()
            .map(String::len)
            .chain(["weighted avg".len(), digits])
            .max()
            .unwrap_or(0);
        let w = COLUMN_WIDTH;

        let mut out = format!("{:>width$} ", "");
        for h in HEADERS {
            out.push_str(&format!(" {h:>w$}"));
        }
        out.push_str("\n\n");

        let row = |name: &str, p: f64, r: f64, f: f64, support: usize| {
            format!(
                "{name:>width$}  {p:>w$.digits$} {r:>w$.digits$} {f:>w$.digits$} {support:>w$}\n"
            )
        };

        for (label, c) in labels.iter().zip(&self.classes) {
            out.push_str(&row(label, c.precision, c.recall, c.f1, c.support));
        }
        out.push('\n');

        out.push_str(&format!(
            "{:>width$}  {:>w$} {:>w$} {:>w$.digits$} {:>w$}\n",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support
        ));
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            out.push_str(&row(name, avg.precision, avg.recall, avg.f1, avg.support));
        }
        out
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.digits))
    }
}

fn class_metrics(label: Label, y_true: &[Label], y_pred: &[Label]) -> ClassMetrics {
    let mut tp = 0usize;
    let mut predicted = 0usize;
    let mut support = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if p == label {
            predicted += 1;
        }
        if t == label {
            support += 1;
            if p == label {
                tp += 1;
            }
        }
    }

    let precision = ratio(tp, predicted).unwrap_or_else(|| {
        warn!(label, "Precision is ill-defined: no predicted samples; setting to 0.0");
        0.0
    });
    let recall = ratio(tp, support).unwrap_or_else(|| {
        warn!(label, "Recall is ill-defined: no true samples; setting to 0.0");
        0.0
    });
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        label,
        precision,
        recall,
        f1,
        support,
    }
}

fn ratio(num: usize, denom: usize) -> Option<f64> {
    (denom > 0).then(|| num as f64 / denom as f64)
}
