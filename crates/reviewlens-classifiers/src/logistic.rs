//! L2-regularized binary logistic regression over sparse features
//!
//! Minimizes the mean log-loss plus `‖w‖² / (2·C·n)` with L-BFGS. The
//! intercept is not penalized.

use crate::optim::{ConvergenceStatus, Lbfgs};
use ndarray::Array1;
use reviewlens_core::{Error, Label, Result};
use serde::{Deserialize, Serialize};
use sprs::CsMat;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularization strength
    #[serde(default = "default_c")]
    pub c: f64,

    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Gradient tolerance for convergence
    #[serde(default = "default_tol")]
    pub tol: f64,

    #[serde(default = "default_true")]
    pub fit_intercept: bool,

    /// L-BFGS correction pairs
    #[serde(default = "default_history")]
    pub history: usize,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: default_c(),
            max_iter: default_max_iter(),
            tol: default_tol(),
            fit_intercept: true,
            history: default_history(),
        }
    }
}

fn default_c() -> f64 {
    1.0
}

fn default_max_iter() -> usize {
    100
}

fn default_tol() -> f64 {
    1e-4
}

fn default_true() -> bool {
    true
}

fn default_history() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Fitted {
    coefficients: Array1<f64>,
    intercept: f64,
    /// `classes[1]` is the positive class
    classes: [Label; 2],
    n_iter: usize,
    converged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: LogisticParams,
    fitted: Option<Fitted>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticParams::default())
    }
}

impl LogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Sorted class labels; the second one is predicted when the decision value is positive
    pub fn classes(&self) -> Result<[Label; 2]> {
        Ok(self.state()?.classes)
    }

    pub fn coefficients(&self) -> Result<&Array1<f64>> {
        Ok(&self.state()?.coefficients)
    }

    pub fn intercept(&self) -> Result<f64> {
        Ok(self.state()?.intercept)
    }

    /// Number of optimizer iterations used by the last fit
    pub fn n_iter(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_iter)
    }

    pub fn converged(&self) -> Option<bool> {
        self.fitted.as_ref().map(|f| f.converged)
    }

    /// Fit on feature rows `x` and labels `y`
    pub fn fit(&mut self, x: &CsMat<f64>, y: &[Label]) -> Result<()> {
        if x.rows() != y.len() {
            return Err(Error::model(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(Error::model("cannot fit logistic regression on zero samples"));
        }
        if self.params.c.is_nan() || self.params.c <= 0.0 {
            return Err(Error::model(format!("C must be positive, got {}", self.params.c)));
        }

        let classes = binary_classes(y)?;
        let targets: Vec<f64> = y
            .iter()
            .map(|&label| if label == classes[1] { 1.0 } else { 0.0 })
            .collect();

        let n_features = x.cols();
        let n = y.len() as f64;
        let alpha = 1.0 / (self.params.c * n);
        let fit_intercept = self.params.fit_intercept;

        let objective = |theta: &Array1<f64>| {
            let intercept = if fit_intercept { theta[n_features] } else { 0.0 };
            let mut grad = Array1::<f64>::zeros(n_features + 1);
            let mut loss = 0.0;

            for (i, row) in x.outer_iterator().enumerate() {
                let z = intercept + row.iter().map(|(j, &v)| v * theta[j]).sum::<f64>();
                loss += softplus(z) - targets[i] * z;

                let residual = sigmoid(z) - targets[i];
                for (j, &v) in row.iter() {
                    grad[j] += residual * v;
                }
                grad[n_features] += residual;
            }

            loss /= n;
            grad.mapv_inplace(|g| g / n);

            let mut penalty = 0.0;
            for j in 0..n_features {
                penalty += theta[j] * theta[j];
                grad[j] += alpha * theta[j];
            }
            loss += 0.5 * alpha * penalty;

            if !fit_intercept {
                grad[n_features] = 0.0;
            }
            (loss, grad)
        };

        let optimizer = Lbfgs::new(self.params.max_iter, self.params.tol, self.params.history);
        let result = optimizer.minimize(objective, Array1::zeros(n_features + 1));

        let converged = result.status == ConvergenceStatus::Converged;
        if !converged {
            warn!(
                status = ?result.status,
                iterations = result.iterations,
                gradient_max = result.gradient_max,
                "Logistic regression did not converge; increase max_iter or scale the data"
            );
        }
        debug!(
            iterations = result.iterations,
            loss = result.objective_value,
            "Fitted logistic regression"
        );

        let mut theta = result.solution;
        let intercept = if fit_intercept { theta[n_features] } else { 0.0 };
        theta = theta.slice_move(ndarray::s![..n_features]);

        self.fitted = Some(Fitted {
            coefficients: theta,
            intercept,
            classes,
            n_iter: result.iterations,
            converged,
        });
        Ok(())
    }

    /// Log-odds of the positive class for every row
    pub fn decision_function(&self, x: &CsMat<f64>) -> Result<Array1<f64>> {
        let state = self.state()?;
        if x.cols() != state.coefficients.len() {
            return Err(Error::model(format!(
                "expected {} features, got {}",
                state.coefficients.len(),
                x.cols()
            )));
        }

        Ok(x
            .outer_iterator()
            .map(|row| state.intercept + row.iter().map(|(j, &v)| v * state.coefficients[j]).sum::<f64>())
            .collect())
    }

    /// Log-odds of the positive class for one sparse row
    pub fn decision_row(&self, row: &[(usize, f64)]) -> Result<f64> {
        let state = self.state()?;
        let mut z = state.intercept;
        for &(j, v) in row {
            let w = state.coefficients.get(j).ok_or_else(|| {
                Error::model(format!(
                    "feature index {j} out of range for {} coefficients",
                    state.coefficients.len()
                ))
            })?;
            z += w * v;
        }
        Ok(z)
    }

    /// Probability of the positive class (`classes()[1]`) for every row
    pub fn predict_proba(&self, x: &CsMat<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    pub fn predict(&self, x: &CsMat<f64>) -> Result<Vec<Label>> {
        let classes = self.state()?.classes;
        Ok(self
            .decision_function(x)?
            .iter()
            .map(|&z| if z > 0.0 { classes[1] } else { classes[0] })
            .collect())
    }

    fn state(&self) -> Result<&Fitted> {
        self.fitted
            .as_ref()
            .ok_or_else(|| Error::model("logistic regression has not been fitted"))
    }
}

fn binary_classes(y: &[Label]) -> Result<[Label; 2]> {
    let distinct: BTreeSet<Label> = y.iter().copied().collect();
    let classes: Vec<Label> = distinct.into_iter().collect();
    match classes.as_slice() {
        [neg, pos] => Ok([*neg, *pos]),
        [only] => Err(Error::model(format!(
            "need samples of at least 2 classes, but the data contains only class {only}"
        ))),
        more => Err(Error::model(format!(
            "binary logistic regression supports 2 classes, found {}: {more:?}",
            more.len()
        ))),
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    fn matrix(rows: &[&[f64]]) -> CsMat<f64> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut tri = TriMat::new((rows.len(), cols));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    tri.add_triplet(i, j, v);
                }
            }
        }
        tri.to_csr()
    }

    fn separable() -> (CsMat<f64>, Vec<Label>) {
        let x = matrix(&[
            &[1.0, 0.0],
            &[0.9, 0.1],
            &[0.8, 0.0],
            &[0.0, 1.0],
            &[0.1, 0.9],
            &[0.0, 0.7],
        ]);
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(softplus(800.0).is_finite());
    }

    #[test]
    fn test_fit_separable() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y);
        assert_eq!(model.converged(), Some(true));

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5 && proba[5] > 0.5);
    }

    #[test]
    fn test_stronger_regularization_shrinks_weights() {
        let (x, y) = separable();
        let norm = |c: f64| {
            let mut model = LogisticRegression::new(LogisticParams {
                c,
                ..Default::default()
            });
            model.fit(&x, &y).unwrap();
            let w = model.coefficients().unwrap();
            w.dot(w).sqrt()
        };
        assert!(norm(0.01) < norm(100.0));
    }

    #[test]
    fn test_arbitrary_label_values() {
        let (x, _) = separable();
        let y = vec![-1, -1, -1, 5, 5, 5];
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.classes().unwrap(), [-1, 5]);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_decision_row_matches_matrix() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        let z = model.decision_function(&x).unwrap();
        let row1 = model.decision_row(&[(0, 0.9), (1, 0.1)]).unwrap();
        assert!((z[1] - row1).abs() < 1e-12);
        assert!(model.decision_row(&[(7, 1.0)]).is_err());
    }

    #[test]
    fn test_class_count_errors() {
        let (x, _) = separable();
        let mut model = LogisticRegression::default();
        assert!(model.fit(&x, &[1, 1, 1, 1, 1, 1]).is_err());
        assert!(model.fit(&x, &[0, 1, 2, 0, 1, 2]).is_err());
        assert!(model.fit(&x, &[0, 1]).is_err());
    }

    #[test]
    fn test_unfitted_and_dimension_errors() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        assert!(matches!(model.predict(&x), Err(Error::Model(_))));

        model.fit(&x, &y).unwrap();
        let wide = matrix(&[&[1.0, 0.0, 1.0]]);
        assert!(model.predict(&wide).is_err());
    }
}
