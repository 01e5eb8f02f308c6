//! Gradient-Boosted Stump Classifier
//!
//! A small boosted ensemble of depth-1 decision trees fit with logistic loss.
//! Each round adds one stump chosen by exhaustive split search over all
//! feature columns, with Newton-step leaf values. Training is fully
//! deterministic: no sampling, stable sorts, fixed iteration order.

use detection_core::{Classifier, FeatureMatrix, FraudError, FraudResult};
use serde::{Deserialize, Serialize};

/// Boosting rounds; each contributes at most one stump.
const ROUNDS: usize = 60;

/// Shrinkage applied to every leaf value.
const LEARNING_RATE: f64 = 0.3;

/// L2 regularization on leaf weights. Keeps leaf values finite even when a
/// partition holds a single row.
const L2_REG: f64 = 1.0;

/// One depth-1 tree: rows with `value < threshold` on the chosen feature go
/// left, the rest go right. Leaf values already include the learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stump {
    feature: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

/// A fitted boosted-stump ensemble.
///
/// Prediction input must carry exactly the training columns in training
/// order; the risk scorer normalizes uploads before calling in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedStumps {
    feature_names: Vec<String>,
    base_score: f64,
    stumps: Vec<Stump>,
}

impl GradientBoostedStumps {
    /// Fit a fresh ensemble on a labeled feature matrix.
    pub fn fit(features: &FeatureMatrix, labels: &[u8]) -> FraudResult<Self> {
        let n = features.n_rows();
        if n == 0 {
            return Err(FraudError::ModelProvisioning(
                "cannot fit a classifier on zero rows".into(),
            ));
        }
        if labels.len() != n {
            return Err(FraudError::ModelProvisioning(format!(
                "{} labels for {} feature rows",
                labels.len(),
                n
            )));
        }

        // Log-odds prior from the positive rate, clamped so a single-class
        // label vector keeps the math finite.
        let positive_rate = (labels.iter().filter(|&&l| l == 1).count() as f64 / n as f64)
            .clamp(1e-6, 1.0 - 1e-6);
        let base_score = (positive_rate / (1.0 - positive_rate)).ln();

        // Row order per feature, sorted once and reused every round.
        let sorted_orders: Vec<Vec<usize>> = (0..features.n_features())
            .map(|j| {
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by(|&a, &b| {
                    features.rows[a][j]
                        .partial_cmp(&features.rows[b][j])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                order
            })
            .collect();

        let targets: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
        let mut scores = vec![base_score; n];
        let mut stumps = Vec::with_capacity(ROUNDS);

        for round in 0..ROUNDS {
            let mut gradients = vec![0.0; n];
            let mut hessians = vec![0.0; n];
            for i in 0..n {
                let p = sigmoid(scores[i]);
                gradients[i] = p - targets[i];
                hessians[i] = p * (1.0 - p);
            }
            let total_g: f64 = gradients.iter().sum();
            let total_h: f64 = hessians.iter().sum();
            let base_objective = total_g * total_g / (total_h + L2_REG);

            let mut best: Option<(f64, Stump)> = None;
            for (j, order) in sorted_orders.iter().enumerate() {
                let mut left_g = 0.0;
                let mut left_h = 0.0;
                for k in 0..n - 1 {
                    let i = order[k];
                    left_g += gradients[i];
                    left_h += hessians[i];

                    let lo = features.rows[order[k]][j];
                    let hi = features.rows[order[k + 1]][j];
                    if lo == hi {
                        continue;
                    }

                    let right_g = total_g - left_g;
                    let right_h = total_h - left_h;
                    let gain = left_g * left_g / (left_h + L2_REG)
                        + right_g * right_g / (right_h + L2_REG)
                        - base_objective;

                    if best.as_ref().map_or(gain > 1e-12, |(g, _)| gain > *g) {
                        best = Some((
                            gain,
                            Stump {
                                feature: j,
                                threshold: (lo + hi) / 2.0,
                                left_value: LEARNING_RATE * (-left_g / (left_h + L2_REG)),
                                right_value: LEARNING_RATE * (-right_g / (right_h + L2_REG)),
                            },
                        ));
                    }
                }
            }

            let Some((gain, stump)) = best else {
                tracing::debug!(round, "no split with positive gain, stopping early");
                break;
            };
            tracing::trace!(round, feature = stump.feature, gain, "added stump");

            for (i, score) in scores.iter_mut().enumerate() {
                *score += stump.apply(features.rows[i][stump.feature]);
            }
            stumps.push(stump);
        }

        tracing::info!(
            rounds = stumps.len(),
            features = features.n_features(),
            rows = n,
            "fitted boosted-stump classifier"
        );

        Ok(Self {
            feature_names: features.feature_names.clone(),
            base_score,
            stumps,
        })
    }

    pub fn n_stumps(&self) -> usize {
        self.stumps.len()
    }

    fn score_row(&self, row: &[f64]) -> f64 {
        let mut score = self.base_score;
        for stump in &self.stumps {
            score += stump.apply(row[stump.feature]);
        }
        score
    }
}

impl Stump {
    fn apply(&self, value: f64) -> f64 {
        if value < self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

impl Classifier for GradientBoostedStumps {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Vec<f64> {
        debug_assert_eq!(features.feature_names, self.feature_names);
        features
            .rows
            .iter()
            .map(|row| sigmoid(self.score_row(row)))
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
