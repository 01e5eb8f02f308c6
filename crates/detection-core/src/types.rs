use serde::{Deserialize, Serialize};

/// Column name carrying the transaction amount in the CSV convention.
pub const AMOUNT_COLUMN: &str = "Amount";

/// Column name carrying the binary ground-truth label (0 = legitimate,
/// 1 = fraudulent).
pub const LABEL_COLUMN: &str = "Class";

/// Column appended on export with the model's fraud likelihood.
pub const PROBABILITY_COLUMN: &str = "Fraud_Probability";

/// Column appended on export with the binary fraud verdict.
pub const PREDICTION_COLUMN: &str = "Fraud_Prediction";

/// Fixed probability cutoff separating fraud verdicts from legitimate ones.
/// Exactly 0.5 classifies as legitimate.
pub const CLASSIFICATION_THRESHOLD: f64 = 0.5;

/// Default cutoff above which a scored record is considered alert-worthy.
/// Stricter than [`CLASSIFICATION_THRESHOLD`]; a record can be flagged as
/// fraud without clearing it.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.9;

/// Numeric, label-free projection of a transaction table used as model input.
///
/// Row-major: `rows[i][j]` is the value of `feature_names[j]` for row `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == feature_names.len()));
        Self {
            feature_names,
            rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Position of a feature column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

/// A transaction row augmented with the model's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// 1-based position within the scored batch.
    pub row: usize,
    /// Transaction amount, when the upload carried an `Amount` column.
    pub amount: Option<f64>,
    /// Model-estimated fraud likelihood in [0, 1].
    pub fraud_probability: f64,
    /// Binary verdict: 1 when the probability exceeds
    /// [`CLASSIFICATION_THRESHOLD`].
    pub fraud_prediction: u8,
}

impl ScoredRecord {
    /// Whether this record clears the given alert cutoff (strictly above).
    pub fn is_alert_worthy(&self, threshold: f64) -> bool {
        self.fraud_probability > threshold
    }
}
