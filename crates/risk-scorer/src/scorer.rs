use detection_core::{
    Classifier, FeatureMatrix, FraudError, FraudResult, ScoredRecord, AMOUNT_COLUMN,
    CLASSIFICATION_THRESHOLD,
};

/// Everything one scoring pass produced.
///
/// `alert_candidates` is the subset of `records` strictly above the alert
/// threshold, precomputed here so that notification can run (and fail)
/// independently of scoring.
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub records: Vec<ScoredRecord>,
    pub alert_candidates: Vec<ScoredRecord>,
    pub alert_threshold: f64,
}

/// Applies a ready classifier to feature matrices. Stateless apart from the
/// borrowed model; deterministic for a fixed model and input.
pub struct RiskScorer<'a> {
    classifier: &'a dyn Classifier,
    alert_threshold: f64,
}

impl<'a> RiskScorer<'a> {
    pub fn new(classifier: &'a dyn Classifier) -> Self {
        Self::with_alert_threshold(classifier, detection_core::DEFAULT_ALERT_THRESHOLD)
    }

    pub fn with_alert_threshold(classifier: &'a dyn Classifier, alert_threshold: f64) -> Self {
        Self {
            classifier,
            alert_threshold,
        }
    }

    /// Score a batch: one record per input row, row identifiers 1-based.
    ///
    /// The matrix must carry exactly the columns the model was trained on;
    /// column order is normalized here, so callers may pass upload order.
    pub fn score(&self, features: &FeatureMatrix) -> FraudResult<ScoringOutcome> {
        let normalized = self.normalize_columns(features)?;
        let features = normalized.as_ref().unwrap_or(features);

        let amount_index = features.column_index(AMOUNT_COLUMN);
        let probabilities = self.classifier.predict_proba(features);

        let records: Vec<ScoredRecord> = probabilities
            .into_iter()
            .enumerate()
            .map(|(i, probability)| ScoredRecord {
                row: i + 1,
                amount: amount_index.map(|j| features.rows[i][j]),
                fraud_probability: probability,
                fraud_prediction: u8::from(probability > CLASSIFICATION_THRESHOLD),
            })
            .collect();

        let alert_candidates: Vec<ScoredRecord> = records
            .iter()
            .filter(|r| r.is_alert_worthy(self.alert_threshold))
            .cloned()
            .collect();

        tracing::info!(
            rows = records.len(),
            flagged = records.iter().filter(|r| r.fraud_prediction == 1).count(),
            high_risk = alert_candidates.len(),
            "scored batch"
        );

        Ok(ScoringOutcome {
            records,
            alert_candidates,
            alert_threshold: self.alert_threshold,
        })
    }

    /// Manual-entry path: batch scoring with exactly one row.
    pub fn score_record(&self, features: &FeatureMatrix) -> FraudResult<ScoredRecord> {
        if features.n_rows() != 1 {
            return Err(FraudError::MalformedInput(format!(
                "single-record scoring got {} rows",
                features.n_rows()
            )));
        }
        let outcome = self.score(features)?;
        let record = outcome.records.into_iter().next();
        // score() returns one record per row, and n_rows == 1 was checked.
        record.ok_or_else(|| FraudError::MalformedInput("scoring produced no record".into()))
    }

    /// Require column-set equality with the training schema; reorder the
    /// matrix into training order when the sets match but the order differs.
    fn normalize_columns(&self, features: &FeatureMatrix) -> FraudResult<Option<FeatureMatrix>> {
        let trained = self.classifier.feature_names();
        if features.feature_names == trained {
            return Ok(None);
        }

        let missing: Vec<&str> = trained
            .iter()
            .filter(|n| features.column_index(n).is_none())
            .map(|n| n.as_str())
            .collect();
        let unexpected: Vec<&str> = features
            .feature_names
            .iter()
            .filter(|n| !trained.contains(n))
            .map(|n| n.as_str())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(FraudError::FeatureSchemaMismatch(format!(
                "model expects columns [{}]; missing [{}], unexpected [{}]",
                trained.join(", "),
                missing.join(", "),
                unexpected.join(", ")
            )));
        }

        // Same set, different order.
        let mapping: Vec<usize> = trained
            .iter()
            .filter_map(|n| features.column_index(n))
            .collect();
        let rows = features
            .rows
            .iter()
            .map(|row| mapping.iter().map(|&j| row[j]).collect())
            .collect();
        tracing::debug!("reordered upload columns into training order");
        Ok(Some(FeatureMatrix::new(trained.to_vec(), rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed per-row probabilities, ignoring feature values.
    struct ScriptedModel {
        names: Vec<String>,
        probabilities: Vec<f64>,
    }

    impl ScriptedModel {
        fn new(names: &[&str], probabilities: &[f64]) -> Self {
            Self {
                names: names.iter().map(|s| s.to_string()).collect(),
                probabilities: probabilities.to_vec(),
            }
        }
    }

    impl Classifier for ScriptedModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Vec<f64> {
            self.probabilities[..features.n_rows()].to_vec()
        }
    }

    /// Probability equals the first feature value; exposes column order.
    struct FirstColumnModel {
        names: Vec<String>,
    }

    impl Classifier for FirstColumnModel {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict_proba(&self, features: &FeatureMatrix) -> Vec<f64> {
            features.rows.iter().map(|r| r[0]).collect()
        }
    }

    fn matrix(names: &[&str], rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::new(names.iter().map(|s| s.to_string()).collect(), rows)
    }

    #[test]
    fn batch_of_three_with_two_high_risk() {
        let model = ScriptedModel::new(&["Time", "Amount"], &[0.95, 0.3, 0.91]);
        let features = matrix(
            &["Time", "Amount"],
            vec![vec![0.0, 120.0], vec![1.0, 8.5], vec![2.0, 999.0]],
        );

        let outcome = RiskScorer::new(&model).score(&features).unwrap();

        let predictions: Vec<u8> = outcome.records.iter().map(|r| r.fraud_prediction).collect();
        assert_eq!(predictions, vec![1, 0, 1]);

        let candidate_rows: Vec<usize> = outcome.alert_candidates.iter().map(|r| r.row).collect();
        assert_eq!(candidate_rows, vec![1, 3]);
        assert_eq!(outcome.alert_candidates[0].amount, Some(120.0));
        assert_eq!(outcome.alert_candidates[1].amount, Some(999.0));
    }

    #[test]
    fn half_probability_classifies_as_legitimate() {
        let model = ScriptedModel::new(&["Amount"], &[0.5, 0.500001]);
        let features = matrix(&["Amount"], vec![vec![1.0], vec![2.0]]);

        let outcome = RiskScorer::new(&model).score(&features).unwrap();
        assert_eq!(outcome.records[0].fraud_prediction, 0);
        assert_eq!(outcome.records[1].fraud_prediction, 1);
    }

    #[test]
    fn alert_cutoff_is_strict_and_distinct_from_classification() {
        let model = ScriptedModel::new(&["Amount"], &[0.9, 0.9000001, 0.6]);
        let features = matrix(&["Amount"], vec![vec![1.0], vec![2.0], vec![3.0]]);

        let outcome = RiskScorer::new(&model).score(&features).unwrap();
        // All three are flagged as fraud, only one is alert-worthy.
        assert!(outcome.records.iter().all(|r| r.fraud_prediction == 1));
        assert_eq!(outcome.alert_candidates.len(), 1);
        assert_eq!(outcome.alert_candidates[0].row, 2);
    }

    #[test]
    fn missing_training_column_is_schema_mismatch() {
        let model = ScriptedModel::new(&["A", "B", "C"], &[0.1]);
        let features = matrix(&["A", "B"], vec![vec![1.0, 2.0]]);

        let err = RiskScorer::new(&model).score(&features).unwrap_err();
        assert!(matches!(err, FraudError::FeatureSchemaMismatch(_)));
        assert!(err.to_string().contains('C'));
    }

    #[test]
    fn unexpected_upload_column_is_schema_mismatch() {
        let model = ScriptedModel::new(&["A", "B"], &[0.1]);
        let features = matrix(&["A", "B", "D"], vec![vec![1.0, 2.0, 3.0]]);

        let err = RiskScorer::new(&model).score(&features).unwrap_err();
        assert!(matches!(err, FraudError::FeatureSchemaMismatch(_)));
        assert!(err.to_string().contains('D'));
    }

    #[test]
    fn upload_column_order_is_normalized() {
        let model = FirstColumnModel {
            names: vec!["A".to_string(), "B".to_string()],
        };
        // Upload order swapped: B first. The value of A is 0.7.
        let features = matrix(&["B", "A"], vec![vec![0.2, 0.7]]);

        let outcome = RiskScorer::new(&model).score(&features).unwrap();
        assert_eq!(outcome.records[0].fraud_probability, 0.7);
    }

    #[test]
    fn missing_amount_column_leaves_amount_unset() {
        let model = ScriptedModel::new(&["Time", "V1"], &[0.4]);
        let features = matrix(&["Time", "V1"], vec![vec![0.0, -1.3]]);

        let outcome = RiskScorer::new(&model).score(&features).unwrap();
        assert_eq!(outcome.records[0].amount, None);
    }

    #[test]
    fn single_record_scoring_requires_one_row() {
        let model = ScriptedModel::new(&["Amount"], &[0.97]);

        let one = matrix(&["Amount"], vec![vec![840.0]]);
        let record = RiskScorer::new(&model).score_record(&one).unwrap();
        assert_eq!(record.row, 1);
        assert_eq!(record.fraud_prediction, 1);
        assert_eq!(record.amount, Some(840.0));

        let two = matrix(&["Amount"], vec![vec![1.0], vec![2.0]]);
        let err = RiskScorer::new(&model).score_record(&two).unwrap_err();
        assert!(matches!(err, FraudError::MalformedInput(_)));
    }

    #[test]
    fn zero_rows_is_a_degenerate_success() {
        let model = ScriptedModel::new(&["Amount"], &[]);
        let features = matrix(&["Amount"], vec![]);

        let outcome = RiskScorer::new(&model).score(&features).unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.alert_candidates.is_empty());
    }
}
