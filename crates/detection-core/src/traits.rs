use crate::types::{FeatureMatrix, CLASSIFICATION_THRESHOLD};

/// A trained binary decision capability mapping feature rows to fraud
/// probabilities.
///
/// Implementations are read-only after construction; training and persistence
/// belong to the concrete model type, not this seam.
pub trait Classifier: Send + Sync {
    /// Ordered feature columns the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Fraud probability in [0, 1] for each row of the matrix.
    ///
    /// Rows must already be aligned to `feature_names()`; the risk scorer is
    /// the enforcement point for that invariant.
    fn predict_proba(&self, features: &FeatureMatrix) -> Vec<f64>;

    /// Binary verdicts derived from `predict_proba` at the fixed 0.5 cutoff.
    fn predict(&self, features: &FeatureMatrix) -> Vec<u8> {
        self.predict_proba(features)
            .into_iter()
            .map(|p| u8::from(p > CLASSIFICATION_THRESHOLD))
            .collect()
    }
}
