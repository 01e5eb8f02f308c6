//! Model Provisioning
//!
//! Load-or-train orchestration: deserialize the cached artifact when one is
//! usable, otherwise train a fresh classifier from the reference dataset and
//! persist it for the next cold start.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dataset::TransactionTable;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use detection_core::{Classifier, FraudError, FraudResult, LABEL_COLUMN};

use crate::artifact::ModelArtifact;
use crate::classifier::GradientBoostedStumps;
use crate::metrics::{evaluate, EvalReport};
use crate::split::{subset, train_test_split, HELD_OUT_FRACTION, SPLIT_SEED};

/// Well-known location of the reference training data, relative to the
/// working directory.
pub const DEFAULT_REFERENCE_DATA_PATH: &str = "data/creditcard.csv";

/// Load-or-train entry point with injectable storage paths.
///
/// Construct one per process and provision once; the returned [`Provisioned`]
/// handle is read-only and shared by reference from then on.
#[derive(Debug, Clone)]
pub struct Provisioner {
    artifact_path: PathBuf,
    reference_data_path: PathBuf,
}

/// A ready classifier plus where it came from.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub classifier: GradientBoostedStumps,
    /// True when the training labels were fabricated (reference data had no
    /// label column). Scores from such a model carry no signal.
    pub labels_synthesized: bool,
    pub source: ModelSource,
}

#[derive(Debug, Clone)]
pub enum ModelSource {
    Loaded { trained_at: DateTime<Utc> },
    Trained(TrainingReport),
}

/// Facts about a fresh training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub rows_total: usize,
    pub rows_train: usize,
    pub eval: EvalReport,
    pub trained_at: DateTime<Utc>,
}

impl Provisioner {
    pub fn new(artifact_path: impl Into<PathBuf>, reference_data_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            reference_data_path: reference_data_path.into(),
        }
    }

    /// Load the cached artifact if one is usable, otherwise train fresh.
    ///
    /// A missing or corrupt artifact is not an error: both fall through to
    /// the train transition. Only an unusable reference dataset is fatal.
    pub fn provision(&self) -> FraudResult<Provisioned> {
        if self.artifact_path.exists() {
            match ModelArtifact::load(&self.artifact_path) {
                Ok(artifact) => {
                    tracing::info!(
                        path = %self.artifact_path.display(),
                        "loaded cached model artifact"
                    );
                    if artifact.labels_synthesized {
                        tracing::warn!(
                            "cached model was trained on synthesized labels, scores carry no signal"
                        );
                    }
                    return Ok(Provisioned {
                        classifier: artifact.model,
                        labels_synthesized: artifact.labels_synthesized,
                        source: ModelSource::Loaded {
                            trained_at: artifact.trained_at,
                        },
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cached model artifact unusable, retraining");
                }
            }
        }
        self.train_fresh()
    }

    /// Train transition: read reference data, fit, evaluate, persist.
    pub fn train_fresh(&self) -> FraudResult<Provisioned> {
        let table = TransactionTable::from_path(&self.reference_data_path).map_err(|e| {
            FraudError::ModelProvisioning(format!(
                "reference data {}: {e}",
                self.reference_data_path.display()
            ))
        })?;

        let (labels, labels_synthesized) = match table.labels() {
            Some(labels) => (labels, false),
            None => {
                tracing::warn!(
                    rows = table.n_rows(),
                    "reference data has no label column, synthesizing random labels; \
                     the resulting model will not be predictive"
                );
                (synthesize_labels(table.n_rows(), SPLIT_SEED), true)
            }
        };

        let features = table.feature_matrix(LABEL_COLUMN).map_err(|e| {
            FraudError::ModelProvisioning(format!(
                "reference data {}: {e}",
                self.reference_data_path.display()
            ))
        })?;

        let split = train_test_split(features.n_rows(), HELD_OUT_FRACTION, SPLIT_SEED);
        let (train_features, train_labels) = subset(&features, &labels, &split.train);
        let (held_features, held_labels) = subset(&features, &labels, &split.held_out);

        let classifier = GradientBoostedStumps::fit(&train_features, &train_labels)?;

        let probabilities = classifier.predict_proba(&held_features);
        let predictions = classifier.predict(&held_features);
        let eval = evaluate(&probabilities, &predictions, &held_labels);
        tracing::info!(
            accuracy = eval.accuracy,
            roc_auc = eval.roc_auc,
            held_out = eval.held_out_rows,
            "evaluated freshly trained model"
        );

        let trained_at = Utc::now();
        let artifact = ModelArtifact {
            model: classifier.clone(),
            labels_synthesized,
            trained_at,
        };
        artifact.save(&self.artifact_path)?;

        Ok(Provisioned {
            classifier,
            labels_synthesized,
            source: ModelSource::Trained(TrainingReport {
                rows_total: features.n_rows(),
                rows_train: split.train.len(),
                eval,
                trained_at,
            }),
        })
    }
}

/// Uniformly random binary labels for label-less reference data. Seeded so
/// repeated cold starts produce the same (non-predictive) model.
fn synthesize_labels(n_rows: usize, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_rows).map(|_| u8::from(rng.gen_bool(0.5))).collect()
}
