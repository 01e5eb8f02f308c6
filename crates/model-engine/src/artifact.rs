use std::path::Path;

use chrono::{DateTime, Utc};
use detection_core::{FraudError, FraudResult};
use serde::{Deserialize, Serialize};

use crate::classifier::GradientBoostedStumps;

/// Well-known location of the persisted model, relative to the working
/// directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "model/fraud_model.json";

/// The serialized classifier plus the training facts a later process needs
/// to judge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: GradientBoostedStumps,
    /// True when the training labels were fabricated because the reference
    /// data had no label column. Such a model predicts noise.
    pub labels_synthesized: bool,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Deserialize an artifact. Any failure (unreadable file, bad JSON) is an
    /// error here; the provisioner decides whether to fall back to training.
    pub fn load<P: AsRef<Path>>(path: P) -> FraudResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FraudError::Io(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw).map_err(|e| {
            FraudError::ModelProvisioning(format!(
                "corrupt model artifact {}: {e}",
                path.display()
            ))
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> FraudResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FraudError::Io(format!("{}: {e}", parent.display())))?;
            }
        }
        let raw = serde_json::to_string_pretty(self).map_err(|e| {
            FraudError::ModelProvisioning(format!("serializing model artifact: {e}"))
        })?;
        std::fs::write(path, raw)
            .map_err(|e| FraudError::Io(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "persisted model artifact");
        Ok(())
    }
}
