use thiserror::Error;

#[derive(Error, Debug)]
pub enum FraudError {
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("No usable feature columns: {0}")]
    NoUsableFeatures(String),

    #[error("Feature schema mismatch: {0}")]
    FeatureSchemaMismatch(String),

    #[error("Model provisioning failed: {0}")]
    ModelProvisioning(String),

    #[error("Alert delivery failed: {0}")]
    AlertDelivery(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub type FraudResult<T> = Result<T, FraudError>;
