//! Risk Scorer
//!
//! Applies a provisioned classifier to uploaded feature matrices, producing
//! per-row fraud probabilities, binary verdicts, and the high-risk subset
//! handed to the alert dispatcher.

pub mod scorer;

pub use scorer::{RiskScorer, ScoringOutcome};
