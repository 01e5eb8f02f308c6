mod smtp;
mod templates;

pub use smtp::SmtpNotifier;
pub use templates::{render_body, render_subject};

use async_trait::async_trait;
use detection_core::{FraudError, ScoredRecord};
use serde::{Deserialize, Serialize};

/// A fraud alert ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub subject: String,
    pub body: String,
    pub high_risk_count: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Alert {
    /// Build the outbound alert for a non-empty high-risk subset.
    ///
    /// Subject carries the record count; the body is one deterministic line
    /// per record. The caller guarantees `records` cleared the threshold.
    pub fn high_risk(records: &[ScoredRecord], threshold: f64) -> Self {
        Self {
            subject: render_subject(records.len()),
            body: render_body(records, threshold),
            high_risk_count: records.len(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Webhook error: {0}")]
    Webhook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_to: Vec<String>,
    pub smtp_tls: SmtpTls,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let smtp_to = std::env::var("NOTIFICATION_EMAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let smtp_tls = match std::env::var("SMTP_TLS").unwrap_or_default().as_str() {
            "tls" => SmtpTls::Tls,
            "none" => SmtpTls::None,
            _ => SmtpTls::StartTls,
        };

        Self {
            smtp_host: std::env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME")
                .ok()
                .filter(|s| !s.is_empty()),
            smtp_password: std::env::var("SMTP_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            smtp_from: std::env::var("SMTP_FROM_ADDRESS")
                .ok()
                .filter(|s| !s.is_empty()),
            smtp_to,
            smtp_tls,
            webhook_url: std::env::var("ALERT_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some() && self.smtp_from.is_some() && !self.smtp_to.is_empty()
    }
}

/// What a dispatch attempt came to. Delivery failure is a reported outcome,
/// never an error: scoring results must survive a dead mail server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// No record cleared the threshold; nothing was sent.
    Skipped,
    /// At least one channel accepted the alert.
    Sent { high_risk: usize },
    /// Every channel failed (or none is configured).
    Failed { high_risk: usize, reason: String },
}

/// Dispatches high-risk alerts to all configured channels.
pub struct AlertDispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl AlertDispatcher {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if config.smtp_configured() {
            match SmtpNotifier::new(config) {
                Ok(notifier) => {
                    tracing::info!(
                        recipients = config.smtp_to.len(),
                        "email alerts enabled"
                    );
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to initialize SMTP notifier");
                }
            }
        }

        if let Some(ref webhook_url) = config.webhook_url {
            channels.push(Box::new(WebhookNotifier {
                webhook_url: webhook_url.clone(),
                client: reqwest::Client::new(),
            }));
            tracing::info!("webhook alerts enabled");
        }

        if channels.is_empty() {
            tracing::info!(
                "no notification channels configured (set SMTP_HOST or ALERT_WEBHOOK_URL)"
            );
        }

        Self { channels }
    }

    /// Test seam: inject channels directly.
    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Send one alert covering the given high-risk records.
    ///
    /// An empty subset is a documented no-op. Channel failures are logged and
    /// folded into the outcome; this method never returns an error.
    pub async fn dispatch(&self, high_risk: &[ScoredRecord], threshold: f64) -> AlertOutcome {
        if high_risk.is_empty() {
            tracing::debug!("no records above alert threshold, no alert sent");
            return AlertOutcome::Skipped;
        }

        let alert = Alert::high_risk(high_risk, threshold);
        if self.channels.is_empty() {
            tracing::warn!(
                high_risk = alert.high_risk_count,
                "alert suppressed, no notification channels configured"
            );
            return AlertOutcome::Failed {
                high_risk: alert.high_risk_count,
                reason: "no notification channels configured".into(),
            };
        }

        let mut delivered = 0usize;
        let mut failures = Vec::new();
        for channel in &self.channels {
            match channel.send(&alert).await {
                Ok(()) => {
                    tracing::debug!(channel = channel.name(), "alert delivered");
                    delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(channel = channel.name(), error = %e, "alert delivery failed");
                    failures.push(format!("{}: {e}", channel.name()));
                }
            }
        }

        if delivered > 0 {
            tracing::info!(
                high_risk = alert.high_risk_count,
                channels = delivered,
                "high-risk alert sent"
            );
            AlertOutcome::Sent {
                high_risk: alert.high_risk_count,
            }
        } else {
            let err = FraudError::AlertDelivery(failures.join("; "));
            tracing::warn!(error = %err, "alert delivery failed on every channel");
            AlertOutcome::Failed {
                high_risk: alert.high_risk_count,
                reason: err.to_string(),
            }
        }
    }
}

/// Generic JSON webhook notifier.
struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        let payload = serde_json::json!({
            "subject": alert.subject,
            "body": alert.body,
            "high_risk_count": alert.high_risk_count,
            "timestamp": alert.timestamp.to_rfc3339(),
        });

        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| NotificationError::Webhook(e.to_string()))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
