use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{Alert, NotificationChannel, NotificationConfig, NotificationError, SmtpTls};

#[derive(Debug)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    /// Build the transport from config. No connection is made here; delivery
    /// errors surface on `send`.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotificationError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| NotificationError::Config("SMTP_HOST not set".into()))?;
        let from_addr = config
            .smtp_from
            .as_deref()
            .ok_or_else(|| NotificationError::Config("SMTP_FROM_ADDRESS not set".into()))?;

        let from: Mailbox = from_addr
            .parse()
            .map_err(|e| NotificationError::Config(format!("invalid from address: {e}")))?;

        let to: Vec<Mailbox> = config
            .smtp_to
            .iter()
            .filter_map(|addr| addr.parse().ok())
            .collect();

        if to.is_empty() {
            return Err(NotificationError::Config(
                "no valid NOTIFICATION_EMAIL_TO addresses".into(),
            ));
        }

        let mut builder = match config.smtp_tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                host,
            )),
        }
        .map_err(|e| NotificationError::Smtp(format!("SMTP transport error: {e}")))?;

        builder = builder.port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }
}

#[async_trait]
impl NotificationChannel for SmtpNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        for recipient in &self.to {
            let email = Message::builder()
                .from(self.from.clone())
                .to(recipient.clone())
                .subject(&alert.subject)
                .header(ContentType::TEXT_PLAIN)
                .body(alert.body.clone())
                .map_err(|e| NotificationError::Smtp(format!("failed to build email: {e}")))?;

            self.transport
                .send(email)
                .await
                .map_err(|e| NotificationError::Smtp(format!("failed to send email: {e}")))?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
