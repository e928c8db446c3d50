//! SMTP delivery of lag reports.

use std::fmt;

use lag_core::{Error, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::EmailConfig;
use crate::notification::Notification;

pub const SENDER_VAR: &str = "EMAIL_SENDER";
pub const PASSWORD_VAR: &str = "EMAIL_PASSWORD";

/// Sender address and SMTP password.
#[derive(Clone)]
pub struct SmtpCredentials {
    sender: String,
    password: String,
}

impl SmtpCredentials {
    pub fn new(sender: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            password: password.into(),
        }
    }

    /// Reads `EMAIL_SENDER` and `EMAIL_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sender = lookup(SENDER_VAR).filter(|v| !v.is_empty());
        let password = lookup(PASSWORD_VAR).filter(|v| !v.is_empty());

        match (sender, password) {
            (Some(sender), Some(password)) => Ok(Self::new(sender, password)),
            _ => Err(Error::auth_config(format!(
                "{} or {} environment variables are not set",
                SENDER_VAR, PASSWORD_VAR
            ))),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Email channel bound to one SMTP relay.
pub struct EmailChannel {
    from: Mailbox,
    to: Vec<Mailbox>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailChannel {
    /// Validates addresses and prepares the relay. Does not connect.
    pub fn new(config: &EmailConfig, credentials: SmtpCredentials) -> Result<Self> {
        let from: Mailbox = credentials
            .sender
            .parse()
            .map_err(|e| Error::config(format!("invalid sender {}: {}", credentials.sender, e)))?;

        let to = config
            .recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| Error::config(format!("invalid recipient {}: {}", r, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        if to.is_empty() {
            return Err(Error::config("email channel needs at least one recipient"));
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| Error::config(format!("invalid SMTP relay {}: {}", config.smtp_host, e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(credentials.sender, credentials.password))
            .build();

        info!(
            relay = %config.smtp_host,
            port = config.smtp_port,
            recipients = to.len(),
            "Email notifications enabled"
        );

        Ok(Self { from, to, transport })
    }

    #[cfg(test)]
    fn recipients(&self) -> &[Mailbox] {
        &self.to
    }

    /// Builds the message for a notification.
    pub fn build_message(&self, notification: &Notification) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        for to in &self.to {
            builder = builder.to(to.clone());
        }

        builder
            .body(notification.body.clone())
            .map_err(|e| Error::notification(format!("failed to build email: {}", e)))
    }

    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::notification(format!("error while sending email: {}", e)))?;

        Ok(())
    }
}
