//! Report notifications fanned out over configured channels.

use lag_core::{LagReport, Result};
use serde::Serialize;
use tracing::{error, info};

use crate::email::EmailChannel;

/// A rendered lag report ready for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub lagging_tables: usize,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, lagging_tables: usize) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            lagging_tables,
        }
    }

    /// Builds a notification from a report, or `None` if nothing is lagging.
    pub fn from_report(report: &LagReport, subject: &str) -> Option<Self> {
        let lagging_tables = report.lagging().count();
        if lagging_tables == 0 {
            return None;
        }
        Some(Self::new(subject, report.render(), lagging_tables))
    }
}

/// Notification channel.
pub enum NotificationChannel {
    /// Log only (default)
    Log,
    Email(Box<EmailChannel>),
}

impl NotificationChannel {
    fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Email(_) => "email",
        }
    }
}

/// Delivers notifications to every channel.
pub struct NotificationWorker {
    channels: Vec<NotificationChannel>,
}

impl Default for NotificationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationWorker {
    pub fn new() -> Self {
        Self {
            channels: vec![NotificationChannel::Log],
        }
    }

    pub fn with_channel(mut self, channel: NotificationChannel) -> Self {
        self.channels.push(channel);
        self
    }

    #[cfg(test)]
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sends to all channels. A failing channel does not stop the others;
    /// the first failure is returned after every channel was tried.
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let mut first_error = None;

        for channel in &self.channels {
            let result = match channel {
                NotificationChannel::Log => {
                    info!(
                        subject = %notification.subject,
                        lagging_tables = notification.lagging_tables,
                        "Lag notification"
                    );
                    Ok(())
                }
                NotificationChannel::Email(email) => email.send(notification).await,
            };

            if let Err(e) = result {
                error!(channel = channel.name(), error = %e, "Notification delivery failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
