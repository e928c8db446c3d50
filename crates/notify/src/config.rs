//! Email notification configuration.

use serde::{Deserialize, Serialize};

/// Email settings. Notifications are off while `recipients` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// SMTP relay host (STARTTLS)
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_subject() -> String {
    "Pinot consumer lag report".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            subject: default_subject(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

impl EmailConfig {
    pub fn is_enabled(&self) -> bool {
        !self.recipients.is_empty()
    }
}
