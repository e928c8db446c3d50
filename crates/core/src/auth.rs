//! Controller credentials.
//!
//! Read from the environment once at startup and handed to the controller
//! client as a value. Nothing below the binary touches the environment.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

pub const USERNAME_VAR: &str = "PINOT_USERNAME";
pub const PASSWORD_VAR: &str = "PINOT_PASSWORD";

/// Basic auth credentials for the cluster controllers.
#[derive(Clone, PartialEq, Eq)]
pub struct ControllerCredentials {
    username: String,
    password: String,
}

impl ControllerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads `PINOT_USERNAME` and `PINOT_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from an arbitrary variable lookup.
    ///
    /// Unset and empty values are both rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR).filter(|v| !v.is_empty());
        let password = lookup(PASSWORD_VAR).filter(|v| !v.is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self::new(username, password)),
            _ => Err(Error::auth_config(format!(
                "{} or {} environment variables are not set",
                USERNAME_VAR, PASSWORD_VAR
            ))),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for ControllerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
