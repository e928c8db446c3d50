//! Lag report notifications.
//!
//! The log channel is always on; email is added when recipients are
//! configured.

pub mod config;
pub mod email;
pub mod notification;

pub use config::*;
pub use email::{EmailChannel, SmtpCredentials};
pub use notification::*;
