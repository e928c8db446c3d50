//! Cluster controller REST client.
//!
//! Two read-only endpoints are used:
//! - `GET /tables?type=realtime` for table discovery
//! - `GET /tables/{table}/consumingSegmentsInfo` for per-partition lag

pub mod client;
pub mod config;

pub use client::*;
pub use config::*;
