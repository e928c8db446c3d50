//! Core types and lag aggregation for the real-time table lag monitor.

pub mod auth;
pub mod cluster;
pub mod coerce;
pub mod error;
pub mod lag;
pub mod report;
pub mod segments;

pub use auth::*;
pub use cluster::*;
pub use coerce::parse_lag;
pub use error::{Error, Result};
pub use lag::*;
pub use report::*;
pub use segments::*;
