//! Shared helpers for lag monitor integration tests.

pub mod mocks;
pub mod stub;
