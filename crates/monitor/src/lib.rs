//! Cluster orchestration for the lag monitor.
//!
//! - Pass (discovery → fetch → aggregate for every cluster, sequentially)
//! - Scheduler (single run or fixed interval, report output, notifications)

pub mod pass;
pub mod scheduler;

pub use pass::*;
pub use scheduler::*;
