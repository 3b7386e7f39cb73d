//! Capacity-aware reviewer allocation: intake, scoring, allocation, and
//! reporting for conference paper review.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
