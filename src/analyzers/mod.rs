//! Criteria normalization.
//!
//! This module resolves each leaf metric of the weighted criteria tree
//! across the merged hospital collection and attaches the population mean
//! and sample standard deviation that downstream scoring normalizes with.

pub mod analyzer;
pub mod distribution;
pub mod resolve;
pub mod types;
pub mod utility;
