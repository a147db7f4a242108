//! Aggregation module.
//!
//! This module turns the loaded booking table into dashboard data:
//! - Grouper: polars queries for counting, grouped means, pivots,
//!   five-number summaries and correlation
//! - Views: one function per dashboard view
//! - Pipeline: section assembly in display order

pub mod grouper;
pub mod pipeline;
pub mod views;

pub use pipeline::*;
