//! # Hotel EDA - exploratory dashboard over hotel booking records
//!
//! Loads a hotel booking file, derives a few normalized columns, and computes
//! the aggregations behind each chart of an exploratory dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│    Table    │────▶│  Dashboard  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (derived)  │     │ (text/json) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hotel_eda::{build_dashboard, load_bookings, render_text, DashboardOptions, Selections};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = load_bookings("hotel_bookings.csv", None)?;
//!     let dashboard = build_dashboard(&table, &Selections::default(), &DashboardOptions::default())?;
//!     println!("{}", render_text(&dashboard));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Leveled logging to stderr
//! - [`config`] - Environment configuration and dashboard options
//! - [`models`] - Output types (Series, periods, labels, previews)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`table`] - Booking table over a polars `DataFrame`, and derived columns
//! - [`transform`] - Polars grouping queries, views, and dashboard assembly
//! - [`validation`] - Column requirement checks
//! - [`render`] - Terminal and JSON output

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;
pub mod table;

// Aggregation
pub mod transform;

// Column checks
pub mod validation;

// Output
pub mod render;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregationError, AggregationResult, ConfigError, ConfigResult, DashboardError,
    DashboardResult, LoadError, LoadResult,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Config, DashboardOptions};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Cell, CorrelationMatrix, CountryCount, GuestKind, Occupancy, OccupancyRow, PairPlotData,
    Projection, RatePoint, SeasonalRow, Series, YearMonth,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    parse_str, read_frame, ParseResult, MISSING_TOKENS,
};

// =============================================================================
// Re-exports - Table
// =============================================================================

pub use table::{load_bookings, BookingTable, ColumnKind, Field, Origin, SourceInfo};

// =============================================================================
// Re-exports - Views
// =============================================================================

pub use transform::views::{
    cancellation_analysis, cancellation_distribution, cancellation_rate_by_stay,
    channel_distribution, correlation_matrix, geographic_summary, lead_time_by_outcome,
    lead_time_cancellation_curve, occupancy_over_time, preference_preview, rate_by_room_type,
    rate_distribution, repeat_vs_new, seasonal_trend, segment_distribution,
    segmentation_preview, top_nationalities,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_dashboard, build_section, run_view, ChartKind, Dashboard, Section, SectionData,
    Selections, ViewKind,
};

// =============================================================================
// Re-exports - Validation and Output
// =============================================================================

pub use validation::{missing_columns, missing_columns_for, ColumnReport};

pub use render::{render, render_json, render_section_json, render_section_text, render_text, OutputFormat};
