//! Domain models for the booking dashboard.
//!
//! - [`Series`] - labelled one-dimensional result (value counts, group means)
//! - [`YearMonth`] - month-level arrival period
//! - [`Occupancy`] / [`GuestKind`] - derived booking labels
//! - [`Cell`] / [`Projection`] - row-wise previews of selected columns
//! - [`CorrelationMatrix`], [`SeasonalRow`], [`OccupancyRow`], [`CountryCount`],
//!   [`RatePoint`] - shaped outputs of individual views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Column Names
// =============================================================================

/// Column names of the hotel booking dataset used by the views.
pub mod columns {
    pub const IS_CANCELED: &str = "is_canceled";
    pub const LEAD_TIME: &str = "lead_time";
    pub const ARRIVAL_DATE_YEAR: &str = "arrival_date_year";
    pub const ARRIVAL_DATE_MONTH: &str = "arrival_date_month";
    pub const ARRIVAL_DATE_WEEK_NUMBER: &str = "arrival_date_week_number";
    pub const STAYS_IN_WEEKEND_NIGHTS: &str = "stays_in_weekend_nights";
    pub const STAYS_IN_WEEK_NIGHTS: &str = "stays_in_week_nights";
    pub const ADULTS: &str = "adults";
    pub const CHILDREN: &str = "children";
    pub const BABIES: &str = "babies";
    pub const MEAL: &str = "meal";
    pub const COUNTRY: &str = "country";
    pub const MARKET_SEGMENT: &str = "market_segment";
    pub const DISTRIBUTION_CHANNEL: &str = "distribution_channel";
    pub const PREVIOUS_CANCELLATIONS: &str = "previous_cancellations";
    pub const RESERVED_ROOM_TYPE: &str = "reserved_room_type";
    pub const ADR: &str = "adr";

    // Derived during normalization
    pub const ARRIVAL_DATE: &str = "arrival_date";
    pub const TOTAL_STAY_NIGHTS: &str = "total_stay_nights";
    pub const OCCUPIED: &str = "occupied";
}

// =============================================================================
// Series
// =============================================================================

/// A labelled one-dimensional result: an index of keys and one value per key.
///
/// Order is meaningful: value counts are sorted by count descending, group-by
/// results by key ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<K, V> {
    /// Name of the index (the grouping column)
    pub index_name: String,
    /// Name of the values
    pub name: String,
    pub index: Vec<K>,
    pub values: Vec<V>,
}

impl<K: PartialEq, V> Series<K, V> {
    pub fn new(index_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            name: name.into(),
            index: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a series from `(key, value)` pairs, keeping their order.
    pub fn from_pairs(
        index_name: impl Into<String>,
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let mut series = Self::new(index_name, name);
        for (k, v) in pairs {
            series.push(k, v);
        }
        series
    }

    pub fn push(&mut self, key: K, value: V) {
        self.index.push(key);
        self.values.push(value);
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.index.iter().zip(self.values.iter())
    }

    /// Keep the first `n` entries.
    pub fn head(mut self, n: usize) -> Self {
        self.index.truncate(n);
        self.values.truncate(n);
        self
    }
}

impl<K: PartialEq> Series<K, u64> {
    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

// =============================================================================
// Periods and Labels
// =============================================================================

/// A calendar month, the period used by the seasonal trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl From<YearMonth> for String {
    fn from(p: YearMonth) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| format!("bad year in '{}'", s))?;
        let month: u32 = month.parse().map_err(|_| format!("bad month in '{}'", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in '{}'", s));
        }
        Ok(Self { year, month })
    }
}

/// Whether a booking turned into a stay: `Occupied` when `is_canceled` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    Canceled,
    Occupied,
}

impl Occupancy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Canceled => "Canceled",
            Self::Occupied => "Occupied",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Canceled" => Some(Self::Canceled),
            "Occupied" => Some(Self::Occupied),
            _ => None,
        }
    }
}

/// Guest classification by cancellation history: `Repeat` when the guest
/// canceled before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuestKind {
    New,
    Repeat,
}

impl GuestKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Repeat => "Repeat",
        }
    }
}

impl fmt::Display for GuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Cells and Projections
// =============================================================================

/// A single table value, as shown in previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) if v.is_nan() => Ok(()),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Selected columns of the table, row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Data for a pairwise scatter plot colored by a target column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPlotData {
    pub features: Vec<String>,
    pub hue: String,
    /// Distinct hue values, ascending
    pub hue_values: Vec<String>,
    /// `means[i][j]`: mean of `features[i]` where the hue is `hue_values[j]`
    pub means: Vec<Vec<f64>>,
    pub data: Projection,
}

// =============================================================================
// View Outputs
// =============================================================================

/// Pearson correlation between every pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` x `columns.len()`
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.values[i][j])
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Bookings arriving in one month, split by outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRow {
    pub period: YearMonth,
    #[serde(rename = "Not Canceled")]
    pub not_canceled: u64,
    #[serde(rename = "Canceled")]
    pub canceled: u64,
}

impl SeasonalRow {
    pub fn total(&self) -> u64 {
        self.not_canceled + self.canceled
    }
}

/// Bookings arriving on one date, split by occupancy label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyRow {
    pub arrival_date: NaiveDate,
    #[serde(rename = "Canceled")]
    pub canceled: u64,
    #[serde(rename = "Occupied")]
    pub occupied: u64,
}

/// One row of the choropleth input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

/// One booking's room type and daily rate, for a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub reserved_room_type: Option<String>,
    pub adr: f64,
}

// =============================================================================
// Tests
// =============================================================================
