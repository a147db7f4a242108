//! In-memory booking table on a polars [`DataFrame`].
//!
//! The table is read once, normalized (derived columns added, see
//! [`derive`]), then shared read-only behind an [`Arc`]. There is no mutation
//! API after construction; views run lazy queries over a cheap clone of the
//! frame.
//!
//! # Typing
//!
//! ```text
//! every non-missing cell parses as i64       → Int   (missing = null)
//! every non-missing cell parses as f64       → Float (missing = null)
//! true / false                               → Bool
//! anything else                              → Text
//! no data rows at all                        → Text
//! produced by normalization only             → Date
//! ```

pub mod derive;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::{DataFrame, DataType, IntoLazy, LazyFrame, PolarsResult, Series};
use serde::Serialize;

use crate::error::{AggregationError, AggregationResult, LoadError, LoadResult};
use crate::logs::{log_info, log_success};
use crate::parser::{parse_file_auto, read_frame, ParseResult};

// =============================================================================
// Columns
// =============================================================================

/// Kind of values a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
    Date,
}

impl ColumnKind {
    /// Kind of a polars data type. Anything without a dedicated kind reads as
    /// text.
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Boolean => ColumnKind::Bool,
            DataType::Date => ColumnKind::Date,
            d if d.is_integer() => ColumnKind::Int,
            d if d.is_float() => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Int | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Int => "int",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "text",
            ColumnKind::Date => "date",
        })
    }
}

/// Where a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Read from the input file
    Source,
    /// Added by normalization
    Derived,
}

/// Name, origin and kind of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub origin: Origin,
    pub kind: ColumnKind,
}

/// Where the table was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
}

// =============================================================================
// Table
// =============================================================================

/// The loaded, normalized booking table.
#[derive(Debug, Clone)]
pub struct BookingTable {
    frame: DataFrame,
    derived: Vec<String>,
    source: SourceInfo,
}

impl BookingTable {
    /// Build a table from an in-memory frame and normalize it.
    pub fn from_frame(frame: DataFrame) -> LoadResult<Self> {
        Self::assemble(frame, SourceInfo::default())
    }

    /// Read checked text into a frame and normalize it.
    pub fn from_parsed(parsed: ParseResult) -> LoadResult<Self> {
        let frame = read_frame(&parsed)?;
        Self::assemble(
            frame,
            SourceInfo {
                encoding: parsed.encoding,
                delimiter: parsed.delimiter,
            },
        )
    }

    fn assemble(frame: DataFrame, source: SourceInfo) -> LoadResult<Self> {
        if frame.width() == 0 {
            return Err(LoadError::NoHeaders);
        }

        // Nothing to infer a type from
        let frame = if frame.height() == 0 {
            as_text(&frame)?
        } else {
            frame
        };

        let (frame, derived) = derive::add_derived_columns(frame)?;
        Ok(Self {
            frame,
            derived: derived.into_iter().map(str::to_string).collect(),
            source,
        })
    }

    /// Number of booking records.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// The underlying frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// A lazy query over the whole table.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame.get_column_names()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn origin(&self, name: &str) -> Origin {
        if self.derived.iter().any(|d| d == name) {
            Origin::Derived
        } else {
            Origin::Source
        }
    }

    /// Every column in frame order.
    pub fn fields(&self) -> Vec<Field> {
        self.frame
            .get_columns()
            .iter()
            .map(|s| Field {
                name: s.name().to_string(),
                origin: self.origin(s.name()),
                kind: ColumnKind::of(s.dtype()),
            })
            .collect()
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> AggregationResult<&Series> {
        self.frame
            .column(name)
            .map_err(|_| AggregationError::MissingColumn(name.to_string()))
    }

    pub fn kind(&self, name: &str) -> AggregationResult<ColumnKind> {
        Ok(ColumnKind::of(self.column(name)?.dtype()))
    }

    // -------------------------------------------------------------------------
    // Type checks. An empty table passes every check.
    // -------------------------------------------------------------------------

    fn require(
        &self,
        name: &str,
        expected: &'static str,
        accepts: impl Fn(ColumnKind) -> bool,
    ) -> AggregationResult<ColumnKind> {
        let kind = self.kind(name)?;
        if accepts(kind) || self.is_empty() {
            Ok(kind)
        } else {
            Err(AggregationError::ColumnType {
                column: name.to_string(),
                expected,
                found: kind,
            })
        }
    }

    pub fn require_numeric(&self, name: &str) -> AggregationResult<()> {
        self.require(name, "numeric", |k| k.is_numeric()).map(|_| ())
    }

    pub fn require_text(&self, name: &str) -> AggregationResult<()> {
        self.require(name, "text", |k| k == ColumnKind::Text).map(|_| ())
    }

    pub fn require_date(&self, name: &str) -> AggregationResult<()> {
        self.require(name, "date", |k| k == ColumnKind::Date).map(|_| ())
    }

    /// Integer group keys. A float column qualifies when every value is whole.
    pub fn require_int_keys(&self, name: &str) -> AggregationResult<()> {
        if self.require(name, "integer", |k| k.is_numeric())? != ColumnKind::Float {
            return Ok(());
        }

        let values = self.column(name)?.cast(&DataType::Float64)?;
        if values.f64()?.into_iter().flatten().all(|v| v.fract() == 0.0) {
            Ok(())
        } else {
            Err(AggregationError::ColumnType {
                column: name.to_string(),
                expected: "integer",
                found: ColumnKind::Float,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Row values
    // -------------------------------------------------------------------------

    /// Numeric column widened to `f64`. Missing values are NaN.
    pub fn numeric(&self, name: &str) -> AggregationResult<Vec<f64>> {
        self.require_numeric(name)?;
        let values = self.column(name)?.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Numeric column as integer keys. Missing values are `None`.
    pub fn int_keys(&self, name: &str) -> AggregationResult<Vec<Option<i64>>> {
        self.require_int_keys(name)?;
        let values = self.column(name)?.cast(&DataType::Int64)?;
        Ok(values.i64()?.into_iter().collect())
    }

    /// Text column. Missing values are `None`.
    pub fn texts(&self, name: &str) -> AggregationResult<Vec<Option<String>>> {
        self.require_text(name)?;
        let values = self.column(name)?.cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Date column. Missing values are `None`.
    pub fn dates(&self, name: &str) -> AggregationResult<Vec<Option<NaiveDate>>> {
        self.require_date(name)?;
        let values = self.column(name)?.cast(&DataType::Date)?;
        Ok(values.date()?.as_date_iter().collect())
    }

    /// Numeric columns read from the file, in file order.
    pub fn numeric_source_columns(&self) -> Vec<&str> {
        self.frame
            .get_columns()
            .iter()
            .filter(|s| ColumnKind::of(s.dtype()).is_numeric())
            .map(|s| s.name())
            .filter(|name| self.origin(name) == Origin::Source)
            .collect()
    }
}

/// Every column cast to text.
fn as_text(frame: &DataFrame) -> PolarsResult<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|s| s.cast(&DataType::String))
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

// =============================================================================
// Loading
// =============================================================================

/// Read, type and normalize a booking file.
///
/// The returned table is shared read-only by every view.
pub fn load_bookings<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> LoadResult<Arc<BookingTable>> {
    log_info(format!("📖 Reading {}...", path.as_ref().display()));
    let parsed = parse_file_auto(path.as_ref(), delimiter)?;
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));

    let table = BookingTable::from_parsed(parsed)?;
    log_success(format!(
        "Read {} rows x {} columns",
        table.len(),
        table.fields().len() - table.derived.len()
    ));
    log_success(format!("Derived columns: {}", table.derived.join(", ")));

    Ok(Arc::new(table))
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
