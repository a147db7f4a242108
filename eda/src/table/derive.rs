//! Normalization: the columns computed once, right after load.
//!
//! ```text
//! arrival_date_year + arrival_date_month        → arrival_date (day 1)
//! stays_in_weekend_nights + stays_in_week_nights → total_stay_nights
//! is_canceled                                    → occupied
//! ```
//!
//! A derived column is skipped, with a warning, when one of its inputs is
//! absent or is not numeric; views that need it then fail with a
//! missing-column error. Only a row whose arrival date cannot be built fails
//! the load.

use chrono::NaiveDate;
use polars::prelude::{col, lit, when, DataFrame, DataType, Expr, IntoLazy, NamedFrom, Series};

use super::ColumnKind;
use crate::error::{LoadError, LoadResult};
use crate::logs::log_warning;
use crate::models::columns::*;
use crate::models::Occupancy;

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Parse a month given as an English name, a three-letter abbreviation or a
/// number from 1 to 12.
pub fn parse_month(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    let lower = value.to_lowercase();
    MONTHS
        .iter()
        .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// Add every derived column whose inputs are usable. Returns the frame and
/// the names that were added; a derived column replaces a source column of
/// the same name.
pub fn add_derived_columns(mut frame: DataFrame) -> LoadResult<(DataFrame, Vec<&'static str>)> {
    let mut derived = Vec::new();
    let mut exprs: Vec<Expr> = Vec::new();

    if usable(&frame, ARRIVAL_DATE, &[ARRIVAL_DATE_YEAR], &[ARRIVAL_DATE_MONTH]) {
        let dates = arrival_dates(&frame)?;
        frame.with_column(dates)?;
        derived.push(ARRIVAL_DATE);
    }
    let stay_inputs = [STAYS_IN_WEEKEND_NIGHTS, STAYS_IN_WEEK_NIGHTS];
    if usable(&frame, TOTAL_STAY_NIGHTS, &stay_inputs, &[]) {
        exprs.push(total_stay_nights());
        derived.push(TOTAL_STAY_NIGHTS);
    }
    if usable(&frame, OCCUPIED, &[], &[IS_CANCELED]) {
        exprs.push(occupied(&frame));
        derived.push(OCCUPIED);
    }

    if !exprs.is_empty() {
        frame = frame.lazy().with_columns(exprs).collect()?;
    }
    if derived.contains(&TOTAL_STAY_NIGHTS) {
        narrow_stay_total(&mut frame)?;
    }

    Ok((frame, derived))
}

/// Whether `target` can be computed: every input present, and the `numeric`
/// ones numeric (or the frame empty). Logs why not.
fn usable(frame: &DataFrame, target: &str, numeric: &[&str], other: &[&str]) -> bool {
    let missing: Vec<&str> = numeric
        .iter()
        .chain(other)
        .copied()
        .filter(|c| frame.column(c).is_err())
        .collect();
    if !missing.is_empty() {
        log_warning(format!("Skipping '{}': missing {}", target, missing.join(", ")));
        return false;
    }

    if frame.height() == 0 {
        return true;
    }
    let wrong: Vec<&str> = numeric
        .iter()
        .copied()
        .filter(|c| !kind_of(frame, c).is_numeric())
        .collect();
    if !wrong.is_empty() {
        log_warning(format!("Skipping '{}': {} not numeric", target, wrong.join(", ")));
        return false;
    }
    true
}

fn kind_of(frame: &DataFrame, name: &str) -> ColumnKind {
    frame
        .column(name)
        .map(|s| ColumnKind::of(s.dtype()))
        .unwrap_or(ColumnKind::Text)
}

/// First day of the arrival month, per row.
fn arrival_dates(frame: &DataFrame) -> LoadResult<Series> {
    let years = frame.column(ARRIVAL_DATE_YEAR)?.cast(&DataType::Float64)?;
    let month_column = frame.column(ARRIVAL_DATE_MONTH)?;
    let month_text = month_column.cast(&DataType::String)?;
    let month_text = month_text.str()?;

    let months: Vec<Option<u32>> = if kind_of(frame, ARRIVAL_DATE_MONTH).is_numeric() {
        let numbers = month_column.cast(&DataType::Float64)?;
        let numbers = numbers.f64()?;
        numbers
            .into_iter()
            .map(|m| {
                m.filter(|m| m.fract() == 0.0 && (1.0..=12.0).contains(m))
                    .map(|m| m as u32)
            })
            .collect()
    } else {
        month_text
            .into_iter()
            .map(|m| m.and_then(parse_month))
            .collect()
    };

    let mut dates = Vec::with_capacity(frame.height());
    for (row, (year, month)) in years.f64()?.into_iter().zip(months).enumerate() {
        let date = match (year, month) {
            (Some(y), Some(m)) if y.fract() == 0.0 && y.abs() <= f64::from(i32::MAX) => {
                NaiveDate::from_ymd_opt(y as i32, m, 1)
            }
            _ => None,
        };
        let date = date.ok_or_else(|| LoadError::Derivation {
            row: row + 1,
            column: ARRIVAL_DATE.to_string(),
            message: format!(
                "no calendar date for year {} and month {}",
                year.map_or_else(|| "null".to_string(), |y| y.to_string()),
                month_text.get(row).unwrap_or("null"),
            ),
        })?;
        dates.push(date);
    }

    Ok(Series::new(ARRIVAL_DATE, dates))
}

/// Weekend nights plus week nights, summed in floating point so a huge
/// value cannot overflow. A missing input gives a missing total.
fn total_stay_nights() -> Expr {
    (col(STAYS_IN_WEEKEND_NIGHTS).cast(DataType::Float64)
        + col(STAYS_IN_WEEK_NIGHTS).cast(DataType::Float64))
    .alias(TOTAL_STAY_NIGHTS)
}

/// Back to integers when both inputs are integers and every total is exact.
fn narrow_stay_total(frame: &mut DataFrame) -> LoadResult<()> {
    let integer_inputs = [STAYS_IN_WEEKEND_NIGHTS, STAYS_IN_WEEK_NIGHTS]
        .iter()
        .all(|c| kind_of(frame, c) == ColumnKind::Int);
    if !integer_inputs {
        return Ok(());
    }

    let total = frame.column(TOTAL_STAY_NIGHTS)?;
    if total.f64()?.into_iter().flatten().all(|v| v.abs() < MAX_EXACT_INT) {
        let narrowed = total.cast(&DataType::Int64)?;
        frame.with_column(narrowed)?;
    }
    Ok(())
}

/// Occupancy label from the cancellation flag: `Occupied` when the flag is
/// 0, `Canceled` otherwise. A missing or non-numeric flag never equals 0.
fn occupied(frame: &DataFrame) -> Expr {
    let label = match kind_of(frame, IS_CANCELED) {
        ColumnKind::Int | ColumnKind::Float | ColumnKind::Bool => {
            when(col(IS_CANCELED).cast(DataType::Float64).eq(lit(0.0)))
                .then(lit(Occupancy::Occupied.label()))
                .otherwise(lit(Occupancy::Canceled.label()))
        }
        kind => {
            if frame.height() > 0 {
                log_warning(format!(
                    "'{}' is {}; every booking is labelled {}",
                    IS_CANCELED,
                    kind,
                    Occupancy::Canceled.label()
                ));
            }
            lit(Occupancy::Canceled.label())
        }
    };
    label.alias(OCCUPIED)
}
