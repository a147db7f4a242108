//! Grouping and summary queries shared by the views.
//!
//! ```text
//! frame ──▶ value_counts   ──▶ key | count            count desc, first-seen ties
//! frame ──▶ group_mean     ──▶ key | mean             key asc
//! frame ──▶ outcome_pivot  ──▶ keys.. | kept | hit    keys asc, 0 when absent
//! frame ──▶ pearson        ──▶ r                      pairwise complete
//! frame ──▶ five_numbers   ──▶ key | count | min | q1 | median | q3 | max
//! ```
//!
//! Each query is lazy and collected once. Rows whose key is null are left out
//! of every grouping; null values are skipped by every aggregate.

use chrono::NaiveDate;
use polars::prelude::{
    col, lit, pearson_corr, DataFrame, DataType, Expr, IntoLazy, LazyFrame, PolarsResult,
    QuantileInterpolOptions,
};

/// Name of the row-count column.
pub const COUNT: &str = "count";

pub const MIN: &str = "min";
pub const Q1: &str = "q1";
pub const MEDIAN: &str = "median";
pub const Q3: &str = "q3";
pub const MAX: &str = "max";

const LEFT: &str = "__left";
const RIGHT: &str = "__right";
const R: &str = "__r";
const PAIRS: &str = "__pairs";

fn cols(names: &[&str]) -> Vec<Expr> {
    names.iter().map(|name| col(name)).collect()
}

// =============================================================================
// Grouping
// =============================================================================

/// Count rows per value of `key`.
///
/// Sorted by count descending; equal counts keep the order in which the keys
/// first appear.
pub fn value_counts(frame: LazyFrame, key: &str) -> PolarsResult<DataFrame> {
    frame
        .select([col(key)])
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([col(key).count().cast(DataType::UInt64).alias(COUNT)])
        .sort_by_exprs([col(COUNT)], [true], false, true)
        .collect()
}

/// Mean of `value` in each `key` group, keys ascending.
///
/// A group whose values are all null has a null mean.
pub fn group_mean(frame: LazyFrame, key: &str, value: &str) -> PolarsResult<DataFrame> {
    frame
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([col(value).cast(DataType::Float64).mean()])
        .sort_by_exprs([col(key)], [false], false, false)
        .collect()
}

/// Split the rows of each key group on the boolean column `flag`: the number
/// of rows where it is false lands in `labels.0`, where it is true in
/// `labels.1`. Rows with a null key or flag are skipped.
pub fn outcome_pivot(
    frame: LazyFrame,
    keys: &[&str],
    flag: &str,
    labels: (&str, &str),
) -> PolarsResult<DataFrame> {
    let mut columns = keys.to_vec();
    columns.push(flag);

    frame
        .select(cols(&columns))
        .drop_nulls(None)
        .group_by(cols(keys))
        .agg([
            col(flag).not().cast(DataType::UInt64).sum().alias(labels.0),
            col(flag).cast(DataType::UInt64).sum().alias(labels.1),
        ])
        .sort_by_exprs(cols(keys), vec![false; keys.len()], false, false)
        .collect()
}

/// Count, minimum, quartiles and maximum of `value` per `key`, keys
/// ascending. Quartiles interpolate linearly.
pub fn five_numbers(frame: LazyFrame, key: &str, value: &str) -> PolarsResult<DataFrame> {
    let quantile = |q: f64| col(value).quantile(lit(q), QuantileInterpolOptions::Linear);

    frame
        .select([col(key), col(value).cast(DataType::Float64)])
        .drop_nulls(None)
        .group_by([col(key)])
        .agg([
            col(value).count().cast(DataType::UInt64).alias(COUNT),
            col(value).min().alias(MIN),
            quantile(0.25).alias(Q1),
            col(value).median().alias(MEDIAN),
            quantile(0.75).alias(Q3),
            col(value).max().alias(MAX),
        ])
        .sort_by_exprs([col(key)], [false], false, false)
        .collect()
}

// =============================================================================
// Correlation
// =============================================================================

/// Pearson correlation of two numeric columns over the rows where both are
/// present.
///
/// NaN with fewer than two such rows or when either side has no variance.
pub fn pearson(frame: &DataFrame, a: &str, b: &str) -> PolarsResult<f64> {
    let out = frame
        .clone()
        .lazy()
        .select([
            col(a).cast(DataType::Float64).alias(LEFT),
            col(b).cast(DataType::Float64).alias(RIGHT),
        ])
        .drop_nulls(None)
        .select([
            pearson_corr(col(LEFT), col(RIGHT), 1).alias(R),
            col(LEFT).count().cast(DataType::UInt64).alias(PAIRS),
        ])
        .collect()?;

    let pairs = counts(&out, PAIRS)?.first().copied().flatten().unwrap_or(0);
    let r = floats(&out, R)?.first().copied().flatten();
    Ok(match r {
        Some(r) if pairs >= 2 && r.is_finite() => r.clamp(-1.0, 1.0),
        _ => f64::NAN,
    })
}

/// Symmetric correlation matrix of the named columns.
///
/// The diagonal is 1.0 for a column with at least two values and nonzero
/// variance, NaN otherwise.
pub fn correlation_matrix(frame: &DataFrame, columns: &[&str]) -> PolarsResult<Vec<Vec<f64>>> {
    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        let own = pearson(frame, columns[i], columns[i])?;
        matrix[i][i] = if own.is_nan() { f64::NAN } else { 1.0 };

        for j in (i + 1)..n {
            let r = pearson(frame, columns[i], columns[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Ok(matrix)
}

// =============================================================================
// Reading results
// =============================================================================

/// Column of a query result as integers.
pub fn ints(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let values = frame.column(name)?.cast(&DataType::Int64)?;
    let values = values.i64()?;
    Ok(values.into_iter().collect())
}

/// Column of a query result as counts.
pub fn counts(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<u64>>> {
    let values = frame.column(name)?.cast(&DataType::UInt64)?;
    let values = values.u64()?;
    Ok(values.into_iter().collect())
}

/// Column of a query result as floats.
pub fn floats(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let values = frame.column(name)?.cast(&DataType::Float64)?;
    let values = values.f64()?;
    Ok(values.into_iter().collect())
}

/// Column of a query result as text.
pub fn strings(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let values = frame.column(name)?.cast(&DataType::String)?;
    let values = values.str()?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Column of a query result as dates.
pub fn dates(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let values = frame.column(name)?.cast(&DataType::Date)?;
    let values = values.date()?;
    Ok(values.as_date_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_value_counts_ties_keep_first_seen_order() {
        let frame = df!("segment" => &[Some("b"), Some("a"), None, Some("a"), Some("c"), Some("b")])
            .unwrap();

        let out = value_counts(frame.lazy(), "segment").unwrap();
        assert_eq!(
            strings(&out, "segment").unwrap(),
            vec![Some("b".to_string()), Some("a".to_string()), Some("c".to_string())]
        );
        assert_eq!(counts(&out, COUNT).unwrap(), vec![Some(2), Some(2), Some(1)]);
    }

    #[test]
    fn test_group_mean_sorted_and_skips_null() {
        let frame = df!(
            "k" => &[Some(2i64), Some(1), Some(2), None, Some(3)],
            "v" => &[Some(4.0), Some(1.0), None, Some(100.0), None]
        )
        .unwrap();

        let out = group_mean(frame.lazy(), "k", "v").unwrap();
        assert_eq!(ints(&out, "k").unwrap(), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(floats(&out, "v").unwrap(), vec![Some(1.0), Some(4.0), None]);
    }

    #[test]
    fn test_outcome_pivot_fills_zero() {
        let frame = df!(
            "month" => &[7i64, 7, 8, 7],
            "hit" => &[Some(false), Some(true), Some(true), None]
        )
        .unwrap();

        let out = outcome_pivot(frame.lazy(), &["month"], "hit", ("kept", "lost")).unwrap();
        assert_eq!(ints(&out, "month").unwrap(), vec![Some(7), Some(8)]);
        assert_eq!(counts(&out, "kept").unwrap(), vec![Some(1), Some(0)]);
        assert_eq!(counts(&out, "lost").unwrap(), vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_pearson() {
        let frame = df!(
            "x" => &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
            "y" => &[Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(1.0)],
            "z" => &[Some(4.0), Some(3.0), Some(2.0), Some(1.0), Some(0.0)],
            "flat" => &[5.0, 5.0, 5.0, 5.0, 5.0]
        )
        .unwrap();

        assert!((pearson(&frame, "x", "y").unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&frame, "x", "z").unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&frame, "x", "flat").unwrap().is_nan());
    }

    #[test]
    fn test_pearson_needs_two_pairs() {
        let frame = df!("x" => &[Some(1.0), None], "y" => &[Some(3.0), Some(4.0)]).unwrap();
        assert!(pearson(&frame, "x", "y").unwrap().is_nan());
    }

    #[test]
    fn test_correlation_matrix_diagonal_and_symmetry() {
        let frame = df!(
            "a" => &[1i64, 2, 3, 5],
            "b" => &[2.0, 1.0, 4.0, 3.0],
            "c" => &[7i64, 7, 7, 7]
        )
        .unwrap();

        let m = correlation_matrix(&frame, &["a", "b", "c"]).unwrap();
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[1][1], 1.0);
        assert!(m[2][2].is_nan());
        assert_eq!(m[0][1].to_bits(), m[1][0].to_bits());
        assert!(m[0][2].is_nan());
    }

    #[test]
    fn test_five_numbers() {
        let frame = df!(
            "room" => &[Some("A"), Some("A"), Some("A"), Some("D"), None],
            "adr" => &[Some(10.0), Some(30.0), Some(20.0), None, Some(99.0)]
        )
        .unwrap();

        let out = five_numbers(frame.lazy(), "room", "adr").unwrap();
        assert_eq!(strings(&out, "room").unwrap(), vec![Some("A".to_string())]);
        assert_eq!(counts(&out, COUNT).unwrap(), vec![Some(3)]);
        assert_eq!(floats(&out, MEDIAN).unwrap(), vec![Some(20.0)]);
        assert_eq!(floats(&out, Q1).unwrap(), vec![Some(15.0)]);
        assert_eq!(floats(&out, MAX).unwrap(), vec![Some(30.0)]);
    }
}
