//! One accessor per dashboard view.
//!
//! Every function is a pure read of the table: same table and selection in,
//! same result out. A missing or mistyped column fails only the view that
//! asked for it.

use polars::prelude::{col, lit, when, DataFrame, DataType};

use super::grouper::{
    self, correlation_matrix as correlate, group_mean, outcome_pivot, value_counts, COUNT,
};
use crate::error::AggregationResult;
use crate::models::columns::*;
use crate::models::{
    Cell, CorrelationMatrix, CountryCount, GuestKind, Occupancy, OccupancyRow, PairPlotData,
    Projection, RatePoint, SeasonalRow, Series, YearMonth,
};
use crate::table::{BookingTable, ColumnKind};

/// Options of the cancellation-analysis and segmentation selectors.
pub const CANCELLATION_FEATURES: [&str; 7] = [
    LEAD_TIME,
    ARRIVAL_DATE_WEEK_NUMBER,
    STAYS_IN_WEEKEND_NIGHTS,
    STAYS_IN_WEEK_NIGHTS,
    ADULTS,
    CHILDREN,
    BABIES,
];

/// Target (hue) column of the cancellation analysis.
pub const CANCELLATION_TARGET: &str = IS_CANCELED;

/// Options of the preference selector, all selected by default.
pub const PREFERENCE_COLUMNS: [&str; 4] = [COUNTRY, MARKET_SEGMENT, RESERVED_ROOM_TYPE, MEAL];

const YEAR: &str = "year";
const MONTH: &str = "month";
const CANCELED_FLAG: &str = "canceled";

// =============================================================================
// Helpers
// =============================================================================

/// Value counts of a text column.
fn text_counts(table: &BookingTable, column: &str) -> AggregationResult<Series<String, u64>> {
    table.require_text(column)?;
    let counts = value_counts(table.lazy(), column)?;
    Ok(Series::from_pairs(
        column,
        COUNT,
        grouper::strings(&counts, column)?
            .into_iter()
            .zip(grouper::counts(&counts, COUNT)?)
            .filter_map(|(key, count)| Some((key?, count?))),
    ))
}

/// Mean of `value` grouped by the integer column `key`.
fn int_group_mean(
    table: &BookingTable,
    key: &str,
    value: &str,
) -> AggregationResult<Series<i64, f64>> {
    table.require_int_keys(key)?;
    table.require_numeric(value)?;

    let frame = table
        .lazy()
        .select([col(key).cast(DataType::Int64), col(value)]);
    let means = group_mean(frame, key, value)?;
    Ok(Series::from_pairs(key, value, key_means(&means, grouper::ints(&means, key)?, value)?))
}

/// Pair group keys with their means; a null mean becomes NaN.
fn key_means<K>(
    means: &DataFrame,
    keys: Vec<Option<K>>,
    value: &str,
) -> AggregationResult<Vec<(K, f64)>> {
    Ok(keys
        .into_iter()
        .zip(grouper::floats(means, value)?)
        .filter_map(|(key, mean)| Some((key?, mean.unwrap_or(f64::NAN))))
        .collect())
}

/// Display cells of one column.
fn cells(table: &BookingTable, name: &str, limit: Option<usize>) -> AggregationResult<Vec<Cell>> {
    let column = table.column(name)?;
    let column = match limit {
        Some(n) => column.head(Some(n)),
        None => column.clone(),
    };
    let frame = DataFrame::new(vec![column])?;

    Ok(match ColumnKind::of(frame.column(name)?.dtype()) {
        ColumnKind::Int => grouper::ints(&frame, name)?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Int))
            .collect(),
        ColumnKind::Float => grouper::floats(&frame, name)?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()).map_or(Cell::Null, Cell::Float))
            .collect(),
        ColumnKind::Date => grouper::dates(&frame, name)?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Date))
            .collect(),
        ColumnKind::Text | ColumnKind::Bool => grouper::strings(&frame, name)?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Text))
            .collect(),
    })
}

/// Rows `0..limit` of the named columns.
fn project(table: &BookingTable, columns: &[String], limit: Option<usize>) -> AggregationResult<Projection> {
    let mut by_column = columns
        .iter()
        .map(|name| cells(table, name, limit).map(Vec::into_iter))
        .collect::<AggregationResult<Vec<_>>>()?;

    let rows = limit.map_or(table.len(), |n| n.min(table.len()));
    Ok(Projection {
        columns: columns.to_vec(),
        rows: (0..rows)
            .map(|_| {
                by_column
                    .iter_mut()
                    .map(|c| c.next().unwrap_or(Cell::Null))
                    .collect()
            })
            .collect(),
    })
}

// =============================================================================
// Views
// =============================================================================

/// Number of bookings per `is_canceled` value.
pub fn cancellation_distribution(table: &BookingTable) -> AggregationResult<Series<i64, u64>> {
    table.require_int_keys(IS_CANCELED)?;

    let frame = table.lazy().select([col(IS_CANCELED).cast(DataType::Int64)]);
    let counts = value_counts(frame, IS_CANCELED)?;
    Ok(Series::from_pairs(
        IS_CANCELED,
        COUNT,
        grouper::ints(&counts, IS_CANCELED)?
            .into_iter()
            .zip(grouper::counts(&counts, COUNT)?)
            .filter_map(|(key, count)| Some((key?, count?))),
    ))
}

/// Mean lead time of canceled and kept bookings.
pub fn lead_time_by_outcome(table: &BookingTable) -> AggregationResult<Series<i64, f64>> {
    int_group_mean(table, IS_CANCELED, LEAD_TIME)
}

/// Number of bookings per market segment, most frequent first.
pub fn segment_distribution(table: &BookingTable) -> AggregationResult<Series<String, u64>> {
    text_counts(table, MARKET_SEGMENT)
}

/// Mean daily rate per reserved room type.
pub fn rate_by_room_type(table: &BookingTable) -> AggregationResult<Series<String, f64>> {
    table.require_text(RESERVED_ROOM_TYPE)?;
    table.require_numeric(ADR)?;

    let means = group_mean(table.lazy(), RESERVED_ROOM_TYPE, ADR)?;
    let rooms = grouper::strings(&means, RESERVED_ROOM_TYPE)?;
    Ok(Series::from_pairs(RESERVED_ROOM_TYPE, ADR, key_means(&means, rooms, ADR)?))
}

/// Pearson correlation between every pair of numeric columns from the file.
pub fn correlation_matrix(table: &BookingTable) -> AggregationResult<CorrelationMatrix> {
    let columns = table.numeric_source_columns();
    Ok(CorrelationMatrix {
        values: correlate(table.frame(), &columns)?,
        columns: columns.into_iter().map(str::to_string).collect(),
    })
}

/// Bookings per arrival month, split into kept and canceled.
pub fn seasonal_trend(table: &BookingTable) -> AggregationResult<Vec<SeasonalRow>> {
    table.require_date(ARRIVAL_DATE)?;
    table.require_numeric(IS_CANCELED)?;

    let frame = table.lazy().select([
        col(ARRIVAL_DATE).dt().year().cast(DataType::Int64).alias(YEAR),
        col(ARRIVAL_DATE).dt().month().cast(DataType::Int64).alias(MONTH),
        col(IS_CANCELED)
            .cast(DataType::Float64)
            .neq(lit(0.0))
            .alias(CANCELED_FLAG),
    ]);
    let pivot = outcome_pivot(frame, &[YEAR, MONTH], CANCELED_FLAG, ("Not Canceled", "Canceled"))?;

    let years = grouper::ints(&pivot, YEAR)?;
    let months = grouper::ints(&pivot, MONTH)?;
    let kept = grouper::counts(&pivot, "Not Canceled")?;
    let canceled = grouper::counts(&pivot, "Canceled")?;

    Ok(years
        .into_iter()
        .zip(months)
        .zip(kept.into_iter().zip(canceled))
        .filter_map(|((year, month), (kept, canceled))| {
            Some(SeasonalRow {
                period: YearMonth {
                    year: i32::try_from(year?).ok()?,
                    month: u32::try_from(month?).ok()?,
                },
                not_canceled: kept.unwrap_or(0),
                canceled: canceled.unwrap_or(0),
            })
        })
        .collect())
}

/// The `top_n` most frequent guest countries.
pub fn top_nationalities(table: &BookingTable, top_n: usize) -> AggregationResult<Series<String, u64>> {
    Ok(text_counts(table, COUNTRY)?.head(top_n))
}

/// Share of canceled bookings per total stay length.
pub fn cancellation_rate_by_stay(table: &BookingTable) -> AggregationResult<Series<i64, f64>> {
    int_group_mean(table, TOTAL_STAY_NIGHTS, IS_CANCELED)
}

/// Guests with previous cancellations against first-timers. A missing
/// history counts as new.
pub fn repeat_vs_new(table: &BookingTable) -> AggregationResult<Series<String, u64>> {
    table.require_numeric(PREVIOUS_CANCELLATIONS)?;

    let frame = table.lazy().select([when(
        col(PREVIOUS_CANCELLATIONS).cast(DataType::Float64).gt(lit(0.0)),
    )
    .then(lit(GuestKind::Repeat.label()))
    .otherwise(lit(GuestKind::New.label()))
    .alias(PREVIOUS_CANCELLATIONS)]);

    let counts = value_counts(frame, PREVIOUS_CANCELLATIONS)?;
    Ok(Series::from_pairs(
        PREVIOUS_CANCELLATIONS,
        COUNT,
        grouper::strings(&counts, PREVIOUS_CANCELLATIONS)?
            .into_iter()
            .zip(grouper::counts(&counts, COUNT)?)
            .filter_map(|(kind, count)| Some((kind?, count?))),
    ))
}

/// First rows of the chosen categorical columns. An empty selection falls
/// back to [`PREFERENCE_COLUMNS`].
pub fn preference_preview(
    table: &BookingTable,
    selection: &[String],
    rows: usize,
) -> AggregationResult<Projection> {
    if selection.is_empty() {
        let defaults: Vec<String> = PREFERENCE_COLUMNS.iter().map(|c| c.to_string()).collect();
        return project(table, &defaults, Some(rows));
    }
    project(table, selection, Some(rows))
}

/// Number of bookings per distribution channel.
pub fn channel_distribution(table: &BookingTable) -> AggregationResult<Series<String, u64>> {
    text_counts(table, DISTRIBUTION_CHANNEL)
}

/// Share of canceled bookings for each exact lead time.
pub fn lead_time_cancellation_curve(table: &BookingTable) -> AggregationResult<Series<i64, f64>> {
    int_group_mean(table, LEAD_TIME, IS_CANCELED)
}

/// Bookings per arrival date, split by occupancy label.
pub fn occupancy_over_time(table: &BookingTable) -> AggregationResult<Vec<OccupancyRow>> {
    table.require_date(ARRIVAL_DATE)?;
    table.require_text(OCCUPIED)?;

    let canceled = Occupancy::Canceled.label();
    let occupied = Occupancy::Occupied.label();
    let frame = table.lazy().select([
        col(ARRIVAL_DATE),
        col(OCCUPIED).eq(lit(canceled)).alias(CANCELED_FLAG),
    ]);
    let pivot = outcome_pivot(frame, &[ARRIVAL_DATE], CANCELED_FLAG, (occupied, canceled))?;

    let dates = grouper::dates(&pivot, ARRIVAL_DATE)?;
    let kept = grouper::counts(&pivot, occupied)?;
    let lost = grouper::counts(&pivot, canceled)?;

    Ok(dates
        .into_iter()
        .zip(kept.into_iter().zip(lost))
        .filter_map(|(date, (kept, lost))| {
            Some(OccupancyRow {
                arrival_date: date?,
                canceled: lost.unwrap_or(0),
                occupied: kept.unwrap_or(0),
            })
        })
        .collect())
}

/// Bookings per country, shaped for a choropleth keyed on country name.
pub fn geographic_summary(table: &BookingTable) -> AggregationResult<Vec<CountryCount>> {
    let counts = text_counts(table, COUNTRY)?;
    Ok(counts
        .index
        .into_iter()
        .zip(counts.values)
        .map(|(country, count)| CountryCount { country, count })
        .collect())
}

/// Every booking's room type and daily rate, unaggregated.
pub fn rate_distribution(table: &BookingTable) -> AggregationResult<Vec<RatePoint>> {
    let rooms = table.texts(RESERVED_ROOM_TYPE)?;
    let adr = table.numeric(ADR)?;

    Ok(rooms
        .into_iter()
        .zip(adr)
        .map(|(reserved_room_type, adr)| RatePoint {
            reserved_room_type,
            adr,
        })
        .collect())
}

// =============================================================================
// Selection-driven views
// =============================================================================

/// Selected features plus the cancellation flag, for a pairwise scatter,
/// with each feature's mean per flag value.
///
/// `None` when nothing is selected.
pub fn cancellation_analysis(
    table: &BookingTable,
    features: &[String],
) -> AggregationResult<Option<PairPlotData>> {
    if features.is_empty() {
        return Ok(None);
    }

    let mut columns = features.to_vec();
    if !columns.iter().any(|c| c == CANCELLATION_TARGET) {
        columns.push(CANCELLATION_TARGET.to_string());
    }
    let data = project(table, &columns, None)?;

    let aliases: Vec<String> = (0..features.len()).map(|i| format!("mean_{}", i)).collect();
    let means = table
        .lazy()
        .filter(col(CANCELLATION_TARGET).is_not_null())
        .group_by([col(CANCELLATION_TARGET)])
        .agg(
            features
                .iter()
                .zip(&aliases)
                .map(|(feature, alias)| col(feature).cast(DataType::Float64).mean().alias(alias))
                .collect::<Vec<_>>(),
        )
        .sort_by_exprs([col(CANCELLATION_TARGET)], [false], false, false)
        .collect()?;

    let hue_values: Vec<String> = grouper::strings(&means, CANCELLATION_TARGET)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let feature_means = aliases
        .iter()
        .map(|alias| {
            Ok(grouper::floats(&means, alias)?
                .into_iter()
                .map(|m| m.unwrap_or(f64::NAN))
                .collect())
        })
        .collect::<AggregationResult<Vec<Vec<f64>>>>()?;

    Ok(Some(PairPlotData {
        features: features.to_vec(),
        hue: CANCELLATION_TARGET.to_string(),
        hue_values,
        means: feature_means,
        data,
    }))
}

/// First rows of the features chosen for customer segmentation.
///
/// `None` when nothing is selected.
pub fn segmentation_preview(
    table: &BookingTable,
    features: &[String],
    rows: usize,
) -> AggregationResult<Option<Projection>> {
    if features.is_empty() {
        return Ok(None);
    }
    project(table, features, Some(rows)).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregationError;
    use crate::parser::parse_str;
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn table(frame: PolarsResult<DataFrame>) -> BookingTable {
        BookingTable::from_frame(frame.unwrap()).unwrap()
    }

    fn sel(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Eight bookings across three arrival months.
    fn sample() -> BookingTable {
        table(df!(
            IS_CANCELED => &[0i64, 0, 1, 1, 0, 1, 0, 0],
            LEAD_TIME => &[10i64, 20, 30, 30, 5, 120, 5, 0],
            ARRIVAL_DATE_YEAR => &[2015i64, 2015, 2015, 2015, 2016, 2016, 2016, 2016],
            ARRIVAL_DATE_MONTH => &["July", "July", "July", "August", "January", "January", "January", "January"],
            STAYS_IN_WEEKEND_NIGHTS => &[1i64, 0, 2, 0, 0, 1, 0, 2],
            STAYS_IN_WEEK_NIGHTS => &[2i64, 3, 5, 1, 1, 2, 1, 5],
            ADULTS => &[2i64, 2, 1, 2, 2, 3, 1, 2],
            CHILDREN => &[Some(0.0), None, Some(0.0), Some(1.0), Some(0.0), Some(2.0), Some(0.0), Some(0.0)],
            MARKET_SEGMENT => &["Online TA", "Direct", "Online TA", "Groups", "Direct", "Online TA", "Corporate", "Direct"],
            RESERVED_ROOM_TYPE => &["A", "A", "D", "A", "E", "D", "A", "E"],
            MEAL => &["BB", "HB", "BB", "BB", "SC", "BB", "HB", "FB"],
            COUNTRY => &[Some("PRT"), Some("GBR"), Some("PRT"), None, Some("ESP"), Some("PRT"), Some("GBR"), Some("FRA")],
            DISTRIBUTION_CHANNEL => &["TA/TO", "Direct", "TA/TO", "TA/TO", "Direct", "TA/TO", "Corporate", "Direct"],
            ADR => &[100.0, 80.0, 150.0, 0.0, 60.0, -6.38, 90.0, 70.0],
            PREVIOUS_CANCELLATIONS => &[0i64, 0, 1, 0, 0, 2, 0, 0]
        ))
    }

    #[test]
    fn test_three_row_example() {
        let table = table(df!(IS_CANCELED => &[0i64, 0, 1], LEAD_TIME => &[10i64, 20, 30]));

        let dist = cancellation_distribution(&table).unwrap();
        assert_eq!(dist.get(&0), Some(&2));
        assert_eq!(dist.get(&1), Some(&1));

        let means = lead_time_by_outcome(&table).unwrap();
        assert_eq!(means.get(&0), Some(&15.0));
        assert_eq!(means.get(&1), Some(&30.0));
    }

    #[test]
    fn test_cancellation_counts_sum_to_rows() {
        let table = sample();
        assert_eq!(cancellation_distribution(&table).unwrap().total(), table.len() as u64);
    }

    #[test]
    fn test_lead_time_without_cancellations() {
        let table = table(df!(IS_CANCELED => &[0i64, 0, 0], LEAD_TIME => &[3i64, 4, 8]));

        let means = lead_time_by_outcome(&table).unwrap();
        assert_eq!(means.get(&1), None);
        assert_eq!(means.get(&0), Some(&5.0));
    }

    #[test]
    fn test_segment_distribution_descending() {
        let segments = segment_distribution(&sample()).unwrap();
        assert_eq!(segments.index, vec!["Online TA", "Direct", "Groups", "Corporate"]);
        assert_eq!(segments.values, vec![3, 3, 1, 1]);
    }

    #[test]
    fn test_rate_by_room_type() {
        let rates = rate_by_room_type(&sample()).unwrap();
        assert_eq!(rates.index, vec!["A", "D", "E"]);
        assert_eq!(rates.get(&"A".to_string()), Some(&67.5));
        assert_eq!(rates.get(&"E".to_string()), Some(&65.0));
    }

    #[test]
    fn test_correlation_matrix_properties() {
        let matrix = correlation_matrix(&sample()).unwrap();

        // Derived total_stay_nights is left out, text columns too
        assert!(!matrix.columns.iter().any(|c| c == TOTAL_STAY_NIGHTS));
        assert!(!matrix.columns.iter().any(|c| c == COUNTRY));
        assert_eq!(matrix.columns[0], IS_CANCELED);
        assert!(matrix.columns.iter().any(|c| c == CHILDREN));

        for i in 0..matrix.size() {
            assert_eq!(matrix.values[i][i], 1.0, "diagonal of {}", matrix.columns[i]);
            for j in 0..matrix.size() {
                let (a, b) = (matrix.values[i][j], matrix.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }

    #[test]
    fn test_seasonal_trend_pivot() {
        let trend = seasonal_trend(&sample()).unwrap();

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].period, YearMonth { year: 2015, month: 7 });
        assert_eq!((trend[0].not_canceled, trend[0].canceled), (2, 1));
        // August only has a cancellation: the kept count is filled with 0
        assert_eq!(trend[1].period, YearMonth { year: 2015, month: 8 });
        assert_eq!((trend[1].not_canceled, trend[1].canceled), (0, 1));
        assert_eq!(trend[2].total(), 4);
    }

    #[test]
    fn test_top_nationalities() {
        let top = top_nationalities(&sample(), 10).unwrap();
        assert_eq!(top.index, vec!["PRT", "GBR", "ESP", "FRA"]);
        assert_eq!(top.values, vec![3, 2, 1, 1]);

        let top2 = top_nationalities(&sample(), 2).unwrap();
        assert_eq!(top2.len(), 2);
    }

    #[test]
    fn test_top_nationalities_caps_at_ten() {
        let countries: Vec<String> = (0..15).map(|i| format!("C{:02}", i)).collect();
        let refs: Vec<&str> = countries.iter().map(|s| s.as_str()).collect();
        let table = table(df!(COUNTRY => refs));

        let top = top_nationalities(&table, 10).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top.index[0], "C00");
        assert!(top.values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_stay_length_example() {
        let table = table(df!(
            STAYS_IN_WEEKEND_NIGHTS => &[1i64, 0],
            STAYS_IN_WEEK_NIGHTS => &[2i64, 3],
            IS_CANCELED => &[0i64, 1]
        ));

        let rates = cancellation_rate_by_stay(&table).unwrap();
        assert_eq!(rates.index, vec![3]);
        assert_eq!(rates.values, vec![0.5]);
    }

    #[test]
    fn test_stay_rates_within_unit_interval() {
        let rates = cancellation_rate_by_stay(&sample()).unwrap();
        assert!(rates.index.windows(2).all(|w| w[0] < w[1]));
        assert!(rates.values.iter().all(|r| (0.0..=1.0).contains(r)));
    }

    #[test]
    fn test_repeat_vs_new() {
        let kinds = repeat_vs_new(&sample()).unwrap();
        assert_eq!(kinds.index, vec!["New", "Repeat"]);
        assert_eq!(kinds.values, vec![6, 2]);
    }

    #[test]
    fn test_preference_preview_defaults() {
        let preview = preference_preview(&sample(), &[], 5).unwrap();
        assert_eq!(preview.columns, PREFERENCE_COLUMNS.to_vec());
        assert_eq!(preview.len(), 5);
        assert_eq!(preview.rows[0][0], Cell::Text("PRT".into()));
        assert_eq!(preview.rows[3][0], Cell::Null);
    }

    #[test]
    fn test_preference_preview_selection() {
        let preview = preference_preview(&sample(), &sel(&[MEAL]), 3).unwrap();
        assert_eq!(preview.columns, vec![MEAL]);
        assert_eq!(preview.rows, vec![
            vec![Cell::Text("BB".into())],
            vec![Cell::Text("HB".into())],
            vec![Cell::Text("BB".into())],
        ]);
    }

    #[test]
    fn test_channel_distribution() {
        let channels = channel_distribution(&sample()).unwrap();
        assert_eq!(channels.index, vec!["TA/TO", "Direct", "Corporate"]);
        assert_eq!(channels.total(), 8);
    }

    #[test]
    fn test_lead_time_curve_unbinned() {
        let curve = lead_time_cancellation_curve(&sample()).unwrap();
        assert_eq!(curve.index, vec![0, 5, 10, 20, 30, 120]);
        assert_eq!(curve.get(&30), Some(&1.0));
        assert_eq!(curve.get(&5), Some(&0.0));
    }

    #[test]
    fn test_occupancy_over_time() {
        let rows = occupancy_over_time(&sample()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].arrival_date, NaiveDate::from_ymd_opt(2015, 7, 1).unwrap());
        assert_eq!(rows[2].arrival_date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!((rows[0].canceled, rows[0].occupied), (1, 2));
        assert_eq!((rows[1].canceled, rows[1].occupied), (1, 0));
        assert_eq!((rows[2].canceled, rows[2].occupied), (1, 3));
    }

    #[test]
    fn test_geographic_summary() {
        let geo = geographic_summary(&sample()).unwrap();
        assert_eq!(geo[0], CountryCount { country: "PRT".into(), count: 3 });
        assert_eq!(geo.iter().map(|c| c.count).sum::<u64>(), 7);

        let json = serde_json::to_value(&geo[0]).unwrap();
        assert_eq!(json, serde_json::json!({ "country": "PRT", "count": 3 }));
    }

    #[test]
    fn test_rate_distribution_is_identity() {
        let table = sample();
        let points = rate_distribution(&table).unwrap();

        assert_eq!(points.len(), table.len());
        assert_eq!(points[5], RatePoint { reserved_room_type: Some("D".into()), adr: -6.38 });
    }

    #[test]
    fn test_cancellation_analysis_empty_selection() {
        assert_eq!(cancellation_analysis(&sample(), &[]).unwrap(), None);
        assert_eq!(segmentation_preview(&sample(), &[], 5).unwrap(), None);
    }

    #[test]
    fn test_cancellation_analysis_adds_target() {
        let data = cancellation_analysis(&sample(), &sel(&[LEAD_TIME, ADULTS]))
            .unwrap()
            .unwrap();

        assert_eq!(data.hue, IS_CANCELED);
        assert_eq!(data.data.columns, vec![LEAD_TIME, ADULTS, IS_CANCELED]);
        assert_eq!(data.data.len(), 8);
        assert_eq!(data.data.rows[2], vec![Cell::Int(30), Cell::Int(1), Cell::Int(1)]);

        assert_eq!(data.hue_values, vec!["0", "1"]);
        // lead time: kept 10, 20, 5, 5, 0; canceled 30, 30, 120
        assert_eq!(data.means[0], vec![8.0, 60.0]);
        assert_eq!(data.means[1][1], 2.0);
    }

    #[test]
    fn test_cancellation_analysis_missing_feature() {
        let err = cancellation_analysis(&sample(), &sel(&["nope"])).unwrap_err();
        assert_eq!(err, AggregationError::MissingColumn("nope".into()));
    }

    #[test]
    fn test_segmentation_preview() {
        let preview = segmentation_preview(&sample(), &sel(&[CHILDREN]), 5)
            .unwrap()
            .unwrap();
        assert_eq!(preview.len(), 5);
        assert_eq!(preview.rows[1], vec![Cell::Null]);
    }

    #[test]
    fn test_missing_column_fails_view() {
        let table = table(df!(IS_CANCELED => &[0i64, 1]));

        assert_eq!(
            rate_by_room_type(&table).unwrap_err(),
            AggregationError::MissingColumn(RESERVED_ROOM_TYPE.into())
        );
        assert_eq!(
            seasonal_trend(&table).unwrap_err(),
            AggregationError::MissingColumn(ARRIVAL_DATE.into())
        );
        assert!(preference_preview(&table, &sel(&["nope"]), 5).is_err());
        // Other views on the same table still work
        assert!(cancellation_distribution(&table).is_ok());
    }

    #[test]
    fn test_wrong_kind_fails_view() {
        let table = table(df!(
            MARKET_SEGMENT => &[1i64, 2],
            RESERVED_ROOM_TYPE => &["A", "D"],
            ADR => &["cheap", "dear"]
        ));

        assert!(matches!(
            segment_distribution(&table).unwrap_err(),
            AggregationError::ColumnType { expected: "text", found: ColumnKind::Int, .. }
        ));
        assert!(matches!(
            rate_by_room_type(&table).unwrap_err(),
            AggregationError::ColumnType { expected: "numeric", found: ColumnKind::Text, .. }
        ));
    }

    #[test]
    fn test_header_only_file() {
        let table = BookingTable::from_parsed(
            parse_str("hotel,country,lead_time\n", ',', "utf-8").unwrap(),
        )
        .unwrap();

        let matrix = correlation_matrix(&table).unwrap();
        assert!(matrix.columns.is_empty());
        assert_eq!(matrix.size(), 0);
        assert!(top_nationalities(&table, 10).unwrap().is_empty());
    }

    #[test]
    fn test_views_are_idempotent() {
        let table = sample();
        assert_eq!(seasonal_trend(&table).unwrap(), seasonal_trend(&table).unwrap());
        assert_eq!(top_nationalities(&table, 10).unwrap(), top_nationalities(&table, 10).unwrap());
        let a = correlation_matrix(&table).unwrap();
        let b = correlation_matrix(&table).unwrap();
        for (ra, rb) in a.values.iter().zip(&b.values) {
            for (x, y) in ra.iter().zip(rb) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }
}
