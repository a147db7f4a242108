//! Column requirement checks.
//!
//! Reports, before any view runs, which dashboard sections would fail on a
//! missing column. A missing column never blocks the load; it only fails the
//! views that read it.
//!
//! # Example
//!
//! ```rust,ignore
//! use hotel_eda::{load_bookings, missing_columns};
//!
//! let table = load_bookings("hotel_bookings.csv", None)?;
//! for report in missing_columns(&table) {
//!     eprintln!("{}: missing {}", report.view.name(), report.missing.join(", "));
//! }
//! ```

use serde::Serialize;

use crate::table::BookingTable;
use crate::transform::pipeline::{Selections, ViewKind};
use crate::transform::views::PREFERENCE_COLUMNS;

/// Columns one view needs but the table lacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    #[serde(serialize_with = "serialize_view")]
    pub view: ViewKind,
    pub missing: Vec<String>,
}

fn serialize_view<S: serde::Serializer>(view: &ViewKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(view.name())
}

/// Views whose fixed column requirements are not met, in dashboard order.
pub fn missing_columns(table: &BookingTable) -> Vec<ColumnReport> {
    ViewKind::ALL
        .iter()
        .filter_map(|&view| {
            let missing = absent(table, view.required_columns().iter().copied());
            (!missing.is_empty()).then_some(ColumnReport { view, missing })
        })
        .collect()
}

/// Like [`missing_columns`], but also checks the columns a selection names.
///
/// An empty preference selection is checked against the default preference
/// columns, since that is what the view falls back to.
pub fn missing_columns_for(table: &BookingTable, selections: &Selections) -> Vec<ColumnReport> {
    ViewKind::ALL
        .iter()
        .filter_map(|&view| {
            let mut wanted: Vec<&str> = view.required_columns().to_vec();
            match view {
                ViewKind::CancellationAnalysis if !selections.features.is_empty() => {
                    wanted.extend(selections.features.iter().map(String::as_str));
                }
                ViewKind::CustomerSegmentation => {
                    wanted.extend(selections.segment.iter().map(String::as_str));
                }
                ViewKind::Preferences if selections.preferences.is_empty() => {
                    wanted.extend(PREFERENCE_COLUMNS);
                }
                ViewKind::Preferences => {
                    wanted.extend(selections.preferences.iter().map(String::as_str));
                }
                _ => {}
            }
            // Nothing selected means the view is skipped, not failed
            if view == ViewKind::CancellationAnalysis && selections.features.is_empty() {
                wanted.clear();
            }

            let missing = absent(table, wanted.into_iter());
            (!missing.is_empty()).then_some(ColumnReport { view, missing })
        })
        .collect()
}

fn absent<'a>(table: &BookingTable, columns: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for column in columns {
        if !table.has_column(column) && !missing.iter().any(|m| m == column) {
            missing.push(column.to_string());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns::*;
    use polars::prelude::*;

    fn small_table() -> BookingTable {
        let frame = df!(
            IS_CANCELED => &[0i64, 1],
            LEAD_TIME => &[3i64, 9],
            COUNTRY => &["PRT", "ESP"]
        )
        .unwrap();
        BookingTable::from_frame(frame).unwrap()
    }

    #[test]
    fn test_reports_views_with_missing_columns() {
        let reports = missing_columns(&small_table());
        let views: Vec<ViewKind> = reports.iter().map(|r| r.view).collect();

        assert!(!views.contains(&ViewKind::CancellationDistribution));
        assert!(!views.contains(&ViewKind::LeadTimeByOutcome));
        assert!(!views.contains(&ViewKind::TopNationalities));

        // occupied is derived from is_canceled; arrival_date needs the year and month
        let occupancy = reports.iter().find(|r| r.view == ViewKind::Occupancy).unwrap();
        assert_eq!(occupancy.missing, vec![ARRIVAL_DATE.to_string()]);

        let rate = reports.iter().find(|r| r.view == ViewKind::RateByRoomType).unwrap();
        assert_eq!(rate.missing, vec![RESERVED_ROOM_TYPE.to_string(), ADR.to_string()]);
    }

    #[test]
    fn test_selection_columns_are_checked() {
        let selections = Selections {
            features: vec![LEAD_TIME.into(), ADULTS.into()],
            segment: vec![],
            preferences: vec![COUNTRY.into()],
        };
        let reports = missing_columns_for(&small_table(), &selections);

        let analysis = reports
            .iter()
            .find(|r| r.view == ViewKind::CancellationAnalysis)
            .unwrap();
        assert_eq!(analysis.missing, vec![ADULTS.to_string()]);
        assert!(!reports.iter().any(|r| r.view == ViewKind::Preferences));
        assert!(!reports.iter().any(|r| r.view == ViewKind::CustomerSegmentation));
    }

    #[test]
    fn test_default_preferences_are_checked() {
        let reports = missing_columns_for(&small_table(), &Selections::default());
        let prefs = reports.iter().find(|r| r.view == ViewKind::Preferences).unwrap();

        assert_eq!(
            prefs.missing,
            vec![MARKET_SEGMENT.to_string(), RESERVED_ROOM_TYPE.to_string(), MEAL.to_string()]
        );
        assert!(!reports.iter().any(|r| r.view == ViewKind::CancellationAnalysis));
    }

    #[test]
    fn test_report_serializes_view_name() {
        let report = ColumnReport {
            view: ViewKind::WorldMap,
            missing: vec![COUNTRY.to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["view"], "world-map");
        assert_eq!(json["missing"][0], "country");
    }
}
