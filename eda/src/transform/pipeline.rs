//! Dashboard assembly: every view, in the order the dashboard shows them.
//!
//! # Example
//!
//! ```rust,ignore
//! use hotel_eda::{build_dashboard, load_bookings, DashboardOptions, Selections};
//!
//! let table = load_bookings("hotel_bookings.csv", None)?;
//! let dashboard = build_dashboard(&table, &Selections::default(), &DashboardOptions::default())?;
//! for section in &dashboard.sections {
//!     println!("{} ({:?})", section.title, section.chart);
//! }
//! ```

use serde::Serialize;

use super::views;
use crate::config::DashboardOptions;
use crate::error::{AggregationResult, DashboardError, DashboardResult};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::columns::*;
use crate::models::{
    CorrelationMatrix, CountryCount, OccupancyRow, PairPlotData, Projection, RatePoint,
    SeasonalRow, Series,
};
use crate::table::BookingTable;

/// Title shown above the dashboard.
pub const DASHBOARD_TITLE: &str = "Hotel Booking Demand Analysis";

/// How the presentation layer should draw a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Heatmap,
    Choropleth,
    Box,
    PairPlot,
    Table,
}

/// Column lists picked by the viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    /// Features for the cancellation pair plot
    pub features: Vec<String>,
    /// Features for the customer segmentation preview
    pub segment: Vec<String>,
    /// Categorical columns for the preference preview
    pub preferences: Vec<String>,
}

// =============================================================================
// Views
// =============================================================================

/// Every view the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ViewKind {
    CancellationAnalysis,
    CustomerSegmentation,
    CancellationDistribution,
    LeadTimeByOutcome,
    SegmentDistribution,
    RateByRoomType,
    Correlation,
    SeasonalTrend,
    TopNationalities,
    StayLengthCancellation,
    RepeatVsNew,
    Preferences,
    ChannelDistribution,
    LeadTimeCurve,
    Occupancy,
    WorldMap,
    RateBoxPlot,
}

impl ViewKind {
    /// All views, in dashboard order.
    pub const ALL: [ViewKind; 17] = [
        ViewKind::CancellationAnalysis,
        ViewKind::CustomerSegmentation,
        ViewKind::CancellationDistribution,
        ViewKind::LeadTimeByOutcome,
        ViewKind::SegmentDistribution,
        ViewKind::RateByRoomType,
        ViewKind::Correlation,
        ViewKind::SeasonalTrend,
        ViewKind::TopNationalities,
        ViewKind::StayLengthCancellation,
        ViewKind::RepeatVsNew,
        ViewKind::Preferences,
        ViewKind::ChannelDistribution,
        ViewKind::LeadTimeCurve,
        ViewKind::Occupancy,
        ViewKind::WorldMap,
        ViewKind::RateBoxPlot,
    ];

    /// Stable kebab-case identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CancellationAnalysis => "cancellation-analysis",
            Self::CustomerSegmentation => "customer-segmentation",
            Self::CancellationDistribution => "cancellation-distribution",
            Self::LeadTimeByOutcome => "lead-time-by-outcome",
            Self::SegmentDistribution => "segment-distribution",
            Self::RateByRoomType => "rate-by-room-type",
            Self::Correlation => "correlation",
            Self::SeasonalTrend => "seasonal-trend",
            Self::TopNationalities => "top-nationalities",
            Self::StayLengthCancellation => "stay-length-cancellation",
            Self::RepeatVsNew => "repeat-vs-new",
            Self::Preferences => "preferences",
            Self::ChannelDistribution => "channel-distribution",
            Self::LeadTimeCurve => "lead-time-curve",
            Self::Occupancy => "occupancy",
            Self::WorldMap => "world-map",
            Self::RateBoxPlot => "rate-box-plot",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CancellationAnalysis => "Booking Cancellation Analysis",
            Self::CustomerSegmentation => "Customer Segmentation",
            Self::CancellationDistribution => "Canceled vs. Non-canceled Bookings",
            Self::LeadTimeByOutcome => "Average Lead Time for Canceled vs. Non-canceled Bookings",
            Self::SegmentDistribution => "Guest Distribution by Market Segment",
            Self::RateByRoomType => "Average Daily Rate by Room Type",
            Self::Correlation => "Correlation Heatmap",
            Self::SeasonalTrend => "Seasonal Booking Trends",
            Self::TopNationalities => "Top Guest Nationalities",
            Self::StayLengthCancellation => "Average Cancellation Rate by Length of Stay",
            Self::RepeatVsNew => "Repeat vs. New Guests",
            Self::Preferences => "Customer Demographics and Preferences",
            Self::ChannelDistribution => "Booking Channel Distribution",
            Self::LeadTimeCurve => "Cancellation Rate vs. Booking Lead Time",
            Self::Occupancy => "Occupancy Rates Over Time",
            Self::WorldMap => "Top Guest Nationalities (World Map)",
            Self::RateBoxPlot => "Average Daily Rate by Room Type (Box Plot)",
        }
    }

    pub fn chart(&self) -> ChartKind {
        match self {
            Self::CancellationAnalysis => ChartKind::PairPlot,
            Self::CustomerSegmentation | Self::Preferences => ChartKind::Table,
            Self::Correlation => ChartKind::Heatmap,
            Self::SeasonalTrend | Self::LeadTimeCurve => ChartKind::Line,
            Self::Occupancy => ChartKind::Area,
            Self::WorldMap => ChartKind::Choropleth,
            Self::RateBoxPlot => ChartKind::Box,
            Self::CancellationDistribution
            | Self::LeadTimeByOutcome
            | Self::SegmentDistribution
            | Self::RateByRoomType
            | Self::TopNationalities
            | Self::StayLengthCancellation
            | Self::RepeatVsNew
            | Self::ChannelDistribution => ChartKind::Bar,
        }
    }

    /// Columns the view always reads. Selection-driven views also read the
    /// selected columns; the correlation view reads whatever is numeric.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::CancellationAnalysis => &[IS_CANCELED],
            Self::CustomerSegmentation | Self::Correlation | Self::Preferences => &[],
            Self::CancellationDistribution => &[IS_CANCELED],
            Self::LeadTimeByOutcome => &[IS_CANCELED, LEAD_TIME],
            Self::SegmentDistribution => &[MARKET_SEGMENT],
            Self::RateByRoomType | Self::RateBoxPlot => &[RESERVED_ROOM_TYPE, ADR],
            Self::SeasonalTrend => &[ARRIVAL_DATE, IS_CANCELED],
            Self::TopNationalities | Self::WorldMap => &[COUNTRY],
            Self::StayLengthCancellation => &[TOTAL_STAY_NIGHTS, IS_CANCELED],
            Self::RepeatVsNew => &[PREVIOUS_CANCELLATIONS],
            Self::ChannelDistribution => &[DISTRIBUTION_CHANNEL],
            Self::LeadTimeCurve => &[LEAD_TIME, IS_CANCELED],
            Self::Occupancy => &[ARRIVAL_DATE, OCCUPIED],
        }
    }

    /// Whether the view only runs when the viewer selected columns for it.
    pub fn is_selection_driven(&self) -> bool {
        matches!(self, Self::CancellationAnalysis | Self::CustomerSegmentation)
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Data handed to the presentation layer for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionData {
    IntCounts(Series<i64, u64>),
    TextCounts(Series<String, u64>),
    IntMeans(Series<i64, f64>),
    TextMeans(Series<String, f64>),
    Correlation(CorrelationMatrix),
    Seasonal(Vec<SeasonalRow>),
    Occupancy(Vec<OccupancyRow>),
    Preview(Projection),
    PairPlot(PairPlotData),
    Countries(Vec<CountryCount>),
    Rates(Vec<RatePoint>),
}

/// One rendered unit of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub chart: ChartKind,
    pub data: SectionData,
}

/// The whole dashboard, sections in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub row_count: usize,
    pub sections: Vec<Section>,
}

impl Dashboard {
    pub fn section(&self, kind: ViewKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == kind.name())
    }
}

/// Run one view. `Ok(None)` means a selection-driven view had nothing selected.
pub fn run_view(
    table: &BookingTable,
    kind: ViewKind,
    selections: &Selections,
    options: &DashboardOptions,
) -> AggregationResult<Option<SectionData>> {
    let data = match kind {
        ViewKind::CancellationAnalysis => {
            return Ok(views::cancellation_analysis(table, &selections.features)?
                .map(SectionData::PairPlot));
        }
        ViewKind::CustomerSegmentation => {
            return Ok(views::segmentation_preview(table, &selections.segment, options.preview_rows)?
                .map(SectionData::Preview));
        }
        ViewKind::CancellationDistribution => {
            SectionData::IntCounts(views::cancellation_distribution(table)?)
        }
        ViewKind::LeadTimeByOutcome => SectionData::IntMeans(views::lead_time_by_outcome(table)?),
        ViewKind::SegmentDistribution => {
            SectionData::TextCounts(views::segment_distribution(table)?)
        }
        ViewKind::RateByRoomType => SectionData::TextMeans(views::rate_by_room_type(table)?),
        ViewKind::Correlation => SectionData::Correlation(views::correlation_matrix(table)?),
        ViewKind::SeasonalTrend => SectionData::Seasonal(views::seasonal_trend(table)?),
        ViewKind::TopNationalities => {
            SectionData::TextCounts(views::top_nationalities(table, options.top_n)?)
        }
        ViewKind::StayLengthCancellation => {
            SectionData::IntMeans(views::cancellation_rate_by_stay(table)?)
        }
        ViewKind::RepeatVsNew => SectionData::TextCounts(views::repeat_vs_new(table)?),
        ViewKind::Preferences => SectionData::Preview(views::preference_preview(
            table,
            &selections.preferences,
            options.preview_rows,
        )?),
        ViewKind::ChannelDistribution => {
            SectionData::TextCounts(views::channel_distribution(table)?)
        }
        ViewKind::LeadTimeCurve => {
            SectionData::IntMeans(views::lead_time_cancellation_curve(table)?)
        }
        ViewKind::Occupancy => SectionData::Occupancy(views::occupancy_over_time(table)?),
        ViewKind::WorldMap => SectionData::Countries(views::geographic_summary(table)?),
        ViewKind::RateBoxPlot => SectionData::Rates(views::rate_distribution(table)?),
    };
    Ok(Some(data))
}

/// Wrap one view's output as a dashboard section.
pub fn build_section(
    table: &BookingTable,
    kind: ViewKind,
    selections: &Selections,
    options: &DashboardOptions,
) -> DashboardResult<Option<Section>> {
    let data = run_view(table, kind, selections, options).map_err(|source| {
        DashboardError::Section {
            section: kind.name(),
            source,
        }
    })?;

    Ok(data.map(|data| Section {
        id: kind.name(),
        title: kind.title(),
        chart: kind.chart(),
        data,
    }))
}

/// Compute every section, top to bottom.
///
/// Selection-driven sections with nothing selected are left out. The first
/// failing section aborts the dashboard.
pub fn build_dashboard(
    table: &BookingTable,
    selections: &Selections,
    options: &DashboardOptions,
) -> DashboardResult<Dashboard> {
    log_info(format!("📊 Building dashboard over {} bookings...", table.len()));

    let mut sections = Vec::with_capacity(ViewKind::ALL.len());
    for kind in ViewKind::ALL {
        match build_section(table, kind, selections, options)? {
            Some(section) => sections.push(section),
            None => log_info_indent(format!("{} skipped (nothing selected)", kind.title()), 1),
        }
    }

    log_success(format!("{} sections ready", sections.len()));

    Ok(Dashboard {
        title: DASHBOARD_TITLE,
        row_count: table.len(),
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn table(frame: PolarsResult<DataFrame>) -> BookingTable {
        BookingTable::from_frame(frame.unwrap()).unwrap()
    }

    fn full_table() -> BookingTable {
        table(df!(
            IS_CANCELED => &[0i64, 1, 0],
            LEAD_TIME => &[10i64, 30, 20],
            ARRIVAL_DATE_YEAR => &[2015i64, 2015, 2016],
            ARRIVAL_DATE_MONTH => &["July", "July", "May"],
            STAYS_IN_WEEKEND_NIGHTS => &[1i64, 0, 2],
            STAYS_IN_WEEK_NIGHTS => &[2i64, 3, 1],
            ADULTS => &[2i64, 1, 2],
            MARKET_SEGMENT => &["Direct", "Online TA", "Direct"],
            RESERVED_ROOM_TYPE => &["A", "D", "A"],
            MEAL => &["BB", "HB", "BB"],
            COUNTRY => &["PRT", "GBR", "PRT"],
            DISTRIBUTION_CHANNEL => &["Direct", "TA/TO", "Direct"],
            ADR => &[75.0, 110.5, 98.0],
            PREVIOUS_CANCELLATIONS => &[0i64, 1, 0]
        ))
    }

    #[test]
    fn test_view_names_roundtrip() {
        for kind in ViewKind::ALL {
            assert_eq!(ViewKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ViewKind::from_name("pie-chart"), None);
    }

    #[test]
    fn test_default_dashboard_skips_selection_views() {
        let dashboard =
            build_dashboard(&full_table(), &Selections::default(), &DashboardOptions::default())
                .unwrap();

        assert_eq!(dashboard.row_count, 3);
        assert_eq!(dashboard.sections.len(), ViewKind::ALL.len() - 2);
        assert!(dashboard.section(ViewKind::CancellationAnalysis).is_none());
        assert!(dashboard.section(ViewKind::CustomerSegmentation).is_none());
        assert_eq!(dashboard.sections[0].id, "cancellation-distribution");

        // Preferences fall back to their defaults
        let prefs = dashboard.section(ViewKind::Preferences).unwrap();
        match &prefs.data {
            SectionData::Preview(p) => {
                assert_eq!(p.columns.len(), 4);
                assert_eq!(p.len(), 3);
            }
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[test]
    fn test_selection_views_follow_selection() {
        let selections = Selections {
            features: vec![LEAD_TIME.into()],
            segment: vec![ADULTS.into(), LEAD_TIME.into()],
            preferences: vec![MEAL.into()],
        };
        let dashboard =
            build_dashboard(&full_table(), &selections, &DashboardOptions::default()).unwrap();

        assert_eq!(dashboard.sections.len(), ViewKind::ALL.len());
        assert_eq!(dashboard.sections[0].chart, ChartKind::PairPlot);
        assert_eq!(dashboard.sections[1].chart, ChartKind::Table);
    }

    #[test]
    fn test_missing_column_aborts_with_section_name() {
        let table = table(df!(IS_CANCELED => &[0i64, 1]));
        let err = build_dashboard(&table, &Selections::default(), &DashboardOptions::default())
            .unwrap_err();

        match err {
            DashboardError::Section { section, source } => {
                assert_eq!(section, "lead-time-by-outcome");
                assert_eq!(source.to_string(), "Missing column: lead_time");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_top_n_option() {
        let options = DashboardOptions { preview_rows: 1, top_n: 1 };
        let data = run_view(&full_table(), ViewKind::TopNationalities, &Selections::default(), &options)
            .unwrap()
            .unwrap();

        match data {
            SectionData::TextCounts(series) => assert_eq!(series.index, vec!["PRT"]),
            other => panic!("unexpected data: {:?}", other),
        }
    }

    #[test]
    fn test_section_json_shape() {
        let section = build_section(
            &full_table(),
            ViewKind::SeasonalTrend,
            &Selections::default(),
            &DashboardOptions::default(),
        )
        .unwrap()
        .unwrap();

        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["id"], "seasonal-trend");
        assert_eq!(json["chart"], "line");
        assert_eq!(json["data"][0]["period"], "2015-07");
        assert_eq!(json["data"][0]["Canceled"], 1);
        assert_eq!(json["data"][1]["period"], "2016-05");
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let table = table(df!(
            IS_CANCELED => &[0i64, 1],
            ADR => &[None, Some(3.0)],
            RESERVED_ROOM_TYPE => &["A", "B"]
        ));

        let data = run_view(&table, ViewKind::RateByRoomType, &Selections::default(), &DashboardOptions::default())
            .unwrap()
            .unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json["values"][0].is_null());
        assert_eq!(json["values"][1], 3.0);
    }
}
