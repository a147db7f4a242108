//! Dashboard output for the terminal and for other programs.
//!
//! - Text: every section under its title, drawn as a `comfy-table` grid
//! - JSON: the dashboard as produced by the pipeline, NaN as `null`

use std::fmt::Display;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use polars::prelude::{DataFrame, IntoLazy, NamedFrom, PolarsResult, Series as PolarsSeries};

use crate::error::DashboardResult;
use crate::logs::log_warning;
use crate::models::columns::{ADR, RESERVED_ROOM_TYPE};
use crate::models::{Cell, PairPlotData, Projection, RatePoint, Series};
use crate::transform::grouper::{
    counts, five_numbers, floats, strings, COUNT, MAX, MEDIAN, MIN, Q1, Q3,
};
use crate::transform::pipeline::{Dashboard, Section, SectionData};

/// Output format of the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// =============================================================================
// Text
// =============================================================================

/// Render the whole dashboard for a terminal.
pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = format!("{}\n{} bookings\n", dashboard.title, dashboard.row_count);
    for section in &dashboard.sections {
        out.push('\n');
        out.push_str(&render_section_text(section));
    }
    out
}

/// Render one section: its title, chart kind, then a table of its data.
pub fn render_section_text(section: &Section) -> String {
    let chart = serde_json::to_value(section.chart)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    format!("== {} [{}]\n{}\n", section.title, chart, data_table(&section.data))
}

fn data_table(data: &SectionData) -> Table {
    match data {
        SectionData::IntCounts(s) => series_table(s, |v| v.to_string()),
        SectionData::TextCounts(s) => series_table(s, |v| v.to_string()),
        SectionData::IntMeans(s) => series_table(s, |v| fmt_float(*v)),
        SectionData::TextMeans(s) => series_table(s, |v| fmt_float(*v)),
        SectionData::Correlation(m) => {
            let mut table = new_table();
            let mut header = vec![String::new()];
            header.extend(m.columns.iter().cloned());
            table.set_header(header);
            for (name, row) in m.columns.iter().zip(&m.values) {
                let mut cells = vec![name.clone()];
                cells.extend(row.iter().map(|&v| fmt_float(v)));
                table.add_row(cells);
            }
            table
        }
        SectionData::Seasonal(rows) => {
            let mut table = new_table();
            table.set_header(vec!["period", "Not Canceled", "Canceled"]);
            for row in rows {
                table.add_row(vec![
                    row.period.to_string(),
                    row.not_canceled.to_string(),
                    row.canceled.to_string(),
                ]);
            }
            table
        }
        SectionData::Occupancy(rows) => {
            let mut table = new_table();
            table.set_header(vec!["arrival_date", "Canceled", "Occupied"]);
            for row in rows {
                table.add_row(vec![
                    row.arrival_date.format("%Y-%m-%d").to_string(),
                    row.canceled.to_string(),
                    row.occupied.to_string(),
                ]);
            }
            table
        }
        SectionData::Preview(projection) => projection_table(projection),
        SectionData::PairPlot(data) => pair_plot_table(data),
        SectionData::Countries(rows) => {
            let mut table = new_table();
            table.set_header(vec!["country", "count"]);
            for row in rows {
                table.add_row(vec![row.country.clone(), row.count.to_string()]);
            }
            table
        }
        SectionData::Rates(points) => box_plot_table(points),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table
}

/// Two decimals; NaN as an empty cell.
fn fmt_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.2}", value)
    }
}

fn series_table<K: Display + PartialEq, V>(series: &Series<K, V>, fmt: impl Fn(&V) -> String) -> Table {
    let mut table = new_table();
    table.set_header(vec![series.index_name.clone(), series.name.clone()]);
    for (key, value) in series.iter() {
        table.add_row(vec![key.to_string(), fmt(value)]);
    }
    table
}

fn projection_table(projection: &Projection) -> Table {
    let mut table = new_table();
    table.set_header(projection.columns.clone());
    for row in &projection.rows {
        table.add_row(row.iter().map(Cell::to_string).collect::<Vec<_>>());
    }
    table
}

/// A scatter grid does not fit a terminal; show each feature's mean per hue
/// value instead.
fn pair_plot_table(data: &PairPlotData) -> Table {
    let mut table = new_table();
    let mut header = vec!["feature".to_string()];
    header.extend(
        data.hue_values
            .iter()
            .map(|value| format!("mean ({} = {})", data.hue, value)),
    );
    table.set_header(header);

    for (feature, means) in data.features.iter().zip(&data.means) {
        let mut cells = vec![feature.clone()];
        cells.extend(means.iter().map(|&m| fmt_float(m)));
        table.add_row(cells);
    }
    table
}

/// Five-number summary of the daily rate per room type.
fn box_plot_table(points: &[RatePoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec![RESERVED_ROOM_TYPE, COUNT, MIN, Q1, MEDIAN, Q3, MAX]);

    let summary = rate_frame(points).and_then(|frame| {
        let out = five_numbers(frame.lazy(), RESERVED_ROOM_TYPE, ADR)?;
        let rooms = strings(&out, RESERVED_ROOM_TYPE)?;
        let count = counts(&out, COUNT)?;
        let stats = [MIN, Q1, MEDIAN, Q3, MAX]
            .iter()
            .map(|name| floats(&out, name))
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok((rooms, count, stats))
    });

    let (rooms, count, stats) = match summary {
        Ok(summary) => summary,
        Err(e) => {
            log_warning(format!("Rate summary unavailable: {}", e));
            return table;
        }
    };

    for (i, room) in rooms.into_iter().enumerate() {
        let mut cells = vec![room.unwrap_or_default()];
        cells.push(count[i].unwrap_or(0).to_string());
        cells.extend(stats.iter().map(|column| fmt_float(column[i].unwrap_or(f64::NAN))));
        table.add_row(cells);
    }
    table
}

fn rate_frame(points: &[RatePoint]) -> PolarsResult<DataFrame> {
    let rooms: Vec<Option<&str>> = points
        .iter()
        .map(|p| p.reserved_room_type.as_deref())
        .collect();
    let rates: Vec<Option<f64>> = points
        .iter()
        .map(|p| Some(p.adr).filter(|v| !v.is_nan()))
        .collect();
    DataFrame::new(vec![
        PolarsSeries::new(RESERVED_ROOM_TYPE, rooms),
        PolarsSeries::new(ADR, rates),
    ])
}

// =============================================================================
// JSON
// =============================================================================

/// Render the dashboard as pretty-printed JSON.
pub fn render_json(dashboard: &Dashboard) -> DashboardResult<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// Render a single section as pretty-printed JSON.
pub fn render_section_json(section: &Section) -> DashboardResult<String> {
    Ok(serde_json::to_string_pretty(section)?)
}

/// Render in the requested format.
pub fn render(dashboard: &Dashboard, format: OutputFormat) -> DashboardResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(dashboard)),
        OutputFormat::Json => render_json(dashboard),
    }
}
