//! Hotel EDA CLI - exploratory dashboard over hotel booking records
//!
//! # Commands
//!
//! ```bash
//! hotel-eda dashboard hotel_bookings.csv             # Every section, as text
//! hotel-eda dashboard --format json -o out.json      # Same, as JSON
//! hotel-eda dashboard --features lead_time,adr       # With the cancellation pair plot
//! hotel-eda view seasonal-trend hotel_bookings.csv   # A single section
//! hotel-eda views                                    # List available views
//! hotel-eda inspect hotel_bookings.csv               # Column types and requirements
//! ```
//!
//! The input path defaults to `HOTEL_EDA_DATA` (or `hotel_bookings.csv`).

use clap::{Args, Parser, Subcommand};
use hotel_eda::logs::{log_error, log_success, log_warning, LOGGER};
use hotel_eda::table::format_delimiter;
use hotel_eda::{
    build_dashboard, build_section, load_bookings, missing_columns, missing_columns_for, render,
    render_section_json, render_section_text, Config, DashboardOptions, OutputFormat, Selections,
    ViewKind,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hotel-eda")]
#[command(about = "Exploratory dashboard over hotel booking records", long_about = None)]
struct Cli {
    /// Only print warnings and errors on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and print every dashboard section
    Dashboard {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Compute and print a single section
    View {
        /// View name (see `hotel-eda views`)
        #[arg(value_enum)]
        view: ViewKind,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List the available views
    Views,

    /// Show how the input file is read and which views it can feed
    Inspect {
        /// Input CSV file (default: $HOTEL_EDA_DATA)
        input: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Input CSV file (default: $HOTEL_EDA_DATA)
    input: Option<PathBuf>,

    /// Features for the cancellation pair plot
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Features for the customer segmentation preview
    #[arg(long, value_delimiter = ',')]
    segment: Vec<String>,

    /// Columns for the preferences preview (default: country, market_segment, reserved_room_type, meal)
    #[arg(long, value_delimiter = ',')]
    prefs: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Rows shown by preview sections
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Countries kept by the top-nationalities view
    #[arg(long)]
    top: Option<usize>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    fn selections(&self) -> Selections {
        Selections {
            features: self.features.clone(),
            segment: self.segment.clone(),
            preferences: self.prefs.clone(),
        }
    }

    /// Flags override the environment.
    fn options(&self, config: &Config) -> Result<DashboardOptions, Box<dyn std::error::Error>> {
        let preview_rows = self.preview_rows.unwrap_or(config.options.preview_rows);
        let top_n = self.top.unwrap_or(config.options.top_n);
        if preview_rows == 0 || top_n == 0 {
            return Err("--preview-rows and --top must be at least 1".into());
        }
        Ok(DashboardOptions { preview_rows, top_n })
    }
}

fn main() {
    let cli = Cli::parse();
    LOGGER.set_quiet(cli.quiet);

    let result = Config::from_env()
        .map_err(Into::into)
        .and_then(|config| match cli.command {
            Commands::Dashboard { run } => cmd_dashboard(&config, &run),
            Commands::View { view, run } => cmd_view(&config, view, &run),
            Commands::Views => cmd_views(),
            Commands::Inspect { input, delimiter } => {
                cmd_inspect(input.as_deref().unwrap_or(&config.data_path), delimiter)
            }
        });

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_dashboard(config: &Config, run: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = run.input.as_deref().unwrap_or(&config.data_path);
    let options = run.options(config)?;
    let selections = run.selections();

    let table = load_bookings(input, run.delimiter)?;
    warn_missing(&missing_columns_for(&table, &selections));

    let dashboard = build_dashboard(&table, &selections, &options)?;
    write_output(&render(&dashboard, run.format)?, run.output.as_deref())?;

    log_success("Done");
    Ok(())
}

fn cmd_view(config: &Config, view: ViewKind, run: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = run.input.as_deref().unwrap_or(&config.data_path);
    let options = run.options(config)?;

    let table = load_bookings(input, run.delimiter)?;
    let section = build_section(&table, view, &run.selections(), &options)?;

    let Some(section) = section else {
        log_warning(format!(
            "'{}' needs a selection (--features or --segment); nothing to show",
            view.name()
        ));
        return Ok(());
    };

    let content = match run.format {
        OutputFormat::Text => render_section_text(&section),
        OutputFormat::Json => render_section_json(&section)?,
    };
    write_output(&content, run.output.as_deref())
}

fn cmd_views() -> Result<(), Box<dyn std::error::Error>> {
    for view in ViewKind::ALL {
        let mut requires: Vec<&str> = view.required_columns().to_vec();
        if view.is_selection_driven() {
            requires.push("<selected>");
        }
        let requires = if requires.is_empty() {
            "-".to_string()
        } else {
            requires.join(", ")
        };
        println!("{:<26} {:<10} {}", view.name(), format!("{:?}", view.chart()), view.title());
        println!("{:<26} requires: {}", "", requires);
    }
    Ok(())
}

fn cmd_inspect(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_bookings(input, delimiter)?;

    println!("📄 {}", input.display());
    println!("   Encoding: {}", table.source().encoding);
    println!("   Delimiter: '{}'", format_delimiter(table.source().delimiter));
    println!("   Rows: {}", table.len());
    println!("\n📋 Columns ({}):", table.fields().len());
    for field in table.fields() {
        println!(
            "   {:<32} {:<6} {:?}",
            field.name,
            field.kind.to_string(),
            field.origin
        );
    }

    let reports = missing_columns(&table);
    if reports.is_empty() {
        println!("\n✅ Every view has the columns it needs");
    } else {
        println!("\n⚠️  Views that will fail:");
        for report in &reports {
            println!("   {:<26} missing {}", report.view.name(), report.missing.join(", "));
        }
    }
    Ok(())
}

fn warn_missing(reports: &[hotel_eda::ColumnReport]) {
    for report in reports {
        log_warning(format!(
            "{} will fail: missing {}",
            report.view.name(),
            report.missing.join(", ")
        ));
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
