//! Querytable CLI - Render CSV result sets as HTML tables
//!
//! ```bash
//! querytable render input.csv -c table.json   # CSV to HTML table
//! querytable render input.csv --format json   # CSV to table JSON
//! querytable parse input.csv                  # Just parse CSV to JSON rows
//! querytable example-config                   # Show an example configuration
//! querytable operations                       # Show available cell operations
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use querytable::{
    build_html, example_config, operations_description, CsvSource, DataSource, HtmlMode, Markup,
    TableConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "querytable")]
#[command(about = "Render CSV result sets as HTML tables", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a CSV file as a table
    Render {
        /// Input CSV file
        input: PathBuf,

        /// JSON table configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// HTML handling for cell values: none, strip or escape
        #[arg(long)]
        html_mode: Option<HtmlMode>,

        /// Table caption
        #[arg(long)]
        caption: Option<String>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },

    /// Parse a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show example table configuration
    ExampleConfig,

    /// Show available cell operations
    Operations,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            input,
            config,
            html_mode,
            caption,
            delimiter,
            output,
            format,
        } => cmd_render(
            &input,
            config.as_deref(),
            html_mode,
            caption,
            delimiter,
            output.as_deref(),
            format,
        ),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::ExampleConfig => cmd_example_config(),

        Commands::Operations => cmd_operations(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn open_source(
    input: &Path,
    delimiter: Option<char>,
) -> Result<CsvSource<std::io::Cursor<Vec<u8>>>, Box<dyn std::error::Error>> {
    let source = match delimiter {
        Some(d) => CsvSource::from_bytes_with_delimiter(&fs::read(input)?, d)?,
        None => CsvSource::open(input)?,
    };
    info!(
        "Reading {}: encoding {}, delimiter '{}'{}",
        input.display(),
        source.encoding(),
        format_delimiter(source.delimiter()),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    Ok(source)
}

fn cmd_render(
    input: &Path,
    config_path: Option<&Path>,
    html_mode: Option<HtmlMode>,
    caption: Option<String>,
    delimiter: Option<char>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => TableConfig::from_file(path)?,
        None => TableConfig::new(),
    };
    if let Some(mode) = html_mode {
        config.html_mode = mode;
    }
    if let Some(caption) = caption {
        config.table_options.caption = Some(caption);
    }

    let source = open_source(input, delimiter)?;
    info!("Columns: {}", source.columns().join(", "));

    let report = build_html(source, &config)?;
    if report.is_clean() {
        info!("{}", report.summary());
    } else {
        warn!("{}", report.summary());
    }

    let rendered = match format {
        OutputFormat::Html => report.table.to_markup(),
        OutputFormat::Json => serde_json::to_string_pretty(&report.table)?,
    };
    write_output(&rendered, output)
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = open_source(input, delimiter)?;

    let mut rows = Vec::new();
    while let Some(row) = source.next_row()? {
        rows.push(row);
    }
    info!("Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&example_config())?);
    Ok(())
}

fn cmd_operations() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", operations_description());
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            info!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
