use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdf_tables::{
    ColumnPolicy, CombineOptions, ConversionReport, ConvertError, ConvertOptions, ExtractError,
    ExtractOptions, HeaderMode, PageSelector, QualityMode, TextLayoutExtractor, convert_pdf_to_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2csv",
    version,
    about = "Extract every table of a text PDF into one CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables and write the combined CSV output.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// Page selection like 1-3,5 (default: all pages).
    #[arg(long)]
    pages: Option<String>,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Force header interpretation on first row of each table.
    #[arg(long, conflicts_with = "no_header")]
    has_header: bool,

    /// Disable header interpretation; keep first row as data.
    #[arg(long, conflicts_with = "has_header")]
    no_header: bool,

    /// Minimum cells required per candidate table row.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// Fail on low-confidence tables instead of exporting them.
    #[arg(long, conflicts_with = "skip_ambiguous")]
    strict: bool,

    /// Drop low-confidence tables instead of exporting them.
    #[arg(long, conflicts_with = "strict")]
    skip_ambiguous: bool,

    /// Column alignment across tables: positional, by-header or strict.
    #[arg(long, default_value = "positional")]
    policy: ColumnPolicy,

    /// Prepend page and table_id columns.
    #[arg(long)]
    provenance: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<(ExtractOptions, ConvertOptions)> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelector::from_str)
        .transpose()
        .context("failed to parse --pages")?
        .unwrap_or_default();

    let header_mode = if args.has_header {
        HeaderMode::HasHeader
    } else if args.no_header {
        HeaderMode::NoHeader
    } else {
        HeaderMode::AutoDetect
    };

    let quality_mode = if args.strict {
        QualityMode::Strict
    } else if args.skip_ambiguous {
        QualityMode::SkipAmbiguous
    } else {
        QualityMode::BestEffort
    };

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let extract = ExtractOptions {
        header_mode,
        quality_mode,
        min_cols: args.min_cols,
    };
    let convert = ConvertOptions {
        pages,
        combine: CombineOptions {
            policy: args.policy,
            provenance: args.provenance,
        },
        delimiter: args.delimiter as u8,
    };
    Ok((extract, convert))
}

fn log_report(report: &ConversionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!("  - {warning}");
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<Result<ConversionReport, ConvertError>> {
    let (extract_options, convert_options) = parse_options(args)?;
    let extractor = TextLayoutExtractor::new(extract_options);
    Ok(convert_pdf_to_csv(
        &args.input,
        &args.output,
        &extractor,
        &convert_options,
    ))
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_tables=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(Ok(report)) => {
                log_report(&report, args.verbose);
                ExitCode::SUCCESS
            }
            Ok(Err(ConvertError::Extract(ExtractError::NoTablesFound))) => {
                eprintln!("error: no tables found in '{}'", args.input.display());
                ExitCode::from(2)
            }
            Ok(Err(error)) => {
                let error = anyhow::Error::new(error)
                    .context(format!("failed to extract tables from '{}'", args.input.display()));
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
