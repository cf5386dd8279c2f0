//! Command line converter from StepMania `.sm` into `.chart`.
//!
//! The output file is written only after the whole conversion succeeded.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use sm2chart::prelude::*;
use thiserror::Error;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "sm2chart", version)]
#[command(about = "Converts a StepMania .sm simfile into a .chart file", long_about = None)]
struct Args {
    /// Simfile to convert
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output path, `notes.chart` next to the input by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Whether a stop exactly on a note's beat delays that note
    #[arg(long, value_enum, default_value_t = StopPolicyArg::AtOrBefore)]
    stop_policy: StopPolicyArg,

    /// Keep notes inside negative tempo sections
    #[arg(long)]
    no_warp_filter: bool,

    /// Steps type of the charts to convert
    #[arg(long, default_value = "dance-single", value_name = "TYPE")]
    steps_type: String,

    /// Ticks per beat
    #[arg(long, default_value_t = DEFAULT_RESOLUTION, value_name = "TICKS")]
    resolution: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Chart)]
    format: Format,

    /// Print debug logs
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StopPolicyArg {
    AtOrBefore,
    Before,
}

impl From<StopPolicyArg> for StopPolicy {
    fn from(arg: StopPolicyArg) -> Self {
        match arg {
            StopPolicyArg::AtOrBefore => Self::AtOrBefore,
            StopPolicyArg::Before => Self::Before,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// `.chart` text
    Chart,
    /// The converted model as JSON
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse {}", .0.display())]
    Parse(PathBuf),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("cannot serialize the chart: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();

    match run(&args) {
        Ok(path) => {
            log::info!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, CliError> {
    let source = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;
    let name = args.input.display().to_string();

    let SmOutput { document, warnings } = parse_sm(&source);
    emit_sm_warnings(&name, &source, &warnings);
    let document = document.map_err(|error| {
        emit_sm_error(&name, &source, &error);
        CliError::Parse(args.input.clone())
    })?;
    log::debug!(
        "{}: {} tempo points, {} stops, {} charts",
        document.header.title,
        document.tempo_points.len(),
        document.stop_points.len(),
        document.charts.len()
    );

    let config = ConvertConfig::default()
        .with_resolution(args.resolution)
        .with_stop_policy(args.stop_policy.into())
        .with_warp_filter(!args.no_warp_filter)
        .with_steps_type(args.steps_type.as_str());
    let ConvertOutput { chart, warnings } = convert_sm(&document, &config)?;
    emit_convert_warnings(&name, &source, &warnings);

    let text = match args.format {
        Format::Chart => chart.unparse(),
        Format::Json => serde_json::to_string_pretty(&chart)?,
    };
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, args.format));
    fs::write(&path, text).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn default_output(input: &Path, format: Format) -> PathBuf {
    input.with_file_name(match format {
        Format::Chart => "notes.chart",
        Format::Json => "notes.json",
    })
}
