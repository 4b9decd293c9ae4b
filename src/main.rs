use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use peloton_tcx::logging::{init_logging, LogFormat};
use peloton_tcx::tcx::TcxReader;
use peloton_tcx::{AppConfig, BatchTranscoder, Transcoder, WorkoutRecord};

/// peloton-tcx - Workout to TCX converter
///
/// Converts Peloton workout records (performance-graph JSON) into Garmin
/// Training Center XML files ready for import.
#[derive(Parser)]
#[command(name = "peloton-tcx")]
#[command(version)]
#[command(about = "Convert Peloton workouts to Garmin TCX", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert workout record JSON files to TCX
    Convert {
        /// Workout record JSON file, or a directory of them
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write <workout id>.tcx files into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Seconds between samples (defaults to each record's granularity)
        #[arg(short, long)]
        granularity: Option<u32>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Print the lap summary of a TCX file
    Inspect {
        /// TCX file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = if cli.config.is_some() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::load_or_default()
    };

    config.logging.level = config.logging.level.raised_by(cli.verbose);
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Convert {
            input,
            output_dir,
            granularity,
            progress,
        } => {
            if output_dir.is_some() {
                config.transcode.output_dir = output_dir;
            }
            if granularity.is_some() {
                config.transcode.data_granularity_seconds = granularity;
            }
            config.validate()?;
            convert(&input, config, progress)
        }
        Commands::Inspect { file } => inspect(&file),
        Commands::Config { init, show } => {
            if init {
                config.save_to_file(&config_path)?;
                println!(
                    "{}",
                    format!("✓ Configuration written to {}", config_path.display()).green()
                );
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

fn convert(input: &Path, config: AppConfig, progress: bool) -> Result<()> {
    println!("{}", "Converting workouts...".green().bold());

    let mut records = Vec::new();
    for path in collect_inputs(input)? {
        match WorkoutRecord::from_file(&path) {
            Ok(record) => {
                tracing::info!(
                    title = %record.title,
                    workout_id = %record.id,
                    workout_date = %record.start_time.format("%a %b %-d %Y %H:%M:%S"),
                    "Found workout"
                );
                records.push(record);
            }
            Err(err) if err.is_skippable() => {
                if err.severity().to_tracing_level() == tracing::Level::WARN {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping workout record");
                } else {
                    tracing::error!(path = %path.display(), error = %err, "Failed to read workout record, skipping");
                }
                println!("  {} {}: {}", "✗".red(), path.display(), err.user_message());
            }
            Err(err) => return Err(err.into()),
        }
    }

    if records.is_empty() {
        println!("{}", "No workouts found".yellow());
        return Ok(());
    }

    let batch = BatchTranscoder::new(Transcoder::new(config.transcode)).with_progress(progress);
    let summary = batch.run(&records);

    for result in &summary.results {
        match (&result.written, &result.error) {
            (Some(path), _) => {
                println!("  {} {} -> {}", "✓".green(), result.title, path.display())
            }
            (None, Some(err)) => println!("  {} {}: {}", "✗".red(), result.title, err),
            (None, None) => println!("  {} {}", "✓".green(), result.title),
        }
    }
    println!("{}", summary.to_string_pretty());

    if summary.is_fully_successful() {
        println!("{}", "✓ Conversion completed".green());
    } else {
        println!("{}", "⚠ Conversion completed with errors".yellow());
    }
    Ok(())
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)
        .with_context(|| format!("Failed to read input directory: {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn inspect(file: &Path) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let doc = TcxReader::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse TCX file {}", file.display()))?;
    let lap = &doc.activity.lap;

    println!("{}", format!("Activity {}", doc.activity.id).cyan().bold());
    println!("  Sport: {}", doc.activity.sport);
    println!("  Duration: {:.0}s", lap.total_time_seconds);
    println!("  Distance: {} m", lap.distance_meters.normalize());
    println!("  Calories: {}", lap.calories);
    println!(
        "  Heart Rate: avg {} / max {} bpm",
        lap.average_heart_rate, lap.maximum_heart_rate
    );
    println!(
        "  Cadence: avg {} / max {} rpm",
        lap.cadence, lap.extension.max_bike_cadence
    );
    println!(
        "  Power: avg {} / max {} W",
        lap.extension.avg_watts, lap.extension.max_watts
    );
    println!(
        "  Speed: avg {:.2} / max {:.2} m/s",
        lap.extension.avg_speed, lap.maximum_speed
    );
    println!("  Trackpoints: {}", doc.trackpoints().len());
    Ok(())
}
