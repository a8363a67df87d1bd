use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn, Level};

use crate::analyzers::SignalAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::processors::{QualityChecker, SimulationPipeline};
use crate::readers::{SignalReader, WeatherReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::SignalWriter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Simulate {
            input,
            output,
            config,
            base_dbm,
            missing_rate,
            outlier_rate,
            seed,
            no_degrade,
            fill_gaps,
            normalize_locations,
            max_workers,
            sequential,
            json,
        } => {
            let mut settings = SimulationConfig::load(config.as_deref())?;
            if let Some(v) = base_dbm {
                settings.base_dbm = v;
            }
            if let Some(v) = missing_rate {
                settings.missing_rate = v;
            }
            if let Some(v) = outlier_rate {
                settings.outlier_rate = v;
            }
            if let Some(v) = seed {
                settings.random_seed = v;
            }
            if let Some(v) = max_workers {
                settings.max_workers = v;
            }
            if no_degrade {
                settings.degrade = false;
            }
            if fill_gaps {
                settings.fill_gaps = true;
            }
            if normalize_locations {
                settings.normalize_locations = true;
            }
            if sequential {
                settings.parallel = false;
            }

            println!("Simulating signal strength...");
            println!("Input file: {}", input.display());
            println!("Output file: {}", output.display());
            println!(
                "Base: {:.1} dBm, seed: {}, workers: {}",
                settings.base_dbm,
                settings.random_seed,
                if settings.parallel { settings.max_workers } else { 1 }
            );

            let pipeline = SimulationPipeline::new(settings)?;
            let rows = WeatherReader::new().read_rows(&input)?;

            let progress = ProgressReporter::new(rows.len() as u64, "Simulating...", json);
            let result = pipeline.run(rows, Some(&progress))?;

            let writer = SignalWriter::new().with_batch_size(pipeline.config().chunk_size);
            writer.write_records(&result.records, &output)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.statistics)?);
                return Ok(());
            }

            if let Some(report) = &result.gap_fill {
                println!(
                    "\nGap filling: {} cells filled, {} left null",
                    report.total_filled(),
                    report.total_unfilled()
                );
            }
            if let Some(report) = &result.degradation {
                println!("\n{}", report.summary());
            }
            println!("\n{}", result.statistics.detailed_summary());
            println!("{}", writer.get_file_info(&output)?.summary());
            println!("Simulation complete!");
        }

        Commands::Validate { input, strict } => {
            println!("Validating weather data...");
            println!("Input file: {}", input.display());

            let progress = ProgressReporter::new_spinner("Validating data...", false);

            let checker = QualityChecker::with_strict_mode(strict);
            let report = checker.check_file(&input)?;

            progress.finish_with_message("Validation complete");
            println!("\n{}", checker.generate_summary(&report));

            if !report.missing_columns.is_empty() {
                println!(
                    "❌ Missing required columns: {}",
                    report.missing_columns.join(", ")
                );
            } else if report.is_clean() {
                println!("✅ All data passed validation checks");
            } else {
                warn!(
                    violations = report.range_violations.len(),
                    nulls = report.total_nulls(),
                    "Weather data has quality issues"
                );
                println!(
                    "⚠️  Found {} range violations and {} null cells",
                    report.range_violations.len(),
                    report.total_nulls()
                );
            }
        }

        Commands::Info {
            input,
            sample,
            json,
        } => {
            let records = SignalReader::new().read_records(&input)?;
            let statistics = SignalAnalyzer::new().analyze(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&statistics)?);
                return Ok(());
            }

            println!("Analyzing signal file: {}", input.display());
            println!("\n{}", statistics.detailed_summary());

            println!("\nFile Details:");
            println!("{}", SignalWriter::new().get_file_info(&input)?.summary());

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(records.len()));
                for (i, record) in records.iter().take(sample).enumerate() {
                    let when = record
                        .timestamp()
                        .map_or_else(|| "-".to_string(), |ts| ts.to_string());
                    let signal = if record.has_signal() {
                        format!("{:.1} dBm", record.signal_dbm)
                    } else {
                        "no signal".to_string()
                    };
                    println!("{}. {} at {}: {}", i + 1, record.location(), when, signal);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // A subscriber may already be installed when run() is called more than once
    let installed = match log_file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .try_init()
            .is_ok(),
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };

    if installed {
        info!(verbose, "Logging initialised");
    }
    Ok(())
}
