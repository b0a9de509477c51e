//! Veering Guidance CLI Application
//!
//! Command-line front end for the veering-core library. It adds:
//! - Application configuration (config.toml)
//! - Logging setup
//! - Replay of captured reader output in place of a live serial port
//! - A console notifier standing in for the phone link

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use veering_core::{
    Action, CycleOrchestrator, NoSettle, OrchestratorError, ThreadSettle, ZoneClassifier,
};

mod config;
mod notifier;
mod replay;

use config::AppConfig;
use notifier::ConsoleNotifier;
use replay::ReplayStream;

/// Veering Guidance - Turn RFID tag readings into walking directions
#[derive(Parser, Debug)]
#[command(name = "veering-cli")]
#[command(about = "Decide veering guidance from RFID reader output", long_about = None)]
#[command(version)]
struct Args {
    /// Path to tags.json with left/right/center tag ids
    #[arg(short, long, value_name = "FILE")]
    tags: Option<PathBuf>,

    /// Captured reader output to replay, one line per sampling iteration
    #[arg(short, long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many decision cycles
    #[arg(long, value_name = "COUNT")]
    cycles: Option<u64>,

    /// Sample iterations per decision cycle
    #[arg(long, value_name = "COUNT")]
    samples: Option<usize>,

    /// Skip the hardware settle delays (useful for replays)
    #[arg(long)]
    no_settle: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Veering Guidance CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using core library v{}", veering_core::VERSION);

    let app_config = load_app_config(&args)?;

    let tags_path = args.tags.clone().unwrap_or_else(|| app_config.tags.file.clone());
    let classifier = ZoneClassifier::from_file(&tags_path)
        .with_context(|| format!("Cannot start without tag configuration {:?}", tags_path))?;

    if args.check_config {
        return check_config_mode(&app_config, &classifier);
    }

    let Some(replay_path) = &args.replay else {
        bail!(
            "No reader input given. This build has no serial driver; pass --replay <FILE> \
             with captured output from {} ({} baud)",
            app_config.reader.device,
            app_config.reader.baud_rate
        );
    };
    let stream = ReplayStream::from_file(replay_path)?;
    let notifier = ConsoleNotifier::stdout(app_config.notifier.device_name.clone());

    if args.no_settle {
        run_loop(stream, notifier, NoSettle::default(), classifier, app_config)
    } else {
        run_loop(stream, notifier, ThreadSettle, classifier, app_config)
    }
}

/// Merge config.toml (if any) with command-line overrides
fn load_app_config(args: &Args) -> Result<AppConfig> {
    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(samples) = args.samples {
        app_config.cycle.samples_per_cycle = samples;
    }
    if let Some(cycles) = args.cycles {
        app_config.cycle.max_cycles = Some(cycles);
    }
    app_config
        .cycle
        .validate()
        .context("Invalid cycle settings")?;

    log::debug!("Configuration: {:?}", app_config);
    Ok(app_config)
}

fn check_config_mode(app_config: &AppConfig, classifier: &ZoneClassifier) -> Result<()> {
    let zones = classifier.zone_map();
    let cycle = &app_config.cycle;

    println!("Configuration OK");
    println!("  Left tags:    {}", zones.left.len());
    println!("  Right tags:   {}", zones.right.len());
    println!("  Center tags:  {}", zones.center.len());
    println!("  Overlapping:  {}", zones.overlaps().len());
    println!(
        "  Cycle:        {} samples, {} ms settle, {} ms handshake settle",
        cycle.samples_per_cycle, cycle.settle_delay_ms, cycle.init_settle_delay_ms
    );
    println!(
        "  Reader:       {} @ {} baud",
        app_config.reader.device, app_config.reader.baud_rate
    );
    println!("  Phone:        {}", app_config.notifier.device_name);
    Ok(())
}

fn run_loop<D: veering_core::Settle>(
    stream: ReplayStream,
    notifier: ConsoleNotifier<std::io::Stdout>,
    settle: D,
    classifier: ZoneClassifier,
    app_config: AppConfig,
) -> Result<()> {
    let mut orchestrator = CycleOrchestrator::new(
        stream,
        notifier,
        settle,
        Arc::new(classifier),
        app_config.cycle,
    )?;

    orchestrator.initialize()?;

    match orchestrator.run() {
        Ok(summary) => {
            log::info!("Stopped after {} cycle(s)", summary.cycles);
        }
        Err(OrchestratorError::Hardware(e)) if e.is_disconnect() => {
            log::info!(
                "Reader input ended after {} cycle(s): {}",
                orchestrator.cycles_completed(),
                e
            );
        }
        Err(e) => return Err(e.into()),
    }

    let last = orchestrator.notifier().last_action().unwrap_or(Action::Unknown);
    log::info!(
        "{} action(s) sent, last: {}",
        orchestrator.notifier().sent(),
        last
    );
    Ok(())
}

/// Verbosity flags to the level used for this project's own log targets
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    use log::LevelFilter;

    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Route veering-core and veering-cli records at the requested level, everything else at warn.
/// `VEERING_LOG` (env_logger filter syntax) overrides both.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = log_level(verbose, quiet);

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("veering_core", level)
        .filter_module("veering_cli", level)
        .parse_env("VEERING_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(log_level(0, false), LevelFilter::Info);
        assert_eq!(log_level(1, false), LevelFilter::Debug);
        assert_eq!(log_level(3, false), LevelFilter::Trace);
        assert_eq!(log_level(2, true), LevelFilter::Error);
    }
}
