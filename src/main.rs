use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use num_bigint::BigInt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collatz_scan::{
    config::{Config, Decision},
    engine::{BaseConvention, MemoCache},
    errors::{AppResult, CollatzError},
    persistence::CacheStore,
    report::ScanReport,
    scanner::{LoggingProgress, RangeScanner, ScanRange, ScanResult, UpperBound},
    session::Prompter,
    trajectory::Trajectory,
    utils::format_elapsed,
};

/// Exit status for rejected input
const EXIT_INVALID_INPUT: u8 = 2;
/// Exit status after Ctrl-C, as a shell reports SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "collatz-scan")]
#[command(version)]
#[command(about = "Find the number with the longest Collatz trajectory in a range")]
#[command(long_about = None)]
struct Cli {
    /// First value of the range (prompted for when omitted)
    #[arg(allow_negative_numbers = true)]
    start: Option<BigInt>,

    /// Last value of the range (prompted for when omitted)
    #[arg(allow_negative_numbers = true)]
    end: Option<BigInt>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Whether END is part of the range (inclusive, exclusive)
    #[arg(long, value_name = "BOUND")]
    upper_bound: Option<UpperBound>,

    /// Length assigned to 1 (transitions, terms)
    #[arg(long, value_name = "CONVENTION")]
    convention: Option<BaseConvention>,

    /// Memo cache snapshot path (overrides config file)
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// Neither load nor save the memo cache snapshot
    #[arg(long)]
    no_cache: bool,

    /// Save the memo cache after the scan (always, never, ask)
    #[arg(long, value_name = "WHEN")]
    save_cache: Option<Decision>,

    /// Print the trajectory of the arg-max (always, never, ask)
    #[arg(long, value_name = "WHEN")]
    show_sequence: Option<Decision>,

    /// Write a results file (always, never, ask)
    #[arg(long, value_name = "WHEN")]
    report: Option<Decision>,

    /// List every scanned value in the results file (always, never, ask)
    #[arg(long, value_name = "WHEN")]
    include_range: Option<Decision>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(upper_bound) = self.upper_bound {
            config.scan.upper_bound = upper_bound;
        }
        if let Some(convention) = self.convention {
            config.engine.base_convention = convention;
        }
        if let Some(path) = &self.cache_file {
            config.cache.path = path.clone();
        }
        if self.no_cache {
            config.cache.load_on_start = false;
            config.cache.save = Decision::Never;
        }
        if let Some(save) = self.save_cache {
            config.cache.save = save;
        }
        if let Some(show) = self.show_sequence {
            config.report.show_trajectory = show;
        }
        if let Some(write) = self.report {
            config.report.write = write;
        }
        if let Some(listing) = self.include_range {
            config.report.include_range_listing = listing;
        }
    }
}

type Terminal = Prompter<io::StdinLock<'static>, io::Stdout>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_filter = format!("collatz_scan={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting collatz-scan v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());
    cli.apply_overrides(&mut config);

    let mut terminal: Terminal = Prompter::new(io::stdin().lock(), io::stdout());
    terminal.say("Collatz Conjecture - Maximum Steps Calculator")?;
    terminal.say("--------------------------------------------")?;

    let range = match read_range(&cli, &config, &mut terminal) {
        Ok(range) => range,
        Err(CollatzError::InvalidArgument { message }) => {
            terminal.say(&message)?;
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
        Err(e) => return Err(e.into()),
    };

    let store = CacheStore::new(&config.cache.path);
    let cache = if config.cache.load_on_start {
        store.load_or_empty(config.engine.base_convention)
    } else {
        MemoCache::new(config.engine.base_convention)
    };
    if cache.len() > 1 {
        terminal.say(&format!(
            "Loaded {} pre-calculated results from storage.",
            cache.len()
        ))?;
    }

    let cancel = CancellationToken::new();
    let scan_done = CancellationToken::new();
    spawn_interrupt_watcher(cancel.clone(), scan_done.clone());

    let interval = config.scan.progress_update_interval;
    let scan_range = range.clone();
    let scan_cancel = cancel.clone();
    let (cache, outcome, elapsed) = tokio::task::spawn_blocking(move || {
        let mut cache = cache;
        let mut progress = LoggingProgress::new(interval);
        let started = Instant::now();
        let outcome =
            RangeScanner::new(&mut cache).scan_with(&scan_range, &mut progress, &scan_cancel);
        (cache, outcome, started.elapsed())
    })
    .await?;
    scan_done.cancel();

    match outcome {
        Ok(result) => {
            finish(&config, &store, &cache, &result, elapsed, &mut terminal)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(CollatzError::InterruptedScan { scanned, partial }) => {
            terminal.say("\nCalculation interrupted.")?;
            info!("Interrupted after {} values", scanned);
            if let Some(partial) = partial {
                terminal.say(&format!(
                    "Best so far (up to {}): {} with {} steps",
                    partial.last_scanned, partial.argmax, partial.max_length
                ))?;
            }
            if terminal.decide(
                config.cache.save,
                "Would you like to save calculated results before exiting?",
            )? {
                save_cache(&store, &cache, &mut terminal)?;
            }
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(e) => Err(e.into()),
    }
}

/// Range from the command line, prompting for whatever bound is missing.
fn read_range(cli: &Cli, config: &Config, terminal: &mut Terminal) -> AppResult<ScanRange> {
    let start = match &cli.start {
        Some(start) => start.clone(),
        None => terminal.ask_integer("Enter the starting number: ")?,
    };
    let end = match &cli.end {
        Some(end) => end.clone(),
        None => terminal.ask_integer("Enter the ending number: ")?,
    };

    ScanRange::new(&start, &end, config.scan.upper_bound)
}

/// Cancel the scan on the first Ctrl-C; exit on a Ctrl-C after that.
fn spawn_interrupt_watcher(cancel: CancellationToken, scan_done: CancellationToken) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for Ctrl-C: {}", e);
                return;
            }
            if cancel.is_cancelled() || scan_done.is_cancelled() {
                std::process::exit(i32::from(EXIT_INTERRUPTED));
            }
            info!("Interrupt received, stopping scan");
            cancel.cancel();
        }
    });
}

fn finish(
    config: &Config,
    store: &CacheStore,
    cache: &MemoCache,
    result: &ScanResult,
    elapsed: Duration,
    terminal: &mut Terminal,
) -> Result<()> {
    terminal.say("\nResults:")?;
    terminal.say(&format!(
        "The number with the maximum steps is: {}",
        result.argmax
    ))?;
    terminal.say(&format!("Number of steps: {}", result.max_length))?;
    terminal.say(&format!("Calculation completed in: {}", format_elapsed(elapsed)))?;
    terminal.say(&format!("New calculations: {}", result.new_entries))?;
    terminal.say(&format!("Total cached results: {}", result.total_cached))?;

    if terminal.decide(
        config.cache.save,
        "\nWould you like to save calculated results for future use?",
    )? {
        save_cache(store, cache, terminal)?;
    }

    if terminal.decide(
        config.report.show_trajectory,
        "\nWould you like to see the sequence for the maximum steps number?",
    )? {
        let summary = Trajectory::from_positive(result.argmax.clone())?
            .summarize(config.report.trajectory_edge);
        terminal.say(&summary.caption())?;
        terminal.say(&summary.to_string())?;
    }

    if terminal.decide(
        config.report.write,
        "\nWould you like to save detailed results to a file?",
    )? {
        let mut report =
            ScanReport::new(result, elapsed).with_trajectory(config.report.include_trajectory);
        if terminal.decide(
            config.report.include_range_listing,
            "Would you like to include results for all numbers in the range?",
        )? {
            report = report.with_range_listing(cache);
        }
        match report.write_to_dir(&config.report.directory) {
            Ok(path) => terminal.say(&format!("Results saved to {}", path.display()))?,
            Err(e) => {
                error!("Failed to write results file: {}", e);
                terminal.say(&format!("Error saving results: {}", e))?;
            }
        }
    }

    Ok(())
}

/// Save failures are reported but never fatal.
fn save_cache(store: &CacheStore, cache: &MemoCache, terminal: &mut Terminal) -> Result<()> {
    match store.save(cache) {
        Ok(saved) => terminal.say(&format!(
            "Saved {} calculated results to storage for future use.",
            saved
        ))?,
        Err(e) => {
            error!("Error saving memoization data: {}", e);
            terminal.say(&format!("Error saving memoization data: {}", e))?;
        }
    }
    Ok(())
}
