//! taplock CLI
//!
//! Record a rhythm, or lock the terminal until it is tapped again.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::panic;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taplock::{
    rhythm::{self, RECORD_WIDTH},
    surface::terminal::restore_terminal,
    Config, Mode, ReferenceRhythm, SessionController, SessionOutcome, TerminalSurface,
    STORAGE_NOTICE, VERSION,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TAPLOCK_LOG";

#[derive(Parser)]
#[command(name = "taplock")]
#[command(version = VERSION)]
#[command(about = "Lock the screen until a recorded tap rhythm is reproduced", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new rhythm into FILE
    Record {
        /// Rhythm file to write
        file: PathBuf,
    },

    /// Lock until the rhythm stored in FILE is tapped
    Unlock {
        /// Rhythm file to read
        file: PathBuf,
    },

    /// Show the delays stored in a rhythm file
    Inspect {
        /// Rhythm file to read
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        /// Write the default configuration if none exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config_path = cli.config.unwrap_or_else(Config::config_path);

    let result = match cli.command {
        Commands::Record { file } => cmd_session(Mode::Record, &file, &config_path),
        Commands::Unlock { file } => cmd_session(Mode::Unlock, &file, &config_path),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Config { init } => cmd_config(&config_path, init),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_session(mode: Mode, file: &Path, config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load_from(config_path)
        .with_context(|| format!("Cannot load configuration from {config_path:?}"))?;

    install_terminal_guards();

    let title = match mode {
        Mode::Record => "TapLock: tap a new rhythm",
        Mode::Unlock => "TapLock: tap your rhythm to unlock",
    };
    let mut surface = TerminalSurface::open(title)?;
    let mut session = SessionController::from_config(&config);

    let result = session.run(mode, &mut surface, file);
    surface.close();

    let report = result?;
    info!(
        attempts = report.stats.attempts,
        bad_rhythms = report.stats.bad_rhythms,
        "Session finished"
    );

    match report.outcome {
        SessionOutcome::Recorded { taps } => {
            println!("Recorded a {taps}-tap rhythm into {file:?}");
            println!();
            println!("{STORAGE_NOTICE}");
        }
        SessionOutcome::Unlocked => {
            println!("Unlocked.");
        }
    }
    Ok(())
}

/// Restore the terminal if the process panics or is told to terminate.
fn install_terminal_guards() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    if let Err(e) = ctrlc::set_handler(|| {
        restore_terminal();
        std::process::exit(1);
    }) {
        warn!("Could not install termination handler: {e}");
    }
}

fn cmd_inspect(file: &Path, json: bool) -> anyhow::Result<()> {
    let reference = rhythm::load(file)?;

    if json {
        let value = inspect_json(file, &reference);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Rhythm file: {file:?}");
    println!("  Taps: {}", reference.tap_count());
    println!("  Delays:");
    for (i, delay) in reference.delays().iter().enumerate() {
        println!("    {:>2}: {:>10.3} ms", i + 1, *delay as f64 / 1000.0);
    }
    println!("  Total: {:.3} ms", reference.total_micros() as f64 / 1000.0);
    Ok(())
}

fn inspect_json(file: &Path, reference: &ReferenceRhythm) -> serde_json::Value {
    serde_json::json!({
        "file": file,
        "record_width": RECORD_WIDTH,
        "taps": reference.tap_count(),
        "delays_us": reference.delays(),
        "total_us": reference.total_micros(),
    })
}

fn cmd_config(config_path: &Path, init: bool) -> anyhow::Result<()> {
    if init {
        if config_path.exists() {
            bail!("Configuration already exists at {config_path:?}");
        }
        Config::default().save_to(config_path)?;
        println!("Wrote default configuration to {config_path:?}");
        return Ok(());
    }

    let config = Config::load_from(config_path)?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {config_path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
