//! Command-line controller
//!
//! Thin trigger surface around the engine: every command maps onto the
//! recorder/player start, stop and query calls.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventplay_rs::config::{config_path, EngineConfig};
use eventplay_rs::input::{InputInjector, LogInjector};
use eventplay_rs::keys::SPECIAL_KEYS;
use eventplay_rs::session::{LoopMode, Player, Recorder, Timeline};
#[cfg(not(feature = "native"))]
use eventplay_rs::EventPlayError;

/// Log a progress line every this many recorded events
const PROGRESS_EVERY: usize = 50;

/// Record and replay mouse and keyboard input
#[derive(Parser, Debug)]
#[command(name = "eventplay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to the app data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record input into a timeline file
    Record {
        /// Output timeline file
        #[arg(short, long)]
        output: PathBuf,

        /// Stop after this many seconds (default: wait for Enter)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Timeline name
        #[arg(short, long)]
        name: Option<String>,

        /// Seconds to wait before recording starts
        #[arg(long, default_value = "0")]
        countdown: f64,
    },

    /// Replay a timeline file
    Play {
        /// Timeline file
        file: PathBuf,

        /// Number of passes (0 = until stopped)
        #[arg(short, long = "loop")]
        loop_count: Option<i64>,

        /// Stop after this many seconds
        #[arg(long = "for")]
        run_for: Option<f64>,

        /// Log actions instead of performing them
        #[arg(long)]
        dry_run: bool,

        /// Seconds to wait before playback starts
        #[arg(long, default_value = "0")]
        countdown: f64,
    },

    /// Show a summary of a timeline file
    Info {
        /// Timeline file
        file: PathBuf,
    },

    /// List the special key names understood in timeline files
    Keys,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Load the config named on the command line, or the default one
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::load_or_default()),
    }
}

/// Run one command
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Record {
            output,
            duration,
            name,
            countdown,
        } => record(&config, &output, duration, name, countdown),
        Commands::Play {
            file,
            loop_count,
            run_for,
            dry_run,
            countdown,
        } => play(&config, &file, loop_count, run_for, dry_run, countdown),
        Commands::Info { file } => info(&file),
        Commands::Keys => {
            for (name, _) in SPECIAL_KEYS {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Config { init } => {
            if init {
                let path = match cli.config.as_deref() {
                    Some(path) => {
                        config.save(path)?;
                        path.to_path_buf()
                    }
                    None => config.save_default_location()?,
                };
                println!("Wrote {}", path.display());
            }
            print!("{}", config.to_toml_string()?);
            if let Some(path) = cli.config.or_else(config_path) {
                eprintln!("# {}", path.display());
            }
            Ok(())
        }
    }
}

fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("invalid --{} value {}", flag, value))
}

fn countdown(secs: f64, action: &str) -> Result<()> {
    let total = seconds(secs, "countdown")?;
    let whole = total.as_secs();
    for remaining in (1..=whole).rev() {
        tracing::info!("{} in {}...", action, remaining);
        std::thread::sleep(Duration::from_secs(1));
    }
    std::thread::sleep(total - Duration::from_secs(whole));
    Ok(())
}

#[cfg(feature = "native")]
fn input_source() -> Result<Arc<dyn eventplay_rs::input::InputSource>> {
    Ok(Arc::new(eventplay_rs::input::RdevSource::new()?))
}

#[cfg(not(feature = "native"))]
fn input_source() -> Result<Arc<dyn eventplay_rs::input::InputSource>> {
    Err(EventPlayError::Platform("built without the `native` feature".into()).into())
}

#[cfg(feature = "native")]
fn os_injector() -> Result<Box<dyn InputInjector>> {
    Ok(Box::new(eventplay_rs::input::EnigoInjector::new()?))
}

#[cfg(not(feature = "native"))]
fn os_injector() -> Result<Box<dyn InputInjector>> {
    Err(EventPlayError::Platform(
        "built without the `native` feature (try --dry-run)".into(),
    )
    .into())
}

fn record(
    config: &EngineConfig,
    output: &Path,
    duration: Option<f64>,
    name: Option<String>,
    countdown_secs: f64,
) -> Result<()> {
    let duration = duration.map(|d| seconds(d, "duration")).transpose()?;
    let recorder = Recorder::new(input_source()?, config.recorder.clone());

    let seen = AtomicUsize::new(0);
    recorder.set_on_event(move |event| {
        let count = seen.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PROGRESS_EVERY == 0 {
            tracing::info!("{} events | {:.1}s", count, event.timestamp);
        }
    });

    countdown(countdown_secs, "Recording")?;
    recorder.start()?;
    match duration {
        Some(duration) => {
            tracing::info!("Recording for {:.1}s", duration.as_secs_f64());
            std::thread::sleep(duration);
        }
        None => {
            tracing::info!("Recording; press Enter to stop");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
        }
    }

    let mut timeline = Timeline::from_events(recorder.stop());
    if let Some(name) = name {
        timeline.name = name;
    }
    timeline.save(output)?;
    println!("{} -> {}", timeline.summary(), output.display());
    Ok(())
}

fn play(
    config: &EngineConfig,
    file: &Path,
    loop_count: Option<i64>,
    run_for: Option<f64>,
    dry_run: bool,
    countdown_secs: f64,
) -> Result<()> {
    let timeline = Timeline::load(file)?;
    if timeline.is_empty() {
        bail!("{} has no events", file.display());
    }
    let run_for = run_for.map(|d| seconds(d, "for")).transpose()?;

    let injector: Box<dyn InputInjector> = if dry_run {
        Box::new(LogInjector::new())
    } else {
        os_injector()?
    };
    let player = Player::new(injector, config.player.clone());
    player.set_timeline(&timeline);
    if let Some(count) = loop_count {
        player.set_loop(count);
    }
    if player.loop_mode() == LoopMode::Infinite && run_for.is_none() {
        tracing::info!("Looping until interrupted (Ctrl-C)");
    }

    let (done_tx, done_rx) = bounded::<()>(1);
    player.set_on_complete(move || {
        let _ = done_tx.try_send(());
    });
    player.set_on_error(|message| tracing::warn!("{}", message));

    countdown(countdown_secs, "Playback")?;
    player.start()?;

    let finished = match run_for {
        Some(limit) => match done_rx.recv_timeout(limit) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => {
                player.stop();
                false
            }
            Err(RecvTimeoutError::Disconnected) => false,
        },
        None => done_rx.recv().is_ok(),
    };

    println!(
        "{} after {} passes",
        if finished { "Finished" } else { "Stopped" },
        player.passes_completed()
    );
    Ok(())
}

fn info(file: &Path) -> Result<()> {
    let timeline = Timeline::load(file)?;
    let summary = timeline.summary();
    println!("Name:       {}", timeline.name);
    println!("Created:    {}", timeline.created_at);
    println!("Events:     {}", summary.event_count);
    println!("Duration:   {:.3}s", summary.duration);
    for (kind, count) in &summary.per_type {
        println!("  {:<14}{}", kind, count);
    }
    Ok(())
}
