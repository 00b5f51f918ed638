use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};

mod audio;
mod color;
mod config;
mod display;
mod export;
mod session;
mod visualizer;
mod wheel;

use config::Config;
use display::terminal::RunOptions;
use session::Session;
use wheel::{SpinSpeed, WheelConfig};

#[derive(Parser, Debug)]
#[command(name = "wheelspin")]
#[command(author, version, about = "Spin a decision wheel of questions and tasks")]
pub struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a commented default config to the XDG config path and exit
    #[arg(long)]
    init_config: bool,

    /// Text file with one question per line
    #[arg(short, long)]
    items: Option<PathBuf>,

    /// Load a wheel exported as JSON (replaces configured items)
    #[arg(long)]
    import: Option<PathBuf>,

    /// Spin speed: slow, medium or fast
    #[arg(short, long)]
    speed: Option<SpinSpeed>,

    /// Seed for reproducible spins
    #[arg(long)]
    seed: Option<u64>,

    /// Disable tick sounds
    #[arg(short, long)]
    mute: bool,

    /// PulseAudio sink for tick sounds
    #[arg(long)]
    audio_device: Option<String>,

    /// Animation frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Hide the question list next to the wheel
    #[arg(long)]
    no_sidebar: bool,

    /// Directory for exported wheels
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Log file [default: $XDG_STATE_HOME/wheelspin/wheelspin.log]
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

/// Where logs go while the TUI owns the terminal
fn log_path(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    explicit.cloned().or_else(|| {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|dir| dir.join("wheelspin").join("wheelspin.log"))
    })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("wheelspin=info".parse()?);

    // Never stderr: it shares the alternate screen and would draw over the wheel
    match log_path(log_file) {
        Some(path) => {
            let file = open_log_file(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "wheelspin", &mut std::io::stdout());
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    init_logging(args.log_file.as_ref())?;

    // Explicit config must load; the default path is best-effort
    let (mut config, config_path) = match &args.config {
        Some(path) => (Config::load(path)?, Some(path.clone())),
        None => {
            let path = Config::default_path().filter(|p| p.exists());
            (Config::load_from_default_path().unwrap_or_default(), path)
        }
    };
    config.merge_args(&args);

    let mut session = Session::new(WheelConfig::default());
    session.rename(config.wheel.name.clone());
    session.set_questions(&config.startup_questions()?);

    let mut initial_status = None;
    if let Some(path) = &args.import {
        match export::import_from_file(path) {
            Ok(imported) => session.import(imported),
            Err(e) => {
                error!("Failed to import {}: {}", path.display(), e);
                initial_status = Some(format!(
                    "Failed to import wheel. Please check the file format. ({})",
                    e
                ));
            }
        }
    }

    info!(
        "Starting wheelspin: '{}' with {} items, speed {}",
        session.name(),
        session.total_count(),
        config.wheel.speed
    );

    let options = RunOptions {
        config_path,
        seed: args.seed,
        initial_status,
    };

    display::terminal::run(config, session, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_log_file_wins() {
        let path = PathBuf::from("/tmp/custom.log");
        assert_eq!(log_path(Some(&path)), Some(path));
    }

    #[test]
    fn test_default_log_file_is_not_the_terminal() {
        if let Some(path) = log_path(None) {
            assert!(path.ends_with("wheelspin/wheelspin.log"));
        }
    }

    #[test]
    fn test_open_log_file_creates_dirs_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("wheelspin").join("wheelspin.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }
}
