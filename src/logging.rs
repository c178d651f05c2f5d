use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MIND_GAMES_LOG";

/// Games own the terminal, so logs only go to the file named by
/// `MIND_GAMES_LOG`. Without it nothing is installed and `tracing` calls are
/// no-ops. `RUST_LOG` narrows the filter (default `info`).
pub fn init() -> Result<(), String>
{
    let Some(path) = env::var_os(LOG_ENV) else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| format!("Failed to open log file {}: {err}", path.to_string_lossy()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| format!("Failed to start logging: {err}"))?;
    Ok(())
}
