use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_PATH: &str = "/tmp/delegering.log";

/// Install the global fmt subscriber. The terminal belongs to the UI, so
/// output goes to a file whenever stderr is a terminal.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match resolve_log_path(config) {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    // A subscriber installed earlier (tests, embedding) wins.
    if let Err(err) = installed {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
    Ok(())
}

fn resolve_log_path(config: &Config) -> Option<PathBuf> {
    config.log_path.clone().or_else(|| {
        if std::io::stderr().is_terminal() {
            Some(PathBuf::from(DEFAULT_LOG_PATH))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolve_log_path_prefers_configured_path() {
        let config = Config {
            api_url: "http://localhost:10000".to_string(),
            request_timeout: Duration::from_secs(60),
            log_path: Some(PathBuf::from("/tmp/test-delegering.log")),
            log_level: "debug".to_string(),
        };
        assert_eq!(
            resolve_log_path(&config),
            Some(PathBuf::from("/tmp/test-delegering.log"))
        );
    }
}
