use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogRotation, LoggingConfig};

/// Install the global subscriber for the replay binary: JSON events to a
/// rotating file under `log_dir`, plus an optional compact stderr mirror.
///
/// `RUST_LOG` wins over `default_filter`. The returned [`WorkerGuard`] flushes
/// the file writer on drop, so hold it until the process exits.
pub fn init_tracing(logging: &LoggingConfig) -> Result<WorkerGuard> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(logging)?);

    let stderr_layer = logging.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter(logging))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .json(),
        )
        .with(stderr_layer)
        .init();

    Ok(guard)
}

fn env_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.default_filter))
}

/// Rolling writer for `log_dir/file_name`, creating the directory first.
fn file_appender(logging: &LoggingConfig) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(&logging.log_dir)
        .with_context(|| format!("creating log directory {}", logging.log_dir))?;

    RollingFileAppender::builder()
        .rotation(rotation(logging.rotation))
        .filename_prefix(&logging.file_name)
        .build(&logging.log_dir)
        .with_context(|| format!("opening log file in {}", logging.log_dir))
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_in(dir: &std::path::Path, rotation: LogRotation) -> LoggingConfig {
        LoggingConfig {
            log_dir: dir.join("nested").to_string_lossy().into_owned(),
            rotation,
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_appender_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path(), LogRotation::Daily);
        let mut appender = file_appender(&config).unwrap();
        appender.write_all(b"{}\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path().join("nested"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("trade.log."), "{names:?}");
    }

    #[test]
    fn test_never_rotation_keeps_plain_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_in(tmp.path(), LogRotation::Never);
        let mut appender = file_appender(&config).unwrap();
        appender.write_all(b"{}\n").unwrap();
        appender.flush().unwrap();
        assert!(tmp.path().join("nested").join("trade.log").exists());
    }

    #[test]
    fn test_rotation_from_config() {
        let parsed: LoggingConfig =
            serde_json::from_str(r#"{ "rotation": "hourly", "stderr": false }"#).unwrap();
        assert_eq!(parsed.rotation, LogRotation::Hourly);
        assert!(!parsed.stderr);
        assert_eq!(rotation(parsed.rotation), Rotation::HOURLY);
        assert_eq!(parsed.file_name, "trade.log");
    }
}
