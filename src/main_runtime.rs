use predict_client::config::{AppConfig, LoggingConfig};
use predict_client::error::{PredictError, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub fn load_config(config_dir: &Path) -> Result<AppConfig> {
    let config = AppConfig::load_from(config_dir)?;
    config
        .validate()
        .map_err(|errors| PredictError::Validation(errors.join("; ")))?;
    Ok(config)
}

pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,predict_client={},predict={}", config.level, config.level))
    });

    // File logging is opt-in for a CLI: only when PREDICT_LOG_DIR is set.
    //
    // `tracing_appender::rolling::daily` panics if it can't create the
    // initial log file, so writability is checked first.
    let file_layer = std::env::var("PREDICT_LOG_DIR").ok().and_then(|log_dir| {
        if std::fs::create_dir_all(&log_dir).is_err() {
            eprintln!(
                "Warning: Could not create log directory {}, file logging disabled",
                log_dir
            );
            return None;
        }

        let test_path = Path::new(&log_dir).join(".predict_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(&log_dir, "predict.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Keep the guard alive for the rest of the process
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    });

    // Console goes to stderr so `--json` output on stdout stays clean
    let console_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });
    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init();
}
