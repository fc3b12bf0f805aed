//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - Daily rotating application logs (deleted after 14 days)
//! - Permanent security logs (never deleted)
//! - Console output with env-filter control

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Number of days application logs are retained
const LOG_RETENTION_DAYS: i64 = 14;

/// Clean up old application log files (older than the retention window)
///
/// Call periodically (e.g., daily) to bound log size. Security logs are
/// never deleted.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if app_log_dir.exists() {
        for entry in fs::read_dir(app_log_dir)? {
            let entry = entry?;
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && let Some(date_part) = name.strip_prefix("app.")
                && let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && let Some(local_datetime) = Local
                    .from_local_datetime(&naive_date.and_hms_opt(0, 0, 0).unwrap())
                    .single()
                && local_datetime < cutoff
            {
                fs::remove_file(&path)?;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(())
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Default log level (e.g., "info", "debug")
/// * `json_format` - JSON output (production) vs. pretty console (development)
/// * `log_dir` - Optional directory for daily-rotated file logging
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let (app_layer, security_layer) = file_layers_json(dir)?;
            subscriber
                .with(console_layer)
                .with(vec![app_layer.boxed(), security_layer.boxed()])
                .init();
        } else {
            subscriber.with(console_layer).init();
        }
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let (app_layer, security_layer) = file_layers_json(dir)?;
            subscriber
                .with(console_layer)
                .with(vec![app_layer.boxed(), security_layer.boxed()])
                .init();
        } else {
            subscriber.with(console_layer).init();
        }
    }

    Ok(())
}

/// Build the JSON file layers: rotated application logs plus permanent
/// security logs split by target
fn file_layers_json<S>(
    dir: &str,
) -> anyhow::Result<(
    impl Layer<S> + Send + Sync,
    impl Layer<S> + Send + Sync,
)>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    let security_log_dir = log_dir.join("security");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&security_log_dir)?;

    // Daily rotating application logs (subject to the 14-day cleanup)
    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "security"
        }));

    // Permanent security logs (never deleted)
    let security_log = RollingFileAppender::new(Rotation::DAILY, security_log_dir, "security");
    let security_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(security_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "security"
        }));

    Ok((app_layer, security_layer))
}
