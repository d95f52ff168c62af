//! Logging system configuration and initialization
//!
//! Sets up `tracing` output for crawls:
//! - Console and file output, each optional
//! - Plain or JSON file records
//! - Timestamps in Paris time (fixed UTC+1)
//! - The previous run's log file is renamed with its timestamp, old files are pruned
//! - `RUST_LOG` overrides the configured filter

#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    filter::Directive,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

const PARIS_OFFSET_SECONDS: i32 = 3600;

// Keeps the non-blocking file writers alive for the whole process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Current time in Paris, ignoring daylight saving
pub fn paris_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(PARIS_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

/// Log timestamps in Paris time
struct ParisTimeFormatter;

impl FormatTime for ParisTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", paris_now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LoggingConfig::default())
}

/// Filter directives used when `RUST_LOG` is not set.
///
/// Below TRACE, HTTP and HTML parser internals are turned down to the levels in
/// `module_filters`; the crate itself logs at the configured level.
pub fn default_filter_directives(config: &LoggingConfig) -> Vec<String> {
    let mut directives = vec![config.level.clone()];

    if !config.level.to_lowercase().contains("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        directives.extend(modules.into_iter().map(|(module, level)| format!("{}={}", module, level)));
        directives.push(format!("immo_annonces_lib={}", config.level));
    }

    directives
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = default_filter_directives(config).into_iter();
    let base = directives.next().unwrap_or_else(|| "info".to_string());
    let mut filter = EnvFilter::try_new(&base)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", base, e))?;

    for directive in directives {
        let parsed: Directive = directive
            .parse()
            .map_err(|e| anyhow!("Invalid log filter '{}': {}", directive, e))?;
        filter = filter.add_directive(parsed);
    }

    Ok(filter)
}

/// Rename the previous run's log file with its timestamp
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<Option<PathBuf>> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(None);
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;
    let file_time = metadata
        .modified()
        .or_else(|_| metadata.created())
        .unwrap_or_else(|_| std::time::SystemTime::now());

    let datetime: DateTime<Utc> = file_time.into();
    let offset = FixedOffset::east_opt(PARIS_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
    let file_stem = log_file_name.trim_end_matches(".log");
    let timestamped_name = format!(
        "{}.{}.log",
        file_stem,
        datetime.with_timezone(&offset).format("%Y%m%dT%H%M%S")
    );
    let timestamped_path = log_dir.join(&timestamped_name);

    std::fs::rename(&log_file_path, &timestamped_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            timestamped_path.display(),
            e
        )
    })?;

    Ok(Some(timestamped_path))
}

/// Delete the oldest `.log` files beyond `max_files`; returns how many were removed
pub fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path.extension().is_some_and(|ext| ext == "log");
        if !path.is_file() || !is_log {
            continue;
        }
        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(max_files as usize) {
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove old log file {:?}: {}", path, e),
        }
    }

    Ok(removed)
}

/// Console layer for whichever stack it ends up in
fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::Layer::new()
        .with_writer(std::io::stdout)
        .with_timer(ParisTimeFormatter)
        .with_target(false)
}

fn store_guard(guard: tracing_appender::non_blocking::WorkerGuard) -> Result<()> {
    LOG_GUARDS
        .lock()
        .map_err(|_| anyhow!("Log guard storage poisoned"))?
        .push(guard);
    Ok(())
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// ```bash
/// # Show HTTP client details
/// RUST_LOG="debug,reqwest=debug,hyper=debug" immo-annonces crawl
///
/// # Only extraction decisions
/// RUST_LOG="warn,immo_annonces_lib::infrastructure::parsing=debug" immo-annonces extract page.html
/// ```
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    let log_dir = config.directory.clone().unwrap_or_else(get_log_directory);
    let env_filter = build_env_filter(&config)?;
    let registry = Registry::default().with(env_filter);

    let mut rotated = None;
    let mut removed = 0;
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;
        rotated = rotate_existing_log_file(&log_dir, &config.file_name)?;
        // The fresh file is created next, so keep one slot for it
        removed = cleanup_old_logs(&log_dir, config.max_files.saturating_sub(1))?;
    }

    let init_result = match (config.file_output, config.console_output) {
        (true, console) => {
            let file_appender = rolling::never(&log_dir, &config.file_name);
            let (file_writer, file_guard) = non_blocking(file_appender);
            store_guard(file_guard)?;

            if config.json_format {
                let file_layer = fmt::Layer::new()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(ParisTimeFormatter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false);
                registry.with(file_layer).with(console.then(console_layer)).try_init()
            } else {
                // time + level + message only
                let file_layer = fmt::Layer::new()
                    .with_writer(file_writer)
                    .with_timer(ParisTimeFormatter)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false);
                registry.with(file_layer).with(console.then(console_layer)).try_init()
            }
        }
        (false, true) => registry.with(console_layer()).try_init(),
        (false, false) => return Err(anyhow!("No logging output configured")),
    };
    init_result.map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
        if let Some(path) = rotated {
            info!("Rotated previous log file to: {:?}", path);
        }
        if removed > 0 {
            info!("Removed {} old log files (keeping {})", removed, config.max_files);
        }
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== immo-annonces ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.level.is_empty());
        assert!(config.console_output);
        assert!(config.file_output);
    }

    #[test]
    fn test_log_directory_creation() {
        let log_dir = get_log_directory();
        assert!(log_dir.to_string_lossy().ends_with("logs"));
    }

    #[test]
    fn test_default_directives_quiet_dependencies() {
        let directives = default_filter_directives(&LoggingConfig::default());
        assert_eq!(directives[0], "info");
        assert!(directives.contains(&"html5ever=warn".to_string()));
        assert!(directives.contains(&"reqwest=info".to_string()));
        assert!(directives.contains(&"immo_annonces_lib=info".to_string()));
    }

    #[test]
    fn test_trace_level_keeps_everything() {
        let config = LoggingConfig { level: "trace".to_string(), ..LoggingConfig::default() };
        assert_eq!(default_filter_directives(&config), vec!["trace".to_string()]);
    }

    #[test]
    fn test_paris_time_offset() {
        assert_eq!(paris_now().offset().local_minus_utc(), PARIS_OFFSET_SECONDS);
    }

    #[test]
    fn test_rotation_renames_previous_log() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("run.log"), "previous run").unwrap();

        let rotated = rotate_existing_log_file(dir.path(), "run.log").unwrap().unwrap();
        assert!(!dir.path().join("run.log").exists());
        assert!(rotated.file_name().unwrap().to_string_lossy().starts_with("run."));
        assert!(rotate_existing_log_file(dir.path(), "run.log").unwrap().is_none());
    }

    // The only test that installs the global subscriber
    #[test]
    fn test_init_with_plain_file_and_console() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            json_format: false,
            console_output: true,
            file_output: true,
            directory: Some(dir.path().to_path_buf()),
            file_name: "crawl.log".to_string(),
            ..LoggingConfig::default()
        };

        init_logging_with_config(config).unwrap();
        assert!(dir.path().join("crawl.log").exists());
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        for name in ["a.log", "b.log", "c.log"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "kept").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), 1).unwrap(), 2);
        let remaining_logs = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "log"))
            .count();
        assert_eq!(remaining_logs, 1);
        assert!(dir.path().join("notes.txt").exists());
    }
}
