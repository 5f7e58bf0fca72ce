use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::config::default_log_dir;

const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_NAME: &str = "wut.log";

/// Route tracing output to a log file, since the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines when dropped; keep it alive for the
/// whole run.
pub fn init_tracing(filter: Option<&str>, log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let directive: Directive = filter
        .unwrap_or(DEFAULT_FILTER)
        .parse()
        .with_context(|| format!("invalid log directive '{}'", filter.unwrap_or_default()))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let (dir, file_name) = log_target(log_file);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();

    Ok(installed.ok().map(|_| guard))
}

fn log_target(log_file: Option<PathBuf>) -> (PathBuf, String) {
    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| LOG_FILE_NAME.to_string());
            (dir, name)
        }
        None => (default_log_dir(), LOG_FILE_NAME.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_log_file_splits_into_dir_and_name() {
        let (dir, name) = log_target(Some(PathBuf::from("/var/tmp/wut/debug.log")));
        assert_eq!(dir, PathBuf::from("/var/tmp/wut"));
        assert_eq!(name, "debug.log");

        let (dir, name) = log_target(Some(PathBuf::from("trace.log")));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "trace.log");
    }

    #[test]
    fn default_target_uses_data_dir() {
        let (dir, name) = log_target(None);
        assert_eq!(dir, default_log_dir());
        assert_eq!(name, LOG_FILE_NAME);
    }

    #[test]
    fn rejects_malformed_directive() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let err = init_tracing(Some("wut=loud"), Some(dir.path().join("wut.log"))).unwrap_err();
        assert!(err.to_string().contains("invalid log directive"));
    }
}
