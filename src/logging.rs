use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

// stderr also carries the user-facing error reports.
const DEFAULT_LOG_FILTER: &str = "error";
const DEFAULT_LOG_FILE_PATH: &str = "logs/chatgpt.log";
const FALLBACK_LOG_FILE_NAME: &str = "chatgpt.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    output: LogOutput,
    file_path: PathBuf,
}

impl LogSettings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            format: parse_log_format(get_var("LOG_FORMAT").as_deref()),
            output: parse_log_output(get_var("LOG_OUTPUT").as_deref()),
            file_path: parse_log_file_path(get_var("LOG_FILE_PATH").as_deref()),
        }
    }
}

fn normalized(raw: Option<&str>) -> Option<String> {
    raw.map(|value| value.trim().to_ascii_lowercase())
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match normalized(raw).as_deref() {
        Some("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match normalized(raw).as_deref() {
        Some("file") => LogOutput::File,
        Some("both") => LogOutput::Both,
        _ => LogOutput::Stderr,
    }
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH))
}

fn build_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(FALLBACK_LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter_from_env())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

fn install_with_file(settings: &LogSettings) -> (InitResult, Option<WorkerGuard>) {
    let include_stderr = settings.output == LogOutput::Both;

    match build_file_writer(&settings.file_path) {
        Ok((file_writer, guard)) => {
            let writer = if include_stderr {
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };

            let result = install(settings.format, writer);
            let guard = result.is_ok().then_some(guard);
            (result, guard)
        }
        Err(err) => {
            let (mode, fallback) = if include_stderr {
                ("both", "using stderr only")
            } else {
                ("file", "using stderr instead")
            };
            eprintln!(
                "chatgpt: failed to initialize LOG_OUTPUT={} at '{}': {}; {}",
                mode,
                settings.file_path.display(),
                err,
                fallback
            );
            (
                install(settings.format, BoxMakeWriter::new(std::io::stderr)),
                None,
            )
        }
    }
}

/// Installs the global subscriber from `LOG_FORMAT`, `LOG_OUTPUT`,
/// `LOG_FILE_PATH` and `RUST_LOG`. Logs never touch stdout, which carries
/// replies.
///
/// File output is written by a background worker; keep the returned guard
/// alive until the program is done so buffered lines get flushed.
#[must_use = "dropping the guard stops the file log writer"]
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());

    let (result, guard) = match settings.output {
        LogOutput::Stderr => (
            install(settings.format, BoxMakeWriter::new(std::io::stderr)),
            None,
        ),
        LogOutput::File | LogOutput::Both => install_with_file(&settings),
    };

    // A subscriber may already be installed; keep it.
    let _ = result;
    guard
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{
        DEFAULT_LOG_FILE_PATH, LogFormat, LogOutput, LogSettings, parse_log_file_path,
        parse_log_format, parse_log_output,
    };

    fn settings_from_pairs(pairs: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        LogSettings::from_env_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn settings_default_to_pretty_stderr() {
        assert_eq!(
            settings_from_pairs(&[]),
            LogSettings {
                format: LogFormat::Pretty,
                output: LogOutput::Stderr,
                file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
            }
        );
    }

    #[test]
    fn settings_read_configured_values() {
        let settings = settings_from_pairs(&[
            ("LOG_FORMAT", "json"),
            ("LOG_OUTPUT", "both"),
            ("LOG_FILE_PATH", "/tmp/chat/session.log"),
        ]);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.output, LogOutput::Both);
        assert_eq!(settings.file_path, PathBuf::from("/tmp/chat/session.log"));
    }

    #[test]
    fn parse_log_format_accepts_json_in_any_case() {
        assert_eq!(parse_log_format(Some(" JSON ")), LogFormat::Json);
        assert_eq!(parse_log_format(Some("unknown")), LogFormat::Pretty);
        assert_eq!(parse_log_format(None), LogFormat::Pretty);
    }

    #[test]
    fn parse_log_output_accepts_file_and_both() {
        assert_eq!(parse_log_output(Some("file")), LogOutput::File);
        assert_eq!(parse_log_output(Some(" BOTH ")), LogOutput::Both);
        assert_eq!(parse_log_output(Some("stdout")), LogOutput::Stderr);
        assert_eq!(parse_log_output(None), LogOutput::Stderr);
    }

    #[test]
    fn parse_log_file_path_uses_default_for_missing_or_empty_values() {
        assert_eq!(
            parse_log_file_path(None),
            PathBuf::from(DEFAULT_LOG_FILE_PATH)
        );
        assert_eq!(
            parse_log_file_path(Some("  ")),
            PathBuf::from(DEFAULT_LOG_FILE_PATH)
        );
        assert_eq!(
            parse_log_file_path(Some("custom/chatgpt.log")),
            PathBuf::from("custom/chatgpt.log")
        );
    }
}
