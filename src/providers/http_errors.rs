use anyhow::anyhow;
use std::error::Error as StdError;
use std::io::ErrorKind;

/// Walks an error's source chain looking for an I/O error of `kind` or a
/// message containing `needle`.
fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if source
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io_err| io_err.kind() == kind)
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::TimedOut, "timed out")
}

pub(crate) fn completion_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return anyhow!(
            "Chat completion request timed out after {}s while calling '{}'. \
             Increase OPENAI_TIMEOUT_SECS or retry later.",
            timeout_secs,
            api_url
        );
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by chat completion API at '{}'. \
                 Check that OPENAI_BASE_URL points at a reachable endpoint.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to chat completion API at '{}'. \
             Check OPENAI_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call chat completion API at '{}': {}", api_url, err)
}
