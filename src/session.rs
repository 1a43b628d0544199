use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::{debug, info};

use crate::completion::CompletionInvoker;
use crate::model::Role;
use crate::sanitize::sanitize;
use crate::transcript::Transcript;

pub const PROMPT: &str = "ChatGPT> ";

const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

fn is_exit_keyword(content: &str) -> bool {
    EXIT_KEYWORDS.contains(&content)
}

/// Interactive loop: one line in, one reply out, until EOF or an exit keyword.
///
/// A failed read discards the line and a failed completion leaves the user
/// turn unanswered; both are reported on `diag` and the loop keeps going.
pub async fn run_repl<R, W, D, C>(
    mut input: R,
    out: &mut W,
    diag: &mut D,
    invoker: &C,
    transcript: &mut Transcript,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    D: Write,
    C: CompletionInvoker + ?Sized,
{
    loop {
        write!(out, "{PROMPT}").context("Failed to write prompt")?;
        out.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                writeln!(out, "EOF received. Exiting...").context("Failed to write to stdout")?;
                info!(turns = transcript.len(), "input closed, ending session");
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "failed to read input line");
                writeln!(diag, "{err}").context("Failed to write to stderr")?;
                continue;
            }
        }

        let content = sanitize(&line);
        if is_exit_keyword(&content) {
            info!(turns = transcript.len(), "exit keyword received, ending session");
            return Ok(());
        }

        transcript.append(Role::User, content);
        debug!(turns = transcript.len(), "requesting completion");

        let reply = match invoker.complete(transcript.snapshot()).await {
            Ok(reply) => reply,
            Err(err) => {
                debug!(error = %err, turns = transcript.len(), "completion failed");
                writeln!(diag, "ChatCompletion error: {err:#}")
                    .context("Failed to write to stderr")?;
                continue;
            }
        };

        writeln!(out, "{reply}").context("Failed to write reply")?;
        transcript.append(Role::Assistant, reply);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneshotStatus {
    Replied,
    Failed,
}

impl OneshotStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Replied => ExitCode::SUCCESS,
            Self::Failed => ExitCode::FAILURE,
        }
    }
}

/// Single message, single completion call, no loop.
pub async fn run_oneshot<W, D, C>(
    message: &str,
    out: &mut W,
    diag: &mut D,
    invoker: &C,
) -> Result<OneshotStatus>
where
    W: Write,
    D: Write,
    C: CompletionInvoker + ?Sized,
{
    let transcript = Transcript::singleton(sanitize(message));

    match invoker.complete(transcript.snapshot()).await {
        Ok(reply) => {
            writeln!(out, "{reply}").context("Failed to write reply")?;
            Ok(OneshotStatus::Replied)
        }
        Err(err) => {
            debug!(error = %err, "oneshot completion failed");
            writeln!(diag, "ChatCompletion error: {err:#}").context("Failed to write to stderr")?;
            Ok(OneshotStatus::Failed)
        }
    }
}
