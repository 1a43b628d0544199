use clap::Parser;
use std::ffi::OsString;

/// Command-line arguments for chatgpt
#[derive(Parser, Debug)]
#[command(name = "chatgpt", version)]
#[command(override_usage = "chatgpt [message arguments...]")]
#[command(about = "A CLI tool to interface with ChatGPT")]
#[command(long_about = r#"
A CLI tool to interface with ChatGPT. Provide message content as arguments for a single
oneshot or enter interactive chat with no args.

Environment:
  OPENAI_API_KEY        credential sent as a bearer token
  OPENAI_BASE_URL       API root (default https://api.openai.com/v1)
  OPENAI_TIMEOUT_SECS   request timeout in seconds (default 60)

Type 'exit' or 'quit' (or send EOF) to leave interactive chat.
"#)]
pub struct Cli {
    /// Message content for a oneshot request; only the first is sent
    #[arg(value_name = "MESSAGE")]
    pub messages: Vec<OsString>,
}

impl Cli {
    /// First positional argument, with invalid UTF-8 replaced rather than rejected.
    pub fn oneshot_message(&self) -> Option<String> {
        self.messages
            .first()
            .map(|raw| raw.to_string_lossy().into_owned())
    }

    pub fn ignored_arg_count(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }
}
