use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::Turn;
use crate::providers;

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// Sends a full transcript to the model and resolves to the reply content.
pub trait CompletionInvoker {
    fn complete<'a>(&'a self, transcript: &'a [Turn]) -> CompletionFuture<'a>;
}

pub struct OpenAiCompletion<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> OpenAiCompletion<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl CompletionInvoker for OpenAiCompletion<'_> {
    fn complete<'a>(&'a self, transcript: &'a [Turn]) -> CompletionFuture<'a> {
        Box::pin(providers::openai::chat(self.client, self.cfg, transcript))
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{CompletionFuture, CompletionInvoker};
    use crate::model::Turn;

    /// Replays scripted outcomes in order and records every transcript it was
    /// handed. Once the script runs out it keeps repeating the fallback reply.
    #[derive(Debug)]
    pub(crate) struct StubCompletion {
        pub(crate) calls: RefCell<Vec<Vec<Turn>>>,
        script: RefCell<VecDeque<Result<String, String>>>,
        fallback: String,
    }

    impl StubCompletion {
        pub(crate) fn replying(content: impl Into<String>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                script: RefCell::new(VecDeque::new()),
                fallback: content.into(),
            }
        }

        pub(crate) fn then_err(self, message: impl Into<String>) -> Self {
            self.script.borrow_mut().push_back(Err(message.into()));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CompletionInvoker for StubCompletion {
        fn complete<'a>(&'a self, transcript: &'a [Turn]) -> CompletionFuture<'a> {
            self.calls.borrow_mut().push(transcript.to_vec());
            let outcome = self
                .script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()));
            Box::pin(async move { outcome.map_err(|message| anyhow!(message)) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionInvoker;
    use super::stub::StubCompletion;
    use crate::model::Turn;

    #[tokio::test]
    async fn stub_records_transcripts_and_replays_script() {
        let stub = StubCompletion::replying("hello").then_err("backend failure");
        let transcript = vec![Turn::user("hi")];

        let err = stub
            .complete(&transcript)
            .await
            .expect_err("first call should fail");
        assert!(err.to_string().contains("backend failure"));

        let reply = stub
            .complete(&transcript)
            .await
            .expect("second call should succeed");
        assert_eq!(reply, "hello");
        assert_eq!(stub.call_count(), 2);
        assert_eq!(stub.calls.borrow()[0], transcript);
    }
}
