use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Turn;
use crate::providers::http_errors::completion_request_error;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn to_chat_messages(turns: &[Turn]) -> Vec<ChatMessage<'_>> {
    turns
        .iter()
        .map(|turn| ChatMessage {
            role: turn.role().as_str(),
            content: turn.content(),
        })
        .collect()
}

/// Prefers the `error.message` field of an API error body, falling back to the
/// raw text when the body has some other shape.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn status_error(status: StatusCode, body: &str) -> anyhow::Error {
    let detail = api_error_message(body);
    if status == StatusCode::UNAUTHORIZED {
        return anyhow!(
            "Chat completion request was rejected with status {}: {}. \
             Check that OPENAI_API_KEY is set to a valid key.",
            status,
            detail
        );
    }

    anyhow!(
        "Chat completion request failed with status {}: {}",
        status,
        detail
    )
}

fn first_reply(parsed: ChatCompletionResponse) -> Result<String> {
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Chat completion response contained no choices"))?;
    choice
        .message
        .content
        .ok_or_else(|| anyhow!("Chat completion response message had no content"))
}

pub async fn chat(client: &Client, cfg: &Config, turns: &[Turn]) -> Result<String> {
    let api_url = completions_url(&cfg.base_url);
    let body = ChatCompletionRequest {
        model: &cfg.model,
        messages: to_chat_messages(turns),
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        turn_count = turns.len(),
        "sending chat completion request"
    );

    let mut request = client.post(&api_url).json(&body);
    if let Some(api_key) = &cfg.api_key {
        request = request.bearer_auth(api_key);
    }

    let response = request.send().await.map_err(|err| {
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            error = %err,
            "chat completion request failed"
        );
        completion_request_error(err, &api_url, cfg.timeout_secs)
    })?;

    let status = response.status();
    if !status.is_success() {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat completion API returned non-success status"
        );
        return Err(status_error(status, &response_body));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    let reply = first_reply(parsed)?;
    debug!(
        model = %cfg.model,
        response_len = reply.len(),
        "received chat completion response"
    );
    Ok(reply)
}
