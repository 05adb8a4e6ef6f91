//! # syl-generation
//!
//! Answer generation through any OpenAI-compatible `/chat/completions`
//! endpoint (OpenAI, Ollama, llama.cpp, vLLM, ...). Providers differ only by
//! base URL, API key and model name.

pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use syl_config::GenerationConfig;
use syl_core::conversation::Turn;
use syl_core::enums::Role;
use syl_core::errors::UpstreamError;
use syl_core::traits::TextGenerator;

pub use error::GenerationError;

const CHAT_PATH: &str = "/chat/completions";

/// [`TextGenerator`] backed by a chat-completions HTTP API.
pub struct ChatCompletionsClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Build a client from the `[generation]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}{CHAT_PATH}", self.base_url)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    async fn complete(&self, body: &Value) -> Result<String, GenerationError> {
        let url = self.url();
        let req = self.apply_auth(self.client.post(&url).json(body));

        let resp = req.send().await.map_err(|e| GenerationError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await.map_err(|e| GenerationError::Http {
            url,
            message: e.to_string(),
        })?;
        parse_completion(&json)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Turn],
        user_query: &str,
    ) -> Result<String, UpstreamError> {
        let body = build_request_body(
            &self.model,
            self.temperature,
            self.max_tokens,
            system_prompt,
            history,
            user_query,
        );
        tracing::debug!(model = %self.model, turns = history.len(), "requesting completion");

        self.complete(&body).await.map_err(|error| {
            tracing::warn!(%error, "generation request failed");
            UpstreamError::from(error)
        })
    }
}

const fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Standard chat-completions body: system prompt, history, then the query.
#[must_use]
pub fn build_request_body(
    model: &str,
    temperature: f32,
    max_tokens: u32,
    system_prompt: &str,
    history: &[Turn],
    user_query: &str,
) -> Value {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(json!({ "role": "system", "content": system_prompt }));
    messages.extend(
        history
            .iter()
            .map(|turn| json!({ "role": role_name(turn.role), "content": turn.content })),
    );
    messages.push(json!({ "role": "user", "content": user_query }));

    json!({
        "model": model,
        "temperature": temperature,
        "max_tokens": max_tokens,
        "messages": messages,
    })
}

/// Extract the first choice's message content.
///
/// # Errors
///
/// Returns [`GenerationError::Malformed`] when there is no choice or the
/// content is missing.
pub fn parse_completion(json: &Value) -> Result<String, GenerationError> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| GenerationError::Malformed("no choices in response".into()))?;

    choice["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| GenerationError::Malformed("choice has no message content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn body_orders_system_history_then_query() {
        let history = vec![
            Turn::user("I'm in Year 1"),
            Turn::assistant("Which module?"),
        ];
        let body = build_request_body(
            "gpt-4o-mini",
            0.2,
            800,
            "You are a course assistant.",
            &history,
            "When is the essay due?",
        );

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 800);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "I'm in Year 1");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "When is the essay due?");
    }

    #[test]
    fn parses_first_choice() {
        let json = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Week 10.\n" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Week 10.");
    }

    #[test]
    fn missing_choices_is_malformed() {
        let err = parse_completion(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
        assert!(!err.is_transient());
    }

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(401, false)]
    fn status_classification(#[case] status: u16, #[case] transient: bool) {
        let err = GenerationError::Status {
            status,
            body: String::new(),
        };
        assert_eq!(err.is_transient(), transient);
        assert_eq!(UpstreamError::from(err).is_transient(), transient);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = GenerationConfig {
            endpoint: "http://localhost:11434/v1/".into(),
            model: "llama3.1".into(),
            ..Default::default()
        };
        let client = ChatCompletionsClient::from_config(&config).unwrap();
        assert_eq!(client.url(), "http://localhost:11434/v1/chat/completions");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transient() {
        let config = GenerationConfig {
            endpoint: "http://127.0.0.1:9".into(),
            model: "m".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = ChatCompletionsClient::from_config(&config).unwrap();
        let err = client.generate("sys", &[], "hi").await.unwrap_err();
        assert!(err.is_transient());
    }
}
