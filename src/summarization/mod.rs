//! Student summaries generated by an external text-generation service.
//!
//! The gateway looks a student up in the [`RecordStore`], renders a prompt, and hands it to a
//! [`SummaryClient`]. The Ollama-backed client issues a single non-streaming `/api/chat`
//! request and returns `message.content` verbatim. Nothing is retried or cached; each call
//! regenerates the summary from scratch.

use crate::config::Config;
use crate::store::{RecordStore, StoreError, Student, StudentId};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while producing a student summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Student lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The text-generation service could not be reached or its body could not be read.
    #[error("Failed to contact summary service: {0}")]
    GatewayUnreachable(String),
    /// The response body was not a JSON object.
    #[error("Invalid response from summary service: {0}")]
    MalformedResponse(String),
    /// The response was a JSON object without a string at `message.content`.
    #[error("Missing summary content")]
    MissingContent,
}

/// Interface implemented by text-generation backends.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Send `prompt` as a single user message and return the generated text.
    async fn complete(&self, prompt: String) -> Result<String, SummaryError>;
}

/// Render the prompt describing `student`.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Generate a brief professional summary for this student:\nName: {}\nAge: {}\nEmail: {}",
        student.name, student.age, student.email
    )
}

/// Pull `message.content` out of a chat response body.
pub fn extract_message_content(body: &[u8]) -> Result<String, SummaryError> {
    let object: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|error| SummaryError::MalformedResponse(error.to_string()))?;
    object
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(SummaryError::MissingContent)
}

/// Looks up students and asks the configured [`SummaryClient`] to describe them.
pub struct SummaryGateway {
    store: Arc<RecordStore>,
    client: Arc<dyn SummaryClient>,
}

impl SummaryGateway {
    /// Build a gateway over `store` that generates text with `client`.
    pub fn new(store: Arc<RecordStore>, client: Arc<dyn SummaryClient>) -> Self {
        Self { store, client }
    }

    /// Generate a fresh summary for the student stored under `id`.
    pub async fn summarize(&self, id: StudentId) -> Result<String, SummaryError> {
        let student = self.store.get(id)?;
        tracing::debug!(student_id = id, "Requesting student summary");
        self.client.complete(build_prompt(&student)).await
    }
}

/// [`SummaryClient`] speaking the Ollama chat API.
pub struct OllamaChatClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaChatClient {
    /// Construct a client for `base_url` that requests completions from `model`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("student-records/summary")
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Construct a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.ollama_url.clone(), config.summary_model.clone())
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryClient for OllamaChatClient {
    async fn complete(&self, prompt: String) -> Result<String, SummaryError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ],
            "stream": false,
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummaryError::GatewayUnreachable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, endpoint = %self.endpoint(), "Ollama returned non-success status");
        }

        let body = response.bytes().await.map_err(|error| {
            SummaryError::GatewayUnreachable(format!("failed to read Ollama response: {error}"))
        })?;

        extract_message_content(&body)
    }
}
