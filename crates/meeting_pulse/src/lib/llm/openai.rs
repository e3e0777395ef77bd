use meeting_datastore::ChatMessage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::DEFAULT_OPENAI_BASE_URL,
    llm::{
        prompts::{self, SourceProfile},
        Chatbot, Summarizer, SummaryRequest, SummaryResponse,
    },
};

pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Completion response carried no content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl CompletionParams {
    pub const SUMMARY: CompletionParams = CompletionParams {
        temperature: 0.3,
        max_tokens: 2000,
    };
    pub const ACTION_ITEMS: CompletionParams = CompletionParams {
        temperature: 0.2,
        max_tokens: 1000,
    };
    pub const CHAT: CompletionParams = CompletionParams {
        temperature: 0.3,
        max_tokens: 1000,
    };
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn send_completion_request(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<CompletionResponse, OpenAIError> {
        let body = CompletionRequest {
            model: model_name,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, OpenAIError> {
        let response = self
            .send_completion_request(<Self as Summarizer>::SUMMARIZER_MODEL, messages, params)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(OpenAIError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl Summarizer for OpenAIClient {
    const SUMMARIZER_MODEL: &'static str = "gpt-4o-mini";
    type Error = OpenAIError;

    #[tracing::instrument(skip_all, fields(meeting = %request.meeting_title))]
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, OpenAIError> {
        let profile = SourceProfile::detect(request.transcript.as_deref(), &request.documents);
        tracing::debug!(?profile, "Detected summary sources");

        let messages = [
            ChatMessage::system(profile.system_prompt()),
            ChatMessage::user(prompts::summary_prompt(request, &profile)),
        ];

        let summary = self
            .complete(&messages, CompletionParams::SUMMARY)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize meeting"))?;

        Ok(SummaryResponse {
            summary,
            sources_used: profile.sources_used(),
        })
    }

    #[tracing::instrument(skip_all)]
    async fn extract_action_items(&self, transcript: &str) -> Result<Vec<String>, OpenAIError> {
        let messages = [
            ChatMessage::system(prompts::ACTION_ITEMS_SYSTEM_PROMPT),
            ChatMessage::user(prompts::action_items_prompt(transcript)),
        ];

        let text = self
            .complete(&messages, CompletionParams::ACTION_ITEMS)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to extract action items"))?;

        Ok(prompts::split_action_items(&text))
    }
}

impl Chatbot for OpenAIClient {
    type Error = OpenAIError;

    #[tracing::instrument(skip_all, fields(messages = history.len()))]
    async fn reply(&self, history: &[ChatMessage]) -> Result<String, OpenAIError> {
        self.complete(history, CompletionParams::CHAT)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to get chat reply"))
    }
}
