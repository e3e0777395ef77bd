use std::sync::{Arc, Mutex};

use meeting_datastore::ChatMessage;
use meeting_pulse::{Chatbot, Summarizer, SummaryRequest, SummaryResponse};

/// Summarizer and chatbot in one, the way the hosted model serves both.
#[derive(Clone)]
pub struct MockLlm {
    pub summary: String,
    pub action_items: Vec<String>,
    pub answers: Arc<Mutex<Vec<String>>>,
    pub summary_requests: Arc<Mutex<Vec<SummaryRequest>>>,
    pub chat_calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    pub fail_with: Option<String>,
}

impl MockLlm {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            action_items: Vec::new(),
            answers: Arc::new(Mutex::new(Vec::new())),
            summary_requests: Arc::new(Mutex::new(Vec::new())),
            chat_calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Chat replies, handed out in order.
    pub fn with_answers(self, answers: &[&str]) -> Self {
        *self.answers.lock().unwrap() = answers.iter().rev().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_action_items(mut self, items: &[&str]) -> Self {
        self.action_items = items.iter().map(|i| i.to_string()).collect();
        self
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }
}

impl Summarizer for MockLlm {
    const SUMMARIZER_MODEL: &'static str = "mock-model";
    type Error = anyhow::Error;

    async fn summarize(&self, request: &SummaryRequest) -> anyhow::Result<SummaryResponse> {
        self.summary_requests.lock().unwrap().push(request.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        let sources_used = if request.transcript.is_some() {
            "Video transcript"
        } else {
            "Meeting documents"
        };
        Ok(SummaryResponse {
            summary: self.summary.clone(),
            sources_used: sources_used.to_string(),
        })
    }

    async fn extract_action_items(&self, _transcript: &str) -> anyhow::Result<Vec<String>> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.action_items.clone())
    }
}

impl Chatbot for MockLlm {
    type Error = anyhow::Error;

    async fn reply(&self, history: &[ChatMessage]) -> anyhow::Result<String> {
        self.chat_calls.lock().unwrap().push(history.to_vec());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer left"))
    }
}
