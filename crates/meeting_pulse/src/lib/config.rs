use std::time::Duration;

use crate::{documents::DEFAULT_MAX_DOCUMENTS, error::Error, transcript::PollConfig};

pub const DEFAULT_MEETINGS_BASE_URL: &str = "https://snoqualmie-wa.municodemeetings.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TRANSCRIPT_API_BASE_URL: &str = "https://api.transcriptapi.com/v1";

/// Runtime settings, usually assembled from the environment by the binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub meetings_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub transcript_api_key: Option<String>,
    pub transcript_api_base_url: String,
    pub poll: PollConfig,
    pub max_documents: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            meetings_base_url: DEFAULT_MEETINGS_BASE_URL.into(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.into(),
            transcript_api_key: None,
            transcript_api_base_url: DEFAULT_TRANSCRIPT_API_BASE_URL.into(),
            poll: PollConfig::default(),
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }
}

impl Config {
    /// Both hosted APIs are needed before anything useful can happen, so
    /// missing keys are reported together at startup.
    pub fn validate(&self) -> Result<ApiKeys, Error> {
        let openai = non_blank(self.openai_api_key.as_deref());
        let transcript = non_blank(self.transcript_api_key.as_deref());

        match (openai, transcript) {
            (Some(openai), Some(transcript)) => Ok(ApiKeys {
                openai: openai.to_string(),
                transcript_api: transcript.to_string(),
            }),
            (openai, transcript) => {
                let mut missing = Vec::new();
                if openai.is_none() {
                    missing.push("OPENAI_API_KEY");
                }
                if transcript.is_none() {
                    missing.push("TRANSCRIPTAPI_KEY");
                }
                Err(Error::MissingConfig(missing))
            }
        }
    }

    pub fn with_poll_seconds(mut self, interval_secs: u64, max_wait_secs: u64) -> Self {
        self.poll = PollConfig {
            interval: Duration::from_secs(interval_secs),
            max_wait: Duration::from_secs(max_wait_secs),
        };
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub openai: String,
    pub transcript_api: String,
}
