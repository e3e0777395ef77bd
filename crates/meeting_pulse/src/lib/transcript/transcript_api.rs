use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::{
    config::DEFAULT_TRANSCRIPT_API_BASE_URL,
    error::Error,
    transcript::{PollConfig, TranscriptionService},
};

/// Bearer authenticated client for the transcription job API
/// (`POST /transcribe`, `GET /transcribe/{job_id}`).
#[derive(Debug, Clone)]
pub struct TranscriptApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct TranscribeRequest<'a> {
    video_url: &'a str,
    language: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionJob {
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<JobState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    pub transcript: Option<String>,
    pub error: Option<String>,
}

impl JobStatus {
    pub fn processing() -> Self {
        JobStatus {
            status: JobState::Processing,
            transcript: None,
            error: None,
        }
    }

    pub fn completed(transcript: impl Into<String>) -> Self {
        JobStatus {
            status: JobState::Completed,
            transcript: Some(transcript.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        JobStatus {
            status: JobState::Failed,
            transcript: None,
            error: Some(error.into()),
        }
    }
}

impl TranscriptApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_TRANSCRIPT_API_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        Ok(resp)
    }
}

impl TranscriptionService for TranscriptApiClient {
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn submit(&self, video_url: &str, language: &str) -> Result<TranscriptionJob, Error> {
        let resp = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&TranscribeRequest {
                video_url,
                language,
            })
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to submit transcription job"))?;

        Ok(Self::check(resp).await?.json::<TranscriptionJob>().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn status(&self, job_id: &str) -> Result<JobStatus, Error> {
        let resp = self
            .client
            .get(format!("{}/transcribe/{job_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to check transcription status"))?;

        Ok(Self::check(resp).await?.json::<JobStatus>().await?)
    }
}

/// Polls `job_id` every `poll.interval` until the job completes or fails, a
/// status request errors, or `poll.max_wait` has elapsed.
#[tracing::instrument(skip(service))]
pub async fn wait_for_transcript<T: TranscriptionService>(
    service: &T,
    job_id: &str,
    poll: &PollConfig,
) -> Result<String, Error> {
    let started = Instant::now();

    while started.elapsed() < poll.max_wait {
        let status = service.status(job_id).await.map_err(|e| {
            tracing::error!(error = %e, "Status request failed");
            Error::TranscriptionFailed(format!("status request failed: {e}"))
        })?;

        match status.status {
            JobState::Completed => return Ok(status.transcript.unwrap_or_default()),
            JobState::Failed => {
                let reason = status.error.unwrap_or_else(|| "Unknown error".into());
                tracing::warn!(%reason, "Transcription job failed");
                return Err(Error::TranscriptionFailed(reason));
            }
            state => tracing::debug!(?state, elapsed = ?started.elapsed(), "Transcript not ready"),
        }

        tokio::time::sleep(poll.interval).await;
    }

    tracing::warn!(max_wait = ?poll.max_wait, "Transcription timed out");
    Err(Error::TranscriptionTimedOut(poll.max_wait))
}

/// Submits `video_url` and waits for the resulting transcript.
pub async fn transcribe_and_wait<T: TranscriptionService>(
    service: &T,
    video_url: &str,
    language: &str,
    poll: &PollConfig,
) -> Result<String, Error> {
    let job = service.submit(video_url, language).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to submit video for transcription");
        Error::TranscriptionFailed(format!("submission failed: {e}"))
    })?;

    let job_id = job
        .job_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::TranscriptionFailed("response carried no job id".into()))?;
    tracing::info!(%job_id, "Submitted video for transcription");

    wait_for_transcript(service, &job_id, poll).await
}
