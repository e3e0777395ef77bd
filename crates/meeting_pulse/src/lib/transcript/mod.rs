//! Transcript acquisition: automatic sources tried in a fixed order, then a
//! human pasting text in.

pub mod acquisition;
pub mod manual;
pub mod transcript_api;
pub mod youtube;

use std::{
    fmt::{self, Debug, Display},
    future::Future,
    time::Duration,
};

pub use acquisition::{AcquisitionEvent, AcquisitionState, TranscriptAcquisition};
pub use manual::{read_pasted_transcript, ManualInstructions, END_OF_TRANSCRIPT};
pub use transcript_api::{JobState, JobStatus, TranscriptApiClient, TranscriptionJob};
pub use youtube::{available_languages, YouTubeCaptionClient};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptSource {
    YouTubeCaptions,
    TranscriptionApi,
    Manual,
}

impl Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TranscriptSource::YouTubeCaptions => "YouTube captions",
            TranscriptSource::TranscriptionApi => "Transcription API",
            TranscriptSource::Manual => "Manual entry",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub source: TranscriptSource,
}

impl Transcript {
    pub fn new(text: impl Into<String>, source: TranscriptSource) -> Self {
        Transcript {
            text: text.into(),
            source,
        }
    }
}

/// Fixed interval status polling with a wall clock ceiling. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub language_name: String,
    pub base_url: String,
    /// Auto generated (speech recognition) captions
    pub is_generated: bool,
}

impl CaptionTrack {
    pub fn is_english(&self) -> bool {
        let code = self.language_code.to_ascii_lowercase();
        code == "en" || code.starts_with("en-")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSnippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Caption tracks published alongside a hosted video.
pub trait CaptionProvider {
    type Error: Debug + Display;

    fn list_tracks(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<CaptionTrack>, Self::Error>>;

    fn fetch_track(
        &self,
        track: &CaptionTrack,
    ) -> impl Future<Output = Result<Vec<CaptionSnippet>, Self::Error>>;
}

/// A third party asynchronous transcription job API.
pub trait TranscriptionService {
    const DEFAULT_LANGUAGE: &'static str = "en";

    type Error: Debug + Display;

    fn submit(
        &self,
        video_url: &str,
        language: &str,
    ) -> impl Future<Output = Result<TranscriptionJob, Self::Error>>;

    fn status(&self, job_id: &str) -> impl Future<Output = Result<JobStatus, Self::Error>>;
}
