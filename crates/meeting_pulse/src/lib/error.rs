use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Not a YouTube url: {0}")]
    NotYouTube(String),
    #[error("No captions could be fetched for video {0}")]
    NoCaptions(String),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("Transcription timed out after {0:?}")]
    TranscriptionTimedOut(Duration),
    #[error("Invalid transcript acquisition step: {0}")]
    InvalidTransition(&'static str),
    #[error("Missing configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
}
