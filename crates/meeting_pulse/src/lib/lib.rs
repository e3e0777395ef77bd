pub mod config;
pub mod documents;
mod error;
pub mod llm;
pub mod parser;
pub mod platform;
mod processor;
pub mod source;
pub mod tracing;
pub mod transcript;

pub use config::{ApiKeys, Config};
pub use error::Error;
pub use llm::{openai, Chatbot, Summarizer, SummaryRequest, SummaryResponse};
pub use platform::VideoPlatform;
pub use processor::{builder::MeetingPipelineBuilder, MeetingPipeline};
pub use source::{MeetingSource, MunicodeSource};
pub use transcript::{
    AcquisitionState, CaptionProvider, Transcript, TranscriptAcquisition, TranscriptSource,
    TranscriptionService,
};

/// Browser-like agent string sent with every page scrape.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
