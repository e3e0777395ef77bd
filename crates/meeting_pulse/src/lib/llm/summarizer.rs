use std::{
    fmt::{Debug, Display},
    future::Future,
};

use meeting_datastore::Document;

/// Everything known about a meeting when asking for a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub meeting_title: String,
    pub meeting_date: String,
    pub transcript: Option<String>,
    /// Pre-rendered document listing, see [`crate::documents::document_context`]
    pub document_context: String,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: String,
    /// Human readable provenance, e.g. "Video transcript, Meeting documents"
    pub sources_used: String,
}

pub trait Summarizer {
    const SUMMARIZER_MODEL: &'static str;

    type Error: Debug + Display;

    fn summarize(
        &self,
        request: &SummaryRequest,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>>;

    /// One action item per non-empty line of the model's answer.
    fn extract_action_items(
        &self,
        transcript: &str,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>>;
}
