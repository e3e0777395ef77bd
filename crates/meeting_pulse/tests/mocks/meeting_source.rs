use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use meeting_datastore::{Meeting, MeetingDetails};
use meeting_pulse::{
    parser::{parse_meeting_details, parse_meetings, MeetingsHtmlDocument},
    MeetingSource,
};

pub const BASE_URL: &str = "https://snoqualmie-wa.municodemeetings.com";

#[derive(Clone)]
pub struct MockMeetingSource {
    pub meetings: Vec<Meeting>,
    pub details: HashMap<String, MeetingDetails>,
    pub documents: HashMap<String, Vec<u8>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl Default for MockMeetingSource {
    fn default() -> Self {
        Self {
            meetings: Vec::new(),
            details: HashMap::new(),
            documents: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }
}

impl MockMeetingSource {
    /// Listing from the directory fixture; every meeting resolves to the detail
    /// fixture.
    pub fn from_fixture() -> Self {
        let listing = MeetingsHtmlDocument::new(
            include_str!("../fixtures/meetings_directory.html"),
            BASE_URL,
        )
        .unwrap();
        let meetings = parse_meetings(&listing);

        let details = meetings
            .iter()
            .map(|meeting| {
                let page = MeetingsHtmlDocument::new(
                    include_str!("../fixtures/meeting_detail.html"),
                    &meeting.url,
                )
                .unwrap();
                (meeting.url.clone(), parse_meeting_details(&page))
            })
            .collect();

        Self {
            meetings,
            details,
            ..Default::default()
        }
    }

    pub fn with_document(mut self, url: &str, bytes: &[u8]) -> Self {
        self.documents.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl MeetingSource for MockMeetingSource {
    type Error = anyhow::Error;

    async fn fetch_meetings(&self) -> anyhow::Result<Vec<Meeting>> {
        self.calls.lock().unwrap().push("listing".to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.meetings.clone())
    }

    async fn fetch_details(&self, meeting_url: &str) -> anyhow::Result<MeetingDetails> {
        self.calls.lock().unwrap().push(meeting_url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.details
            .get(meeting_url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {meeting_url}"))
    }

    async fn download_document(&self, document_url: &str) -> anyhow::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(document_url.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.documents
            .get(document_url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {document_url}"))
    }
}
