use std::ops::Deref;

use meeting_datastore::{Meeting, MeetingDetails};

use crate::{
    config::DEFAULT_MEETINGS_BASE_URL,
    error::Error,
    parser::{parse_meeting_details, parse_meetings, MeetingsHtmlDocument},
    source::MeetingSource,
    USER_AGENT,
};

/// Municode Meetings portal of a single municipality.
pub struct MunicodeSource {
    client: reqwest::Client,
    base_url: String,
}

impl Deref for MunicodeSource {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Default for MunicodeSource {
    fn default() -> Self {
        MunicodeSource::new(DEFAULT_MEETINGS_BASE_URL)
    }
}

impl MunicodeSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        MunicodeSource::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        MunicodeSource {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(&self, url: &str) -> Result<MeetingsHtmlDocument, Error> {
        let html = self
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        MeetingsHtmlDocument::new(html, url)
    }
}

impl MeetingSource for MunicodeSource {
    type Error = Error;

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_meetings(&self) -> Result<Vec<Meeting>, Error> {
        let page = self.fetch_page(&self.base_url).await?;
        let meetings = parse_meetings(&page);
        tracing::info!(count = meetings.len(), "Fetched meeting listing");
        Ok(meetings)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_details(&self, meeting_url: &str) -> Result<MeetingDetails, Error> {
        let page = self.fetch_page(meeting_url).await?;
        Ok(parse_meeting_details(&page))
    }

    #[tracing::instrument(skip(self))]
    async fn download_document(&self, document_url: &str) -> Result<Vec<u8>, Error> {
        let bytes = self
            .get(document_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tracing::debug!(size = bytes.len(), "Downloaded document");
        Ok(bytes.to_vec())
    }
}
