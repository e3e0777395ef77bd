use std::{fmt, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub(crate) static DATE_CANDIDATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b\d{1,2}/\d{1,2}/\d{4}\b
        | \b\d{4}-\d{2}-\d{2}\b
        | \b[A-Z][a-z]{2,8}\.?\s+\d{1,2},\s*\d{4}\b
        ",
    )
    .unwrap()
});

const DATE_FORMATS: [&str; 5] = ["%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%b %d,%Y"];

/// Identity of a meeting: its absolute detail page url.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(String);

impl MeetingId {
    pub fn new(url: impl Into<String>) -> Self {
        MeetingId(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Meeting> for MeetingId {
    fn from(meeting: &Meeting) -> Self {
        meeting.id()
    }
}

/// One municipal meeting and the media/documents attached to it.
///
/// Records are created with partial fields by the listing fetch and enriched
/// in place once the detail page has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub title: String,
    pub url: String,
    /// Opaque, scraper dependent date text
    pub date: String,
    pub video_url: String,
    pub documents: Vec<Document>,
}

impl Meeting {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Meeting {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> MeetingId {
        MeetingId::new(self.url.as_str())
    }

    pub fn has_video(&self) -> bool {
        !self.video_url.trim().is_empty()
    }

    /// Merges what the detail page revealed into this record.
    ///
    /// Identity (`url`) never changes. A listing title is kept over the detail
    /// page heading, which on most municipal sites is a site-wide banner.
    pub fn enrich(&mut self, details: MeetingDetails) {
        if self.title.trim().is_empty() && !details.title.is_empty() {
            self.title = details.title;
        }
        if !details.date.is_empty() {
            self.date = details.date;
        }
        if !details.video_url.is_empty() {
            self.video_url = details.video_url;
        }
        for document in details.documents {
            if !self.documents.iter().any(|d| d.url == document.url) {
                self.documents.push(document);
            }
        }
    }

    /// Best effort parse of the opaque date, falling back to a date embedded in
    /// the title (e.g. "Board Meeting - Feb 1, 2024").
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_loose_date(&self.date).or_else(|| parse_loose_date(&self.title))
    }
}

fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    DATE_CANDIDATE_REGEX.find_iter(text).find_map(|m| {
        let candidate = m.as_str().replace('.', "");
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&candidate, fmt).ok())
    })
}

/// What a meeting detail page yields. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingDetails {
    pub title: String,
    pub date: String,
    pub video_url: String,
    pub documents: Vec<Document>,
}

impl MeetingDetails {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.date.is_empty()
            && self.video_url.is_empty()
            && self.documents.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub url: String,
}

impl Document {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Document {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Builds a document from an anchor, inferring the title from keywords in
    /// the url when the link text is blank (icon links are common).
    pub fn from_link(text: &str, url: impl Into<String>) -> Self {
        let url = url.into();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let title = if text.is_empty() {
            Self::infer_title(&url).to_string()
        } else {
            text
        };
        Document { title, url }
    }

    pub fn infer_title(url: &str) -> &'static str {
        let url = url.to_lowercase();
        if url.contains("packet") {
            "Agenda Packet"
        } else if url.contains("agenda") {
            "Agenda"
        } else if url.contains("minutes") {
            "Minutes"
        } else {
            "Document"
        }
    }

    pub fn format(&self) -> DocumentFormat {
        DocumentFormat::of(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Html,
    Pdf,
    Other,
}

impl DocumentFormat {
    /// Label in the title wins, then the url path extension.
    pub fn of(document: &Document) -> Self {
        let title = document.title.to_lowercase();
        if title.contains("html") {
            return DocumentFormat::Html;
        }
        if title.contains("pdf") {
            return DocumentFormat::Pdf;
        }

        let path = document
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if path.ends_with(".html") || path.ends_with(".htm") {
            DocumentFormat::Html
        } else if path.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else {
            DocumentFormat::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
