//! # Meetings Parser
//!
//! Best effort extraction of meeting records from a municipal meetings site
//! (municodemeetings.com style markup).
//!
//! Listing pages are parsed in tiers: the "Meetings Directory" table, then
//! `div.meeting-item` containers, then any meeting-like anchor on the page.
//! Detail pages yield a title, a date, the first video url found by a fixed
//! cascade, and the document links.
//!
//! Nothing here fails: unexpected markup degrades to fewer fields or to no
//! records at all.

use std::{ops::Deref, sync::LazyLock};

use itertools::Itertools;
use meeting_datastore::{Document, Meeting, MeetingDetails};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    error::Error,
    platform::{has_video_extension, VideoPlatform},
};

const DOCUMENT_EXTENSIONS: [&str; 9] = ["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "rtf", "txt"];

static DIRECTORY_CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)meetings\s+directory").unwrap());
static MEETING_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(meeting|council|commission|committee|board|hearing|session)").unwrap()
});
static DOCUMENT_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(agenda|packet|minutes)").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").unwrap());
static PLAYER_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(video|player|stream)").unwrap());
static BARE_YOUTUBE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(TABLE, "table");
selector!(CAPTION, "caption");
selector!(ROW, "tr");
selector!(HEADER_CELL, "thead th");
selector!(CELL, "td");
selector!(ANCHOR, "a[href]");
selector!(MEETING_ITEM, "div.meeting-item");
selector!(H1, "h1");
selector!(TITLE, "title");
selector!(MEETING_DATE, ".meeting-date");
selector!(TIME, "time");
selector!(IFRAME, "iframe[src]");
selector!(VIDEO, "video[src]");
selector!(VIDEO_SOURCE, "video source[src]");
selector!(ANY, "*");

/// Raw html of one page together with the url it was served from, which every
/// relative link is resolved against.
pub struct MeetingsHtmlDocument {
    html: String,
    page_url: Url,
}

impl Deref for MeetingsHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.html
    }
}

impl MeetingsHtmlDocument {
    pub fn new(html: impl Into<String>, page_url: &str) -> Result<Self, Error> {
        Ok(MeetingsHtmlDocument {
            html: html.into(),
            page_url: Url::parse(page_url)?,
        })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    fn resolve(&self, href: &str) -> Option<String> {
        resolve_url(&self.page_url, href)
    }

    fn resolve_parsed(&self, href: &str) -> Option<Url> {
        self.resolve(href).and_then(|url| Url::parse(&url).ok())
    }
}

/// Parses a listing page into partial meeting records (title + url, plus
/// whatever the directory table carries).
#[tracing::instrument(skip_all, fields(page = %doc.page_url))]
pub fn parse_meetings(doc: &MeetingsHtmlDocument) -> Vec<Meeting> {
    let html = Html::parse_document(doc);

    let meetings = if let Some(meetings) = parse_directory_table(&html, doc) {
        tracing::debug!(count = meetings.len(), "Parsed meetings directory table");
        meetings
    } else if let Some(meetings) = parse_meeting_items(&html, doc) {
        tracing::debug!(count = meetings.len(), "Parsed meeting-item containers");
        meetings
    } else {
        let meetings = parse_meeting_anchors(&html, doc);
        tracing::debug!(count = meetings.len(), "Parsed meeting anchors");
        meetings
    };

    meetings
        .into_iter()
        .unique_by(|m| m.url.clone())
        .collect()
}

fn parse_directory_table(html: &Html, doc: &MeetingsHtmlDocument) -> Option<Vec<Meeting>> {
    let table = html.select(&TABLE).find(|table| {
        table
            .select(&CAPTION)
            .next()
            .is_some_and(|caption| DIRECTORY_CAPTION_RE.is_match(&element_text(caption)))
    })?;

    let headers = table.select(&HEADER_CELL).map(element_text).collect::<Vec<_>>();

    let meetings = table
        .select(&ROW)
        .filter_map(|row| {
            let cells = row.select(&CELL).collect::<Vec<_>>();
            // column 0: date, column 1: title + detail link, rest: documents
            let [date_cell, title_cell, link_cells @ ..] = cells.as_slice() else {
                return None;
            };

            let anchor = title_cell.select(&ANCHOR).next()?;
            let url = doc.resolve(anchor.value().attr("href")?)?;
            let title = Some(element_text(anchor))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| element_text(*title_cell));
            if title.is_empty() {
                return None;
            }

            let mut meeting = Meeting::new(title, url);
            meeting.date = element_text(*date_cell);

            for (offset, cell) in link_cells.iter().enumerate() {
                let header = headers.get(offset + 2).map(String::as_str).unwrap_or_default();
                for link in cell.select(&ANCHOR) {
                    let Some(link_url) = link.value().attr("href").and_then(|h| doc.resolve(h))
                    else {
                        continue;
                    };
                    if VideoPlatform::classify(&link_url).is_video() {
                        if meeting.video_url.is_empty() {
                            meeting.video_url = link_url;
                        }
                        continue;
                    }
                    let text = element_text(link);
                    let label = if text.is_empty() { header } else { text.as_str() };
                    meeting.documents.push(Document::from_link(label, link_url));
                }
            }

            Some(meeting)
        })
        .collect();

    Some(meetings)
}

fn parse_meeting_items(html: &Html, doc: &MeetingsHtmlDocument) -> Option<Vec<Meeting>> {
    let items = html.select(&MEETING_ITEM).collect::<Vec<_>>();
    if items.is_empty() {
        return None;
    }

    let meetings = items
        .into_iter()
        .filter_map(|item| {
            let anchor = item.select(&ANCHOR).next()?;
            let url = doc.resolve(anchor.value().attr("href")?)?;
            let title = element_text(anchor);
            (!title.is_empty()).then(|| Meeting::new(title, url))
        })
        .collect();

    Some(meetings)
}

fn parse_meeting_anchors(html: &Html, doc: &MeetingsHtmlDocument) -> Vec<Meeting> {
    html.select(&ANCHOR)
        .filter_map(|anchor| {
            // match on the path only, the site's own host name contains "meetings"
            let url = doc.resolve_parsed(anchor.value().attr("href")?)?;
            if !MEETING_HREF_RE.is_match(url.path()) || has_document_extension(url.path()) {
                return None;
            }
            let title = element_text(anchor);
            if title.is_empty() {
                return None;
            }
            Some(Meeting::new(title, url))
        })
        .collect()
}

/// Parses a meeting detail page.
#[tracing::instrument(skip_all, fields(page = %doc.page_url))]
pub fn parse_meeting_details(doc: &MeetingsHtmlDocument) -> MeetingDetails {
    let html = Html::parse_document(doc);

    let title = html
        .select(&H1)
        .map(element_text)
        .find(|t| !t.is_empty())
        .or_else(|| html.select(&TITLE).map(element_text).find(|t| !t.is_empty()))
        .unwrap_or_default();

    let video_url = find_video_url(&html)
        .and_then(|src| doc.resolve(&src))
        .unwrap_or_default();

    MeetingDetails {
        title,
        date: find_date(&html),
        video_url,
        documents: find_documents(&html, doc),
    }
}

fn find_date(html: &Html) -> String {
    if let Some(date) = html.select(&MEETING_DATE).map(element_text).find(|t| !t.is_empty()) {
        return date;
    }
    if let Some(date) = html
        .select(&TIME)
        .filter_map(|time| {
            time.value()
                .attr("datetime")
                .map(str::to_string)
                .or_else(|| Some(element_text(time)))
        })
        .find(|t| !t.trim().is_empty())
    {
        return date.trim().to_string();
    }

    let text = html.root_element().text().collect::<Vec<_>>().join(" ");
    DATE_RE
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

type VideoStrategy = fn(&Html) -> Option<String>;

/// Priority order of the video url cascade; the first hit wins.
const VIDEO_STRATEGIES: [(&str, VideoStrategy); 7] = [
    ("youtube_iframe", youtube_iframe),
    ("vimeo_iframe", vimeo_iframe),
    ("video_file_link", video_file_link),
    ("html5_video", html5_video),
    ("player_iframe", player_iframe),
    ("data_attribute", data_attribute),
    ("watch_page_link", watch_page_link),
];

fn find_video_url(html: &Html) -> Option<String> {
    VIDEO_STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(html).inspect(|src| tracing::debug!(strategy = *name, %src, "Found video url"))
    })
}

fn iframe_sources(html: &Html) -> impl Iterator<Item = &str> {
    html.select(&IFRAME)
        .filter_map(|iframe| iframe.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
}

fn youtube_iframe(html: &Html) -> Option<String> {
    iframe_sources(html)
        .find(|src| VideoPlatform::classify(src) == VideoPlatform::YouTube)
        .map(str::to_string)
}

fn vimeo_iframe(html: &Html) -> Option<String> {
    iframe_sources(html)
        .find(|src| VideoPlatform::classify(src) == VideoPlatform::Vimeo)
        .map(str::to_string)
}

fn video_file_link(html: &Html) -> Option<String> {
    html.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| has_video_extension(href.trim()))
        .map(|href| href.trim().to_string())
}

fn html5_video(html: &Html) -> Option<String> {
    html.select(&VIDEO)
        .chain(html.select(&VIDEO_SOURCE))
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
}

fn player_iframe(html: &Html) -> Option<String> {
    iframe_sources(html)
        .find(|src| PLAYER_HINT_RE.is_match(src))
        .map(str::to_string)
}

fn data_attribute(html: &Html) -> Option<String> {
    html.select(&ANY).find_map(|el| {
        el.value().attrs().find_map(|(name, value)| {
            let name = name.to_lowercase();
            let value = value.trim();
            if !name.starts_with("data-") || value.is_empty() {
                return None;
            }
            if name.contains("youtube") && BARE_YOUTUBE_ID_RE.is_match(value) {
                return Some(format!("https://www.youtube.com/watch?v={value}"));
            }
            let looks_like_link =
                value.starts_with("http") || value.starts_with("//") || value.starts_with('/');
            let suggests_video = PLAYER_HINT_RE.is_match(&name)
                || PLAYER_HINT_RE.is_match(value)
                || VideoPlatform::classify(value).is_video();
            (looks_like_link && suggests_video).then(|| value.to_string())
        })
    })
}

fn watch_page_link(html: &Html) -> Option<String> {
    html.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            matches!(
                VideoPlatform::classify(href),
                VideoPlatform::YouTube | VideoPlatform::Vimeo
            )
        })
        .map(str::to_string)
}

fn find_documents(html: &Html, doc: &MeetingsHtmlDocument) -> Vec<Document> {
    html.select(&ANCHOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            let text = element_text(anchor);
            let is_document = has_document_extension(href)
                || DOCUMENT_KEYWORD_RE.is_match(href)
                || DOCUMENT_KEYWORD_RE.is_match(&text);
            if !is_document || VideoPlatform::classify(href).is_video() {
                return None;
            }
            Some(Document::from_link(&text, doc.resolve(href)?))
        })
        .collect()
}

fn has_document_extension(href: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit_once('.')
        .map(|(_, ext)| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Resolves `href` against `base`, keeping only http(s) results.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
}

fn element_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
