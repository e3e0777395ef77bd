use std::{ops::Deref, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;

use crate::{
    error::Error,
    platform::youtube_video_id,
    transcript::{CaptionProvider, CaptionSnippet, CaptionTrack},
    USER_AGENT,
};

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;\s*(?:var\s+meta|</script>)",
    )
    .unwrap()
});
static TIMED_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").unwrap());
static START_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"start="([\d.]+)""#).unwrap());
static DUR_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"dur="([\d.]+)""#).unwrap());

/// Reads caption tracks straight off YouTube: the watch page embeds the track
/// list in `ytInitialPlayerResponse`, each track serves timed text xml.
pub struct YouTubeCaptionClient {
    client: reqwest::Client,
    watch_url: String,
}

impl Deref for YouTubeCaptionClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Default for YouTubeCaptionClient {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        YouTubeCaptionClient::new(client)
    }
}

impl YouTubeCaptionClient {
    const WATCH_URL: &'static str ="https://www.youtube.com/watch";

    pub fn new(client: reqwest::Client) -> Self {
        YouTubeCaptionClient {
            client,
            watch_url: Self::WATCH_URL.into(),
        }
    }

    pub fn with_watch_url(mut self, url: impl Into<String>) -> Self {
        self.watch_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl From<RawCaptionTrack> for CaptionTrack {
    fn from(raw: RawCaptionTrack) -> Self {
        let language_name = raw
            .name
            .map(|name| {
                name.simple_text
                    .unwrap_or_else(|| name.runs.into_iter().map(|r| r.text).collect())
            })
            .unwrap_or_else(|| raw.language_code.clone());

        CaptionTrack {
            language_code: raw.language_code,
            language_name,
            base_url: raw.base_url,
            is_generated: raw.kind.as_deref() == Some("asr"),
        }
    }
}

/// Pulls the caption track list out of a watch page.
pub fn parse_caption_tracks(watch_page: &str) -> Result<Vec<CaptionTrack>, Error> {
    let json = YT_PLAYER_RESPONSE_RE
        .captures(watch_page)
        .and_then(|cap| cap.get(1))
        .ok_or(Error::ParseError(
            "Failed to extract ytInitialPlayerResponse from the watch page",
        ))?;

    let response = serde_json::from_str::<PlayerResponse>(json.as_str())?;

    Ok(response
        .captions
        .and_then(|c| c.tracklist)
        .map(|t| t.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(CaptionTrack::from)
        .collect())
}

/// Parses timed text xml (`<text start=".." dur="..">..</text>`) in document
/// order. Text is entity-encoded twice by YouTube, hence the double decode.
pub fn parse_timed_text(xml: &str) -> Vec<CaptionSnippet> {
    TIMED_TEXT_RE
        .captures_iter(xml)
        .filter_map(|cap| {
            let attrs = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let text = decode_entities(&decode_entities(cap.get(2)?.as_str()));
            let seconds = |re: &Regex| {
                re.captures(attrs)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .unwrap_or_default()
            };
            Some(CaptionSnippet {
                text,
                start: seconds(&START_ATTR_RE),
                duration: seconds(&DUR_ATTR_RE),
            })
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect::<String>()
}

impl CaptionProvider for YouTubeCaptionClient {
    type Error = Error;

    #[tracing::instrument(skip(self))]
    async fn list_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, Error> {
        let resp = self
            .get(&self.watch_url)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?;
        let watch_page = resp.text().await?;

        let tracks = parse_caption_tracks(&watch_page)?;
        tracing::debug!(count = tracks.len(), "Found caption tracks");
        Ok(tracks)
    }

    #[tracing::instrument(skip(self, track), fields(language = %track.language_code))]
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionSnippet>, Error> {
        let xml = self
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_timed_text(&xml))
    }
}

/// Retrieves captions for `video_id`: English variants first, then any other
/// track, first one that fetches with text wins. Fragments are joined with
/// single spaces in their original order.
#[tracing::instrument(skip(provider))]
pub async fn fetch_captions<C: CaptionProvider>(
    provider: &C,
    video_id: &str,
) -> Result<String, Error> {
    let tracks = provider.list_tracks(video_id).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to list caption tracks");
        Error::NoCaptions(video_id.to_string())
    })?;

    let (english, others): (Vec<_>, Vec<_>) = tracks.iter().partition(|t| t.is_english());

    for track in english.into_iter().chain(others) {
        match provider.fetch_track(track).await {
            Ok(snippets) => {
                let text = snippets
                    .iter()
                    .map(|s| s.text.trim())
                    .filter(|t| !t.is_empty())
                    .join(" ");
                if !text.is_empty() {
                    tracing::info!(
                        language = %track.language_code,
                        chars = text.len(),
                        "Retrieved captions"
                    );
                    return Ok(text);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, language = %track.language_code, "Failed to fetch caption track")
            }
        }
    }

    Err(Error::NoCaptions(video_id.to_string()))
}

/// Names of the caption tracks published for a YouTube video, in the order
/// the provider lists them.
#[tracing::instrument(skip(provider))]
pub async fn available_languages<C: CaptionProvider>(
    provider: &C,
    video_url: &str,
) -> Result<Vec<String>, Error> {
    let video_id =
        youtube_video_id(video_url).ok_or_else(|| Error::NotYouTube(video_url.to_string()))?;

    let tracks = provider.list_tracks(&video_id).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to list caption tracks");
        Error::NoCaptions(video_id.clone())
    })?;

    Ok(tracks
        .into_iter()
        .map(|track| {
            if track.language_name.trim().is_empty() {
                track.language_code
            } else {
                track.language_name
            }
        })
        .collect())
}
