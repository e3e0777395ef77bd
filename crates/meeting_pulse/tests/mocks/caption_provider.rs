use std::sync::{Arc, Mutex};

use meeting_pulse::{
    transcript::{CaptionSnippet, CaptionTrack},
    CaptionProvider,
};

/// Serves one English track whose snippets are the words of `text`.
#[derive(Clone)]
pub struct MockCaptionProvider {
    pub text: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockCaptionProvider {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// The video exists but publishes no caption tracks.
    pub fn without_tracks() -> Self {
        Self {
            text: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            text: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl CaptionProvider for MockCaptionProvider {
    type Error = anyhow::Error;

    async fn list_tracks(&self, video_id: &str) -> anyhow::Result<Vec<CaptionTrack>> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        Ok(self
            .text
            .iter()
            .map(|_| CaptionTrack {
                language_code: "en".into(),
                language_name: "English (auto-generated)".into(),
                base_url: format!("https://www.youtube.com/api/timedtext?v={video_id}&lang=en"),
                is_generated: true,
            })
            .collect())
    }

    async fn fetch_track(&self, _track: &CaptionTrack) -> anyhow::Result<Vec<CaptionSnippet>> {
        let text = self.text.clone().unwrap_or_default();
        Ok(text
            .split_whitespace()
            .enumerate()
            .map(|(i, word)| CaptionSnippet {
                text: word.to_string(),
                start: i as f64,
                duration: 1.0,
            })
            .collect())
    }
}
