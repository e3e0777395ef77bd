use std::mem;

use crate::{
    error::Error,
    platform::{youtube_video_id, VideoPlatform},
    transcript::{
        transcript_api::transcribe_and_wait, youtube::fetch_captions, CaptionProvider,
        ManualInstructions, PollConfig, Transcript, TranscriptSource, TranscriptionService,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    NotStarted,
    TryingAutomatic(TranscriptSource),
    AwaitingManualInput(ManualInstructions),
    Resolved(Transcript),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionEvent {
    Start,
    SourceSucceeded(String),
    SourceFailed(String),
    ManualInputProvided(String),
    ManualInputDeclined,
}

/// Tracks one attempt at getting a transcript for a video.
///
/// Automatic sources are tried in plan order. When all of them fail the
/// acquisition parks in [`AcquisitionState::AwaitingManualInput`] until the
/// caller either supplies text or declines.
#[derive(Debug, Clone)]
pub struct TranscriptAcquisition {
    video_url: String,
    platform: VideoPlatform,
    plan: Vec<TranscriptSource>,
    next: usize,
    state: AcquisitionState,
    failures: Vec<(TranscriptSource, String)>,
}

impl TranscriptAcquisition {
    pub fn new(video_url: impl Into<String>) -> Self {
        let video_url = video_url.into().trim().to_string();
        let platform = VideoPlatform::classify(&video_url);

        let plan = match platform {
            _ if video_url.is_empty() => vec![],
            VideoPlatform::YouTube => vec![
                TranscriptSource::YouTubeCaptions,
                TranscriptSource::TranscriptionApi,
            ],
            _ => vec![TranscriptSource::TranscriptionApi],
        };

        TranscriptAcquisition {
            video_url,
            platform,
            plan,
            next: 0,
            state: AcquisitionState::NotStarted,
            failures: vec![],
        }
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn platform(&self) -> VideoPlatform {
        self.platform
    }

    pub fn plan(&self) -> &[TranscriptSource] {
        &self.plan
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn failures(&self) -> &[(TranscriptSource, String)] {
        &self.failures
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AcquisitionState::Resolved(_) | AcquisitionState::Failed(_)
        )
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        match &self.state {
            AcquisitionState::Resolved(transcript) => Some(transcript),
            _ => None,
        }
    }

    pub fn into_transcript(self) -> Option<Transcript> {
        match self.state {
            AcquisitionState::Resolved(transcript) => Some(transcript),
            _ => None,
        }
    }

    /// Advances the state machine. An event that makes no sense in the
    /// current state leaves it untouched.
    pub fn apply(&mut self, event: AcquisitionEvent) -> Result<&AcquisitionState, Error> {
        let current = mem::replace(&mut self.state, AcquisitionState::NotStarted);

        let next = match (current, event) {
            (AcquisitionState::NotStarted, AcquisitionEvent::Start) => self.next_automatic(),
            (AcquisitionState::TryingAutomatic(source), AcquisitionEvent::SourceSucceeded(text)) => {
                AcquisitionState::Resolved(Transcript::new(text, source))
            }
            (AcquisitionState::TryingAutomatic(source), AcquisitionEvent::SourceFailed(reason)) => {
                self.failures.push((source, reason));
                self.next_automatic()
            }
            (AcquisitionState::AwaitingManualInput(_), AcquisitionEvent::ManualInputProvided(text)) => {
                AcquisitionState::Resolved(Transcript::new(text, TranscriptSource::Manual))
            }
            (AcquisitionState::AwaitingManualInput(_), AcquisitionEvent::ManualInputDeclined) => {
                AcquisitionState::Failed(self.failure_reason())
            }
            (current, event) => {
                tracing::warn!(state = ?current, ?event, "Rejected transcript acquisition event");
                self.state = current;
                return Err(Error::InvalidTransition(
                    "event does not apply to the current acquisition state",
                ));
            }
        };

        tracing::debug!(state = ?next, "Transcript acquisition advanced");
        self.state = next;
        Ok(&self.state)
    }

    fn next_automatic(&mut self) -> AcquisitionState {
        match self.plan.get(self.next).copied() {
            Some(source) => {
                self.next += 1;
                AcquisitionState::TryingAutomatic(source)
            }
            None => AcquisitionState::AwaitingManualInput(ManualInstructions::new(
                self.video_url.clone(),
                self.platform,
            )),
        }
    }

    fn failure_reason(&self) -> String {
        if self.failures.is_empty() {
            return "manual transcription declined".into();
        }
        let tried = self
            .failures
            .iter()
            .map(|(source, reason)| format!("{source}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ");
        format!("manual transcription declined after automatic sources failed ({tried})")
    }

    /// Drives every automatic source in turn. Returns once the acquisition is
    /// resolved or waiting for manual input.
    #[tracing::instrument(skip_all, fields(video_url = %self.video_url, platform = %self.platform))]
    pub async fn run<C: CaptionProvider, T: TranscriptionService>(
        &mut self,
        captions: &C,
        transcription: &T,
        poll: &PollConfig,
    ) -> Result<&AcquisitionState, Error> {
        if self.state == AcquisitionState::NotStarted {
            self.apply(AcquisitionEvent::Start)?;
        }

        while let AcquisitionState::TryingAutomatic(source) = self.state {
            tracing::info!(%source, "Trying transcript source");
            let event = match self.attempt(source, captions, transcription, poll).await {
                Ok(text) => {
                    tracing::info!(%source, chars = text.len(), "Transcript retrieved");
                    AcquisitionEvent::SourceSucceeded(text)
                }
                Err(e) => {
                    tracing::warn!(%source, error = %e, "Transcript source failed");
                    AcquisitionEvent::SourceFailed(e.to_string())
                }
            };
            self.apply(event)?;
        }

        Ok(&self.state)
    }

    async fn attempt<C: CaptionProvider, T: TranscriptionService>(
        &self,
        source: TranscriptSource,
        captions: &C,
        transcription: &T,
        poll: &PollConfig,
    ) -> Result<String, Error> {
        let text = match source {
            TranscriptSource::YouTubeCaptions => {
                let video_id = youtube_video_id(&self.video_url)
                    .ok_or_else(|| Error::NotYouTube(self.video_url.clone()))?;
                fetch_captions(captions, &video_id).await?
            }
            TranscriptSource::TranscriptionApi => {
                transcribe_and_wait(transcription, &self.video_url, T::DEFAULT_LANGUAGE, poll)
                    .await?
            }
            TranscriptSource::Manual => {
                return Err(Error::InvalidTransition(
                    "manual entry is not an automatic source",
                ))
            }
        };

        if text.trim().is_empty() {
            return Err(Error::TranscriptionFailed("empty transcript".into()));
        }
        Ok(text)
    }

    pub fn submit_manual(&mut self, text: impl Into<String>) -> Result<&AcquisitionState, Error> {
        self.apply(AcquisitionEvent::ManualInputProvided(text.into()))
    }

    pub fn decline_manual(&mut self) -> Result<&AcquisitionState, Error> {
        self.apply(AcquisitionEvent::ManualInputDeclined)
    }
}
