pub mod builder;

use meeting_datastore::{ChatMessage, Meeting, MeetingId, SessionStore};

use crate::{
    documents::document_context,
    llm::{ChatContext, Chatbot, Summarizer, SummaryRequest, SummaryResponse},
    source::MeetingSource,
    transcript::{
        available_languages, AcquisitionState, CaptionProvider, PollConfig, Transcript,
        TranscriptAcquisition, TranscriptionService,
    },
};

/// Drives one meeting at a time from listing to chat.
///
/// Every operation here is a component boundary: failures are logged and come
/// back as an empty list, `false` or `None`, never as an error.
pub struct MeetingPipeline<M, C, T, L, D>
where
    M: MeetingSource,
    C: CaptionProvider,
    T: TranscriptionService,
    L: Summarizer + Chatbot,
    D: SessionStore,
{
    pub(crate) source: M,
    pub(crate) captions: C,
    pub(crate) transcription: T,
    pub(crate) llm: L,
    pub(crate) store: D,
    pub(crate) poll: PollConfig,
    pub(crate) max_documents: usize,
}

impl<M, C, T, L, D> MeetingPipeline<M, C, T, L, D>
where
    M: MeetingSource,
    C: CaptionProvider,
    T: TranscriptionService,
    L: Summarizer + Chatbot,
    D: SessionStore,
{
    /// Partial meeting records from the listing page.
    #[tracing::instrument(skip(self))]
    pub async fn list_meetings(&self) -> Vec<Meeting> {
        self.source
            .fetch_meetings()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch meetings"))
            .unwrap_or_default()
    }

    /// Fills `meeting` in from its detail page. Returns whether the page could
    /// be fetched; the meeting is left as is otherwise.
    #[tracing::instrument(skip_all, fields(meeting = %meeting.url))]
    pub async fn load_meeting(&self, meeting: &mut Meeting) -> bool {
        match self.source.fetch_details(&meeting.url).await {
            Ok(details) => {
                if details.is_empty() {
                    tracing::warn!("Meeting page carried no details");
                }
                meeting.enrich(details);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch meeting details");
                false
            }
        }
    }

    /// Runs every automatic transcript source for `video_url`. The returned
    /// acquisition is either resolved or waiting for manual input.
    #[tracing::instrument(skip(self))]
    pub async fn acquire_transcript(&self, video_url: &str) -> TranscriptAcquisition {
        let mut acquisition = TranscriptAcquisition::new(video_url);

        let needs_manual_input = acquisition
            .run(&self.captions, &self.transcription, &self.poll)
            .await
            .map(|state| matches!(state, AcquisitionState::AwaitingManualInput(_)));

        match needs_manual_input {
            Ok(true) => tracing::warn!(
                failures = acquisition.failures().len(),
                "No automatic transcript source succeeded"
            ),
            Ok(false) => {}
            Err(e) => tracing::error!(error = %e, "Transcript acquisition stopped"),
        }

        acquisition
    }

    /// Caption languages published for a YouTube video. Empty for other
    /// platforms or when the track list can't be read.
    pub async fn caption_languages(&self, video_url: &str) -> Vec<String> {
        available_languages(&self.captions, video_url)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "No caption languages"))
            .unwrap_or_default()
    }

    #[tracing::instrument(skip_all, fields(meeting = %meeting.url))]
    pub async fn summarize(
        &self,
        meeting: &Meeting,
        transcript: Option<&Transcript>,
    ) -> Option<SummaryResponse> {
        let request = SummaryRequest {
            meeting_title: meeting.title.clone(),
            meeting_date: meeting.date.clone(),
            transcript: transcript.map(|t| t.text.clone()),
            document_context: document_context(&meeting.documents, self.max_documents),
            documents: meeting.documents.clone(),
        };

        self.llm
            .summarize(&request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to generate summary"))
            .ok()
    }

    pub async fn extract_action_items(&self, transcript: &Transcript) -> Option<Vec<String>> {
        self.llm
            .extract_action_items(&transcript.text)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to extract action items"))
            .ok()
    }

    /// Opens (or restarts) the chat session of `meeting`, seeded with the
    /// meeting material. Returns the assistant's greeting.
    #[tracing::instrument(skip_all, fields(meeting = %meeting.url))]
    pub async fn start_chat(
        &self,
        meeting: &Meeting,
        summary: &SummaryResponse,
        transcript: Option<&Transcript>,
    ) -> Option<String> {
        let document_context = document_context(&meeting.documents, self.max_documents);
        let context = ChatContext {
            summary: &summary.summary,
            meeting_title: &meeting.title,
            meeting_date: &meeting.date,
            sources_used: &summary.sources_used,
            transcript: transcript.map(|t| t.text.as_str()),
            document_context: &document_context,
            documents: &meeting.documents,
        };
        let greeting = context.greeting();

        self.store
            .start(
                &meeting.id(),
                vec![
                    ChatMessage::system(context.system_message()),
                    ChatMessage::assistant(greeting.clone()),
                ],
            )
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to start chat session"))
            .ok()?;

        Some(greeting)
    }

    /// Sends `question` with the whole conversation so far. The question and
    /// the answer are only recorded when an answer came back.
    #[tracing::instrument(skip(self, question))]
    pub async fn ask(&self, meeting: &MeetingId, question: &str) -> Option<String> {
        let mut history = self
            .store
            .messages(meeting)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to load chat history"))
            .ok()?;

        if history.is_empty() {
            tracing::warn!("No chat session for meeting");
            return None;
        }

        let question = ChatMessage::user(question);
        history.push(question.clone());

        let answer = self
            .llm
            .reply(&history)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to answer question"))
            .ok()?;

        self.store
            .append(meeting, vec![question, ChatMessage::assistant(answer.clone())])
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to record chat exchange"))
            .ok()?;

        Some(answer)
    }

    pub async fn chat_history(&self, meeting: &MeetingId) -> Vec<ChatMessage> {
        self.store
            .messages(meeting)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to load chat history"))
            .unwrap_or_default()
    }

    pub async fn end_chat(&self, meeting: &MeetingId) -> bool {
        self.store
            .clear(meeting)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to clear chat session"))
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub async fn download_document(&self, document_url: &str) -> Option<Vec<u8>> {
        self.source
            .download_document(document_url)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to download document"))
            .ok()
    }
}
