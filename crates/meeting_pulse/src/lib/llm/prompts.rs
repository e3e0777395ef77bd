//! Prompt assembly. The wording adapts to which sources a meeting actually
//! has, so a summary built from an agenda alone never claims to know what
//! happened in the room.

use meeting_datastore::Document;

use crate::llm::SummaryRequest;

const SYSTEM_GENERAL: &str = include_str!("./prompts/system_general.txt");
const SYSTEM_AGENDA: &str = include_str!("./prompts/system_agenda.txt");
const SYSTEM_TRANSCRIPT: &str = include_str!("./prompts/system_transcript.txt");
const SYSTEM_MINUTES: &str = include_str!("./prompts/system_minutes.txt");
const CHAT_PREAMBLE: &str = include_str!("./prompts/chat.txt");

pub const ACTION_ITEMS_SYSTEM_PROMPT: &str = include_str!("./prompts/action_items.txt");

/// Which kinds of source material are available for one meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceProfile {
    pub has_transcript: bool,
    pub has_documents: bool,
    pub has_minutes: bool,
    pub has_agenda: bool,
    pub document_count: usize,
}

impl SourceProfile {
    pub fn detect(transcript: Option<&str>, documents: &[Document]) -> Self {
        let mentions = |needle: &str| {
            documents
                .iter()
                .any(|doc| doc.title.to_lowercase().contains(needle))
        };

        SourceProfile {
            has_transcript: transcript.is_some_and(|t| !t.trim().is_empty()),
            has_documents: !documents.is_empty(),
            has_minutes: mentions("minutes"),
            has_agenda: mentions("agenda"),
            document_count: documents.len(),
        }
    }

    /// Minutes win over a transcript, a transcript over an agenda.
    pub fn system_prompt(&self) -> &'static str {
        if self.has_minutes {
            SYSTEM_MINUTES
        } else if self.has_transcript {
            SYSTEM_TRANSCRIPT
        } else if self.has_agenda {
            SYSTEM_AGENDA
        } else {
            SYSTEM_GENERAL
        }
    }

    pub fn sources_used(&self) -> String {
        match (self.has_transcript, self.has_documents) {
            (true, true) => "Video transcript, Meeting documents",
            (true, false) => "Video transcript",
            (false, true) => "Meeting documents",
            (false, false) => "Meeting details only",
        }
        .to_string()
    }

    fn opening(&self) -> &'static str {
        if self.has_transcript && self.has_documents {
            "Please provide a comprehensive summary of this city council meeting based on the video transcript and supporting documents."
        } else if self.has_transcript {
            "Please provide a comprehensive summary of this city council meeting based on the video transcript."
        } else if self.has_minutes {
            "Please provide a summary of this city council meeting based on the available meeting minutes and documents."
        } else if self.has_agenda {
            "Please provide a summary of what was planned for this city council meeting based on the available agenda and documents."
        } else {
            "Please provide a summary based on the available meeting information."
        }
    }

    fn source_note(&self) -> &'static str {
        if self.has_transcript && self.has_documents {
            "**Summary based on:** Video transcript and meeting documents"
        } else if self.has_transcript {
            "**Summary based on:** Video transcript only"
        } else if self.has_minutes {
            "**Summary based on:** Meeting minutes and documents (no video available)"
        } else if self.has_agenda {
            "**Summary based on:** Meeting agenda only (no video or minutes available)"
        } else {
            "**Summary based on:** Limited meeting information"
        }
    }

    fn focus(&self) -> Option<&'static str> {
        if self.has_transcript {
            Some("Focus on what actually occurred during the meeting as captured in the transcript.")
        } else if self.has_minutes {
            Some("Focus on official decisions and actions as recorded in the meeting minutes.")
        } else if self.has_agenda {
            Some("Focus on what was planned for discussion. Use language like 'scheduled to discuss', 'planned for review', etc. Note that without minutes or video, actual outcomes are unknown.")
        } else {
            None
        }
    }

    fn document_uses(&self) -> [&'static str; 3] {
        if self.has_transcript {
            [
                "- Provide context for discussions in the transcript",
                "- Identify which agenda items were covered",
                "- Include relevant background information",
            ]
        } else if self.has_minutes {
            [
                "- Understand the full context of recorded decisions",
                "- Provide background on agenda items",
                "- Include relevant supporting information",
            ]
        } else {
            [
                "- Understand planned discussion topics",
                "- Provide context for agenda items",
                "- Include relevant background information",
            ]
        }
    }

    fn closing(&self) -> &'static str {
        if self.has_transcript {
            "Please ensure the summary is well-structured, professional, and captures all significant discussions and decisions. If meeting documents include agenda items that weren't discussed in the transcript, note them as 'Not discussed' or 'Deferred'."
        } else if self.has_minutes {
            "Please clearly indicate that this summary is based on meeting documents only (not video recording). Focus on official decisions and actions as recorded in the minutes and supporting documents."
        } else {
            "Please clearly state that this summary represents what was PLANNED for discussion according to the agenda, not what actually occurred. Use language like 'was scheduled to discuss', 'was planned for review', etc. Note that without minutes or video, the actual outcomes are unknown."
        }
    }
}

pub fn summary_prompt(request: &SummaryRequest, profile: &SourceProfile) -> String {
    let mut parts = vec![
        profile.opening().to_string(),
        "\nThe summary should include (when information is available):".into(),
        "1. Key topics and agenda items discussed".into(),
        "2. Important decisions made".into(),
        "3. Action items and next steps".into(),
        "4. Public comments (if any)".into(),
        "5. Votes taken and their outcomes".into(),
    ];

    if let Some(focus) = profile.focus() {
        parts.push(format!("\n{focus}"));
    }

    if !request.meeting_title.trim().is_empty() {
        parts.push(format!("\n\nMeeting: {}", request.meeting_title.trim()));
    }
    if !request.meeting_date.trim().is_empty() {
        parts.push(format!("Date: {}", request.meeting_date.trim()));
    }

    if profile.has_documents && !request.document_context.trim().is_empty() {
        parts.push(format!(
            "\n\nMeeting Documents ({} available):",
            profile.document_count
        ));
        parts.push(request.document_context.clone());
        parts.push("\nUse these documents to:".into());
        parts.extend(profile.document_uses().map(String::from));
    }

    if let Some(transcript) = request.transcript.as_deref().filter(|_| profile.has_transcript) {
        parts.push(format!("\n\nMeeting Transcript:\n{transcript}"));
    }

    parts.push(format!(
        "\n\n{}\n\n{}",
        profile.source_note(),
        profile.closing()
    ));

    parts.join("\n")
}

pub fn action_items_prompt(transcript: &str) -> String {
    format!("Please extract all action items from this meeting transcript:\n\n{transcript}")
}

pub fn split_action_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Material the chat assistant is grounded on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatContext<'a> {
    pub summary: &'a str,
    pub meeting_title: &'a str,
    pub meeting_date: &'a str,
    pub sources_used: &'a str,
    pub transcript: Option<&'a str>,
    pub document_context: &'a str,
    pub documents: &'a [Document],
}

impl ChatContext<'_> {
    /// System message that opens a chat session.
    pub fn system_message(&self) -> String {
        let mut sections = vec![CHAT_PREAMBLE.trim().to_string()];

        let mut header = vec![];
        if !self.meeting_title.trim().is_empty() {
            header.push(format!("MEETING TITLE: {}", self.meeting_title.trim()));
        }
        if !self.meeting_date.trim().is_empty() {
            header.push(format!("MEETING DATE: {}", self.meeting_date.trim()));
        }
        if !self.sources_used.trim().is_empty() {
            header.push(format!(
                "SOURCES USED FOR THIS SUMMARY: {}",
                self.sources_used.trim()
            ));
        }
        if !header.is_empty() {
            sections.push(header.join("\n"));
        }

        sections.push(format!("MEETING SUMMARY:\n{}", self.summary));

        sections.push(match self.transcript.filter(|t| !t.trim().is_empty()) {
            Some(transcript) => format!("FULL MEETING TRANSCRIPT:\n{transcript}"),
            None => "MEETING TRANSCRIPT: Not available".into(),
        });

        sections.push(if self.document_context.trim().is_empty() {
            "MEETING DOCUMENTS: No additional documents were available".into()
        } else {
            format!("MEETING DOCUMENTS AND CONTEXT:\n{}", self.document_context)
        });

        if !self.documents.is_empty() {
            let references = self
                .documents
                .iter()
                .map(|doc| format!("- {}: {}", doc.title, doc.url))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("DOCUMENT REFERENCES:\n{references}"));
        }

        sections.join("\n\n")
    }

    pub fn greeting(&self) -> String {
        let title = self.meeting_title.trim();
        if title.is_empty() {
            "I've reviewed the materials for this meeting. What would you like to know?".into()
        } else {
            format!("I've reviewed the materials for {title}. What would you like to know?")
        }
    }
}
