use meeting_datastore::{ChatMessage, InMemorySessionStore, MeetingId, SessionStore};

/// In-memory store that can be told to reject writes.
#[derive(Default)]
pub struct MockSessionStore {
    pub inner: InMemorySessionStore,
    pub fail_writes_with: Option<String>,
}

impl MockSessionStore {
    pub fn failing_writes(msg: &str) -> Self {
        Self {
            fail_writes_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl SessionStore for MockSessionStore {
    async fn messages(&self, meeting: &MeetingId) -> anyhow::Result<Vec<ChatMessage>> {
        self.inner.messages(meeting).await
    }

    async fn start(&self, meeting: &MeetingId, seed: Vec<ChatMessage>) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_writes_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.inner.start(meeting, seed).await
    }

    async fn append(&self, meeting: &MeetingId, messages: Vec<ChatMessage>) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_writes_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.inner.append(meeting, messages).await
    }

    async fn clear(&self, meeting: &MeetingId) -> anyhow::Result<bool> {
        self.inner.clear(meeting).await
    }
}
