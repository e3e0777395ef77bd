use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{session::SessionStore, ChatMessage, MeetingId};

/// Process local session store. Conversations are lost when it is dropped.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<MeetingId, Vec<ChatMessage>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, HashMap<MeetingId, Vec<ChatMessage>>>> {
        self.sessions
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))
    }
}

impl SessionStore for InMemorySessionStore {
    async fn messages(&self, meeting: &MeetingId) -> anyhow::Result<Vec<ChatMessage>> {
        Ok(self.lock()?.get(meeting).cloned().unwrap_or_default())
    }

    async fn start(&self, meeting: &MeetingId, seed: Vec<ChatMessage>) -> anyhow::Result<()> {
        tracing::debug!(%meeting, messages = seed.len(), "Starting chat session");
        self.lock()?.insert(meeting.clone(), seed);
        Ok(())
    }

    async fn append(&self, meeting: &MeetingId, messages: Vec<ChatMessage>) -> anyhow::Result<()> {
        self.lock()?
            .entry(meeting.clone())
            .or_default()
            .extend(messages);
        Ok(())
    }

    async fn clear(&self, meeting: &MeetingId) -> anyhow::Result<bool> {
        Ok(self.lock()?.remove(meeting).is_some())
    }
}
