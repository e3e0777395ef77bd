use std::future::Future;

use crate::{ChatMessage, MeetingId};

pub mod memory;

/// Running chat conversations, one ordered message sequence per meeting.
pub trait SessionStore {
    /// Returns the conversation so far, empty if none was started.
    fn messages(
        &self,
        meeting: &MeetingId,
    ) -> impl Future<Output = anyhow::Result<Vec<ChatMessage>>> + Send;

    /// Replaces any existing conversation with `seed`.
    fn start(
        &self,
        meeting: &MeetingId,
        seed: Vec<ChatMessage>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn append(
        &self,
        meeting: &MeetingId,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Drops the conversation, returning whether one existed.
    fn clear(&self, meeting: &MeetingId) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

impl<T: SessionStore + Send + Sync> SessionStore for &T {
    async fn messages(&self, meeting: &MeetingId) -> anyhow::Result<Vec<ChatMessage>> {
        (**self).messages(meeting).await
    }

    async fn start(&self, meeting: &MeetingId, seed: Vec<ChatMessage>) -> anyhow::Result<()> {
        (**self).start(meeting, seed).await
    }

    async fn append(&self, meeting: &MeetingId, messages: Vec<ChatMessage>) -> anyhow::Result<()> {
        (**self).append(meeting, messages).await
    }

    async fn clear(&self, meeting: &MeetingId) -> anyhow::Result<bool> {
        (**self).clear(meeting).await
    }
}
