use meeting_datastore::SessionStore;

use crate::{
    documents::DEFAULT_MAX_DOCUMENTS,
    llm::{Chatbot, Summarizer},
    source::MeetingSource,
    transcript::{CaptionProvider, PollConfig, TranscriptionService},
    MeetingPipeline,
};

pub struct MeetingPipelineBuilder<M = (), C = (), T = (), L = (), D = ()> {
    source: M,
    captions: C,
    transcription: T,
    llm: L,
    store: D,
    poll: PollConfig,
    max_documents: usize,
}

impl Default for MeetingPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeetingPipelineBuilder {
    pub fn new() -> Self {
        Self {
            source: (),
            captions: (),
            transcription: (),
            llm: (),
            store: (),
            poll: PollConfig::default(),
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }
}

impl<M, C, T, L, D> MeetingPipelineBuilder<M, C, T, L, D> {
    pub fn source<M2: MeetingSource>(self, source: M2) -> MeetingPipelineBuilder<M2, C, T, L, D> {
        MeetingPipelineBuilder {
            source,
            captions: self.captions,
            transcription: self.transcription,
            llm: self.llm,
            store: self.store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }

    pub fn captions<C2: CaptionProvider>(
        self,
        captions: C2,
    ) -> MeetingPipelineBuilder<M, C2, T, L, D> {
        MeetingPipelineBuilder {
            source: self.source,
            captions,
            transcription: self.transcription,
            llm: self.llm,
            store: self.store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }

    pub fn transcription<T2: TranscriptionService>(
        self,
        transcription: T2,
    ) -> MeetingPipelineBuilder<M, C, T2, L, D> {
        MeetingPipelineBuilder {
            source: self.source,
            captions: self.captions,
            transcription,
            llm: self.llm,
            store: self.store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }

    pub fn llm<L2: Summarizer + Chatbot>(self, llm: L2) -> MeetingPipelineBuilder<M, C, T, L2, D> {
        MeetingPipelineBuilder {
            source: self.source,
            captions: self.captions,
            transcription: self.transcription,
            llm,
            store: self.store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }

    pub fn store<D2: SessionStore>(self, store: D2) -> MeetingPipelineBuilder<M, C, T, L, D2> {
        MeetingPipelineBuilder {
            source: self.source,
            captions: self.captions,
            transcription: self.transcription,
            llm: self.llm,
            store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }

    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }
}

impl<M, C, T, L, D> MeetingPipelineBuilder<M, C, T, L, D>
where
    M: MeetingSource,
    C: CaptionProvider,
    T: TranscriptionService,
    L: Summarizer + Chatbot,
    D: SessionStore,
{
    pub fn build(self) -> MeetingPipeline<M, C, T, L, D> {
        MeetingPipeline {
            source: self.source,
            captions: self.captions,
            transcription: self.transcription,
            llm: self.llm,
            store: self.store,
            poll: self.poll,
            max_documents: self.max_documents,
        }
    }
}
