pub mod caption_provider;
pub mod llm;
pub mod meeting_source;
pub mod session_store;
pub mod transcription_service;
