mod chat;
pub mod openai;
pub mod prompts;
mod summarizer;

pub use chat::Chatbot;
pub use openai::{CompletionParams, OpenAIClient, OpenAIError};
pub use prompts::{ChatContext, SourceProfile};
pub use summarizer::{Summarizer, SummaryRequest, SummaryResponse};
