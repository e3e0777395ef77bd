//! # Meeting DataStore
//!
//! Domain types shared by the meeting pipeline (meetings, their documents and
//! chat messages) and the [`SessionStore`] abstraction that keeps running chat
//! conversations keyed by meeting identity.
//!
//! Nothing here is persisted; sessions live for as long as the store does.

mod domain;
mod session;

pub use domain::{
    ChatMessage, Document, DocumentFormat, Meeting, MeetingDetails, MeetingId, Role,
};
pub use session::memory::InMemorySessionStore;
pub use session::SessionStore;
