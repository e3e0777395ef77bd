use std::{
    fmt::{Debug, Display},
    future::Future,
};

use meeting_datastore::ChatMessage;

/// Answers the last user message given the whole conversation so far.
pub trait Chatbot {
    type Error: Debug + Display;

    fn reply(&self, history: &[ChatMessage])
        -> impl Future<Output = Result<String, Self::Error>>;
}
