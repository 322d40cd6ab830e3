//! Conversation transcript and chat transport.

pub mod transport;

use serde::{Deserialize, Serialize};

pub use transport::{
    BestEffort, ChatBackend, ChatReply, EMPTY_REPLY_FALLBACK, PendingSend, TransportError,
    reply_message,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only log of the current conversation.
///
/// While `follow` is set (the panel is open) every append asks the renderer to
/// scroll to the newest message; the request is consumed with
/// [`Transcript::take_scroll_request`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    follow: bool,
    scroll_pending: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        if self.follow {
            self.scroll_pending = true;
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn set_follow(&mut self, follow: bool) {
        self.follow = follow;
        if follow {
            self.scroll_pending = true;
        }
    }

    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

/// Canned prompts offered in the panel header.
pub const SAMPLE_QUESTIONS: [&str; 3] = [
    "Recommend hiking essentials for a student under $40",
    "I need a gift for my sister who likes running under $30",
    "HDMI cable 2m for laptop under $10",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_only_requests_scroll_while_following() {
        let mut t = Transcript::new();
        t.append(Message::assistant("hi"));
        assert!(!t.take_scroll_request());

        t.set_follow(true);
        assert!(t.take_scroll_request());
        t.append(Message::user("hello"));
        assert!(t.take_scroll_request());
        assert!(!t.take_scroll_request());
        assert_eq!(t.len(), 2);
        assert_eq!(t.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn clear_empties_everything() {
        let mut t = Transcript::new();
        t.append(Message::user("a"));
        t.append(Message::assistant("b"));
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
