use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use super::Message;

/// Shown when the backend answers without a usable `reply`.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't reply.";

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// No usable response: connection failure, timeout, undecodable body.
    #[error("{0}")]
    Network(String),
}

impl TransportError {
    /// Text shown to the user after the `Error: ` prefix.
    ///
    /// A response body wins over the status line; JSON bodies are shown in
    /// compact form so nested detail objects stay on one line.
    pub fn details(&self) -> String {
        match self {
            TransportError::Http { body, .. } if !body.trim().is_empty() => {
                match serde_json::from_str::<serde_json::Value>(body) {
                    Ok(serde_json::Value::String(text)) => text,
                    Ok(value) => value.to_string(),
                    Err(_) => body.clone(),
                }
            }
            TransportError::Http { status, .. } => {
                format!("Request failed with status code {status}")
            }
            TransportError::Network(message) if message.is_empty() => "Unknown error".to_string(),
            TransportError::Network(message) => message.clone(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Outcome of a fire-and-forget call.
///
/// The failure is carried so callers cannot mistake it for success, and
/// dropped on purpose with [`BestEffort::ignore`].
#[derive(Debug)]
#[must_use = "call .ignore() to discard a best-effort failure explicitly"]
pub struct BestEffort(Result<(), TransportError>);

impl BestEffort {
    pub fn ok() -> Self {
        Self(Ok(()))
    }

    pub fn failed(err: TransportError) -> Self {
        Self(Err(err))
    }

    pub fn succeeded(&self) -> bool {
        self.0.is_ok()
    }

    pub fn ignore(self) {
        if let Err(err) = self.0 {
            tracing::debug!(%err, "best-effort call failed; continuing");
        }
    }
}

impl From<Result<(), TransportError>> for BestEffort {
    fn from(result: Result<(), TransportError>) -> Self {
        Self(result)
    }
}

/// Remote side of the assistant.
pub trait ChatBackend {
    fn chat(&self, message: &str) -> impl Future<Output = Result<ChatReply, TransportError>> + Send;

    /// Ask the server to forget its copy of the conversation.
    fn reset(&self) -> impl Future<Output = BestEffort> + Send;
}

/// A user message that has been appended optimistically and is waiting for
/// its reply. `epoch` is the conversation generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub text: String,
    pub epoch: u64,
}

/// The assistant message for a finished request.
pub fn reply_message(result: Result<ChatReply, TransportError>) -> Message {
    match result {
        Ok(ChatReply {
            reply: Some(reply),
        }) if !reply.is_empty() => Message::assistant(reply),
        Ok(_) => Message::assistant(EMPTY_REPLY_FALLBACK),
        Err(err) => Message::assistant(format!("Error: {}", err.details())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn reply_or_fallback() {
        let msg = reply_message(Ok(ChatReply {
            reply: Some("Try the trail pack".into()),
        }));
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Try the trail pack");

        assert_eq!(
            reply_message(Ok(ChatReply {
                reply: Some(String::new())
            }))
            .content,
            EMPTY_REPLY_FALLBACK
        );
        assert_eq!(
            reply_message(Ok(ChatReply::default())).content,
            EMPTY_REPLY_FALLBACK
        );
    }

    #[test]
    fn error_details_follow_body_then_message() {
        let json = TransportError::Http {
            status: 400,
            body: r#"{ "detail": "message is required" }"#.into(),
        };
        assert_eq!(
            reply_message(Err(json)).content,
            r#"Error: {"detail":"message is required"}"#
        );

        let text = TransportError::Http {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(text.details(), "Bad Gateway");

        let empty = TransportError::Http {
            status: 500,
            body: String::new(),
        };
        assert_eq!(empty.details(), "Request failed with status code 500");

        let net = TransportError::Network("connection refused".into());
        assert_eq!(reply_message(Err(net)).content, "Error: connection refused");
    }

    #[test]
    fn best_effort_reports_outcome() {
        assert!(BestEffort::ok().succeeded());
        let failed = BestEffort::failed(TransportError::Network("down".into()));
        assert!(!failed.succeeded());
        failed.ignore();
    }
}
