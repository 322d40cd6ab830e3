//! Session continuity: decides when the chat must be wiped because the
//! signed-in identity changed.
//!
//! The identity key is only a change detector. Conversation content and the
//! widget layout must not leak across identity boundaries, while re-observing
//! the same identity must not reset anything.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Guest,
    User(String),
}

impl IdentityKey {
    /// An empty username is treated as no user at all.
    pub fn from_username(username: Option<&str>) -> Self {
        match username {
            Some(name) if !name.is_empty() => IdentityKey::User(name.to_string()),
            _ => IdentityKey::Guest,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            IdentityKey::Guest => None,
            IdentityKey::User(name) => Some(name),
        }
    }

    /// First assistant message shown for this identity.
    pub fn welcome(&self) -> String {
        match self {
            IdentityKey::User(name) => format!(
                "Hi {name}! Tell me what you need + budget. I’ll recommend items from SmartShop."
            ),
            IdentityKey::Guest => {
                "Hi! You’re browsing as a guest. Tell me what you need + budget (if any)."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Guest => f.write_str("guest"),
            IdentityKey::User(name) => write!(f, "user:{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityTransition {
    /// First observation: greet, nothing to reset.
    Initialized,
    /// Login, logout or account switch: full reset plus a remote reset call.
    Changed { previous: IdentityKey },
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContinuity {
    last: Option<IdentityKey>,
}

impl SessionContinuity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&IdentityKey> {
        self.last.as_ref()
    }

    pub fn observe(&mut self, key: &IdentityKey) -> IdentityTransition {
        match self.last.as_ref() {
            None => {
                self.last = Some(key.clone());
                IdentityTransition::Initialized
            }
            Some(last) if last == key => IdentityTransition::Unchanged,
            Some(_) => {
                let previous = self.last.replace(key.clone());
                IdentityTransition::Changed {
                    previous: previous.unwrap_or(IdentityKey::Guest),
                }
            }
        }
    }
}
