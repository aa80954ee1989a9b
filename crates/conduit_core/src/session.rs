use std::sync::RwLock;

use serde_json::Value;
use shared::domain::User;
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::ShellError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn token(&self) -> Option<&shared::domain::AuthToken> {
        self.user.as_ref().map(|user| &user.token)
    }

    /// Replaces the user and reports whether this signed the user out.
    pub(crate) fn set_user(&mut self, user: Option<User>) -> bool {
        let signed_out = self.user.is_some() && user.is_none();
        self.user = user;
        signed_out
    }
}

/// External mirror of the session, such as browser storage shared between tabs.
pub trait SessionChannel: Send + Sync {
    fn store(&self, user: Option<&User>) -> Result<(), ShellError>;
    fn load(&self) -> Option<String>;
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

/// In-process channel. `notify_external` simulates a write made by another tab.
pub struct MemorySessionChannel {
    stored: RwLock<Option<String>>,
    events: broadcast::Sender<String>,
}

impl MemorySessionChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            stored: RwLock::new(None),
            events,
        }
    }

    pub fn with_stored(raw: impl Into<String>) -> Self {
        let channel = Self::new();
        if let Ok(mut guard) = channel.stored.write() {
            *guard = Some(raw.into());
        }
        channel
    }

    pub fn stored(&self) -> Option<String> {
        self.stored.read().ok().and_then(|guard| guard.clone())
    }

    pub fn notify_external(&self, raw: impl Into<String>) {
        let raw = raw.into();
        if let Ok(mut guard) = self.stored.write() {
            *guard = if raw.is_empty() || raw == "null" {
                None
            } else {
                Some(raw.clone())
            };
        }
        // No receivers simply means nobody is listening yet.
        let _ = self.events.send(raw);
    }
}

impl Default for MemorySessionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionChannel for MemorySessionChannel {
    fn store(&self, user: Option<&User>) -> Result<(), ShellError> {
        let raw = user.map(encode_user).transpose()?;
        let mut guard = self
            .stored
            .write()
            .map_err(|_| ShellError::Persistence("session storage lock poisoned".into()))?;
        *guard = raw;
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.stored()
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}

pub fn encode_user(user: &User) -> Result<String, ShellError> {
    Ok(serde_json::to_string(user)?)
}

/// Decodes a raw session-change payload. Anything malformed means "no user".
pub fn decode_user(raw: &str) -> Option<User> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return None;
    }
    match serde_json::from_str::<User>(raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "discarding malformed session payload");
            None
        }
    }
}

/// Decodes the boot payload: a JSON string whose contents are a JSON-encoded user.
pub fn decode_boot_payload(raw: &str) -> Option<User> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "boot payload is not JSON; starting anonymous");
            return None;
        }
    };
    match value {
        Value::String(inner) => decode_user(&inner),
        Value::Null => None,
        other => match serde_json::from_value::<User>(other) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "boot payload does not describe a user; starting anonymous");
                None
            }
        },
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
