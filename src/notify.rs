use serde::Serialize;

pub const DEFAULT_TTL_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient, auto-dismissing message for the UI toast area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub ttl_ms: u64,
}

/// Notifications raised while handling one event. Fire-and-forget: they are
/// attached to the response and never acknowledged.
#[derive(Debug)]
pub struct Outbox {
    ttl_ms: u64,
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, %message, "notification");
        self.pending.push(Notification {
            level,
            message,
            ttl_ms: self.ttl_ms,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
