//! Error handling for EventPlay-RS
//!
//! This module defines the engine's error taxonomy and a Result alias for use
//! throughout the crate.
//!
//! Only the timeline codec fails a whole operation (a malformed file yields no
//! timeline). Everything else degrades to "skip this event / warn / continue":
//! unresolved keys, listener or playback shutdown timeouts and per-event
//! injection failures are reported but never abort the engine.

use std::time::Duration;
use thiserror::Error;

/// Main error type for EventPlay-RS operations
#[derive(Error, Debug)]
pub enum EventPlayError {
    /// An event record is missing a mandatory field or carries a bad value
    #[error("Malformed event ({field}): {message}")]
    MalformedEvent { field: String, message: String },

    /// A timeline record is not usable; `index` points at the first bad event
    #[error("Malformed timeline{}: {message}", index_suffix(.index))]
    MalformedTimeline {
        index: Option<usize>,
        message: String,
    },

    /// A key name has no native key (or a native key has no name)
    #[error("Unresolved key: {0}")]
    UnresolvedKey(String),

    /// An input listener did not shut down in time
    #[error("{stream} listener did not stop within {timeout:?}")]
    ListenerShutdownTimeout { stream: String, timeout: Duration },

    /// The OS rejected a synthetic input action
    #[error("Injection failed: {0}")]
    InjectionFailure(String),

    /// The replay thread did not observe cancellation in time
    #[error("Playback did not stop within {0:?}")]
    PlaybackShutdownTimeout(Duration),

    /// Input backend could not be created
    #[error("Platform error: {0}")]
    Platform(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EventPlayError>,
    },
}

fn index_suffix(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at event [{}]", i),
        None => String::new(),
    }
}

impl EventPlayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EventPlayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a malformed event error for a field
    pub fn malformed_event(field: impl Into<String>, message: impl Into<String>) -> Self {
        EventPlayError::MalformedEvent {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a malformed timeline error
    pub fn malformed_timeline(index: Option<usize>, message: impl Into<String>) -> Self {
        EventPlayError::MalformedTimeline {
            index,
            message: message.into(),
        }
    }

    /// Whether the engine keeps working after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventPlayError::Platform(_) => false,
            EventPlayError::WithContext { source, .. } => source.is_recoverable(),
            _ => true,
        }
    }
}

impl From<serde_json::Error> for EventPlayError {
    fn from(err: serde_json::Error) -> Self {
        EventPlayError::Serialization(err.to_string())
    }
}

/// Result type alias for EventPlay-RS operations
pub type Result<T> = std::result::Result<T, EventPlayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EventPlayError::malformed_event("timestamp", "required field is missing");
        assert_eq!(
            err.to_string(),
            "Malformed event (timestamp): required field is missing"
        );
    }

    #[test]
    fn test_malformed_timeline_cites_index() {
        let err = EventPlayError::malformed_timeline(Some(3), "bad event");
        assert_eq!(err.to_string(), "Malformed timeline at event [3]: bad event");

        let err = EventPlayError::malformed_timeline(None, "events is missing");
        assert_eq!(err.to_string(), "Malformed timeline: events is missing");
    }

    #[test]
    fn test_error_with_context() {
        let err = EventPlayError::UnresolvedKey("banana_key".to_string());
        let with_ctx = err.with_context("Failed to replay key");
        assert!(with_ctx.to_string().contains("Failed to replay key"));
        assert!(with_ctx.to_string().contains("banana_key"));
    }

    #[test]
    fn test_recoverable() {
        assert!(EventPlayError::InjectionFailure("x".into()).is_recoverable());
        assert!(EventPlayError::PlaybackShutdownTimeout(Duration::from_secs(1)).is_recoverable());
        assert!(!EventPlayError::Platform("no display".into()).is_recoverable());
        assert!(!EventPlayError::Platform("no display".into())
            .with_context("creating injector")
            .is_recoverable());
    }
}
