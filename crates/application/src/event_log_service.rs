//! Structured event logging enriched with the request context.
//!
//! Every call produces one JSON line of the form
//! `{"event": ..., "data": ..., "txid": ..., "uid": ...}` and hands it to a
//! [`LogSink`]. Logging is best-effort: failures never reach the caller.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use myblog_core::{AppError, AppResult, ContextSlot};
use serde::{Deserialize, Serialize};

/// Severity of a structured event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operational event.
    #[default]
    Info,
    /// Unexpected but handled condition.
    Warn,
    /// Failed operation.
    Error,
}

impl LogLevel {
    /// Returns the canonical level name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Output port receiving serialized event lines.
pub trait LogSink: Send + Sync {
    /// Writes one serialized event to the named channel.
    fn emit(&self, channel: &str, level: LogLevel, line: &str) -> AppResult<()>;
}

#[derive(Serialize)]
struct LogRecord<'a, T: Serialize + ?Sized> {
    event: &'a str,
    data: &'a T,
    txid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<i64>,
}

/// Serializes one event with the ambient context of `context`.
///
/// `txid` is `null` outside a request; `uid` is omitted unless a non-zero user
/// is authenticated.
pub fn render_event<T: Serialize + ?Sized>(
    context: &ContextSlot,
    event_name: &str,
    data: &T,
) -> AppResult<String> {
    let record = LogRecord {
        event: event_name,
        data,
        txid: context
            .current_transaction_id()
            .map(|transaction_id| transaction_id.to_string()),
        uid: context.current_user_id().filter(|user_id| *user_id != 0),
    };

    serde_json::to_string(&record).map_err(|error| {
        AppError::Internal(format!("failed to serialize event '{event_name}': {error}"))
    })
}

/// Emits structured events on a named channel.
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn LogSink>,
    channel: Arc<str>,
}

impl EventLogger {
    /// Creates a logger writing to `channel`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>, channel: impl Into<String>) -> Self {
        let channel: String = channel.into();
        Self {
            sink,
            channel: Arc::from(channel),
        }
    }

    /// Returns the channel this logger writes to.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns a logger sharing the sink but writing to another channel.
    #[must_use]
    pub fn for_channel(&self, channel: impl Into<String>) -> Self {
        Self::new(self.sink.clone(), channel)
    }

    /// Logs an event at [`LogLevel::Info`].
    pub fn log_event<T: Serialize + ?Sized>(
        &self,
        context: &ContextSlot,
        event_name: &str,
        data: &T,
    ) {
        self.log_event_at(context, event_name, data, LogLevel::Info);
    }

    /// Logs an event at the given level. Never fails.
    pub fn log_event_at<T: Serialize + ?Sized>(
        &self,
        context: &ContextSlot,
        event_name: &str,
        data: &T,
        level: LogLevel,
    ) {
        let outcome = render_event(context, event_name, data)
            .and_then(|line| self.sink.emit(&self.channel, level, &line));

        if let Err(error) = outcome {
            tracing::error!(
                channel = %self.channel,
                event = event_name,
                %error,
                "structured event dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(String, LogLevel, String)>>,
    }

    impl RecordingSink {
        fn entries(&self) -> Vec<(String, LogLevel, String)> {
            self.lines
                .lock()
                .map(|guard| guard.clone())
                .unwrap_or_default()
        }

        fn last_record(&self) -> Value {
            self.entries()
                .last()
                .and_then(|(_, _, line)| serde_json::from_str(line).ok())
                .unwrap_or(Value::Null)
        }
    }

    impl LogSink for RecordingSink {
        fn emit(&self, channel: &str, level: LogLevel, line: &str) -> AppResult<()> {
            self.lines
                .lock()
                .map_err(|error| AppError::Internal(format!("failed to lock sink: {error}")))?
                .push((channel.to_owned(), level, line.to_owned()));
            Ok(())
        }
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn emit(&self, _channel: &str, _level: LogLevel, _line: &str) -> AppResult<()> {
            Err(AppError::Internal("sink unavailable".to_owned()))
        }
    }

    #[test]
    fn event_inside_request_carries_txid_and_uid() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::new(sink.clone(), "myblog");
        let slot = ContextSlot::new();

        let guard = slot.enter(Some(42));
        logger.log_event(&slot, "get_blogs_by_author", &json!({"author_id": 1}));
        let transaction_id = slot.current_transaction_id().map(|id| id.to_string());
        drop(guard);

        let record = sink.last_record();
        assert_eq!(record["event"], "get_blogs_by_author");
        assert_eq!(record["data"]["author_id"], 1);
        assert_eq!(record["uid"], 42);
        assert_eq!(record["txid"].as_str().map(ToOwned::to_owned), transaction_id);
    }

    #[test]
    fn event_outside_request_omits_uid_and_nulls_txid() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::new(sink.clone(), "myblog");
        let slot = ContextSlot::new();

        {
            let _guard = slot.enter(Some(42));
        }
        logger.log_event(&slot, "demo", &json!({"author_id": 1}));

        let record = sink.last_record();
        assert!(record.get("uid").is_none());
        assert_eq!(record["txid"], Value::Null);
    }

    #[test]
    fn anonymous_request_omits_uid_but_keeps_txid() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::new(sink.clone(), "myblog");
        let slot = ContextSlot::new();

        let _guard = slot.enter(None);
        logger.log_event(&slot, "hello_world", "anonymous");

        let record = sink.last_record();
        assert!(record.get("uid").is_none());
        assert!(record["txid"].is_string());
        assert_eq!(record["data"], "anonymous");
    }

    #[test]
    fn level_and_channel_are_forwarded() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::new(sink.clone(), "myblog").for_channel("audit");
        let slot = ContextSlot::new();

        logger.log_event_at(&slot, "publish_rejected", &1, LogLevel::Warn);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "audit");
        assert_eq!(entries[0].1, LogLevel::Warn);
    }

    #[test]
    fn serialization_failure_is_swallowed() {
        let sink = Arc::new(RecordingSink::default());
        let logger = EventLogger::new(sink.clone(), "myblog");
        let slot = ContextSlot::new();

        let mut unserializable = HashMap::new();
        unserializable.insert((1, 2), "tuple keys are not valid JSON object keys");

        logger.log_event(&slot, "broken", &unserializable);
        assert!(sink.entries().is_empty());
        assert!(render_event(&slot, "broken", &unserializable).is_err());
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let logger = EventLogger::new(Arc::new(FailingSink), "myblog");
        let slot = ContextSlot::new();
        let _guard = slot.enter(Some(1));

        logger.log_event(&slot, "still_fine", &json!({}));
    }
}
