//! Structured event sink writing through `tracing`.

use myblog_application::{LogLevel, LogSink};
use myblog_core::AppResult;

/// Forwards serialized events to the process `tracing` subscriber.
///
/// The channel becomes a `channel` field so subscribers can filter on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    /// Creates a new tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn emit(&self, channel: &str, level: LogLevel, line: &str) -> AppResult<()> {
        match level {
            LogLevel::Debug => tracing::debug!(target: "myblog::events", channel, "{line}"),
            LogLevel::Info => tracing::info!(target: "myblog::events", channel, "{line}"),
            LogLevel::Warn => tracing::warn!(target: "myblog::events", channel, "{line}"),
            LogLevel::Error => tracing::error!(target: "myblog::events", channel, "{line}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use myblog_application::{LogLevel, LogSink};

    use super::TracingLogSink;

    #[test]
    fn emits_every_level_without_subscriber() {
        let sink = TracingLogSink::new();
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert!(sink.emit("myblog", level, r#"{"event":"ping"}"#).is_ok());
        }
    }
}
