//! Progress and diagnostic sinks.
//!
//! The pipeline owns no presentation; callers inject callbacks and the
//! core reports through them. Every sink is optional and a missing sink is
//! a no-op, so library use without a UI costs nothing.

use std::sync::Arc;

/// `(current, total, stage)` progress callback.
pub type ProgressSink = Arc<dyn Fn(usize, usize, Option<&str>) + Send + Sync>;

/// Diagnostic message callback for warnings and errors.
pub type MessageSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Bundle of caller-supplied sinks handed through the pipeline.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    pub progress: Option<ProgressSink>,
    pub warn: Option<MessageSink>,
    pub error: Option<MessageSink>,
}

impl ProgressReporter {
    /// Reporter that discards everything.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn progress(&self, current: usize, total: usize, stage: Option<&str>) {
        if let Some(sink) = &self.progress {
            sink(current, total, stage);
        }
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        if let Some(sink) = &self.warn {
            sink(message);
        }
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{message}");
        if let Some(sink) = &self.error {
            sink(message);
        }
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("progress", &self.progress.is_some())
            .field("warn", &self.warn.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
