/// Coarse job state carried by every [`ProgressEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Nothing has started yet.
    Idle,
    /// The job is decoding, retiming or encoding.
    Processing,
    /// The job produced its output.
    Complete,
    /// The job failed; `error` holds the message.
    Error,
}

/// One informational progress update emitted by a job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Current job state.
    pub status: ProgressStatus,
    /// Human-readable description of the current step.
    pub message: String,
    /// Completion estimate in `0..=100`.
    pub percent: f32,
    /// 1-based index of the item being processed (stitch jobs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_item: Option<usize>,
    /// Number of items in the job (stitch jobs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<usize>,
    /// Error text when `status` is [`ProgressStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// Build a `processing` event.
    pub fn processing(message: impl Into<String>, percent: f32) -> Self {
        Self {
            status: ProgressStatus::Processing,
            message: message.into(),
            percent: percent.clamp(0.0, 100.0),
            current_item: None,
            total_items: None,
            error: None,
        }
    }

    /// Build the terminal `complete` event.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Complete,
            message: message.into(),
            percent: 100.0,
            current_item: None,
            total_items: None,
            error: None,
        }
    }

    /// Build the terminal `error` event.
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Error,
            message: message.into(),
            percent: 0.0,
            current_item: None,
            total_items: None,
            error: Some(error.into()),
        }
    }

    /// Attach `current/total` item counters.
    pub fn with_item(mut self, current: usize, total: usize) -> Self {
        self.current_item = Some(current);
        self.total_items = Some(total);
        self
    }
}

/// One-way observer for job progress.
///
/// Jobs call `on_progress` synchronously and never read anything back, so implementations must
/// return quickly and must not block on the job.
pub trait ProgressObserver: Send + Sync {
    /// Receive one progress update.
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Optional-observer wrapper used inside jobs.
#[derive(Clone, Copy)]
pub(crate) struct Progress<'a> {
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self { observer }
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(observer) = self.observer {
            observer.on_progress(&event);
        }
    }

    pub(crate) fn step(&self, message: impl Into<String>, percent: f32) {
        if self.observer.is_some() {
            self.emit(ProgressEvent::processing(message, percent));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/progress.rs"]
mod tests;
