/// Events emitted by the batch runner while processing.
pub enum ProgressEvent {
    FileStarted {
        ordinal: usize,
        total: usize,
        name: String,
    },
    FileCompleted {
        name: String,
        category: String,
    },
    FileFailed {
        name: String,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}
