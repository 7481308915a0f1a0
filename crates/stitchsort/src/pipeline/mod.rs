pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod runner;

pub use config::BatchConfig;
pub use error::PipelineError;
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter};
pub use report::BatchReport;
pub use runner::BatchRunner;
