pub mod category;
pub mod classify;
pub mod config;
pub mod design;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod render;
pub mod secrets;
pub mod storage;

pub use category::{Category, Language};
pub use classify::{Classifier, OpenAiClassifier, OpenAiConfig};
pub use config::Config;
pub use design::DesignRecord;
pub use error::{
    ConfigError, RenderError, Result, ScanError, StitchsortError, StorageError,
};
pub use pattern::{read_pes_file, StitchCommand, StitchOp};
pub use pipeline::{
    BatchConfig, BatchReport, BatchRunner, NoopProgress, PipelineError, ProgressEvent,
    ProgressReporter,
};
pub use render::{RenderConfig, StitchRenderer};
pub use secrets::{resolve_secret, SecretError};
pub use storage::DesignStore;
