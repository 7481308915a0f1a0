use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchsortError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read design '{path}': {source}")]
    ReadDesign {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported design format: {0}")]
    UnsupportedFormat(String),

    #[error("Design file is truncated ({0})")]
    Truncated(String),

    #[error("Design contains no stitches")]
    NoStitches,

    #[error("Design contains no valid coordinates")]
    NoCoordinates,

    #[error("Failed to write preview '{path}': {source}")]
    WritePreview {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode preview: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy file from '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Design has no assigned category: {0}")]
    MissingCategory(String),
}

pub type Result<T> = std::result::Result<T, StitchsortError>;
