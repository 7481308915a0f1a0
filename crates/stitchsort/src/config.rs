//! Runtime configuration for the classification backend.
//!
//! Settings merge from an optional JSON file and the environment. The
//! file may live at an explicit path or at the platform config dir
//! (`<config_dir>/stitchsort/config.json`); missing files fall back to
//! defaults with the API key resolved from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::classify::OpenAiConfig;
use crate::error::ConfigError;
use crate::render::RenderConfig;
use crate::secrets::resolve_secret;

/// Environment variable holding the API key when no file source is set.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

const CONFIG_DIR_NAME: &str = "stitchsort";
const CONFIG_FILE_NAME: &str = "config.json";

/// On-disk configuration shape. All fields optional; defaults apply.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    /// Direct API key value. Prefer `api_key_file` or the env var.
    api_key: Option<String>,
    /// Path to a file containing the API key.
    api_key_file: Option<String>,
    model: Option<String>,
    api_base: Option<String>,
    request_timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    preview: PreviewFileConfig,
}

/// Optional preview-rendering overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PreviewFileConfig {
    max_width: Option<u32>,
    max_height: Option<u32>,
    jpeg_quality: Option<u8>,
}

/// Resolved configuration, ready to hand to the classifier and renderer.
pub struct Config {
    pub api_key: SecretString,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    render: RenderConfig,
}

impl Config {
    /// Loads configuration, merging the file (if any) with the
    /// environment. An explicit path must exist; the default location
    /// is used only when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(explicit) => Some(read_file_config(explicit)?),
            None => match default_config_path() {
                Some(default) if default.is_file() => Some(read_file_config(&default)?),
                _ => None,
            },
        };
        let file = file.unwrap_or_default();

        let api_key = resolve_secret(
            file.api_key.as_deref(),
            file.api_key_file.as_deref(),
            Some(API_KEY_ENV_VAR),
        )?;

        let mut render = RenderConfig::default();
        if let Some(max_width) = file.preview.max_width {
            render.max_width = max_width;
        }
        if let Some(max_height) = file.preview.max_height {
            render.max_height = max_height;
        }
        if let Some(jpeg_quality) = file.preview.jpeg_quality {
            render.jpeg_quality = jpeg_quality;
        }

        Ok(Self {
            api_key,
            model: file.model,
            api_base: file.api_base,
            timeout: file.request_timeout_secs.map(Duration::from_secs),
            max_retries: file.max_retries,
            render,
        })
    }

    /// Preview-rendering settings, file overrides applied over defaults.
    pub fn render(&self) -> RenderConfig {
        self.render.clone()
    }

    /// Builds the backend configuration, keeping backend defaults for
    /// anything the file left unset.
    pub fn openai(self) -> OpenAiConfig {
        let mut config = OpenAiConfig::new(self.api_key);
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        config
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: FileConfig = serde_json::from_str(&content)?;
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
