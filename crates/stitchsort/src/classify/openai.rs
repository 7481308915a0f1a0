//! OpenAI Vision classification client with bounded retry and backoff.

use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::category::{Category, SUPPORTED_CATEGORIES};
use crate::classify::Classifier;
use crate::error::ConfigError;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
/// Cheaper model for the availability probe.
const PROBE_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Backoff grows linearly: attempt N waits N * this step.
const BACKOFF_STEP: Duration = Duration::from_secs(2);

/// Maximum length for logged error bodies to keep logs readable.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Closed prompt: the model is constrained to one of the known
/// category identifiers, answered as a single word.
const CATEGORIZATION_PROMPT: &str = "\
Analyze this embroidery image and categorize it into ONE of the following main categories:

- teddy_bears (teddy bears, bears)
- angels (angels)
- names (names, text, letters)
- cars (cars, vehicles)
- flowers (flowers, floral)
- animals (animals, pets)
- hearts (hearts, love)
- stars (stars)
- butterflies (butterflies)
- babies (babies, children)
- christmas (christmas, holiday)
- easter (easter)
- sports (sports)
- food (food)
- nature (nature, trees)
- other (other)

Respond ONLY with the category name in English, as one word, without additional explanations.
Valid response examples: \"teddy_bears\", \"flowers\", \"names\", \"cars\"";

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl OpenAiConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Error, Debug)]
enum AttemptError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub struct OpenAiClassifier {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClassifier {
    pub fn new(config: OpenAiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ConfigError::Validation {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    pub fn supported_categories() -> &'static [&'static str] {
        SUPPORTED_CATEGORIES
    }

    fn attempt(&self, base64_image: &str) -> Result<String, AttemptError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": CATEGORIZATION_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:image/jpeg;base64,{}", base64_image),
                            // Low detail keeps token usage bounded
                            "detail": "low",
                        },
                    },
                ],
            }],
            "max_tokens": 50,
            "temperature": 0.1,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(self.config.api_key.expose_secret())
            .timeout(self.config.timeout)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ChatResponse = response.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AttemptError::Malformed("no message content in response".to_string()))
    }
}

impl Classifier for OpenAiClassifier {
    fn classify(&self, image_path: &Path) -> Category {
        let _span = tracing::info_span!("classify").entered();

        // Unreadable image: degrade without any network call
        let image_bytes = match std::fs::read(image_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Cannot read preview {}: {}", image_path.display(), e);
                return Category::other();
            }
        };

        // Encode once per call, reused across attempts
        let base64_image = general_purpose::STANDARD.encode(&image_bytes);

        for attempt in 1..=self.config.max_retries {
            debug!(
                "Classification attempt {}/{} for {}",
                attempt,
                self.config.max_retries,
                image_path.display()
            );

            match self.attempt(&base64_image) {
                Ok(text) => {
                    return match Category::from_model_response(&text) {
                        Ok(category) => {
                            info!("Category identified: {}", category.name());
                            category
                        }
                        Err(e) => {
                            warn!("Model returned unusable category '{}': {}", text.trim(), e);
                            Category::other()
                        }
                    };
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        self.config.max_retries,
                        image_path.display(),
                        e
                    );
                    if attempt < self.config.max_retries {
                        let wait = BACKOFF_STEP * attempt;
                        info!("Waiting {:?} before next attempt", wait);
                        std::thread::sleep(wait);
                    }
                }
            }
        }

        error!(
            "All classification attempts failed for {}; degrading to 'other'",
            image_path.display()
        );
        Category::other()
    }

    fn available(&self) -> bool {
        let body = serde_json::json!({
            "model": PROBE_MODEL,
            "messages": [{ "role": "user", "content": "test" }],
            "max_tokens": 1,
        });

        let result = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(self.config.api_key.expose_secret())
            .timeout(PROBE_TIMEOUT)
            .json(&body)
            .send();

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(
                    "Classification backend not available: status {}",
                    response.status()
                );
                false
            }
            Err(e) => {
                error!("Classification backend not available: {}", e);
                false
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= MAX_ERROR_BODY_LENGTH)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> OpenAiClassifier {
        OpenAiClassifier::new(OpenAiConfig::new(SecretString::from("test-key"))).unwrap()
    }

    #[test]
    fn test_unreadable_image_degrades_without_network() {
        let category = classifier().classify(Path::new("/nonexistent/preview.jpg"));
        assert_eq!(category.name(), "other");
    }

    #[test]
    fn test_exhausted_attempts_degrade_to_other() {
        let tmp = tempfile::TempDir::new().unwrap();
        let preview = tmp.path().join("preview.jpg");
        std::fs::write(&preview, b"jpeg bytes").unwrap();

        // Discard port: every attempt fails at connect, exercising the
        // full retry loop without a live backend
        let mut config = OpenAiConfig::new(SecretString::from("test-key"));
        config.api_base = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_secs(1);
        config.max_retries = 1;

        let classifier = OpenAiClassifier::new(config).unwrap();
        let category = classifier.classify(&preview);
        assert_eq!(category.name(), "other");
    }

    #[test]
    fn test_prompt_enumerates_every_supported_category() {
        for id in SUPPORTED_CATEGORIES {
            assert!(
                CATEGORIZATION_PROMPT.contains(id),
                "prompt missing category {}",
                id
            );
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new(SecretString::from("k"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_truncate_body_caps_length() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert!(truncated.len() < 250);
        assert!(truncated.ends_with("(truncated)"));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{"choices":[{"message":{"content":"flowers"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("flowers")
        );
    }
}
