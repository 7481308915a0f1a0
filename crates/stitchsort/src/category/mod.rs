pub mod language;

pub use language::Language;

use thiserror::Error;

/// Punctuation stripped from raw model responses before normalization.
const RESPONSE_PUNCTUATION: &str = ".,!?;:\"()[]{}";

/// Category identifiers the classification prompt is constrained to.
pub const SUPPORTED_CATEGORIES: &[&str] = &[
    "teddy_bears",
    "angels",
    "names",
    "cars",
    "flowers",
    "animals",
    "hearts",
    "stars",
    "butterflies",
    "babies",
    "christmas",
    "easter",
    "sports",
    "food",
    "nature",
    "other",
];

/// Identifier used when classification degrades instead of failing.
pub const OTHER_CATEGORY: &str = "other";

#[derive(Error, Debug, PartialEq)]
pub enum CategoryError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Confidence must be between 0.0 and 1.0, got {0}")]
    InvalidConfidence(f32),
}

/// Immutable category value: a canonical lowercase, underscore-separated
/// identifier plus a confidence scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    name: String,
    confidence: f32,
}

impl Category {
    /// Normalizes the name (trim, lowercase, spaces to underscores) and
    /// fails when nothing remains.
    pub fn new(name: &str, confidence: f32) -> Result<Self, CategoryError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CategoryError::InvalidConfidence(confidence));
        }

        let normalized = name.trim().to_lowercase().replace(' ', "_");
        if normalized.is_empty() {
            return Err(CategoryError::EmptyName);
        }

        Ok(Self {
            name: normalized,
            confidence,
        })
    }

    /// Builds a category from raw model output: strips the fixed
    /// punctuation set before normalizing.
    pub fn from_model_response(response: &str) -> Result<Self, CategoryError> {
        let cleaned: String = response
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !RESPONSE_PUNCTUATION.contains(*c))
            .collect();

        Self::new(&cleaned, 1.0)
    }

    /// The degradation sentinel. Infallible: "other" always normalizes.
    pub fn other() -> Self {
        Self {
            name: OTHER_CATEGORY.to_string(),
            confidence: 1.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Folder name for this category in the given language. Unknown
    /// identifiers fall back to the identifier itself.
    pub fn folder_name(&self, language: Language) -> &str {
        language.folder_name(&self.name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
