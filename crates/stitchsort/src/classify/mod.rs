pub mod openai;

pub use openai::{OpenAiClassifier, OpenAiConfig};

use std::path::Path;

use crate::category::Category;

/// Narrow contract over the remote image-understanding capability.
/// The batch runner only ever holds a `Box<dyn Classifier>`, so local
/// and test doubles swap in without touching batch logic.
pub trait Classifier: Send + Sync {
    /// Maps a preview image to a category. Never fails: every terminal
    /// error degrades to the `other` sentinel. This is the only place in
    /// the system allowed to silently degrade.
    fn classify(&self, image_path: &Path) -> Category;

    /// Cheap availability probe. Any failure reports unavailable.
    fn available(&self) -> bool;
}
