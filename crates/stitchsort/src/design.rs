use std::path::{Path, PathBuf};

use crate::category::Category;

/// One input design discovered in the batch. The category and preview
/// path are assigned exactly once per processing attempt, by the runner.
#[derive(Debug, Clone)]
pub struct DesignRecord {
    pub source_path: PathBuf,
    pub name: String,
    pub category: Option<Category>,
    pub preview_path: Option<PathBuf>,
}

impl DesignRecord {
    pub fn new<P: AsRef<Path>>(source_path: P) -> Self {
        let source_path = source_path.as_ref().to_path_buf();
        let name = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("design")
            .to_string();

        Self {
            source_path,
            name,
            category: None,
            preview_path: None,
        }
    }

    pub fn is_pes_file(&self) -> bool {
        self.source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pes"))
            .unwrap_or(false)
    }

    pub fn assign_category(&mut self, category: Category) {
        self.category = Some(category);
    }

    pub fn set_preview_path(&mut self, preview_path: PathBuf) {
        self.preview_path = Some(preview_path);
    }
}
