use std::path::{Path, PathBuf};

use crate::category::Language;

/// Default output folder name when no explicit output directory is given.
const DEFAULT_OUTPUT_FOLDER: &str = "categorized";

pub struct BatchConfig {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    pub language: Language,
    /// 1-based count of leading files to skip when resuming.
    pub start_after: usize,
}

impl BatchConfig {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        let input_directory = input_directory.as_ref().to_path_buf();
        let output_directory = input_directory.join(DEFAULT_OUTPUT_FOLDER);
        Self {
            input_directory,
            output_directory,
            language: Language::default(),
            start_after: 0,
        }
    }

    pub fn output_directory<P: AsRef<Path>>(mut self, output_directory: P) -> Self {
        self.output_directory = output_directory.as_ref().to_path_buf();
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn start_after(mut self, start_after: usize) -> Self {
        self.start_after = start_after;
        self
    }
}
