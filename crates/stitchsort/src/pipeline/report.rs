use std::collections::BTreeSet;

/// How many per-file error messages the summary shows before suppressing.
const MAX_REPORTED_ERRORS: usize = 5;

/// Aggregate outcome of one batch. Built incrementally by the runner,
/// immutable once the batch finishes.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub categories_found: BTreeSet<String>,
    /// One message per failed item, including its display name.
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn record_success(&mut self, category_id: &str) {
        self.processed += 1;
        self.categories_found.insert(category_id.to_string());
    }

    pub fn record_failure(&mut self, name: &str, error: &str) {
        self.failed += 1;
        self.errors.push(format!("{}: {}", name, error));
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Success means at least one file fully succeeded, or there were
    /// no files at all (failed strictly less than total).
    pub fn is_success(&self) -> bool {
        self.failed < self.total || self.total == 0
    }

    /// Human-readable summary: totals, per-category list, and up to the
    /// first five error messages with a suppressed-count note.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Categorization statistics:".to_string());
        lines.push(format!("  Total files: {}", self.total));
        lines.push(format!("  Successfully processed: {}", self.processed));
        lines.push(format!("  Failed: {}", self.failed));
        if self.skipped > 0 {
            lines.push(format!("  Skipped (resume offset): {}", self.skipped));
        }

        if !self.categories_found.is_empty() {
            lines.push(format!(
                "  Categories found: {}",
                self.categories_found.len()
            ));
            for category in &self.categories_found {
                lines.push(format!("    - {}", category));
            }
        }

        if !self.errors.is_empty() {
            lines.push("  Errors:".to_string());
            for error in self.errors.iter().take(MAX_REPORTED_ERRORS) {
                lines.push(format!("    - {}", error));
            }
            if self.errors.len() > MAX_REPORTED_ERRORS {
                lines.push(format!(
                    "    ... and {} more errors",
                    self.errors.len() - MAX_REPORTED_ERRORS
                ));
            }
        }

        lines.join("\n")
    }
}
