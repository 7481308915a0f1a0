use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tracing::info_span;

use crate::classify::Classifier;
use crate::design::DesignRecord;
use crate::pattern::read_pes_file;
use crate::render::StitchRenderer;
use crate::storage::DesignStore;

use super::config::BatchConfig;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};
use super::report::BatchReport;

/// Drives one batch: render, classify, place, cleanup — one file at a
/// time, in scan order. Holds the classifier behind its capability
/// trait only, so backends swap without touching batch logic.
pub struct BatchRunner {
    config: BatchConfig,
    renderer: StitchRenderer,
    classifier: Box<dyn Classifier>,
    store: DesignStore,
    shutdown: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(
        config: BatchConfig,
        renderer: StitchRenderer,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        let store = DesignStore::new(&config.output_directory);
        Self {
            config,
            renderer,
            classifier,
            store,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Install an external interrupt flag. When set, the batch stops
    /// before starting the next file and sweeps pending previews.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Runs the whole batch. Only hard precondition failures return an
    /// error; everything per-file lands in the report.
    pub fn run(&self, progress: &dyn ProgressReporter) -> Result<BatchReport, PipelineError> {
        let _span = info_span!("batch", input = %self.config.input_directory.display()).entered();

        if !self.config.input_directory.exists() {
            return Err(PipelineError::InputDirectoryMissing(
                self.config.input_directory.clone(),
            ));
        }
        if !self.config.input_directory.is_dir() {
            return Err(PipelineError::InputNotADirectory(
                self.config.input_directory.clone(),
            ));
        }
        if !self.classifier.available() {
            return Err(PipelineError::BackendUnavailable);
        }
        std::fs::create_dir_all(&self.config.output_directory).map_err(|e| {
            PipelineError::CreateOutputDirectory {
                path: self.config.output_directory.clone(),
                source: e,
            }
        })?;

        let designs = self.store.find_designs(&self.config.input_directory)?;

        let mut report = BatchReport {
            total: designs.len(),
            ..Default::default()
        };

        if designs.is_empty() {
            warn!("No .pes files found in directory");
            return Ok(report);
        }

        if self.config.start_after > 0 {
            info!(
                "Resuming: skipping the first {} files",
                self.config.start_after
            );
        }

        let total = designs.len();
        let mut pending_previews: Vec<PathBuf> = Vec::new();

        for (index, mut design) in designs.into_iter().enumerate() {
            let ordinal = index + 1;

            if ordinal <= self.config.start_after {
                debug!("Skipping file {}: {}", ordinal, design.name);
                report.record_skip();
                continue;
            }

            if self.shutdown.load(Ordering::Relaxed) {
                warn!("Interrupted; stopping before file {}", ordinal);
                break;
            }

            info!("Processing file {}/{}: {}", ordinal, total, design.name);
            progress.report(ProgressEvent::FileStarted {
                ordinal,
                total,
                name: design.name.clone(),
            });

            match self.process_design(&mut design, &mut pending_previews) {
                Ok(category_id) => {
                    report.record_success(&category_id);
                    progress.report(ProgressEvent::FileCompleted {
                        name: design.name.clone(),
                        category: category_id,
                    });
                }
                Err(error) => {
                    warn!("Failed to process {}: {}", design.name, error);
                    report.record_failure(&design.name, &error);
                    progress.report(ProgressEvent::FileFailed {
                        name: design.name.clone(),
                        error,
                    });
                }
            }

            // Intermediate previews never outlive their file
            cleanup_previews(&mut pending_previews);
        }

        // Covers the interrupt path, where the loop breaks mid-batch
        cleanup_previews(&mut pending_previews);

        info!(
            "Categorization completed. Processed: {}, Failed: {}",
            report.processed, report.failed
        );
        Ok(report)
    }

    /// Per-file state machine. Returns the category identifier on full
    /// success; any error message is a recoverable per-file failure.
    fn process_design(
        &self,
        design: &mut DesignRecord,
        pending_previews: &mut Vec<PathBuf>,
    ) -> Result<String, String> {
        // Render
        let commands = {
            let _step = info_span!("render", design = %design.name).entered();
            read_pes_file(&design.source_path).map_err(|e| e.to_string())?
        };

        let preview_path = self.renderer.preview_path(&design.name);
        // Track the path as soon as it exists so cleanup is guaranteed
        // even if a later step faults
        pending_previews.push(preview_path.clone());

        self.renderer
            .render_to_file(&commands, &preview_path)
            .map_err(|e| e.to_string())?;
        design.set_preview_path(preview_path.clone());

        // Classify — never fails, degrades to "other" at worst
        let category = {
            let _step = info_span!("classify", design = %design.name).entered();
            self.classifier.classify(&preview_path)
        };
        let category_id = category.name().to_string();
        design.assign_category(category);

        // Place
        {
            let _step = info_span!("place", design = %design.name).entered();
            self.store
                .place_in_category_folder(design, self.config.language)
                .map_err(|e| e.to_string())?;
        }

        Ok(category_id)
    }
}

fn cleanup_previews(pending: &mut Vec<PathBuf>) {
    for path in pending.drain(..) {
        match std::fs::remove_file(&path) {
            Ok(()) => debug!("Removed preview {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove preview {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, Language};
    use crate::pipeline::progress::NoopProgress;
    use crate::render::{RenderConfig, StitchRenderer};
    use std::path::Path;
    use tempfile::TempDir;

    /// Classifier double returning a fixed category.
    struct StaticClassifier {
        category: &'static str,
        available: bool,
    }

    impl Classifier for StaticClassifier {
        fn classify(&self, _image_path: &Path) -> Category {
            Category::new(self.category, 1.0).unwrap()
        }

        fn available(&self) -> bool {
            self.available
        }
    }

    fn write_design(directory: &Path, name: &str) {
        std::fs::write(directory.join(name), valid_pes_bytes()).unwrap();
    }

    fn write_empty_design(directory: &Path, name: &str) {
        std::fs::write(directory.join(name), pes_bytes(&[0xFF, 0x00])).unwrap();
    }

    /// PES bytes with a short square of stitches.
    fn valid_pes_bytes() -> Vec<u8> {
        pes_bytes(&[
            0, 0, 10, 0, 0, 10, // three stitch records
            0xFF, 0x00,
        ])
    }

    fn pes_bytes(stitch_block: &[u8]) -> Vec<u8> {
        let pec_position = 16usize;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"#PES0001");
        bytes.extend_from_slice(&(pec_position as u32).to_le_bytes());
        bytes.resize(pec_position + 532, 0);
        bytes.extend_from_slice(stitch_block);
        bytes
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input");
        let output = tmp.path().join("output");
        std::fs::create_dir_all(&input).unwrap();
        (tmp, input, output)
    }

    fn runner(input: &Path, output: &Path, classifier: StaticClassifier) -> BatchRunner {
        let config = BatchConfig::new(input).output_directory(output);
        BatchRunner::new(
            config,
            StitchRenderer::new(RenderConfig::default()),
            Box::new(classifier),
        )
    }

    #[test]
    fn test_unavailable_backend_aborts_batch() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_abort.pes");

        let runner = runner(
            &input,
            &output,
            StaticClassifier {
                category: "flowers",
                available: false,
            },
        );

        let result = runner.run(&NoopProgress);
        assert!(matches!(result, Err(PipelineError::BackendUnavailable)));
        // Nothing was touched
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_directory_aborts_batch() {
        let (_tmp, input, output) = setup();
        let runner = runner(
            &input.join("missing"),
            &output,
            StaticClassifier {
                category: "flowers",
                available: true,
            },
        );

        let result = runner.run(&NoopProgress);
        assert!(matches!(
            result,
            Err(PipelineError::InputDirectoryMissing(_))
        ));
    }

    #[test]
    fn test_single_design_processed_and_placed() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_happy.pes");

        let runner = runner(
            &input,
            &output,
            StaticClassifier {
                category: "flowers",
                available: true,
            },
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 0);
        assert!(report.categories_found.contains("flowers"));
        assert!(report.is_success());

        // Original and preview placed into the category folder
        assert!(output.join("flowers/runner_happy.pes").exists());
        assert!(output.join("flowers/runner_happy.jpg").exists());

        // Intermediate preview was cleaned up
        let scratch = std::env::temp_dir().join("stitchsort/runner_happy.jpg");
        assert!(!scratch.exists());
    }

    #[test]
    fn test_render_failure_counts_failed_and_continues() {
        let (_tmp, input, output) = setup();
        write_empty_design(&input, "runner_a_empty.pes");
        write_design(&input, "runner_b_good.pes");

        let runner = runner(
            &input,
            &output,
            StaticClassifier {
                category: "stars",
                available: true,
            },
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("runner_a_empty"));
        assert!(report.is_success());
    }

    #[test]
    fn test_resume_offset_skips_leading_files() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_skip_1.pes");
        write_design(&input, "runner_skip_2.pes");
        write_design(&input, "runner_skip_3.pes");

        let config = BatchConfig::new(&input)
            .output_directory(&output)
            .start_after(2);
        let runner = BatchRunner::new(
            config,
            StitchRenderer::new(RenderConfig::default()),
            Box::new(StaticClassifier {
                category: "hearts",
                available: true,
            }),
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 0);

        // Only the third file was placed
        assert!(output.join("hearts/runner_skip_3.pes").exists());
        assert!(!output.join("hearts/runner_skip_1.pes").exists());
    }

    #[test]
    fn test_resume_past_end_skips_everything() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_past_end.pes");

        let config = BatchConfig::new(&input)
            .output_directory(&output)
            .start_after(10);
        let runner = BatchRunner::new(
            config,
            StitchRenderer::new(RenderConfig::default()),
            Box::new(StaticClassifier {
                category: "hearts",
                available: true,
            }),
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_interrupt_stops_before_next_file() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_int_1.pes");
        write_design(&input, "runner_int_2.pes");

        let shutdown = Arc::new(AtomicBool::new(true));
        let runner = runner(
            &input,
            &output,
            StaticClassifier {
                category: "flowers",
                available: true,
            },
        )
        .with_shutdown(shutdown);

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.processed, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_placement_failure_counts_failed() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_place_fail.pes");

        // Block the category folder with a plain file
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(output.join("sports"), b"in the way").unwrap();

        let runner = runner(
            &input,
            &output,
            StaticClassifier {
                category: "sports",
                available: true,
            },
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed, 0);
        assert!(!report.is_success());
        // Preview cleaned up despite the failure
        let scratch = std::env::temp_dir().join("stitchsort/runner_place_fail.jpg");
        assert!(!scratch.exists());
    }

    #[test]
    fn test_localized_placement_uses_folder_table() {
        let (_tmp, input, output) = setup();
        write_design(&input, "runner_ptbr.pes");

        let config = BatchConfig::new(&input)
            .output_directory(&output)
            .language(Language::PtBr);
        let runner = BatchRunner::new(
            config,
            StitchRenderer::new(RenderConfig::default()),
            Box::new(StaticClassifier {
                category: "flowers",
                available: true,
            }),
        );

        let report = runner.run(&NoopProgress).unwrap();
        assert_eq!(report.processed, 1);
        // Folder is localized, category identifier is not
        assert!(output.join("flores/runner_ptbr.pes").exists());
        assert!(report.categories_found.contains("flowers"));
    }
}
