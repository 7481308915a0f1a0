use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};
use tracing_subscriber::EnvFilter;

use stitchsort::{
    read_pes_file, BatchConfig, BatchRunner, Classifier, Config, DesignStore, Language,
    OpenAiClassifier,
    ProgressEvent, ProgressReporter, RenderConfig, StitchRenderer,
};

#[derive(Parser)]
#[command(name = "stitchsort", version, about = "Batch categorizer for .PES embroidery designs")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a JSON config file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Categorize every .pes file under a directory
    Categorize {
        /// Directory containing the design files
        input_directory: PathBuf,

        /// Where category folders are created (default: <input>/categorized)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Category folder language
        #[arg(short, long, default_value = "en", value_parser = ["en", "pt-BR"])]
        language: String,

        /// Skip the first N files (resume an interrupted batch)
        #[arg(long, value_name = "N", default_value_t = 0)]
        start_after: usize,

        /// List what would be processed without classifying or copying
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a single design to a JPEG preview
    Convert {
        /// The .pes file to render
        pes_file: PathBuf,

        /// Output image path (default: same name with .jpg)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Verify the classification backend is reachable
    Check,
}

/// Prints per-file progress to stdout while logs go to stderr.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FileStarted {
                ordinal,
                total,
                name,
            } => {
                println!("[{}/{}] {}", ordinal, total, name);
            }
            ProgressEvent::FileCompleted { name, category } => {
                println!("  {} -> {}", name, category);
            }
            ProgressEvent::FileFailed { name, error } => {
                println!("  {} failed: {}", name, error);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // The fmt subscriber also captures log-macro events from the library
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_pipeline_parts(
    config_path: Option<&Path>,
) -> Result<(StitchRenderer, OpenAiClassifier), String> {
    let config = Config::load(config_path).map_err(|e| e.to_string())?;
    let renderer = StitchRenderer::new(config.render());
    let classifier = OpenAiClassifier::new(config.openai()).map_err(|e| e.to_string())?;
    Ok((renderer, classifier))
}

fn run_categorize(
    config_path: Option<&Path>,
    input_directory: PathBuf,
    output: Option<PathBuf>,
    language: &str,
    start_after: usize,
    dry_run: bool,
) -> Result<bool, String> {
    let language: Language = language.parse().unwrap_or_default();
    let mut batch = BatchConfig::new(&input_directory)
        .language(language)
        .start_after(start_after);
    if let Some(output) = output {
        batch = batch.output_directory(output);
    }

    if dry_run {
        return run_dry_run(&batch);
    }

    let (renderer, classifier) = build_pipeline_parts(config_path)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
        info!("Interrupt received, finishing the current file");
    })
    .map_err(|e| format!("Failed to install interrupt handler: {}", e))?;

    let runner = BatchRunner::new(batch, renderer, Box::new(classifier)).with_shutdown(shutdown);

    let report = runner.run(&ConsoleProgress).map_err(|e| e.to_string())?;
    println!("{}", report.summary());
    Ok(report.is_success())
}

/// Lists the batch plan without classifying or copying anything.
fn run_dry_run(batch: &BatchConfig) -> Result<bool, String> {
    let store = DesignStore::new(&batch.output_directory);
    let designs = store
        .find_designs(&batch.input_directory)
        .map_err(|e| e.to_string())?;

    println!(
        "Would process {} design(s) into {}",
        designs.len().saturating_sub(batch.start_after),
        batch.output_directory.display()
    );
    for (index, design) in designs.iter().enumerate() {
        if index < batch.start_after {
            println!("  (skip) {}", design.name);
        } else {
            println!("  {}", design.source_path.display());
        }
    }
    Ok(true)
}

fn run_convert(pes_file: PathBuf, output: Option<PathBuf>) -> Result<(), String> {
    let output = output.unwrap_or_else(|| pes_file.with_extension("jpg"));

    let commands = read_pes_file(&pes_file).map_err(|e| e.to_string())?;
    let renderer = StitchRenderer::new(RenderConfig::default());
    renderer
        .render_to_file(&commands, &output)
        .map_err(|e| e.to_string())?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn run_check(config_path: Option<&Path>) -> Result<bool, String> {
    let (_, classifier) = build_pipeline_parts(config_path)?;
    Ok(classifier.available())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Categorize {
            input_directory,
            output,
            language,
            start_after,
            dry_run,
        } => run_categorize(
            config_path,
            input_directory,
            output,
            &language,
            start_after,
            dry_run,
        ),
        Commands::Convert { pes_file, output } => run_convert(pes_file, output).map(|()| true),
        Commands::Check => match run_check(config_path) {
            Ok(true) => {
                println!("Backend is reachable");
                Ok(true)
            }
            Ok(false) => {
                println!("Backend is not reachable");
                Ok(false)
            }
            Err(e) => Err(e),
        },
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}
