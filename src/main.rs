use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use photostamp::config::Config;
use photostamp::gallery;
use photostamp::pipeline::{ImageOutcome, Pipeline};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Photostamp - stamp a text watermark onto photos and publish them into a
/// gallery directory
#[derive(Parser, Debug)]
#[command(name = "photostamp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stamp and publish the given images
    Apply {
        /// Source images to watermark
        images: Vec<PathBuf>,
    },
    /// List published artifacts, newest first
    List {
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one published artifact
    Delete {
        /// Artifact to delete (name within the gallery, or a full path)
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    // Initialize logging subsystem
    photostamp::logging::init_subscriber().expect("Failed to initialize logging subsystem");

    let args = Args::parse();
    let config = load_config(&args.config);

    match args.command {
        Command::Apply { images } => cmd_apply(&config, &images),
        Command::List { json } => cmd_list(&config, json),
        Command::Delete { file, yes } => cmd_delete(&config, &file, yes),
    }
}

/// Load configuration, falling back to defaults when no file exists at the
/// default location. An explicitly configured path is still free to point
/// at `config.yaml`; a missing file is only tolerated there.
fn load_config(path: &Path) -> Config {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_FILE) {
        tracing::debug!("no config file found, using built-in defaults");
        return Config::default();
    }

    Config::from_file(path).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    })
}

fn cmd_apply(config: &Config, images: &[PathBuf]) -> ExitCode {
    if images.is_empty() {
        println!("no images selected.");
        return ExitCode::SUCCESS;
    }

    let pipeline = match Pipeline::from_config(config, Local::now().year()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to set up watermarking: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        text = pipeline.text(),
        gallery = %pipeline.gallery_dir().display(),
        count = images.len(),
        "starting batch"
    );
    println!("applying watermark...");

    let report = pipeline.run(images);

    for result in &report.results {
        match &result.outcome {
            ImageOutcome::Published(artifact) => {
                println!("  {} -> {}", result.source.display(), artifact.display_name);
            }
            ImageOutcome::DecodeFailed(e) => {
                println!("  failed to decode {}: {}", result.source.display(), e);
            }
            ImageOutcome::PublishFailed(e) => {
                println!("  failed to publish {}: {}", result.source.display(), e);
            }
        }
    }

    if report.all_succeeded() {
        println!("all images watermarked.");
        ExitCode::SUCCESS
    } else {
        println!("some images failed.");
        ExitCode::FAILURE
    }
}

fn cmd_list(config: &Config, json: bool) -> ExitCode {
    let dir = config.output.watermark_dir();

    let entries = match gallery::list_artifacts(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&entries) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize listing: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    if entries.is_empty() {
        println!("no watermarked images yet.");
        return ExitCode::SUCCESS;
    }

    for entry in &entries {
        println!(
            "{}  {}",
            entry.modified.format("%Y-%m-%d %H:%M:%S"),
            entry.display_name
        );
    }

    ExitCode::SUCCESS
}

fn cmd_delete(config: &Config, file: &Path, yes: bool) -> ExitCode {
    // A bare file name refers to an artifact inside the gallery directory
    let path = if file.components().count() == 1 && file.is_relative() {
        config.output.watermark_dir().join(file)
    } else {
        file.to_path_buf()
    };

    if !yes {
        match confirm(&format!("delete {}? [y/N] ", path.display())) {
            Ok(true) => {}
            Ok(false) => {
                println!("cancelled.");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match gallery::remove_artifact(&path) {
        Ok(()) => {
            println!("deleted {}.", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("delete failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Prompt on stdout and read a yes/no answer from stdin.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush().context("failed to flush prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
