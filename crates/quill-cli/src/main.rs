use anyhow::Context;
use clap::Parser;
use quill_core::config::{EnvironmentOptions, Optimizations, QuillConfig};
use quill_core::{Environment, Node};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "quill.yaml";

/// Quill - optimizer for compiled template trees
#[derive(Parser, Debug, Clone)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serialized template trees (JSON) to optimize
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a quill.yaml or JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Optimization mask overriding the configuration (-1 enables everything)
    #[arg(short = 'O', long, value_name = "MASK", allow_negative_numbers = true)]
    optimizations: Option<i64>,

    /// Write one output file per input into this directory instead of stdout
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the indented tree dump instead of JSON
    #[arg(long)]
    dump: bool,

    /// Write a default quill.yaml into the current directory
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean tree.
    // Set RUST_LOG=debug to see every applied rewrite
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        QuillConfig::init_file(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG))?;
        println!("Created {}", DEFAULT_CONFIG);
        return Ok(());
    }

    if cli.files.is_empty() {
        eprintln!("Error: No input files specified. Use --help for usage information.");
        std::process::exit(1);
    }

    let env = build_environment(&cli)?;
    info!(
        "Optimizing {} file(s) with optimizations: {}",
        cli.files.len(),
        env.optimizations()
    );

    if !run(&cli, &env)? {
        std::process::exit(1);
    }

    Ok(())
}

/// Resolve configuration: explicit file, then ./quill.yaml, then defaults; the
/// command-line mask wins over all of them
fn build_environment(cli: &Cli) -> anyhow::Result<Environment> {
    let mut config = match &cli.config {
        Some(path) => QuillConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG);
            if default_path.exists() {
                QuillConfig::from_file(&default_path)
                    .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG))?
            } else {
                QuillConfig::default()
            }
        }
    };

    if let Some(mask) = cli.optimizations {
        let optimizations = Optimizations::from_mask(mask)?;
        config.environment = EnvironmentOptions::with_optimizations(optimizations);
    }

    Ok(Environment::new(config.environment)?)
}

/// Outcome of optimizing a single file
struct FileResult {
    file_path: PathBuf,
    result: anyhow::Result<String>,
}

/// Optimize every input in parallel, then emit results in input order.
/// Returns false if any file failed
fn run(cli: &Cli, env: &Environment) -> anyhow::Result<bool> {
    use rayon::prelude::*;

    let results: Vec<FileResult> = cli
        .files
        .par_iter()
        .map(|file_path| FileResult {
            file_path: file_path.clone(),
            result: optimize_file(file_path, env, cli.dump),
        })
        .collect();

    if let Some(out_dir) = &cli.out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }

    let mut had_errors = false;
    for result in results {
        match result.result {
            Ok(output) => match &cli.out_dir {
                Some(out_dir) => {
                    let output_path = determine_output_path(&result.file_path, out_dir, cli.dump);
                    std::fs::write(&output_path, output)
                        .with_context(|| format!("Failed to write {}", output_path.display()))?;
                    info!("Generated: {}", output_path.display());
                }
                None => println!("{}", output),
            },
            Err(error) => {
                had_errors = true;
                eprintln!("Error optimizing {}: {:#}", result.file_path.display(), error);
            }
        }
    }

    Ok(!had_errors)
}

fn optimize_file(path: &Path, env: &Environment, dump: bool) -> anyhow::Result<String> {
    debug!("Optimizing {}...", path.display());

    let content = std::fs::read_to_string(path).context("Failed to read file")?;
    let tree: Node = serde_json::from_str(&content).context("Invalid template tree")?;
    let optimized = env
        .optimize(tree)
        .ok_or_else(|| anyhow::anyhow!("root node was removed by a pass"))?;

    if dump {
        Ok(optimized.to_string())
    } else {
        Ok(serde_json::to_string_pretty(&optimized)?)
    }
}

fn determine_output_path(input: &Path, out_dir: &Path, dump: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "tree".into());
    let extension = if dump { "txt" } else { "json" };
    out_dir.join(stem).with_extension(extension)
}
