use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::LevelFilter;

use proofmetrics_core::config::{Config, CONFIG_FILE};
use proofmetrics_core::metrics::CollectionResult;
use proofmetrics_core::pipeline::MetricsPipeline;
use proofmetrics_core::types::TableFormat;
use proofmetrics_core::verify::{ProcessVerifier, Verifier};

use proofmetrics_dafny::DafnyClassifier;
use proofmetrics_report::{json, render_tables, text, write_tables};

#[derive(Parser)]
#[command(name = "proofmetrics")]
#[command(about = "Measure spec vs proof lines, kernel reuse and verification time of Dafny projects")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect all metrics and write one table file per category
    Collect {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Skip verifier runs (no timing table)
        #[arg(long)]
        skip_verify: bool,
        /// Config file path (defaults to .proofmetrics.toml in the project tree)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory (defaults to output.directory under the project root)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Table format: latex or markdown (defaults to output.format)
        #[arg(long)]
        format: Option<String>,
        /// Brace counting: lexical or literal-aware (defaults to classifier.brace_counting)
        #[arg(long)]
        brace_counting: Option<String>,
    },
    /// Collect metrics and print a summary without writing files
    Show {
        /// Path to the project root
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Skip verifier runs
        #[arg(long)]
        skip_verify: bool,
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
        /// Compact JSON output (single line)
        #[arg(long)]
        compact: bool,
        /// Brace counting: lexical or literal-aware
        #[arg(long)]
        brace_counting: Option<String>,
    },
    /// Create a default .proofmetrics.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Collect {
            path,
            skip_verify,
            config,
            output,
            format,
            brace_counting,
        } => cmd_collect(
            &path,
            skip_verify,
            config.as_deref(),
            output.as_deref(),
            format.as_deref(),
            brace_counting.as_deref(),
        ),
        Commands::Show {
            path,
            skip_verify,
            config,
            format,
            compact,
            brace_counting,
        } => cmd_show(
            &path,
            skip_verify,
            config.as_deref(),
            &format,
            compact,
            brace_counting.as_deref(),
        ),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

/// `info` by default, `debug` with `--verbose`; a set `RUST_LOG` wins over both.
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

fn cmd_collect(
    path: &Path,
    skip_verify: bool,
    config_path: Option<&Path>,
    output: Option<&Path>,
    format: Option<&str>,
    brace_counting: Option<&str>,
) -> Result<()> {
    let config = load_config(path, config_path, brace_counting)?;
    let format: TableFormat = match format {
        Some(f) => f.parse()?,
        None => config.output.format,
    };
    let out_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => path.join(&config.output.directory),
    };

    let result = run_collection(path, config, skip_verify)?;

    let files = render_tables(&result, format);
    let written = write_tables(&out_dir, &files)?;
    for file in &written {
        println!("Written: {}", file.display());
    }

    if !result.verification_ran {
        let timing = out_dir.join(format!("metrics-timing.{}", format.extension()));
        if timing.exists() {
            println!(
                "{} verification skipped; {} is from an earlier run",
                "Note:".yellow(),
                timing.display()
            );
        } else {
            println!(
                "{} verification skipped; no timing table written",
                "Note:".yellow()
            );
        }
    }

    Ok(())
}

fn cmd_show(
    path: &Path,
    skip_verify: bool,
    config_path: Option<&Path>,
    format: &str,
    compact: bool,
    brace_counting: Option<&str>,
) -> Result<()> {
    let config = load_config(path, config_path, brace_counting)?;
    let result = run_collection(path, config, skip_verify)?;

    let report = match format {
        "json" => {
            let mut out = json::format_result(&result, compact);
            out.push('\n');
            out
        }
        "text" => text::format_summary(&result),
        other => anyhow::bail!("unknown output format: {other} (expected text or json)"),
    };
    print!("{report}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default configuration.");
    Ok(())
}

fn load_config(
    project_path: &Path,
    config_path: Option<&Path>,
    brace_counting: Option<&str>,
) -> Result<Config> {
    let mut config = match config_path {
        Some(p) => Config::load(p)?,
        None => Config::load_or_default(project_path),
    };
    if let Some(mode) = brace_counting {
        config.classifier.brace_counting = mode.parse()?;
    }
    Ok(config)
}

fn run_collection(
    project_path: &Path,
    config: Config,
    skip_verify: bool,
) -> Result<CollectionResult> {
    if !project_path.is_dir() {
        anyhow::bail!("project path {} is not a directory", project_path.display());
    }

    let classifier = DafnyClassifier::with_brace_counting(config.classifier.brace_counting)
        .context("failed to initialize Dafny classifier")?;
    let mut verifier = (!skip_verify).then(|| ProcessVerifier::from_config(&config.verify));
    let pipeline = MetricsPipeline::new(Box::new(classifier), config);

    let timed = verifier.as_mut().map(|v| v as &mut dyn Verifier);
    let mut result = pipeline.collect(project_path, timed);

    // A verifier that gave up produced no timings worth a table.
    if verifier.as_ref().is_some_and(|v| !v.is_available()) {
        result.verification_ran = false;
    }

    Ok(result)
}
