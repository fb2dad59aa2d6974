//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use pageforge_core::assembler::{self, WrittenDocument};
use pageforge_core::pipeline::{Pipeline, PipelineOutput, ProgressReporter, StepId};
use pageforge_shared::{AppConfig, PageforgeError, init_config, load_config, load_config_from};
use tracing::{info, warn};

/// Sample product record used by `pageforge sample`.
const SAMPLE_PRODUCT: &str = include_str!("../../../fixtures/json/product.fixture.json");

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pageforge: generate product content pages from a single product record.
#[derive(Parser)]
#[command(
    name = "pageforge",
    version,
    about = "Generate FAQ, product and comparison pages from one product JSON record.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.pageforge/pageforge.toml.
    #[arg(long, global = true, env = "PAGEFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the pipeline on a product record and write the three pages.
    Generate {
        /// Product JSON file. Reads stdin when omitted or `-`.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to `output.dir` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the documents to stdout instead of writing files.
        #[arg(long)]
        stdout: bool,
    },

    /// Print the sample product record.
    Sample,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pageforge=info",
        1 => "pageforge=debug",
        _ => "pageforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `--stdout` output stays clean JSON.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Generate { input, out, stdout } => {
            cmd_generate(config_path, input.as_deref(), out.as_deref(), stdout)
        }
        Command::Sample => cmd_sample(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Resolve configuration: explicit file, else the default file, else defaults.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    config_path: Option<&Path>,
    input: Option<&Path>,
    out: Option<&Path>,
    to_stdout: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let raw = read_input(input)?;

    info!(
        input = %input.map_or("<stdin>".into(), |p| p.display().to_string()),
        "generating pages"
    );

    let pipeline = Pipeline::new()?;
    let reporter = CliProgress::new();
    let output = pipeline.run(&raw, &reporter).map_err(report_failure)?;

    if to_stdout {
        for document in output.documents() {
            println!("{}", assembler::to_json(document, config.output.pretty)?);
        }
        return Ok(());
    }

    let out_dir = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let written = assembler::write_outputs(&output, &config.output, &out_dir)?;

    print_summary(&output, &out_dir, &written);
    Ok(())
}

/// Read the product JSON from a file, or from stdin for `None` / `-`.
fn read_input(input: Option<&Path>) -> Result<serde_json::Value> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read input file '{}'", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read product JSON from stdin")?;
            buf
        }
    };

    serde_json::from_str(&text).map_err(|e| eyre!("input is not valid JSON: {e}"))
}

/// Turn a run-level failure into a report naming the step and the contract.
fn report_failure(err: PageforgeError) -> color_eyre::Report {
    match err.failed_step() {
        Some(step) => eyre!("pipeline aborted at step `{step}`: {}", err.root_cause()),
        None => color_eyre::Report::new(err),
    }
}

fn print_summary(output: &PipelineOutput, out_dir: &Path, written: &[WrittenDocument]) {
    println!();
    println!("  Pages generated successfully!");
    println!("  Output: {}", out_dir.display());
    for doc in written {
        println!(
            "  {:<11} {:<22} {:>6} B  sha256:{}",
            doc.page_type.as_str(),
            doc.filename,
            doc.size_bytes,
            &doc.sha256[..12]
        );
    }
    println!("  Steps:  {}", output.steps.len());
    println!("  Time:   {:.1}ms", output.elapsed.as_secs_f64() * 1000.0);
    println!();
}

fn cmd_sample() -> Result<()> {
    print!("{SAMPLE_PRODUCT}");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, step: StepId, index: usize, total: usize) {
        self.spinner.set_message(format!("[{index}/{total}] {step}"));
    }

    fn failed(&self, step: StepId, error: &PageforgeError) {
        self.spinner.finish_and_clear();
        warn!(%step, error = %error.root_cause(), "run aborted");
    }

    fn done(&self, _output: &PipelineOutput) {
        self.spinner.finish_and_clear();
    }
}
