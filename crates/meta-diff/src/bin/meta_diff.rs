//! meta-diff CLI: diff, flatten, collapse and patch metadata JSON files.
//!
//! Usage:
//!   meta-diff diff <baseline> <modified> [--format json|changes|text|html] [--raw]
//!   meta-diff flatten <file>
//!   meta-diff collapse <file> [--lenient]
//!   meta-diff subset <baseline> <shape>
//!   meta-diff apply <document> <change-request>
//!   meta-diff compare <document> <change-request> [--format ...] [--effective]
//!
//! Every command reads JSON files and writes to stdout. `--config` points at
//! a TOML file with identity fields, ignore keys and path policy.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meta_diff::path_keys::{collapse_with, flatten, PathPolicy};
use meta_diff::render::{render_html, render_text};
use meta_diff::{extract_subset, prepare, ChangeRequest, Delta, DiffConfig};
use serde_json::{Map, Value};

#[derive(Debug, Parser)]
#[command(name = "meta-diff", version, about = "Diff and patch federated-identity metadata documents")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Diff two documents
    Diff {
        baseline: PathBuf,
        modified: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Skip ignore-key stripping and key sorting
        #[arg(long)]
        raw: bool,
    },
    /// Flatten nested mappings into dotted keys
    Flatten { file: PathBuf },
    /// Collapse dotted keys into nested mappings
    Collapse {
        file: PathBuf,
        /// Accept empty path segments
        #[arg(long)]
        lenient: bool,
    },
    /// Restrict a document to the fields present in a shape
    Subset { baseline: PathBuf, shape: PathBuf },
    /// Apply a change request to a document
    Apply {
        document: PathBuf,
        change_request: PathBuf,
    },
    /// Diff a change request against the current document
    Compare {
        document: PathBuf,
        change_request: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Diff the document before and after applying the request
        #[arg(long)]
        effective: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The structured delta as JSON
    Json,
    /// A JSON list of leaf changes
    Changes,
    /// One line per change
    Text,
    /// An HTML fragment
    Html,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DiffConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DiffConfig::default(),
    };

    match cli.command {
        Command::Diff {
            baseline,
            modified,
            format,
            raw,
        } => {
            let (mut a, mut b) = (read_json(&baseline)?, read_json(&modified)?);
            if !raw {
                let ignore = config.ignore_keys();
                a = prepare(&a, &ignore);
                b = prepare(&b, &ignore);
            }
            print_delta(config.differ().diff(&a, &b).as_ref(), format)
        }
        Command::Flatten { file } => {
            let doc = read_object(&file)?;
            print_json(&Value::Object(flatten(&doc)))
        }
        Command::Collapse { file, lenient } => {
            let flat = read_object(&file)?;
            let policy = if lenient {
                PathPolicy::Lenient
            } else {
                config.path_policy
            };
            let nested = collapse_with(&flat, policy)
                .with_context(|| format!("collapsing {}", file.display()))?;
            print_json(&Value::Object(nested))
        }
        Command::Subset { baseline, shape } => {
            let (baseline, shape) = (read_object(&baseline)?, read_object(&shape)?);
            print_json(&Value::Object(extract_subset(&baseline, &shape)))
        }
        Command::Apply {
            document,
            change_request,
        } => {
            let doc = read_json(&document)?;
            let request = read_change_request(&change_request)?;
            let updated = request.apply(&doc, config.path_policy)?;
            print_json(&updated)
        }
        Command::Compare {
            document,
            change_request,
            format,
            effective,
        } => {
            let doc = read_json(&document)?;
            let request = read_change_request(&change_request)?;
            let differ = config.differ();
            let delta = if effective {
                request.effective_change(&doc, &differ, config.path_policy)?
            } else {
                request.compare(&doc, &differ, config.path_policy)?
            };
            print_delta(delta.as_ref(), format)
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn read_change_request(path: &Path) -> Result<ChangeRequest> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ChangeRequest::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_delta(delta: Option<&Delta>, format: OutputFormat) -> Result<()> {
    let Some(delta) = delta else {
        tracing::info!("no differences");
        return Ok(());
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(delta)?),
        OutputFormat::Changes => println!("{}", serde_json::to_string_pretty(&delta.changes())?),
        OutputFormat::Text => print!("{}", render_text(delta)),
        OutputFormat::Html => println!("{}", render_html(delta)),
    }
    Ok(())
}
