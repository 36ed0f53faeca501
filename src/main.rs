//! json-nose CLI - JSON payload inspector

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use json_nose::{Inspector, KeyPath, render_json, render_text};
use log::{debug, info};

/// Inspect a JSON payload of unknown encoding.
///
/// Detects the text encoding (falling back to UTF-16 then UTF-8), parses the
/// document, and prints its top-level shape, a sample item, and the result
/// of probing the sample for a platform field.
#[derive(Parser, Debug)]
#[command(name = "json-nose")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON file(s) to inspect
    #[arg(default_value = "n8n_response.json")]
    files: Vec<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Force an encoding by label (e.g. utf-16le, utf-8, windows-1252)
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Object key holding the item list (repeatable, default: results)
    #[arg(short = 'w', long = "wrapper")]
    wrappers: Vec<String>,

    /// Dotted key path to probe in the sample item (repeatable, replaces the
    /// default platform probes)
    #[arg(short = 'p', long = "probe")]
    probes: Vec<KeyPath>,

    /// Skip probing the sample item
    #[arg(long, conflicts_with = "probes")]
    no_probe: bool,

    /// Dotted key path whose values are counted across all items (repeatable)
    #[arg(short = 't', long = "tally")]
    tallies: Vec<KeyPath>,

    /// Refuse files larger than this many bytes
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Pretty-print the sample item and list failed decode attempts
    #[arg(long)]
    details: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format(|f, record| writeln!(f, "[{} {}]: {}", record.level(), record.target(), record.args()))
        .init();

    debug!("Args: {:?}", args);

    let inspector = match build_inspector(&args) {
        Ok(inspector) => inspector,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = inspect_file(&inspector, file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn build_inspector(args: &Args) -> Result<Inspector, Box<dyn std::error::Error>> {
    let mut inspector = Inspector::new();

    if let Some(ref label) = args.encoding {
        inspector.encoding_label(label)?;
    }

    if !args.wrappers.is_empty() {
        inspector.wrapper_keys(args.wrappers.clone());
    }

    if args.no_probe {
        inspector.probes(Vec::new());
    } else if !args.probes.is_empty() {
        inspector.probes(args.probes.clone());
    }

    for path in &args.tallies {
        inspector.tally(path.clone());
    }

    inspector.max_bytes(args.max_bytes);

    Ok(inspector)
}

fn inspect_file(
    inspector: &Inspector,
    path: &Path,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting {}", path.display());

    let report = inspector.inspect_path(path)?;
    let name = path.display().to_string();

    match args.format {
        OutputFormat::Text => println!("{}", render_text(&name, &report, args.details)),
        OutputFormat::Json => println!("{}", render_json(&name, &report)),
    }

    Ok(())
}
