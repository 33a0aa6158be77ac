//! Command-line tool for listing, extracting, and adding PDF attachments.
//!
//! Exit codes: 0 on success, 1 on any error (missing file, attachment not
//! found, invalid PDF, unwritable output).

use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use pdfattach::{add_attachments, get_attachment, list_attachments, NewAttachment};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pdf-attachments",
    about = "List, extract, and add file attachments in PDF documents",
    long_about = "List, extract, and add file attachments in PDF documents.\n\n\
        Supports both document-level embedded files and page-level \
        FileAttachment annotations.",
    after_help = "EXAMPLES:\n  \
        pdf-attachments list report.pdf\n  \
        pdf-attachments get report.pdf data.csv -o /tmp/data.csv\n  \
        pdf-attachments add report.pdf notes.txt image.png -o report_new.pdf",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all attachments with name, size, page, and description
    List {
        /// PDF file to inspect
        pdf: PathBuf,
    },

    /// Extract a single attachment by its exact name
    Get {
        /// PDF file containing the attachment
        pdf: PathBuf,

        /// Exact attachment name (see `list`)
        name: String,

        /// Output file path (defaults to the attachment's name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Embed files as document-level attachments
    Add {
        /// PDF file to add attachments to
        pdf: PathBuf,

        /// Files to embed
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output PDF path (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store a file under another name: 'original:newname' (repeatable)
        #[arg(short = 'n', long = "name", value_name = "ORIGINAL:NEW")]
        names: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr; the level comes from `-v` only, never the environment.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::List { pdf } => cmd_list(&pdf),
        Commands::Get { pdf, name, output } => cmd_get(&pdf, &name, output),
        Commands::Add {
            pdf,
            files,
            output,
            names,
        } => cmd_add(&pdf, &files, output, &names),
    }
}

fn cmd_list(pdf: &Path) -> Result<()> {
    let attachments = list_attachments(pdf)?;

    println!("PDF: {}", pdf.display());
    println!("Attachments: {}", attachments.len());
    println!("{}", "-".repeat(50));
    if attachments.is_empty() {
        println!("  (none)");
    }
    for attachment in &attachments {
        println!("{attachment}");
    }
    Ok(())
}

fn cmd_get(pdf: &Path, name: &str, output: Option<PathBuf>) -> Result<()> {
    let Some(attachment) = get_attachment(pdf, name)? else {
        bail!("attachment '{name}' not found in {}", pdf.display());
    };

    let out = output.unwrap_or_else(|| PathBuf::from(attachment.file_name()));
    attachment
        .save_to(&out)
        .map_err(|e| anyhow!("cannot write '{}': {e}", out.display()))?;

    println!(
        "Extracted: {} → {}  ({} bytes)",
        attachment.name,
        out.display(),
        attachment.size
    );
    Ok(())
}

fn cmd_add(pdf: &Path, files: &[PathBuf], output: Option<PathBuf>, names: &[String]) -> Result<()> {
    let renames = names
        .iter()
        .map(|raw| parse_rename(raw))
        .collect::<Result<Vec<_>>>()?;
    let inputs = NewAttachment::with_renames(files, &renames)?;

    let out = output.unwrap_or_else(|| pdf.to_path_buf());
    let count = add_attachments(pdf, &inputs, Some(out.as_path()))?;

    println!("Added {count} attachment(s) → {}", out.display());
    Ok(())
}

/// Parse an `original:newname` rename.
fn parse_rename(raw: &str) -> Result<(String, String)> {
    let Some((original, renamed)) = raw.split_once(':') else {
        bail!("invalid --name format '{raw}'. Expected 'original:newname'.");
    };
    if original.is_empty() || renamed.is_empty() {
        bail!("invalid --name format '{raw}'. Both original and new name must be non-empty.");
    }
    Ok((original.to_string(), renamed.to_string()))
}
