//! CLI tool for filling DOCX and PPTX templates from a job file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docfill_core::{generate, outline, DocumentFormat, DocumentStore, Job, Outline, TemplateEngine};
use docfill_docx::DocxStore;
use docfill_ooxml::Package;
use docfill_pptx::PptxStore;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// Fill {{placeholders}} and repeat marked blocks in Word and PowerPoint templates.
#[derive(Parser, Debug)]
#[command(name = "docfill")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a document from a JSON job file
    Fill {
        /// Job file (template, output pattern, globals, blocks)
        job: PathBuf,

        /// Template to use instead of the job's
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output path pattern to use instead of the job's
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the block markers and placeholders of a template
    Inspect {
        /// Template file (.docx or .pptx)
        template: PathBuf,

        /// Print the outline as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Fill {
            job,
            template,
            output,
        } => fill(&job, template, output, args.verbose),
        Command::Inspect { template, json } => inspect(&template, json),
    }
}

/// Run one job file end to end.
fn fill(
    job_path: &Path,
    template: Option<PathBuf>,
    output: Option<String>,
    verbose: bool,
) -> Result<()> {
    let mut job = Job::from_path(job_path)
        .with_context(|| format!("Failed to load job {}", job_path.display()))?;
    if let Some(template) = template {
        job.template = template;
    }
    if let Some(output) = output {
        job.output = output;
    }

    let store = store_for(&job.template)?;
    let report = generate(store.as_ref(), &job)
        .with_context(|| format!("Failed to fill {}", job.template.display()))?;

    if verbose {
        eprintln!(
            "  Merged {} runs, substituted {} runs",
            report.merged_runs, report.substituted_runs
        );
        for block in &report.expanded {
            let copies: usize = block.expansions.iter().map(|e| e.copies).sum();
            eprintln!(
                "  Block '{}': {} copies in {} container(s)",
                block.id,
                copies,
                block.expansions.len()
            );
        }
    }
    for id in &report.skipped {
        eprintln!("Warning: block '{}' has no marker pair; left as is", id);
    }

    println!("{}", report.output.display());
    Ok(())
}

/// Print where a template's markers and placeholders are.
fn inspect(template: &Path, json: bool) -> Result<()> {
    let store = store_for(template)?;
    let mut document = store
        .load(template)
        .with_context(|| format!("Failed to load {}", template.display()))?;
    TemplateEngine::for_format(document.format).normalize_document(&mut document);
    let outline = outline(&document);

    if json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
    } else {
        print!("{}", format_outline(&outline));
    }
    Ok(())
}

fn format_outline(outline: &Outline) -> String {
    let mut out = String::new();
    for part in &outline.parts {
        if part.markers.is_empty() && part.blocks.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({:?})\n", part.path, part.kind));
        for marker in &part.markers {
            let shown = if marker.is_empty() { "(bare)" } else { marker.as_str() };
            out.push_str(&format!("  marker: {}\n", shown));
        }
        for block in &part.blocks {
            out.push_str(&format!("  {}\n", block.text.trim()));
        }
    }
    let placeholders = outline.placeholders();
    if !placeholders.is_empty() {
        out.push_str(&format!("Placeholders: {}\n", placeholders.join(", ")));
    }
    out
}

/// Pick the store for a template: by package content first, then by extension.
fn store_for(path: &Path) -> Result<Box<dyn DocumentStore>> {
    let format = detect_format(path)?;
    log::debug!("Handling {} as {:?}", path.display(), format);
    Ok(match format {
        DocumentFormat::Docx => Box::new(DocxStore::new()),
        DocumentFormat::Pptx => Box::new(PptxStore::new()),
    })
}

fn detect_format(path: &Path) -> Result<DocumentFormat> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    // Read magic bytes to detect a ZIP package
    let mut magic = [0u8; 4];
    let by_content = if reader.read_exact(&mut magic).is_ok() && DocumentFormat::is_package(&magic) {
        reader.rewind()?;
        Package::sniff_format(reader).ok().flatten()
    } else {
        None
    };

    by_content
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(DocumentFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format of {}", path.display()))
}
