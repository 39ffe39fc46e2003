//! CLI for generating, exporting and inspecting slide decks.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use deck_core::feedback::{export_filename, export_json};
use deck_core::{
    Audience, FeedbackStats, FeedbackStore, GeneratedSlide, JsonFileFeedbackStore,
    RequestedSlideType, SlideRequest,
};
use deck_gateway::{GenerationGateway, HttpGenerator};
use deck_pptx::{DeckReader, ExportedFile, PresentationExporter};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Generate consultant-style slide decks and export them as PowerPoint.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of a slide generation service
    #[arg(long, env = "DECK_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Give up on the generation service after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Skip the generation service and use local heuristics only
    #[arg(long, global = true)]
    local: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck from a purpose and export it
    Generate {
        /// What the presentation is for
        #[arg(short, long)]
        purpose: String,

        /// styrelse, kollegor, kunder, workshop, allmän or other
        #[arg(short, long, default_value = "other")]
        audience: String,

        /// Number of slides (1-20)
        #[arg(short = 'n', long, default_value = "5")]
        slides: usize,

        /// swot, situation-complication, agenda, dashboard or custom
        #[arg(short = 't', long = "type", default_value = "custom", value_parser = parse_slide_type)]
        slide_type: RequestedSlideType,

        /// Free-text details, one point per line
        #[arg(short, long, conflicts_with = "details_file")]
        details: Option<String>,

        /// Read details from a file
        #[arg(long)]
        details_file: Option<PathBuf>,

        /// Reference files; .pptx decks contribute their outline
        #[arg(short, long)]
        inspiration: Vec<PathBuf>,

        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the slides as JSON instead of exporting
        #[arg(long)]
        json: bool,
    },

    /// Export slides from a JSON file
    Export {
        /// JSON file with a slide array or {"slides": [...]}
        input: PathBuf,

        /// Output file or directory (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the text outline of .pptx files
    Inspect {
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Print in the form used for inspiration text
        #[arg(long)]
        inspiration: bool,
    },

    /// Summarise, export or clear stored feedback
    Feedback {
        /// Feedback JSON file
        #[arg(long, env = "DECK_FEEDBACK_FILE")]
        file: PathBuf,

        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Subcommand, Debug)]
enum FeedbackAction {
    /// Print totals and per-feature counts
    Stats,
    /// Write all entries to a dated JSON file
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove all entries
    Clear,
}

fn parse_slide_type(value: &str) -> std::result::Result<RequestedSlideType, String> {
    RequestedSlideType::from_name(value).ok_or_else(|| format!("unknown slide type '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match &args.command {
        Command::Generate {
            purpose,
            audience,
            slides,
            slide_type,
            details,
            details_file,
            inspiration,
            output,
            json,
        } => {
            let details = match (details, details_file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => String::new(),
            };
            let request = SlideRequest::new(purpose.as_str(), Audience::parse(audience), *slides, *slide_type)
                .with_details(details)
                .with_inspiration(load_inspiration(inspiration)?);
            request.validate().map_err(|e| anyhow!("{}", e))?;

            let gateway = build_gateway(&args);
            let generation = gateway.generate_with_source(&request).await;
            if args.verbose {
                eprintln!("Generated {} slides ({})", generation.slides.len(), generation.source);
            }

            if *json {
                println!("{}", serde_json::to_string_pretty(&generation.slides)?);
            } else {
                let path = write_export(&generation.slides, output.as_deref(), Path::new("."))?;
                println!("{}", path.display());
            }
        }

        Command::Export { input, output } => {
            let slides = load_slides(input)?;
            let default_dir = input.parent().unwrap_or(Path::new("."));
            let path = write_export(&slides, output.as_deref(), default_dir)?;
            println!("{}", path.display());
        }

        Command::Inspect { input, inspiration } => {
            let reader = DeckReader::new();
            for path in input {
                let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
                let outline = reader
                    .read(BufReader::new(file))
                    .map_err(|e| anyhow!("{}: {}", path.display(), e))?;

                if args.verbose {
                    eprintln!("{}: {} slides", path.display(), outline.slides.len());
                }
                if *inspiration {
                    println!("{}", outline.to_inspiration());
                } else {
                    for slide in &outline.slides {
                        println!("--- Slide {} ---", slide.number);
                        for line in &slide.lines {
                            println!("{}", line);
                        }
                    }
                }
            }
        }

        Command::Feedback { file, action } => {
            let store = JsonFileFeedbackStore::new(file);
            run_feedback(&store, action)?;
        }
    }

    Ok(())
}

fn build_gateway(args: &Args) -> GenerationGateway {
    match (&args.endpoint, args.local) {
        (Some(endpoint), false) => {
            let mut remote = HttpGenerator::new(endpoint);
            if let Some(secs) = args.timeout_secs {
                remote = remote.with_timeout(Duration::from_secs(secs));
            }
            GenerationGateway::new(remote)
        }
        _ => GenerationGateway::local_only(),
    }
}

/// Inspiration text from reference files.
///
/// Decks contribute their outline; other files are only named.
fn load_inspiration(paths: &[PathBuf]) -> Result<String> {
    let reader = DeckReader::new();
    let mut parts = Vec::new();

    for path in paths {
        let is_pptx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");

        if !is_pptx {
            parts.push(format!("Fil: {}", name));
            continue;
        }

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        match reader.read(BufReader::new(file)) {
            Ok(outline) => parts.push(format!("Fil: {}\n{}", name, outline.to_inspiration())),
            Err(e) => {
                log::warn!("Could not read {}, using its name only: {}", path.display(), e);
                parts.push(format!("Fil: {}", name));
            }
        }
    }

    Ok(parts.join("\n\n"))
}

/// Slides from a JSON file holding either an array or `{"slides": [...]}`.
fn load_slides(path: &Path) -> Result<Vec<GeneratedSlide>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SlideFile {
        Bare(Vec<GeneratedSlide>),
        Wrapped { slides: Vec<GeneratedSlide> },
    }

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let slides = match serde_json::from_str(&content)
        .with_context(|| format!("{} is not a slide list", path.display()))?
    {
        SlideFile::Bare(slides) | SlideFile::Wrapped { slides } => slides,
    };
    if slides.is_empty() {
        return Err(anyhow!("{} contains no slides", path.display()));
    }
    Ok(slides)
}

fn write_export(slides: &[GeneratedSlide], output: Option<&Path>, default_dir: &Path) -> Result<PathBuf> {
    let file = PresentationExporter::new().export(slides);
    if file.is_fallback() {
        eprintln!("PowerPoint export failed; wrote a plain XML outline instead");
    }

    let path = output_path(&file, output, default_dir)?;
    write_output(&path, &file.bytes)?;
    Ok(path)
}

/// Where an exported file goes.
///
/// A directory (existing, or given without extension) receives the file under
/// its dated name; an explicit file name keeps its stem but takes the
/// extension of what was actually written.
fn output_path(file: &ExportedFile, output: Option<&Path>, default_dir: &Path) -> Result<PathBuf> {
    let path = match output {
        Some(path) if path.is_dir() || path.extension().is_none() => {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create output directory: {}", path.display()))?;
            path.join(&file.filename)
        }
        Some(path) => path.with_extension(file.format.extension()),
        None => default_dir.join(&file.filename),
    };
    Ok(path)
}

fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    Ok(())
}

fn run_feedback(store: &dyn FeedbackStore, action: &FeedbackAction) -> Result<()> {
    let entries = store.entries().map_err(|e| anyhow!("{}", e))?;

    match action {
        FeedbackAction::Stats => {
            let stats = FeedbackStats::from_entries(&entries);
            println!("Total:    {}", stats.total);
            println!("Positive: {}", stats.positive);
            println!("Negative: {}", stats.negative);
            if let Some((feature, count)) = stats.top_feature() {
                println!("Top feature: {} ({})", feature, count);
            }
            for (feature, count) in &stats.features {
                println!("  {:<20} {}", feature, count);
            }
        }
        FeedbackAction::Export { output } => {
            let json = export_json(&entries).map_err(|e| anyhow!("{}", e))?;
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(export_filename(Local::now().date_naive())));
            write_output(&path, json.as_bytes())?;
            println!("{}", path.display());
        }
        FeedbackAction::Clear => {
            store.clear().map_err(|e| anyhow!("{}", e))?;
            println!("Removed {} entries", entries.len());
        }
    }
    Ok(())
}
