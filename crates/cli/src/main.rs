//! CLI for populating solution design decks from architecture sources.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dsd_core::{
    apply_mapping, classify, find_architecture_slides, mapping_summary, reconcile, slide_summary,
    ComponentCatalog, DocumentStore, SlideType,
};
use dsd_extract::{ArchitectureAnalyzer, ClaudeClient, IntegrationAnalysis};
use dsd_gslides::GoogleSlidesDocument;
use dsd_pptx::PptxDocument;
use std::path::PathBuf;

/// Populate slide deck placeholders from an architecture source.
#[derive(Parser, Debug)]
#[command(name = "dsd-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a .pptx file, or a presentation id with --google-slides
    #[arg(required_unless_present = "analyze_only")]
    document: Option<String>,

    /// Treat DOCUMENT as a Google Slides presentation id
    #[arg(short, long)]
    google_slides: bool,

    /// Architecture image to analyze (whiteboard photo, exported diagram)
    #[arg(short, long, group = "source")]
    image: Option<PathBuf>,

    /// File with Mermaid diagram source to analyze
    #[arg(short, long, group = "source")]
    mermaid: Option<PathBuf>,

    /// File with free-text architecture notes to analyze
    #[arg(short, long, group = "source")]
    notes: Option<PathBuf>,

    /// Print the extracted components and exit without touching a deck
    #[arg(long)]
    analyze_only: bool,

    /// Output path for the populated deck (default: <name>_populated.pptx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only populate slides of this type (current|target|timeline|vision)
    #[arg(short, long)]
    filter: Option<String>,

    /// Only populate this slide (1-based deck position)
    #[arg(short, long)]
    slide: Option<usize>,

    /// Show the proposed mapping without writing anything
    #[arg(short, long)]
    dry_run: bool,

    /// Also analyze integration patterns and feed them into the mapping
    #[arg(long)]
    patterns: bool,

    /// Anthropic API key (default: ANTHROPIC_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let api_key = match args.api_key.clone() {
        Some(key) => key,
        None => std::env::var("ANTHROPIC_API_KEY")
            .context("no API key: pass --api-key or set ANTHROPIC_API_KEY")?,
    };
    let client = ClaudeClient::new(api_key);

    // Extract components from whichever source was given.
    let analyzer = ArchitectureAnalyzer::new(client);
    let analysis = if let Some(image) = &args.image {
        eprintln!("Analyzing image: {}", image.display());
        analyzer.analyze_image(image)?
    } else if let Some(mermaid) = &args.mermaid {
        let code = std::fs::read_to_string(mermaid)
            .with_context(|| format!("failed to read {}", mermaid.display()))?;
        eprintln!("Analyzing Mermaid diagram: {}", mermaid.display());
        analyzer.analyze_mermaid(&code)?
    } else if let Some(notes) = &args.notes {
        let text = std::fs::read_to_string(notes)
            .with_context(|| format!("failed to read {}", notes.display()))?;
        eprintln!("Analyzing notes: {}", notes.display());
        analyzer.analyze_notes(&text)?
    } else {
        bail!("no architecture source: pass --image, --mermaid or --notes");
    };

    eprintln!(
        "Extracted {} components from {} source",
        analysis.components.len(),
        analysis.source_type
    );
    for comp in &analysis.components {
        eprintln!("  - {} ({})", comp.name, comp.category);
    }

    let patterns = if args.patterns {
        let pattern_analysis = analyze_patterns(&analyzer, &analysis.components);
        eprint!("{}", dsd_extract::format_pattern_summary(&pattern_analysis));
        Some(pattern_analysis)
    } else {
        None
    };

    if args.analyze_only {
        return Ok(());
    }

    let document = args
        .document
        .as_deref()
        .context("no document given")?;

    let mut store: Box<dyn DocumentStore> = if args.google_slides {
        let token = std::env::var("GOOGLE_SLIDES_TOKEN")
            .context("set GOOGLE_SLIDES_TOKEN to use --google-slides")?;
        Box::new(GoogleSlidesDocument::connect(document, token)?)
    } else {
        Box::new(PptxDocument::open(document)?)
    };

    populate(&mut *store, &args, &analyzer, analysis.components, patterns)
}

/// Map the components into the deck's architecture slides.
fn populate(
    store: &mut dyn DocumentStore,
    args: &Args,
    analyzer: &ArchitectureAnalyzer,
    components: Vec<dsd_core::SystemComponent>,
    patterns: Option<IntegrationAnalysis>,
) -> Result<()> {
    let filter = args
        .filter
        .as_deref()
        .map(parse_slide_filter)
        .transpose()?;

    let records = store.enumerate_placeholder_shapes()?;
    let slides = find_architecture_slides(&records);
    if slides.is_empty() {
        bail!("no placeholder shapes found in the document");
    }
    eprintln!("{}", slide_summary(&slides));

    let catalog = ComponentCatalog::from_components(components);
    let context = patterns.as_ref().and_then(dsd_extract::pattern_context);

    let mut any_applied = false;
    for slide in &slides {
        if let Some(wanted) = args.slide {
            if slide.index + 1 != wanted {
                continue;
            }
        }
        if let Some(wanted) = filter {
            if classify(&slide.title) != wanted {
                continue;
            }
        }

        eprintln!("\nMapping slide {}: {}", slide.index + 1, slide.title);
        let (entries, _raw) =
            dsd_extract::suggest_mapping(analyzer.client(), slide, &catalog, context.as_deref())?;
        let result = reconcile(slide, &catalog, &entries);
        eprintln!("{}", mapping_summary(&result));

        if args.dry_run {
            continue;
        }

        let applied = apply_mapping(store, &result);
        eprintln!("Applied {} of {} mappings", applied, result.mappings.len());
        any_applied = any_applied || applied > 0;
    }

    if args.dry_run {
        eprintln!("\nDry run, nothing written");
        return Ok(());
    }
    if !any_applied {
        eprintln!("\nNo mappings applied, nothing to save");
        return Ok(());
    }

    let location = store.save(args.output.as_deref())?;
    eprintln!("\nSaved: {location}");
    Ok(())
}

/// Integration pattern analysis, falling back to keyword heuristics when
/// the model call fails.
fn analyze_patterns(
    analyzer: &ArchitectureAnalyzer,
    components: &[dsd_core::SystemComponent],
) -> IntegrationAnalysis {
    match dsd_extract::analyze_components(analyzer.client(), components) {
        Ok(analysis) => analysis,
        Err(e) => {
            log::warn!("pattern analysis failed ({e}), using keyword heuristics");
            IntegrationAnalysis {
                current_patterns: dsd_extract::detect_legacy_patterns(components),
                recommended_patterns: dsd_extract::suggest_modern_patterns(components),
                summary: String::new(),
            }
        }
    }
}

fn parse_slide_filter(value: &str) -> Result<SlideType> {
    match value.to_lowercase().as_str() {
        "current" => Ok(SlideType::CurrentState),
        "target" | "future" => Ok(SlideType::TargetState),
        "timeline" => Ok(SlideType::Timeline),
        "vision" => Ok(SlideType::Vision),
        other => bail!("unknown slide filter '{other}' (use current|target|timeline|vision)"),
    }
}
