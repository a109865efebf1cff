//! Search a document for several terms and print the resulting highlights
//!
//! Loads a document into the in-memory engine, places the document-loaded
//! marker, runs one search pass per term and prints the annotation layer as
//! JSON.
//!
//! Usage:
//!   cargo run --bin highlight_demo -- --doc document.json
//!   cargo run --bin highlight_demo -- --config viewer.json --highlights terms.json
//!   cargo run --bin highlight_demo -- --doc document.json --clear

use highlight_oxide::engine::{AnnotationLayer, DocumentEngine, MemoryDocument, MemoryEngine};
use highlight_oxide::geometry::Rect;
use highlight_oxide::highlight::{load_definitions, HighlightDefinition, Rgb};
use highlight_oxide::search::TermId;
use highlight_oxide::{HighlightSession, Result, ViewerConfig};
use std::path::PathBuf;

struct DemoArgs {
    config: Option<PathBuf>,
    doc: Option<PathBuf>,
    highlights: Option<PathBuf>,
    clear: bool,
    verbose: bool,
}

impl DemoArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = Self {
            config: None,
            doc: None,
            highlights: None,
            clear: false,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        parsed.config = Some(PathBuf::from(&args[i]));
                    }
                },
                "--doc" => {
                    i += 1;
                    if i < args.len() {
                        parsed.doc = Some(PathBuf::from(&args[i]));
                    }
                },
                "--highlights" => {
                    i += 1;
                    if i < args.len() {
                        parsed.highlights = Some(PathBuf::from(&args[i]));
                    }
                },
                "--clear" => {
                    parsed.clear = true;
                },
                "--verbose" | "-v" => {
                    parsed.verbose = true;
                },
                other => {
                    eprintln!("Ignoring unknown argument: {}", other);
                },
            }
            i += 1;
        }

        parsed
    }
}

const SAMPLE_PAGES: [&str; 2] = [
    "About this document\nImportant information about the viewer\nPowered by an embedded engine",
    "Import and export support\nPortable document formats\nPopular imaging options",
];

/// The two terms the viewer sample searches for.
fn default_terms() -> Vec<(TermId, HighlightDefinition)> {
    vec![
        (
            TermId::from("1"),
            HighlightDefinition::new("im", Rgb::new(255, 0, 0)).with_regex(true),
        ),
        (
            TermId::from("2"),
            HighlightDefinition::new("po", Rgb::new(0, 255, 0))
                .with_regex(true)
                .with_case_sensitive(true),
        ),
    ]
}

fn run(args: &DemoArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::new(),
    };
    if let Some(doc) = &args.doc {
        config = config.with_initial_doc(doc);
    }

    let terms = match &args.highlights {
        Some(path) => load_definitions(path)?,
        None => default_terms(),
    };

    let mut session = HighlightSession::<MemoryEngine>::initialize(&config)?;
    if !session.engine().is_document_loaded() {
        session
            .engine_mut()
            .load_document(MemoryDocument::from_text_pages(&SAMPLE_PAGES));
    }
    session.on_document_loaded(1, Rect::new(100.0, 150.0, 200.0, 50.0))?;

    let report = session.search_and_highlight(terms)?;
    if args.verbose {
        for err in session.driver().match_errors() {
            eprintln!("warning: {}", err);
        }
        eprintln!(
            "Removed {} annotation(s), added {} highlight(s)",
            report.removed,
            report.added.len()
        );
    }

    if args.clear {
        session.clear_annotations()?;
    }

    let layer = session.engine().annotation_layer();
    let annotations: Vec<_> = layer
        .list_annotations()
        .into_iter()
        .filter_map(|id| layer.get_annotation(id))
        .collect();
    println!("{}", serde_json::to_string_pretty(&annotations)?);
    Ok(())
}

fn main() {
    env_logger::init();

    let args = DemoArgs::from_args();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
