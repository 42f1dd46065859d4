use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deckgraft_core::{
    compose_file, graft_slide, remove_slides, remove_slides_strict, repair, ComposerSettings,
    Package, PresentationDocument, RepairOutcome, SlideContent,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "deckgraft")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Assemble PowerPoint decks from a template and a content plan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a deck from a template and a JSON content plan
    Assemble {
        #[arg(short, long)]
        template: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        plan: PathBuf,

        /// JSON composer settings; defaults apply when omitted
        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Remove slides by zero-based position
    Remove {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_delimiter = ',', required = true)]
        slides: Vec<usize>,

        /// Fail instead of ignoring positions past the end
        #[arg(long)]
        strict: bool,
    },
    /// Copy one slide of another deck into a deck
    Graft {
        #[arg(short, long)]
        dest: PathBuf,

        #[arg(short = 'S', long)]
        source: PathBuf,

        #[arg(short = 'n', long)]
        index: usize,

        #[arg(short, long)]
        output: PathBuf,

        /// Manifest position; appends when omitted
        #[arg(short, long)]
        position: Option<usize>,
    },
    /// Add the parts and content types office applications expect
    Repair {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Plans are either a bare list of slides or an object with a `slides` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanFile {
    List(Vec<SlideContent>),
    Document { slides: Vec<SlideContent> },
}

impl PlanFile {
    fn into_slides(self) -> Vec<SlideContent> {
        match self {
            Self::List(slides) | Self::Document { slides } => slides,
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn open(path: &Path) -> Result<Package> {
    Package::open(path).with_context(|| format!("opening {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,deckgraft_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            template,
            output,
            plan,
            settings,
            json,
        } => {
            let slides = read_json::<PlanFile>(&plan)?.into_slides();
            if slides.is_empty() {
                bail!("{} lists no slides", plan.display());
            }
            let settings = match settings {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    ComposerSettings::from_json(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => ComposerSettings::default(),
            };

            let report = compose_file(&template, &output, slides, settings)
                .with_context(|| format!("assembling {}", output.display()))?;

            if json {
                let summary = serde_json::json!({
                    "output": output,
                    "removed": report.removal.removed,
                    "repaired": matches!(report.repair, Some(RepairOutcome::Repaired(_))),
                    "grafted": report.grafted,
                    "skipped": report.skipped,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Wrote {} ({} slides grafted, {} skipped)",
                    output.display(),
                    report.grafted.len(),
                    report.skipped.len()
                );
                for skipped in &report.skipped {
                    println!(
                        "  skipped '{}': layout {} not in template ({} slides)",
                        skipped.title, skipped.layout_index, skipped.template_slides
                    );
                }
            }
        }
        Commands::Remove {
            input,
            output,
            slides,
            strict,
        } => {
            let mut package = open(&input)?;
            let report = if strict {
                remove_slides_strict(&mut package, slides)?
            } else {
                remove_slides(&mut package, slides)?
            };
            package.save(&output)?;
            println!(
                "Removed {:?}, ignored {:?}; wrote {}",
                report.removed,
                report.ignored,
                output.display()
            );
        }
        Commands::Graft {
            dest,
            source,
            index,
            output,
            position,
        } => {
            let mut dest_package = open(&dest)?;
            let source_package = open(&source)?;
            let slide_id = graft_slide(
                &mut dest_package,
                &source_package,
                index,
                position.unwrap_or(usize::MAX),
            )?;
            dest_package.save(&output)?;
            println!("Grafted slide {} as id {}; wrote {}", index, slide_id, output.display());
        }
        Commands::Repair { input, output } => {
            let mut package = open(&input)?;
            match repair(&mut package) {
                RepairOutcome::Repaired(report) => {
                    for part in &report.added_parts {
                        println!("  added {}", part);
                    }
                    for part in &report.dropped_overrides {
                        println!("  dropped override {}", part);
                    }
                }
                RepairOutcome::Skipped(reason) => println!("Repair skipped: {}", reason),
            }
            package.save(&output)?;
            info!(output = %output.display(), "repaired deck written");
        }
        Commands::Info { file } => {
            let package = open(&file)?;
            let presentation = PresentationDocument::load(&package)?;
            let media = package
                .list()
                .filter(|name| deckgraft_core::package::parts::is_media_part(name))
                .count();

            println!("{}", file.display());
            println!("  parts: {}", package.len());
            println!("  media: {}", media);
            println!("  slides: {}", presentation.slide_count());
            for (position, entry) in presentation.manifest().entries().iter().enumerate() {
                let part = presentation
                    .slide_part(position)
                    .unwrap_or_else(|err| format!("<{}>", err));
                println!("  {:>3}  id {:<6} {}", position, entry.slide_id, part);
            }
        }
    }

    Ok(())
}
