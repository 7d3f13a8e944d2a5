use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use genrematch_core::ingest::catalog_from_files;
use genrematch_core::persist::{load_snapshot, save_catalog, save_meta, CatalogPaths, MetaFile, SNAPSHOT_VERSION};
use genrematch_core::{EngineState, RecommendRequest, DEFAULT_TOP_N};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod interactive;
mod render;

#[derive(Parser)]
#[command(name = "genrematch")]
#[command(about = "Recommend movies with a similar genre mix", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a catalog snapshot from IMDb title.basics / title.ratings dumps
    Build {
        /// Directory searched for title.basics.tsv[.gz] and title.ratings.tsv[.gz]
        #[arg(long)]
        input: Option<String>,
        /// Explicit path to the basics dump
        #[arg(long)]
        basics: Option<String>,
        /// Explicit path to the ratings dump
        #[arg(long)]
        ratings: Option<String>,
        /// Output catalog directory
        #[arg(long, default_value = "./catalog")]
        output: String,
    },
    /// Recommend movies similar to a title
    Recommend {
        /// Title to look up (case-insensitive)
        title: String,
        #[arg(long, default_value = "./catalog")]
        catalog: String,
        /// Keep only results whose genres contain this text
        #[arg(long)]
        genre: Option<String>,
        /// Keep only results rated at least this
        #[arg(long)]
        min_rating: Option<f32>,
        /// Number of results to rank
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
    /// List the genres present in the catalog
    Genres {
        #[arg(long, default_value = "./catalog")]
        catalog: String,
    },
    /// Prompt for titles and filters until `quit`
    Interactive {
        #[arg(long, default_value = "./catalog")]
        catalog: String,
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, basics, ratings, output } => {
            let (basics, ratings) = locate_sources(input.as_deref(), basics, ratings)?;
            build_catalog(&basics, &ratings, &output)
        }
        Commands::Recommend { title, catalog, genre, min_rating, n } => {
            let state = load_state(&catalog)?;
            let mut req = RecommendRequest::new(title.trim()).with_n(n);
            req.filter.genre = genre;
            req.filter.min_rating = min_rating;
            let outcome = state.recommend(&req)?;
            let stdout = io::stdout();
            render::outcome(&mut stdout.lock(), &outcome, req.filter.is_active())?;
            Ok(())
        }
        Commands::Genres { catalog } => {
            let state = load_state(&catalog)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for g in state.genres() {
                writeln!(out, "{g}")?;
            }
            Ok(())
        }
        Commands::Interactive { catalog, n } => {
            let state = load_state(&catalog)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            interactive::run(&state, n, stdin.lock(), stdout.lock())
        }
    }
}

fn load_state(dir: &str) -> Result<EngineState> {
    let paths = CatalogPaths::new(dir);
    let (catalog, meta) = load_snapshot(&paths)?;
    tracing::info!(entries = meta.num_entries, created_at = %meta.created_at, "loaded catalog snapshot");
    Ok(EngineState::build(catalog)?)
}

/// Resolve the two source dumps from explicit paths or by walking `input`.
fn locate_sources(input: Option<&str>, basics: Option<String>, ratings: Option<String>) -> Result<(PathBuf, PathBuf)> {
    let mut found_basics = basics.map(PathBuf::from);
    let mut found_ratings = ratings.map(PathBuf::from);
    if let Some(dir) = input {
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if !p.is_file() { continue; }
            let name = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if found_basics.is_none() && matches!(name, "title.basics.tsv" | "title.basics.tsv.gz") {
                found_basics = Some(p.to_path_buf());
            } else if found_ratings.is_none() && matches!(name, "title.ratings.tsv" | "title.ratings.tsv.gz") {
                found_ratings = Some(p.to_path_buf());
            }
        }
    }
    match (found_basics, found_ratings) {
        (Some(b), Some(r)) => Ok((b, r)),
        (None, _) => Err(anyhow!("no title.basics.tsv[.gz] found; pass --input or --basics")),
        (_, None) => Err(anyhow!("no title.ratings.tsv[.gz] found; pass --input or --ratings")),
    }
}

fn build_catalog(basics: &Path, ratings: &Path, output: &str) -> Result<()> {
    tracing::info!(basics = %basics.display(), ratings = %ratings.display(), "reading sources");
    let catalog = catalog_from_files(basics, ratings)?;
    // fail the build here rather than at first query
    EngineState::build(catalog.clone())?;

    let out_paths = CatalogPaths::new(output);
    save_catalog(&out_paths, &catalog)?;
    let meta = MetaFile {
        num_entries: catalog.len() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: SNAPSHOT_VERSION,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, entries = catalog.len(), "catalog build complete");
    Ok(())
}
