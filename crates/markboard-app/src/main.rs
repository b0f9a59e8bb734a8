//! `markboard` command-line entry point.

use clap::{Parser, Subcommand};
use markboard_app::commands::{self, AnnotateJob, Dimensions, SketchJob};
use markboard_app::AppResult;
use markboard_core::config::EngineConfig;
use std::path::PathBuf;

/// Markboard - sketch and annotate from the command line
#[derive(Parser)]
#[command(name = "markboard")]
#[command(about = "Sketching and photo annotation engine")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a photo with a pointer script and write the flattened PNG
    Annotate {
        /// Photo to annotate (PNG, JPEG or WebP)
        #[arg(long)]
        image: PathBuf,
        /// Size the photo is displayed at, e.g. 300x200
        #[arg(long)]
        display: Dimensions,
        /// Device pixel ratio of the display
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,
        /// Pointer script (JSON, display coordinates)
        #[arg(long)]
        script: PathBuf,
        /// Output PNG
        #[arg(long)]
        out: PathBuf,
        /// Also place the result on a new page of this document
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Draw a pointer script on a blank white surface
    Sketch {
        /// Surface size, e.g. 800x600
        #[arg(long)]
        size: Dimensions,
        /// Pointer script (JSON, surface coordinates)
        #[arg(long)]
        script: PathBuf,
        /// Output PNG
        #[arg(long)]
        out: PathBuf,
        /// Also store the strokes on the last page of this document
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Print page count and per-page element counts
    Summary {
        #[arg(long)]
        document: PathBuf,
    },

    /// Render one page of a document to PNG
    Render {
        #[arg(long)]
        document: PathBuf,
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Annotate {
            image,
            display,
            dpr,
            script,
            out,
            document,
        } => commands::annotate(
            config,
            &AnnotateJob {
                image,
                display,
                device_pixel_ratio: dpr,
                script,
                out,
                document,
            },
        ),
        Commands::Sketch {
            size,
            script,
            out,
            document,
        } => commands::sketch(
            config,
            &SketchJob {
                size,
                script,
                out,
                document,
            },
        ),
        Commands::Summary { document } => {
            let document = commands::load_document(&document)?;
            print!("{}", commands::summarize(&document));
            Ok(())
        }
        Commands::Render {
            document,
            page,
            zoom,
            out,
        } => commands::render(config, &document, page, zoom, &out),
    }
}
