use clap::{Parser, Subcommand};
use mixed_gal::types::{CATALOG_FILENAME, Catalog};
use mixed_gal::{config, convert, generate, output, scan};
use std::path::PathBuf;

/// Shared flags for commands that transcode heic assets.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the conversion cache — force re-transcoding of all heic files
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "mixed-gal")]
#[command(about = "Static gallery builder for mixed-media event albums")]
#[command(long_about = "\
Static gallery builder for mixed-media event albums

Your filesystem is the data source. Each directory under the source root is
one folder (an event or album); the images, MP4 videos, and HEIC photos
inside it become that folder's assets.

Content structure:

  content/
  ├── gallery.toml                 # Gallery config (optional)
  ├── spring-gala/                 # Folder (one event)
  │   ├── description.md           # Folder description (Markdown, optional)
  │   ├── logo.png                 # Folder logo (first logo match wins)
  │   ├── dance.jpg                # Image asset
  │   ├── dance.json               # Sidecar: {\"caption\": ..., \"tags\": [...]}
  │   ├── highlights.mp4           # Video asset
  │   ├── toast.heic               # Converted to JPEG by the convert stage
  │   └── stage/walk.jpg           # Nested files roll up to the folder
  └── graduation_2024/
      └── slideshow.mp4

HEIC photos are transcoded at build time (AV1-coded payloads decode in pure
Rust; HEVC-coded files are reported per asset and render as a visible
placeholder). Unrecognized files stay in the gallery as download-only
entries. Sidecar tags drive the generated per-tag pages.

Run 'mixed-gal gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (catalog manifest, converted JPEGs)
    #[arg(long, default_value = ".mixed-gal-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory into a catalog manifest
    Scan,
    /// Transcode heic assets to JPEG
    Convert(CacheArgs),
    /// Produce the final HTML gallery from the converted catalog
    Generate,
    /// Run the full pipeline: scan → convert → generate
    Build(CacheArgs),
    /// Validate the content directory without building
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let catalog = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let catalog_path = cli.temp_dir.join(CATALOG_FILENAME);
            let json = serde_json::to_string_pretty(&catalog)?;
            std::fs::write(&catalog_path, json)?;
            output::print_scan_output(&catalog, &cli.source);
        }
        Command::Convert(cache_args) => {
            let catalog_path = cli.temp_dir.join(CATALOG_FILENAME);
            let manifest_content = std::fs::read_to_string(&catalog_path)?;
            let catalog: Catalog = serde_json::from_str(&manifest_content)?;
            init_thread_pool(&catalog.config.processing);
            let converted_dir = cli.temp_dir.join("converted");
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_convert_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = convert::convert(
                &catalog_path,
                &cli.source,
                &converted_dir,
                !cache_args.no_cache,
                Some(tx),
            )?;
            printer.join().unwrap();
            println!("Cache: {}", result.cache_stats);
        }
        Command::Generate => {
            let converted_dir = cli.temp_dir.join("converted");
            let converted_manifest_path = converted_dir.join(CATALOG_FILENAME);
            generate::generate(
                &converted_manifest_path,
                &converted_dir,
                &cli.source,
                &cli.output,
            )?;
            let manifest_content = std::fs::read_to_string(&converted_manifest_path)?;
            let catalog: Catalog = serde_json::from_str(&manifest_content)?;
            output::print_generate_output(&catalog);
        }
        Command::Build(cache_args) => {
            std::fs::create_dir_all(&cli.temp_dir)?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let catalog = scan::scan(&cli.source)?;
            let catalog_path = cli.temp_dir.join(CATALOG_FILENAME);
            let json = serde_json::to_string_pretty(&catalog)?;
            std::fs::write(&catalog_path, json)?;
            output::print_scan_output(&catalog, &cli.source);

            println!("==> Stage 2: Converting heic assets");
            init_thread_pool(&catalog.config.processing);
            let converted_dir = cli.temp_dir.join("converted");
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_convert_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = convert::convert(
                &catalog_path,
                &cli.source,
                &converted_dir,
                !cache_args.no_cache,
                Some(tx),
            )?;
            printer.join().unwrap();
            println!("Cache: {}", result.cache_stats);

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            generate::generate(
                &result.manifest_path,
                &converted_dir,
                &cli.source,
                &cli.output,
            )?;
            output::print_generate_output(&result.catalog);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let catalog = scan::scan(&cli.source)?;
            output::print_scan_output(&catalog, &cli.source);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
