use clap::{Parser, Subcommand};
use env_logger::Env;
use khgallery::config::{self, GalleryConfig, OutputFormat};
use khgallery::imaging::RustBackend;
use khgallery::output::{self, CheckEntry};
use khgallery::{metadata, pipeline, render, scan, signal};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "khgallery")]
#[command(about = "Thumbnail a photo directory and render a gallery page")]
#[command(long_about = "\
Thumbnail a photo directory and render a gallery page

The source directory is a flat set of .jpg files, usually symlinks into a
photo library. Every photo gets a thumbnail, the results are shuffled, and a
single gallery document is written.

Source layout:

  gallery/
  ├── dawn.jpg -> ~/Photos/Iceland 2023/dawn.jpg   # collection \"Iceland 2023\"
  ├── local.jpg                                    # collection \"(default)\"
  └── thumbnails/                                  # created by the build
      ├── dawn.jpg                                 # 500px wide
      └── local.jpg

Photos at least 5x wider than tall are panoramas and get 2000px thumbnails.

Settings come from khgallery.toml (or --config), then CLI flags.
Run 'khgallery gen-config' to generate a documented config file.
Set RUST_LOG=debug for per-photo dispatch logging.")]
#[command(version)]
struct Cli {
    /// Config file (default: khgallery.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source photo directory
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Rendered gallery document
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Thumbnail directory, relative to the source directory
    #[arg(long, global = true)]
    thumbnails_dir: Option<String>,

    /// Maximum concurrent thumbnail workers (capped at CPU cores)
    #[arg(long, global = true)]
    max_workers: Option<usize>,

    /// Fixed shuffle seed for a reproducible order
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Gallery name shown in the page title
    #[arg(long, global = true)]
    name: Option<String>,

    /// Output document format
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// Apply flags on top of the file-backed config.
    fn apply_overrides(&self, config: &mut GalleryConfig) {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(dir) = &self.thumbnails_dir {
            config.thumbnails_dir = dir.clone();
        }
        if let Some(n) = self.max_workers {
            config.processing.max_workers = Some(n);
        }
        if let Some(seed) = self.seed {
            config.processing.seed = Some(seed);
        }
        if let Some(name) = &self.name {
            config.gallery.name = name.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → thumbnail → shuffle → render
    Build,
    /// List the photos a build would process, without touching them
    Check,
    /// Print a stock khgallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Build => {
            let config = resolve_config(&cli)?;
            let shutdown = signal::setup_shutdown_signal()?;
            let renderer = render::renderer_for(config.format);
            println!(
                "==> Building {} → {} ({})",
                config.source_dir.display(),
                config.output_path.display(),
                config.format.as_str()
            );
            let report =
                pipeline::build(&config, &RustBackend::new(), renderer.as_ref(), &shutdown)?;
            output::print_build_summary(&report);
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.source_dir.display());
            let entries: Vec<CheckEntry> = scan::scan(&config.source_dir)?
                .into_iter()
                .map(|path| CheckEntry {
                    collection: metadata::resolve_collection(&path),
                    path,
                })
                .collect();
            output::print_check_output(&entries, &config.source_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// File-backed config with CLI flags applied, validated once more.
fn resolve_config(cli: &Cli) -> Result<GalleryConfig, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}
