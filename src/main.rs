use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tidory::loader;
use tidory::models::{BuildEnvironment, PipelineOptions};
use tidory::Composer;

#[derive(Parser)]
#[command(name = "tidory")]
#[command(about = "Bundler configuration for Tistory skin projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the synthesized bundler configuration as JSON
    Config {
        /// Build for production (also enabled by TIDORY_ENV=production)
        #[arg(short, long)]
        production: bool,

        /// Path to tidory.config.json (searched upward from the current directory by default)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Pipeline defaults to use
        #[arg(long, value_enum, default_value_t = Preset::Package)]
        preset: Preset,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Resolve and print the production public path
    PublicPath {
        /// Path to tidory.config.json
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Classic,
    Package,
}

impl Preset {
    fn options(self) -> PipelineOptions {
        match self {
            Self::Classic => PipelineOptions::classic(),
            Self::Package => PipelineOptions::package(),
        }
    }
}

/// Initialize tracing on stderr; stdout carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tidory=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Locate and load the manifest; credentials may come from the project's `.env`.
fn open_composer(manifest: Option<&Path>) -> anyhow::Result<Composer> {
    let manifest_path = match manifest {
        Some(path) => path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize {}", path.display()))?,
        None => loader::find_manifest(&std::env::current_dir()?)?,
    };
    tracing::debug!(path = %manifest_path.display(), "Loading manifest");

    let (manifest, root) = loader::load_project(&manifest_path)?;
    Ok(Composer::new(manifest, root))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Config {
            production,
            manifest,
            preset,
            compact,
        } => {
            let environment = BuildEnvironment::select(production, BuildEnvironment::from_env()?);

            let composer = open_composer(manifest.as_deref())?.with_options(preset.options());
            let config = composer.synthesize(environment).await?;

            let output = if compact {
                config.to_json()?
            } else {
                config.to_json_pretty()?
            };
            println!("{}", output);
        }
        Commands::PublicPath { manifest } => {
            let composer = open_composer(manifest.as_deref())?;
            let public_path = composer.public_path(BuildEnvironment::Production).await?;
            println!("{}", public_path);
        }
    }

    Ok(())
}
