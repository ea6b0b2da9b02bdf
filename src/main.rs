use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;

use igov_site::client::IgovClientBuilder;
use igov_site::config::load_config;
use igov_site::records::Category;
use igov_site::report::RunSummary;
use igov_site::site::SiteBuilder;
use igov_site::store::DataStore;
use igov_site::{scrape, serve};

/// Static site pipeline for UN General Assembly proceedings.
#[derive(Debug, Parser)]
#[command(name = "igov-site", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape GA data into per-category JSON files.
    Scrape {
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
        /// Session number to scrape (must be present in the config).
        #[arg(long)]
        session: String,
        /// Scrape a single category.
        #[arg(long, conflicts_with = "all")]
        category: Option<Category>,
        /// Scrape every category (the default when no category is given).
        #[arg(long)]
        all: bool,
    },
    /// Render the persisted JSON into the static HTML tree.
    Build {
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
        /// Session number to build (must be present in the config).
        #[arg(long)]
        session: String,
        /// Build a single category.
        #[arg(long, conflicts_with = "all")]
        category: Option<Category>,
        /// Build every category (the default when no category is given).
        #[arg(long)]
        all: bool,
    },
    /// Serve the output directory for local preview.
    Serve {
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scrape {
            config,
            session,
            category,
            all,
        } => {
            let config = load_config(&config)?;
            config.session(&session)?;
            let categories = selected_categories(category, all);
            let client = IgovClientBuilder::default().build()?;
            let store = DataStore::new(&config.site.data_dir);
            let summary = scrape::run(&config, &client, &store, &session, &categories).await?;
            finish(summary)
        }
        Command::Build {
            config,
            session,
            category,
            all,
        } => {
            let config = load_config(&config)?;
            let store = DataStore::new(&config.site.data_dir);
            let summary = SiteBuilder::new(&config, &store)
                .build(&session, &selected_categories(category, all))?;
            finish(summary)
        }
        Command::Serve { config, port } => {
            let config = load_config(&config)?;
            anyhow::ensure!(
                config.site.output_dir.is_dir(),
                "output directory {} does not exist, run build first",
                config.site.output_dir.display()
            );
            serve::serve(&config.site.output_dir, port).await?;
            Ok(())
        }
    }
}

fn selected_categories(category: Option<Category>, all: bool) -> BTreeSet<Category> {
    match (all, category) {
        (false, Some(category)) => BTreeSet::from([category]),
        _ => Category::iter().collect(),
    }
}

fn finish(summary: RunSummary) -> Result<()> {
    print!("{summary}");
    anyhow::ensure!(
        !summary.has_failures(),
        "completed with {} failure(s)",
        summary.failure_count()
    );
    Ok(())
}
