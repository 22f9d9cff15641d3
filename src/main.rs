use std::path::PathBuf;

use actix_web::web;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use restaurant_recommender::server::{self, AppState};
use restaurant_recommender::{Config, Recommender, SearchOptions, Snapshot};

#[derive(Parser)]
#[command(name = "restaurant-recommender", version, about = "Restaurant recommendations from free-text queries")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Scraped restaurants (JSON array)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Snapshot cache location
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Minimum similarity for the similarity retrieval pass
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Enrich the source corpus and write the snapshot cache
    Enrich,
    /// Run one query and print the ranked restaurants
    Search {
        query: String,
        #[arg(long, short = 'n')]
        top_n: Option<usize>,
        #[arg(long)]
        min_rating: Option<f64>,
    },
    /// List categories by restaurant count
    Categories,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(source) = &self.source {
            config.data.source = source.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.data.snapshot = snapshot.clone();
        }
        if let Some(threshold) = self.threshold {
            config.search.similarity_threshold = threshold;
        }
        if let Command::Serve { bind: Some(bind) } = &self.command {
            config.server.bind = bind.clone();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command {
        Command::Serve { .. } => {
            let recommender = Recommender::from_config(&config).context("loading corpus")?;
            let state = web::Data::new(AppState::new(recommender, config));
            server::run(state).await.context("HTTP server failed")?;
        }
        Command::Enrich => {
            let snapshot = Snapshot::from_source(&config).context("enriching corpus")?;
            snapshot
                .save(&config.data.snapshot)
                .with_context(|| format!("writing {}", config.data.snapshot.display()))?;
            info!(
                "Snapshot with {} restaurants written to {}",
                snapshot.corpus().len(),
                config.data.snapshot.display()
            );
        }
        Command::Search {
            query,
            top_n,
            min_rating,
        } => {
            let recommender = Recommender::from_config(&config).context("loading corpus")?;
            let options = SearchOptions {
                top_n: top_n.unwrap_or(config.search.default_top_n),
                min_rating,
            };
            let results = recommender.search_with(&query, &options)?;
            if results.is_empty() {
                println!("No restaurants found for '{}'", query);
            }
            for (rank, result) in results.iter().enumerate() {
                let rating = result
                    .rating
                    .map(|r| format!("{:.1}", r))
                    .unwrap_or_else(|| "-".to_string());
                let categories: Vec<&str> = result.category_set.iter().map(String::as_str).collect();
                println!(
                    "{}. {} | Score: {:.4} | Rating: {} | Reviews: {} | {}",
                    rank + 1,
                    result.name,
                    result.score,
                    rating,
                    result.review_count,
                    categories.join(", ")
                );
            }
        }
        Command::Categories => {
            let recommender = Recommender::from_config(&config).context("loading corpus")?;
            for entry in recommender.list_categories() {
                println!("{:<20} {}", entry.category, entry.count);
            }
        }
    }

    Ok(())
}
