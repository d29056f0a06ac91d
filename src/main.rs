//! CLI entry point for flatblog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flatblog")]
#[command(version)]
#[command(about = "A markdown-file blog backend with flat JSON stores", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Create a new article
    New {
        /// Title of the new article
        title: String,

        /// Comma-separated categories
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List site information
    List {
        /// Type of content to list (articles, categories, tags)
        #[arg(default_value = "articles")]
        r#type: String,
    },

    /// Search article titles
    Search {
        query: String,
    },

    /// Show like or read counts
    Stats {
        /// Counter to show (likes, reads)
        #[arg(default_value = "reads")]
        kind: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "flatblog=debug,tower_http=debug,info"
    } else {
        "flatblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let blog = flatblog::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            flatblog::server::start(&blog, &ip, port).await?;
        }

        Commands::New {
            title,
            categories,
            tags,
        } => {
            let blog = flatblog::Blog::new(&base_dir)?;
            tracing::info!("Creating new article with title: {}", title);
            flatblog::commands::new::run(&blog, &title, &categories, &tags)?;
        }

        Commands::List { r#type } => {
            let blog = flatblog::Blog::new(&base_dir)?;
            flatblog::commands::list::run(&blog, &r#type)?;
        }

        Commands::Search { query } => {
            let blog = flatblog::Blog::new(&base_dir)?;
            flatblog::commands::list::search(&blog, &query)?;
        }

        Commands::Stats { kind } => {
            let blog = flatblog::Blog::new(&base_dir)?;
            flatblog::commands::stats::run(&blog, &kind).await?;
        }

        Commands::Version => {
            println!("flatblog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
