/*
newsdigest - main.rs
`brief` (default) reads a JSON request on stdin and prints a JSON digest on stdout.
`analyze` runs the LLM credibility report for a topic and prints the balanced article.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Config;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdigest::analysis;
use newsdigest::ingestion::{GNewsClient, NewsSource};
use newsdigest::llm::remote::RemoteLlmProvider;
use newsdigest::pipeline::{self, DigestSetup};

#[derive(Parser, Debug)]
#[command(name = "newsdigest", about = "News search digests and credibility reports")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read {"query", "num_articles"} from stdin, write an extractive digest as JSON
    Brief,
    /// Score each article for fake news and bias with an LLM, then write a balanced article
    Analyze {
        /// Search topic
        #[arg(long, default_value = "global warming")]
        query: String,

        /// Number of articles to fetch
        #[arg(long, default_value_t = 5)]
        num_articles: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = load_config(args.config.as_deref()).await;

    match args.command.unwrap_or(Command::Brief) {
        // brief always answers on stdout, even when configuration is broken
        Command::Brief => brief(config.and_then(|c| DigestSetup::from_config(&c))).await,
        Command::Analyze { query, num_articles } => analyze(&config?, &query, num_articles).await,
    }
}

async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = match explicit {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            anyhow::bail!("Config file not found: {}", p.display());
        }
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = Config::load_with_defaults(
        Some(&default_path).filter(|p| p.exists()).map(|p| p.as_path()),
        override_path.as_deref(),
    )
    .await?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");
    Ok(config)
}

async fn brief(setup: Result<DigestSetup>) -> Result<()> {
    let mut input = String::new();
    let response = match tokio::io::stdin().read_to_string(&mut input).await {
        Ok(_) => pipeline::brief_response(&input, setup).await,
        Err(e) => pipeline::DigestResponse::failure(format!("Error: {}", e)),
    };

    let line = serde_json::to_string(&response).context("failed to encode response")?;
    println!("{}", line);
    Ok(())
}

async fn analyze(config: &Config, query: &str, num_articles: u32) -> Result<()> {
    let llm = config.llm.clone().unwrap_or_default();
    let adapter = llm.adapter.as_deref().unwrap_or("none");
    if adapter != "remote" {
        anyhow::bail!("analyze needs llm.adapter = \"remote\" (found \"{}\")", adapter);
    }
    let remote = llm
        .remote
        .as_ref()
        .context("llm.adapter is \"remote\" but [llm.remote] is missing")?;
    let provider = RemoteLlmProvider::from_config(remote)?;
    info!(model = provider.model(), "LLM provider initialized");

    let client = GNewsClient::from_config(&config.news.clone().unwrap_or_default())?;
    let articles = client.search(query, num_articles).await?;
    let report = analysis::run_analysis(&provider, &articles, Path::new(config.analysis_dir())).await?;
    info!(
        articles = report.analyses.len(),
        report = %report.report_path.display(),
        "analysis complete"
    );

    println!("{}", report.balanced_article);
    Ok(())
}
