//! papermap CLI entry point.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use papermap::{
    load_corpus, Analysis, EmbeddingKeywordExtractor, EmbeddingProvider, LexicalEmbedder, Pipeline,
    PipelineConfig,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Embedder {
    /// Feature-hashing embeddings, no model download.
    Lexical,
    /// all-MiniLM-L6-v2 via fastembed (needs the `fastembed` feature).
    Fastembed,
}

/// Cluster paper abstracts, summarize clusters, and recommend similar authors.
#[derive(Debug, Parser)]
#[command(name = "papermap", version, about)]
struct Cli {
    /// JSON corpus (array of papers with `abstractText` and `referenceAuthors`).
    corpus: PathBuf,

    /// JSON pipeline configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of clusters (overrides config).
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// K-means seed (overrides config).
    #[arg(long)]
    seed: Option<u64>,

    /// Embedding model.
    #[arg(long, value_enum, default_value_t = Embedder::Lexical)]
    embedder: Embedder,

    /// Dimension for the lexical embedder.
    #[arg(long, default_value_t = 384)]
    dim: usize,

    /// Model cache directory for fastembed.
    #[arg(long, env = "PAPERMAP_MODEL_CACHE")]
    #[cfg_attr(not(feature = "fastembed"), allow(dead_code))]
    model_cache: Option<PathBuf>,

    /// Keywords returned per cluster.
    #[arg(long, default_value_t = 5)]
    top_keywords: usize,

    /// Emit the report as JSON.
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(k) = cli.clusters {
        config.n_clusters = k;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn build_embedder(cli: &Cli) -> Result<Box<dyn EmbeddingProvider>> {
    match cli.embedder {
        Embedder::Lexical => Ok(Box::new(LexicalEmbedder::new().with_dim(cli.dim))),
        #[cfg(feature = "fastembed")]
        Embedder::Fastembed => {
            let provider = papermap::FastEmbedProvider::new(None, cli.model_cache.clone())
                .map_err(|e| anyhow::anyhow!("failed to load embedding model: {e}"))?;
            Ok(Box::new(provider))
        }
        #[cfg(not(feature = "fastembed"))]
        Embedder::Fastembed => {
            anyhow::bail!("papermap was built without the `fastembed` feature")
        }
    }
}

fn print_text(analysis: &Analysis) {
    for summary in &analysis.summaries {
        println!(
            "Cluster {} ({} papers) Keywords: {}",
            summary.cluster_id + 1,
            summary.paper_count,
            summary.keywords.join(", ")
        );
    }
    println!();
    for rec in &analysis.recommendations {
        println!("Author: {}", rec.author);
        println!("Recommended: {}", rec.ranked_peers.join(", "));
        println!();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let corpus = load_corpus(&cli.corpus)
        .with_context(|| format!("failed to load {}", cli.corpus.display()))?;

    let embedder = build_embedder(&cli)?;
    let extractor = EmbeddingKeywordExtractor::new(embedder.as_ref()).with_top_n(cli.top_keywords);
    let pipeline = Pipeline::new(embedder.as_ref(), extractor).with_config(config);

    let analysis = pipeline.run(corpus).context("analysis failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis.report())?);
    } else {
        print_text(&analysis);
    }
    Ok(())
}
