use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use semsearch_common::{logger, AppConfig};
use semsearch_embed::OllamaEmbedder;
use semsearch_vector::{Corpus, SearchEngine, SearchResult};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            return None;
        }
    }
}

/// Load .env file from project root, falling back to the working directory
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "semsearch")]
#[command(about = "Semantic similarity search over JSONL records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// JSONL corpus file
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Record key holding the text to embed
    #[arg(long)]
    text_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more queries and print the ranked records
    Query {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Number of results per query
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Query strings
        #[arg(required = true)]
        queries: Vec<String>,
    },

    /// Read queries from stdin until EOF or an empty line
    Interactive {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Number of results per query
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start the HTTP server
    Serve {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Load config from the environment and apply CLI overrides
fn load_config(corpus: CorpusArgs) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = corpus.corpus {
        config.corpus_path = path;
    }
    if let Some(key) = corpus.text_key {
        config.text_key = key;
    }
    config.validate()?;
    Ok(config)
}

/// Load the corpus and embed it
async fn build_engine(config: &AppConfig) -> Result<Arc<SearchEngine>> {
    let corpus = Corpus::load(&config.corpus_path, &config.text_key)?;
    let embedder = OllamaEmbedder::new(
        &config.ollama_base_url,
        &config.embedding_model,
        config.embed_batch_size,
    )?;

    if !embedder.test_connection().await.unwrap_or(false) {
        tracing::warn!("Ollama at {} is not responding", config.ollama_base_url);
    }

    let engine = SearchEngine::build(corpus, Arc::new(embedder)).await?;
    Ok(Arc::new(engine))
}

fn print_results(query: &str, results: &[SearchResult], json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(results)?)?;
        return Ok(());
    }

    writeln!(out, "Query: {}", query)?;
    for r in results {
        writeln!(out, "{:>3}. [{:.4}] {} (id={})", r.rank, r.score, r.text, r.id)?;
    }
    Ok(())
}

async fn run_interactive(engine: &SearchEngine, top_k: usize) -> Result<()> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("query> ");
        std::io::stderr().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        match engine.search(query, top_k).await {
            Ok(results) => print_results(query, &results, false)?,
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    match cli.command {
        Commands::Query { corpus, top_k, json, queries } => {
            let config = load_config(corpus)?;
            logger::setup_console_logging(&config.log_level)?;

            let engine = build_engine(&config).await?;
            let top_k = top_k.unwrap_or(config.default_top_k);

            for query in &queries {
                let results = engine.search(query, top_k).await?;
                print_results(query, &results, json)?;
            }
        }
        Commands::Interactive { corpus, top_k } => {
            let config = load_config(corpus)?;
            logger::setup_console_logging(&config.log_level)?;

            let engine = build_engine(&config).await?;
            run_interactive(&engine, top_k.unwrap_or(config.default_top_k)).await?;
        }
        Commands::Serve { corpus, host, port } => {
            let mut config = load_config(corpus)?;
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            config.validate()?;

            logger::setup_logging(&config)?;

            tracing::info!("semsearch starting...");
            tracing::info!("  Corpus: {}", config.corpus_path.display());
            tracing::info!("  Model: {}", config.embedding_model);
            tracing::info!("  Bind: {}", config.server_bind_address());

            let engine = build_engine(&config).await?;

            println!("Server listening on http://{}", config.server_bind_address());
            semsearch_server::start_server(config, engine).await?;
        }
    }

    Ok(())
}
