//! `arag` command line front end.
//!
//! ```bash
//! # Ingest URLs and PDFs (no sources loads the default seed posts)
//! arag ingest --url https://lilianweng.github.io/posts/2023-06-23-agent/ --pdf notes.pdf
//!
//! # Ask a question; routed to the local index or to web search
//! arag ask "What are the components of an LLM agent?"
//!
//! # Show how a file would be chunked, without touching the index
//! arag split notes.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arag_ai::answer::Answerer;
use arag_ai::embeddings::OllamaEmbedder;
use arag_ai::evidence::EvidenceStore;
use arag_ai::index::{SqliteIndex, VectorIndex};
use arag_ai::llm::{GroqLlm, Llm, OllamaLlm};
use arag_ai::ollama::OllamaClient;
use arag_ai::pipeline::Pipeline;
use arag_ai::router::Router;
use arag_ai::websearch::{TavilyClient, WebEvidenceProvider};
use arag_core::chunking::{fingerprint, RecursiveSplitter, SplitterConfig};
use arag_core::config::{LlmProvider, Settings};
use arag_core::error::AppError;
use arag_core::ingest::{load_sources, HttpFetcher, SourceSpec};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arag")]
#[command(about = "Agentic retrieval-augmented question answering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, split and store documents; already stored chunks are skipped
    Ingest {
        /// Web page to ingest (repeatable)
        #[arg(long = "url")]
        urls: Vec<String>,

        /// PDF file to ingest (repeatable)
        #[arg(long = "pdf")]
        pdfs: Vec<PathBuf>,

        /// Also ingest the default seed posts
        #[arg(long)]
        defaults: bool,

        /// Maximum chunk length in characters
        #[arg(long, default_value_t = arag_core::chunking::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Characters shared by consecutive chunks
        #[arg(long, default_value_t = arag_core::chunking::DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from stored evidence or live web search
    Ask {
        question: String,

        /// Print answer, route and evidence as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chunk a text file and print the chunks
    Split {
        input: PathBuf,

        #[arg(long, default_value_t = arag_core::chunking::DEFAULT_CHUNK_SIZE)]
        size: usize,

        #[arg(long, default_value_t = arag_core::chunking::DEFAULT_CHUNK_OVERLAP)]
        overlap: usize,
    },

    /// Check configuration, the local Ollama server and the index
    Health,
}

/// Long-lived clients; the pipeline borrows from these.
struct Services {
    settings: Settings,
    fetcher: HttpFetcher,
    ollama: OllamaClient,
    embedder: OllamaEmbedder,
    llm: Box<dyn Llm>,
    search: TavilyClient,
    index: SqliteIndex,
}

impl Services {
    fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let ollama = OllamaClient::new(&settings.ollama_base_url)?;
        let llm: Box<dyn Llm> = match settings.llm_provider {
            LlmProvider::Groq => {
                let key = settings.groq_api_key.as_deref().ok_or_else(|| {
                    AppError::new("CONFIG_MISSING", "Required configuration value is not set")
                        .with_details("key=GROQ_API_KEY")
                })?;
                Box::new(GroqLlm::new(key)?)
            }
            LlmProvider::Ollama => Box::new(OllamaLlm::new(ollama.clone())),
        };
        Ok(Self {
            fetcher: HttpFetcher::new(&settings.user_agent),
            embedder: OllamaEmbedder::new(ollama.clone()),
            search: TavilyClient::new(&settings.tavily_api_key)?,
            index: SqliteIndex::open(&settings.index_path)?,
            ollama,
            llm,
            settings,
        })
    }

    fn pipeline(&self) -> Pipeline<'_> {
        let s = &self.settings;
        Pipeline::new(
            Router::new(self.llm.as_ref(), s.router_model.as_str()),
            EvidenceStore::new(&self.index, &self.embedder, s.embed_model.as_str()),
            WebEvidenceProvider::new(&self.search),
            Answerer::new(self.llm.as_ref(), s.answer_model.as_str()),
        )
        .with_retrieve_k(s.retrieve_k)
    }
}

fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.code, retryable = e.retryable, "{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Split {
            input,
            size,
            overlap,
        } => split_file(&input, size, overlap),
        Commands::Health => health(),
        Commands::Ingest {
            urls,
            pdfs,
            defaults,
            chunk_size,
            chunk_overlap,
            json,
        } => {
            let splitter = build_splitter(chunk_size, chunk_overlap)?;
            let services = Services::from_settings(Settings::from_env()?)?;
            let mut specs: Vec<SourceSpec> = urls.into_iter().map(SourceSpec::Url).collect();
            specs.extend(pdfs.into_iter().map(SourceSpec::Pdf));
            if defaults {
                specs.push(SourceSpec::Defaults);
            }

            let documents = load_sources(&services.fetcher, &specs)?;
            let summary = services
                .pipeline()
                .with_splitter(splitter)
                .ingest(&documents)?;
            if json {
                println!("{}", to_json(&summary)?);
            } else {
                println!(
                    "documents: {}\nchunks: {}\ninserted: {}\nskipped (already stored): {}",
                    summary.documents, summary.chunks, summary.inserted, summary.skipped_existing
                );
            }
            Ok(())
        }
        Commands::Ask { question, json } => {
            let services = Services::from_settings(Settings::from_env()?)?;
            let resp = services.pipeline().ask(&question)?;
            if json {
                println!("{}", to_json(&resp)?);
            } else {
                println!("{}\n", resp.answer);
                println!("route: {}", resp.route);
                for (i, doc) in resp.evidence.iter().enumerate() {
                    println!("[{}] {} ({})", i + 1, doc.origin, doc.source.as_str());
                }
            }
            Ok(())
        }
    }
}

fn split_file(input: &Path, size: usize, overlap: usize) -> Result<(), AppError> {
    let text = fs::read_to_string(input).map_err(|e| {
        AppError::new("INGEST_READ_FAILED", "Failed to read input file")
            .with_details(format!("path={}; err={}", input.display(), e))
    })?;
    let splitter = build_splitter(size, overlap)?;
    let config = splitter.config();

    let chunks = splitter.split_text(&text);
    println!(
        "{} chunks (size {}, overlap {})",
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );
    for (i, chunk) in chunks.iter().enumerate() {
        let fp = fingerprint(chunk);
        println!(
            "\n--- chunk {i} ({} chars, {}) ---\n{chunk}",
            chunk.chars().count(),
            &fp[..12]
        );
    }
    Ok(())
}

fn build_splitter(chunk_size: usize, chunk_overlap: usize) -> Result<RecursiveSplitter, AppError> {
    RecursiveSplitter::new(SplitterConfig {
        chunk_size,
        chunk_overlap,
        ..SplitterConfig::default()
    })
}

fn health() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "loaded settings");
    println!("config: ok (provider={:?})", settings.llm_provider);

    let services = Services::from_settings(settings)?;
    services.ollama.health_check()?;
    println!("ollama: ok ({})", services.ollama.base_url());
    println!(
        "index: ok ({} records at {})",
        services.index.len()?,
        services.settings.index_path.display()
    );
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("OUTPUT_ENCODE_FAILED", "Failed to encode output")
            .with_details(e.to_string())
    })
}
