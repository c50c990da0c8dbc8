use anyhow::Result;
use clap::Parser;
use embedcache::db::Db;
use embedcache::embeddings::{EmbeddingService, OpenAIClient};
use embedcache::Config;

#[derive(Parser, Debug)]
#[command(name = "embed")]
#[command(about = "Embed texts through the cache (table-backed by default)")]
struct Args {
    /// Texts to embed
    #[arg(required = true)]
    texts: Vec<String>,

    /// Use the file-backed cache instead of the embeddings table
    #[arg(long)]
    file_cache: bool,

    /// Override the configured embedding model
    #[arg(short, long)]
    model: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    // Validate OpenAI API key is set
    let api_key = std::env::var(&config.embeddings.api_key_env).map_err(|_| {
        anyhow::anyhow!(
            "Environment variable {} not set. Set it in your .env file or as an environment variable.",
            config.embeddings.api_key_env
        )
    })?;

    let model = args
        .model
        .unwrap_or_else(|| config.embeddings.model.clone());

    let service = EmbeddingService::new(
        Box::new(OpenAIClient::new(api_key)),
        config.file_cache_path(),
    );

    let embeddings = if args.file_cache {
        log::info!(
            "Embedding {} texts with model {} via the file cache",
            args.texts.len(),
            model
        );
        service.embed_with_file_cache(&args.texts, &model)?
    } else {
        log::info!(
            "Embedding {} texts with model {} via the table cache",
            args.texts.len(),
            model
        );
        let db = Db::open(config.db_path())?;
        service.embed_with_table_cache(&db, &args.texts, &model)?
    };

    for (text, embedding) in args.texts.iter().zip(embeddings.iter()) {
        println!("{}: {} dimensions", text, embedding.len());
    }

    log::info!("Embedded {} texts", embeddings.len());

    Ok(())
}
