use embedcache::db::Db;
use embedcache::embeddings::{EmbeddingService, OpenAIClient};
use embedcache::{search, Config};
use std::time::Instant;

/// Parse CLI args: optional --model <val>; first positional is the query.
fn parse_search_args() -> anyhow::Result<(String, Option<String>)> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut query = None;
    let mut model = None;
    let mut next_model = false;
    for arg in &args {
        if next_model {
            model = Some(arg.clone());
            next_model = false;
            continue;
        }
        if arg == "--model" {
            next_model = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        if query.is_none() {
            query = Some(arg.clone());
        }
    }
    let query = query.ok_or_else(|| {
        anyhow::anyhow!(
            "Usage: search <query> [--model <model>]\nExample: search \"rust error handling\""
        )
    })?;
    if query.trim().is_empty() {
        anyhow::bail!("Query cannot be empty");
    }
    Ok((query, model))
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Db::open(config.db_path())?;

    // Get API key from environment (loaded by config via dotenv)
    let api_key = std::env::var(&config.embeddings.api_key_env)?;

    let service = EmbeddingService::new(
        Box::new(OpenAIClient::new(api_key)),
        config.file_cache_path(),
    );

    let (query, model) = parse_search_args()?;
    let model = model.unwrap_or_else(|| config.embeddings.model.clone());

    // Measure search latency
    let start = Instant::now();

    let results = search::find_similar(&db, &service, &query, &model, config.search.top_k)?;

    let duration = start.elapsed();

    // Display results
    println!("\nQuery: \"{}\"\n", query);

    if results.is_empty() {
        println!("No similar texts found.");
    } else {
        for (rank, result) in results.iter().enumerate() {
            println!("─────────────────────────────────────────────────────────────────────────────");
            println!("Rank #{} (similarity: {:.4})", rank + 1, result.score);
            println!("{}", result.text);
        }
        println!("─────────────────────────────────────────────────────────────────────────────");
    }

    println!("\nResults: {}", results.len());
    println!("Model: {}", model);
    println!("Latency: {:?}", duration);

    Ok(())
}
