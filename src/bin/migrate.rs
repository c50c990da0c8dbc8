use anyhow::Result;
use clap::Parser;
use embedcache::cache::table_cache;
use embedcache::db::Db;
use embedcache::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(about = "Copy the file-backed cache into the embeddings table, row by row")]
struct Args {
    /// Override the configured file-cache path
    #[arg(long)]
    from: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load()?;

    let db = Db::open(config.db_path())?;
    let path = args
        .from
        .unwrap_or_else(|| config.file_cache_path().to_path_buf());

    log::info!(
        "Migrating file cache {} into {}",
        path.display(),
        config.db_path().display()
    );

    // One-way copy: rows already in the table are not deduplicated against
    let written = table_cache::migrate_from_file_cache(&db, &path)?;

    log::info!("Migration complete: {} rows written", written);

    Ok(())
}
