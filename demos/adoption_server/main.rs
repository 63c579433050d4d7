//! Adoption catalogue HTTP server
//!
//! Run with:
//!
//! ```sh
//! cargo run --example adoption_server -- demos/adoption_server/pawprint.yaml
//! ```
//!
//! Then try:
//!
//! ```sh
//! curl -s -X POST localhost:3000/cats/search \
//!   -H 'content-type: application/json' \
//!   -d '{"statuses":["AVAILABLE"],"sortBy":"ageMonths","sortDir":"asc","limit":2}'
//! ```

use anyhow::Result;
use pawprint::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)?,
        None => AppConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let cats = config.load_seed()?;
    tracing::info!(count = cats.len(), "Seeded catalogue");

    ServerBuilder::new()
        .with_store(InMemoryCatStore::with_cats(cats))
        .with_config(config)
        .serve()
        .await
}
