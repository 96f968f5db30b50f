//! Serve the discussion UI.
//!
//! Reads `.env` when present, then `OPENAI_API_KEY`, `GROQ_API_KEY`, `SERPAPI_KEY`,
//! `ROUNDTABLE_SEARCH_BACKEND` and `ROUNDTABLE_ADDR` from the environment. Logging is
//! controlled with `RUST_LOG`.

use roundtable::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    roundtable::init_logger();
    if dotenv_loaded {
        log::debug!("loaded variables from .env");
    }

    let config = ServerConfig::from_env()?;
    roundtable::web::serve(config).await
}
