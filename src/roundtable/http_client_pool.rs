//! HTTP Client Pool for maintaining persistent connections per base URL.
//!
//! One `reqwest::Client` is kept per base URL so that the chat and search clients reuse
//! TCP connections and TLS sessions across the calls of a discussion. Clients are configured
//! with:
//! - `pool_idle_timeout`: idle connections live for 90 seconds
//! - `pool_max_idle_per_host`: up to 10 idle connections per host
//! - `tcp_keepalive`: keepalive packets every 60 seconds
//! - `timeout`: 300 seconds for a whole request

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

lazy_static! {
    static ref HTTP_CLIENT_POOL: Mutex<HashMap<String, reqwest::Client>> =
        Mutex::new(HashMap::new());
}

/// Get or create a shared HTTP client for the given base URL.
pub fn get_http_client(base_url: &str) -> reqwest::Client {
    let mut pool = HTTP_CLIENT_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(client) = pool.get(base_url) {
        return client.clone();
    }

    let client = match reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .timeout(Duration::from_secs(300))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            log::warn!(
                "http_client_pool::get_http_client({}): falling back to default client: {}",
                base_url,
                err
            );
            reqwest::Client::new()
        }
    };

    log::debug!("http_client_pool: created client for {}", base_url);
    pool.insert(base_url.to_string(), client.clone());
    client
}
