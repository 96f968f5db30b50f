// src/roundtable/mod.rs

pub mod agent;
pub mod chat_provider;
pub mod clients;
pub mod config;
pub mod discussion;
pub mod event;
pub mod http_client_pool;
pub mod prompt;
pub mod search;
pub mod transcript;
#[cfg(feature = "web-ui")]
pub mod web;

pub use discussion::Discussion;
