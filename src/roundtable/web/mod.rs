//! Browser UI served with axum (feature `web-ui`).
//!
//! - `GET /` renders the start page.
//! - `POST /discussion` takes the form, validates it and, when valid, runs the whole
//!   discussion before answering with one collapsible section per turn. Invalid input is
//!   answered with `400 Bad Request` and an inline message; no remote call is made.
//!
//! ```rust,no_run
//! use roundtable::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     roundtable::init_logger();
//!     roundtable::web::serve(ServerConfig::from_env()?).await
//! }
//! ```

pub mod render;

use std::error::Error;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::roundtable::clients::{HttpProviderFactory, ProviderFactory};
use crate::roundtable::config::{
    Credentials, DiscussionSettings, ServerConfig, DEFAULT_TURNS, MAX_TURNS, MIN_TURNS,
};
use crate::roundtable::discussion::run_discussion;
use crate::roundtable::event::{EventHandler, LoggingEventHandler};
use crate::roundtable::search::SearchBackend;

/// Shared state of the UI server.
pub struct AppState {
    pub default_credentials: Credentials,
    pub search_backend: SearchBackend,
    pub factory: Arc<dyn ProviderFactory>,
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl AppState {
    /// State backed by the real HTTP providers and a logging event handler.
    pub fn from_config(config: &ServerConfig) -> Self {
        AppState {
            default_credentials: config.default_credentials.clone(),
            search_backend: config.search_backend,
            factory: Arc::new(HttpProviderFactory),
            event_handler: Some(Arc::new(LoggingEventHandler)),
        }
    }
}

/// Fields posted by the start page.
#[derive(Debug, Default, Deserialize)]
pub struct DiscussionForm {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub suggested_topic: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub groq_api_key: String,
    #[serde(default)]
    pub serpapi_key: String,
    /// Kept as text so a malformed value is reported on the page instead of by the extractor.
    #[serde(default)]
    pub turns: String,
    #[serde(default)]
    pub search_backend: Option<String>,
}

impl DiscussionForm {
    /// Merge the form with the server defaults. A typed topic wins over a selected one.
    pub fn into_settings(self, state: &AppState) -> Result<DiscussionSettings, String> {
        let topic = if self.topic.trim().is_empty() {
            self.suggested_topic
        } else {
            self.topic
        };
        let search_backend = match self.search_backend.as_deref().map(str::trim) {
            None | Some("") => state.search_backend,
            Some(name) => name
                .parse::<SearchBackend>()
                .map_err(|name| format!("Unknown search backend '{}'.", name))?,
        };
        let turns = match self.turns.trim() {
            "" => DEFAULT_TURNS,
            text => text.parse::<usize>().map_err(|_| {
                format!(
                    "Number of turns must be a whole number between {} and {}, got '{}'.",
                    MIN_TURNS, MAX_TURNS, text
                )
            })?,
        };
        let credentials = Credentials::new(
            Some(self.openai_api_key),
            Some(self.groq_api_key),
            Some(self.serpapi_key),
        )
        .or_defaults(&state.default_credentials);

        Ok(DiscussionSettings {
            topic,
            turns,
            credentials,
            search_backend,
        })
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::render_index(
        &state.default_credentials,
        state.search_backend,
    ))
}

async fn start_discussion(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DiscussionForm>,
) -> Response {
    let settings = match form.into_settings(&state) {
        Ok(settings) => settings,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Html(render::render_error(&message))).into_response()
        }
    };

    match run_discussion(&settings, state.factory.as_ref(), state.event_handler.clone()).await {
        Ok(outcome) => Html(render::render_outcome(&outcome)).into_response(),
        Err(err) => {
            log::info!("web::start_discussion: rejected: {}", err);
            (
                StatusCode::BAD_REQUEST,
                Html(render::render_error(&err.to_string())),
            )
                .into_response()
        }
    }
}

/// Routes of the discussion UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/discussion", post(start_discussion))
        .with_state(Arc::new(state))
}

/// Bind `config.addr` and serve the UI until the process stops.
pub async fn serve(config: ServerConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(config.addr).await?;
    log::info!(
        "roundtable UI listening on http://{} (search backend: {})",
        listener.local_addr()?,
        config.search_backend
    );
    axum::serve(listener, router(AppState::from_config(&config))).await?;
    Ok(())
}
