//! Nani's Kitchen - a recipe conversation service
//!
//! A Rust backend running a small conversation state machine: the user
//! lists ingredients, Nani asks a couple of clarifying questions, then
//! answers with a short recipe and a picture of the dish.

mod api;
mod config;
mod generation;
mod llm;
mod recipe_title;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::Config;
use generation::{GenerationClient, KitchenGenerator};
use llm::ModelRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nani_kitchen=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env();

    // Initialize generation backend
    let llm_registry = Arc::new(ModelRegistry::new(&config.llm));
    if llm_registry.has_models() {
        tracing::info!(
            chat_model = llm_registry.chat_model_id().unwrap_or_default(),
            image_model = %config.llm.image_model,
            image_size = %config.recipe.image_size,
            "Generation backend initialized"
        );
    } else {
        tracing::warn!("No API key configured. Set OPENAI_API_KEY; turns will get apologies.");
    }

    let generator: Arc<dyn GenerationClient> =
        Arc::new(KitchenGenerator::new(llm_registry, config.recipe));

    // Create application state
    let state = AppState::new(generator);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Nani's Kitchen listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
