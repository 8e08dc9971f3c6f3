mod cache;
mod config;
mod error;
mod metrics;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use extract::{Extractor, OpenAiClient};
use graphstore::GraphStore;
use narrate::NarrationClient;
use ontology::OntologyRegistry;

use crate::cache::AnswerCache;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().json().init();

    let config = AppConfig::from_env()?;

    let graph = neo4rs::Graph::new(
        config.neo4j.uri.as_str(),
        config.neo4j.user.as_str(),
        config.neo4j.password.as_str(),
    )
    .await
    .context("failed to connect to Neo4j")?;

    let store = GraphStore::new(graph.clone());
    store
        .init_schema()
        .await
        .context("failed to initialize graph schema")?;

    let ontologies = OntologyRegistry::new(graph);

    let extraction_client = OpenAiClient::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.extraction_model.clone(),
        config.llm.timeout,
    )?;
    let extractor = Extractor::new(extraction_client);

    let narrator = NarrationClient::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.chat_model.clone(),
        config.llm.tts_model.clone(),
        config.llm.tts_voice.clone(),
        config.llm.timeout,
    )?;

    let state = Arc::new(AppState {
        store,
        ontologies,
        extractor,
        narrator,
        cache: AnswerCache::new(config.cache_max_entries),
        metrics: Metrics::new(),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
