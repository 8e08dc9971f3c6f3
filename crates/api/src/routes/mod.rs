pub mod articles;
pub mod ontologies;
pub mod query;
pub mod story;

use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::metrics::MetricsSnapshot;
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/articles", post(articles::create).get(articles::list))
        .route("/articles/query", post(query::ask))
        .route(
            "/articles/:id",
            get(articles::get_one).patch(articles::reextract),
        )
        .route("/articles/:id/graph", get(articles::graph))
        .route("/articles/:id/story", get(story::generate))
        .route("/articles/:id/story/audio", post(story::audio))
        .route("/articles/:id/examples", get(query::examples))
        .route("/ontologies", post(ontologies::create).get(ontologies::list))
        .route(
            "/ontologies/:id",
            get(ontologies::get_one)
                .patch(ontologies::update)
                .delete(ontologies::remove),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    neo4j: String,
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let neo4j = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };
    let status = if neo4j == "ok" { "ok" } else { "degraded" };
    Json(HealthResponse { status, neo4j })
}

async fn metrics(State(state): State<SharedState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
