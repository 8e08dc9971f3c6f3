use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use narrate::Chapter;

use crate::error::{ApiError, ApiResult};
use crate::metrics::TimedOperation;
use crate::state::{AppState, SharedState};

#[derive(Serialize)]
pub struct StoryResponse {
    pub chapters: Vec<Chapter>,
}

#[derive(Deserialize)]
pub struct AudioRequest {
    pub text: String,
}

pub async fn generate(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
) -> ApiResult<Json<StoryResponse>> {
    let result = generate_inner(&state, &article_id).await;
    state.metrics.record_request(result.is_ok());
    result
}

async fn generate_inner(state: &AppState, article_id: &str) -> ApiResult<Json<StoryResponse>> {
    let rows = state.store.fetch_graph(article_id).await?;
    if rows.entities.is_empty() {
        return Err(ApiError::Validation(
            "article has no extracted graph to narrate".to_string(),
        ));
    }

    let timer = TimedOperation::start();
    let chapters = narrate::generate_story(&state.narrator, &rows).await?;
    state.metrics.record_story(timer.elapsed());

    info!(article_id = %article_id, chapters = chapters.len(), "Story generated");
    Ok(Json(StoryResponse { chapters }))
}

/// Synthesize speech for one chapter narrative. Returns raw mp3 bytes.
pub async fn audio(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
    Json(req): Json<AudioRequest>,
) -> ApiResult<Response> {
    if req.text.trim().is_empty() {
        return Err(ApiError::Validation("text is required".to_string()));
    }
    // 404 before spending a TTS call on an unknown article
    state.store.get_article(&article_id).await?;

    let bytes = state.narrator.speech(&req.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response())
}
