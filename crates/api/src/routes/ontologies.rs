use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use ontology::{Ontology, OntologyDraft};

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

pub async fn create(
    State(state): State<SharedState>,
    Json(draft): Json<OntologyDraft>,
) -> ApiResult<Json<Ontology>> {
    let ontology_id = state.ontologies.create(&draft).await?;
    Ok(Json(state.ontologies.get(&ontology_id).await?))
}

pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Ontology>>> {
    Ok(Json(state.ontologies.list().await?))
}

pub async fn get_one(
    State(state): State<SharedState>,
    Path(ontology_id): Path<String>,
) -> ApiResult<Json<Ontology>> {
    Ok(Json(state.ontologies.get(&ontology_id).await?))
}

/// Full replace of the ontology and all its definitions.
pub async fn update(
    State(state): State<SharedState>,
    Path(ontology_id): Path<String>,
    Json(draft): Json<OntologyDraft>,
) -> ApiResult<Json<Ontology>> {
    state.ontologies.update(&ontology_id, &draft).await?;
    Ok(Json(state.ontologies.get(&ontology_id).await?))
}

pub async fn remove(
    State(state): State<SharedState>,
    Path(ontology_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    // 404 for unknown ids instead of a silent no-op delete
    state.ontologies.get(&ontology_id).await?;
    state.ontologies.delete(&ontology_id).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}
