use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use extract::TypeConstraint;
use graphstore::{ArticleRecord, ArticleSummary, NewArticle};
use insight::GraphData;
use ontology::ArticleType;

use crate::error::{ApiError, ApiResult};
use crate::metrics::TimedOperation;
use crate::state::{AppState, SharedState};

#[derive(Deserialize)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(rename = "articleType")]
    pub article_type: Option<String>,
    #[serde(rename = "ontologyId")]
    pub ontology_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: String,
}

#[derive(Serialize)]
pub struct CreateArticleResponse {
    #[serde(rename = "articleId")]
    pub article_id: String,
    #[serde(rename = "entitiesCount")]
    pub entities_count: usize,
    #[serde(rename = "relationshipsCount")]
    pub relationships_count: usize,
}

#[derive(Serialize)]
pub struct ArticleResponse {
    pub article: ArticleRecord,
    pub graph: GraphData,
}

fn default_mode() -> String {
    "easy".to_string()
}

/// `mode` is a closed set; anything else is a client error, never a silent
/// fallback to easy mode.
fn validate_mode(mode: &str) -> Result<(), ApiError> {
    match mode {
        "easy" | "advanced" => Ok(()),
        other => Err(ApiError::Validation(format!(
            "mode must be 'easy' or 'advanced', got '{}'",
            other
        ))),
    }
}

/// The resolved extraction inputs for one request.
struct ResolvedConstraint {
    constraint: TypeConstraint,
    article_type: String,
    ontology_id: Option<String>,
}

/// Easy mode resolves a built-in article-type category; advanced mode
/// requires an existing user ontology.
async fn resolve_constraint(
    state: &AppState,
    mode: &str,
    article_type: Option<&str>,
    ontology_id: Option<&str>,
) -> ApiResult<ResolvedConstraint> {
    validate_mode(mode)?;

    if mode == "advanced" {
        let ontology_id = ontology_id.ok_or_else(|| {
            ApiError::Validation("ontologyId is required in advanced mode".to_string())
        })?;
        let ontology = state.ontologies.get(ontology_id).await?;
        return Ok(ResolvedConstraint {
            constraint: TypeConstraint::for_ontology(&ontology),
            article_type: article_type.unwrap_or("general").to_string(),
            ontology_id: Some(ontology_id.to_string()),
        });
    }

    let parsed = ArticleType::parse(article_type.unwrap_or("general"));
    Ok(ResolvedConstraint {
        constraint: TypeConstraint::for_article_type(parsed),
        article_type: parsed.as_str().to_string(),
        ontology_id: None,
    })
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateArticleRequest>,
) -> ApiResult<Json<CreateArticleResponse>> {
    let result = create_inner(&state, req).await;
    state.metrics.record_request(result.is_ok());
    result
}

async fn create_inner(
    state: &AppState,
    req: CreateArticleRequest,
) -> ApiResult<Json<CreateArticleResponse>> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation(
            "article content is required".to_string(),
        ));
    }
    let title = if req.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        req.title.clone()
    };

    let resolved = resolve_constraint(
        state,
        &req.mode,
        req.article_type.as_deref(),
        req.ontology_id.as_deref(),
    )
    .await?;

    // One model call per request; a failed extraction fails the request.
    let timer = TimedOperation::start();
    let data = state
        .extractor
        .extract(&req.content, &title, &resolved.constraint)
        .await?;
    state.metrics.record_extract(timer.elapsed(), data.entities.len());

    let article_id = format!("article-{}", Uuid::new_v4());
    let article = NewArticle {
        id: article_id.clone(),
        title,
        content: req.content,
        summary: data.summary.clone(),
        article_type: resolved.article_type,
        mode: req.mode,
    };

    state
        .store
        .create_article_graph(
            &article,
            &data.entities,
            &data.relationships,
            resolved.ontology_id.as_deref(),
        )
        .await?;

    info!(
        article_id = %article_id,
        entities = data.entities.len(),
        relationships = data.relationships.len(),
        "Article created"
    );
    Ok(Json(CreateArticleResponse {
        article_id,
        entities_count: data.entities.len(),
        relationships_count: data.relationships.len(),
    }))
}

/// Re-extraction: the new extraction is fully validated before the old
/// entities are touched, so a model failure leaves the prior graph intact.
pub async fn reextract(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    let result = reextract_inner(&state, &article_id, req).await;
    state.metrics.record_request(result.is_ok());
    result
}

async fn reextract_inner(
    state: &AppState,
    article_id: &str,
    req: UpdateArticleRequest,
) -> ApiResult<Json<ArticleResponse>> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation(
            "article content is required".to_string(),
        ));
    }

    let existing = state.store.get_article(article_id).await?;
    let title = req.title.unwrap_or(existing.title);

    let resolved = resolve_constraint(
        state,
        &existing.mode,
        Some(&existing.article_type),
        existing.ontology_id.as_deref(),
    )
    .await?;

    let timer = TimedOperation::start();
    let data = state
        .extractor
        .extract(&req.content, &title, &resolved.constraint)
        .await?;
    state.metrics.record_extract(timer.elapsed(), data.entities.len());

    state
        .store
        .replace_article_graph(
            article_id,
            &title,
            &req.content,
            &data.summary,
            &data.entities,
            &data.relationships,
        )
        .await?;

    let rows = state.store.fetch_graph(article_id).await?;
    let graph = insight::assemble(&rows);

    info!(article_id = %article_id, nodes = graph.nodes.len(), "Article re-extracted");
    Ok(Json(ArticleResponse {
        article: rows.article,
        graph,
    }))
}

pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<ArticleSummary>>> {
    Ok(Json(state.store.list_articles().await?))
}

pub async fn get_one(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
) -> ApiResult<Json<ArticleRecord>> {
    Ok(Json(state.store.get_article(&article_id).await?))
}

pub async fn graph(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
) -> ApiResult<Json<GraphData>> {
    let rows = state.store.fetch_graph(&article_id).await?;
    Ok(Json(insight::assemble(&rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_two_known_modes() {
        assert!(validate_mode("easy").is_ok());
        assert!(validate_mode("advanced").is_ok());
    }

    #[test]
    fn rejects_unknown_modes() {
        for mode in ["advancd", "EASY", "auto", ""] {
            assert!(matches!(
                validate_mode(mode),
                Err(ApiError::Validation(_))
            ));
        }
    }

    #[test]
    fn create_response_uses_count_field_names() {
        let response = CreateArticleResponse {
            article_id: "article-1".to_string(),
            entities_count: 3,
            relationships_count: 2,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["articleId"], "article-1");
        assert_eq!(json["entitiesCount"], 3);
        assert_eq!(json["relationshipsCount"], 2);
    }
}
