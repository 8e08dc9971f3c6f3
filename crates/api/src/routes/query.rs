use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use narrate::QueryAnswer;

use crate::cache::AnswerCache;
use crate::error::{ApiError, ApiResult};
use crate::metrics::TimedOperation;
use crate::state::{AppState, SharedState};

const MAX_SUGGESTED_QUESTIONS: usize = 4;

#[derive(Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "articleId")]
    pub article_id: String,
    pub question: String,
}

#[derive(Serialize)]
pub struct ExamplesResponse {
    pub questions: Vec<String>,
}

pub async fn ask(
    State(state): State<SharedState>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<QueryAnswer>> {
    let result = ask_inner(&state, req).await;
    state.metrics.record_request(result.is_ok());
    result
}

async fn ask_inner(state: &AppState, req: QueryRequest) -> ApiResult<Json<QueryAnswer>> {
    if req.question.trim().is_empty() {
        return Err(ApiError::Validation("question is required".to_string()));
    }

    let rows = state.store.fetch_graph(&req.article_id).await?;

    // The cache key covers the graph context, so answers cached before a
    // re-extraction are never replayed against the new graph.
    let context = narrate::build_graph_context(&rows);
    let cache_key = AnswerCache::key(&[&req.article_id, &context, &req.question]);
    if let Some(cached) = state.cache.get(&cache_key) {
        if let Ok(answer) = serde_json::from_str::<QueryAnswer>(&cached) {
            debug!(article_id = %req.article_id, "Answer served from cache");
            return Ok(Json(answer));
        }
    }

    let timer = TimedOperation::start();
    let answer = narrate::answer_question(&state.narrator, &rows, &req.question).await?;
    state.metrics.record_query(timer.elapsed());

    state.cache.set(cache_key, serde_json::to_string(&answer)?);
    Ok(Json(answer))
}

/// Suggested questions for an article, derived from which entity types its
/// graph actually contains.
pub async fn examples(
    State(state): State<SharedState>,
    Path(article_id): Path<String>,
) -> ApiResult<Json<ExamplesResponse>> {
    // 404 for unknown articles before inspecting entity types
    state.store.get_article(&article_id).await?;
    let overview = state.store.entity_type_overview(&article_id).await?;

    Ok(Json(ExamplesResponse {
        questions: suggest_questions(&overview.entity_types, &overview.sample_names),
    }))
}

fn suggest_questions(entity_types: &[String], sample_names: &[String]) -> Vec<String> {
    let mut questions = Vec::new();
    let has = |t: &str| entity_types.iter().any(|e| e == t);

    if has("Person") {
        questions.push("Who are the key people involved?".to_string());
    }
    if has("Organization") {
        questions.push("What organizations are mentioned?".to_string());
    }
    if has("Location") {
        questions.push("Which locations play a role?".to_string());
    }
    if sample_names.len() >= 2 {
        questions.push(format!(
            "How are {} and {} connected?",
            sample_names[0], sample_names[1]
        ));
    }
    questions.push("What are the main findings?".to_string());
    questions.push("Summarize the key relationships.".to_string());

    questions.truncate(MAX_SUGGESTED_QUESTIONS);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_follow_the_available_entity_types() {
        let questions = suggest_questions(
            &["Person".to_string(), "Location".to_string()],
            &["Alice".to_string(), "Paris".to_string()],
        );
        assert_eq!(questions.len(), MAX_SUGGESTED_QUESTIONS);
        assert_eq!(questions[0], "Who are the key people involved?");
        assert_eq!(questions[1], "Which locations play a role?");
        assert_eq!(questions[2], "How are Alice and Paris connected?");
    }

    #[test]
    fn empty_graph_still_gets_general_questions() {
        let questions = suggest_questions(&[], &[]);
        assert_eq!(
            questions,
            vec![
                "What are the main findings?".to_string(),
                "Summarize the key relationships.".to_string(),
            ]
        );
    }

    #[test]
    fn never_more_than_four_suggestions() {
        let types = vec![
            "Person".to_string(),
            "Organization".to_string(),
            "Location".to_string(),
        ];
        let names = vec!["A".to_string(), "B".to_string()];
        assert_eq!(suggest_questions(&types, &names).len(), 4);
    }
}
