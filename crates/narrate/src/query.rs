//! Ad hoc natural-language questions over one article's assembled graph.
//!
//! The model is asked to tag its answer with an explicit `[HIGHLIGHT: ...]`
//! id-list marker. When the marker is missing or useless, a deterministic
//! heuristic recovers highlight ids from the question and answer text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use graphstore::{ArticleGraphRows, EntityRow};

use crate::NarrateError;
use crate::llm::NarrationClient;

const MAX_HEURISTIC_HIGHLIGHTS: usize = 10;
const QUERY_TEMPERATURE: f32 = 0.3;

const QUERY_SYSTEM_PROMPT: &str = r#"You are a helpful assistant that answers questions about a knowledge graph.

When answering:
1. Be concise and specific.
2. Reference actual entities and relationships from the graph.
3. IMPORTANT: If the answer involves specific entities, you MUST list ALL their EXACT IDs (from the "ID | Name" format) in your response as [HIGHLIGHT: id1, id2, id3].
   - If asked "Who are the key people?", include ALL person IDs.
   - Example: when mentioning "Huawei" (ID: huawei) and "China" (ID: china), include [HIGHLIGHT: huawei, china].
4. If the question cannot be answered from the graph, say so clearly.
5. Use the same language as the question."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    #[serde(rename = "highlightNodes")]
    pub highlight_node_ids: Vec<String>,
}

/// Answer one question against the article's graph. Highlight recovery is
/// best-effort: an empty id list with a non-empty answer is a valid outcome,
/// never an error.
pub async fn answer_question(
    client: &NarrationClient,
    rows: &ArticleGraphRows,
    question: &str,
) -> Result<QueryAnswer, NarrateError> {
    let context = build_graph_context(rows);
    let user = format!("{}\n\nQuestion: {}", context, question);

    let raw_answer = client
        .chat(QUERY_SYSTEM_PROMPT, &user, QUERY_TEMPERATURE)
        .await?;

    let highlight_node_ids = recover_highlights(&raw_answer, question, &rows.entities);
    let answer = strip_highlight_marker(&raw_answer);

    debug!(
        highlights = highlight_node_ids.len(),
        "Answered graph question"
    );
    Ok(QueryAnswer {
        answer,
        highlight_node_ids,
    })
}

/// Textual representation of the graph: entity id|name|type lines plus
/// relationship lines with resolved endpoint names.
pub fn build_graph_context(rows: &ArticleGraphRows) -> String {
    let mut context = String::from("Graph Structure:\n\nEntities (format: ID | Name | Type):\n");

    for entity in &rows.entities {
        context.push_str(&format!(
            "- {} | {} ({}): {}\n",
            entity.id,
            entity.name,
            entity.entity_type,
            entity.description.as_deref().unwrap_or("No description")
        ));
    }

    context.push_str("\nRelationships:\n");
    for rel in &rows.relationships {
        let from_name = entity_name(&rows.entities, &rel.from);
        let to_name = entity_name(&rows.entities, &rel.to);
        context.push_str(&format!(
            "- {} → {} → {}{}\n",
            from_name,
            rel.relationship_type,
            to_name,
            rel.description
                .as_deref()
                .map(|d| format!(": {}", d))
                .unwrap_or_default()
        ));
    }

    context
}

fn entity_name<'a>(entities: &'a [EntityRow], id: &'a str) -> &'a str {
    entities
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.name.as_str())
        .unwrap_or(id)
}

fn highlight_regex() -> Regex {
    Regex::new(r"\[HIGHLIGHT: ([^\]]+)\]").unwrap()
}

/// Marker ids first (filtered against the known entity set), then the
/// keyword/substring heuristic, then empty.
fn recover_highlights(answer: &str, question: &str, entities: &[EntityRow]) -> Vec<String> {
    let known: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();

    if let Some(captures) = highlight_regex().captures(answer) {
        let ids: Vec<String> = captures[1]
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| known.contains(id.as_str()))
            .collect();
        if !ids.is_empty() {
            return ids;
        }
    }

    heuristic_highlights(answer, question, entities)
}

/// Type-keyword match on the question, else substring match of entity names
/// in the answer text. Capped at 10 ids; an empty result is acceptable.
fn heuristic_highlights(answer: &str, question: &str, entities: &[EntityRow]) -> Vec<String> {
    let lower_question = question.to_lowercase();

    let type_filter = if lower_question.contains("people") || lower_question.contains("person") {
        Some("Person")
    } else if lower_question.contains("organization") || lower_question.contains("company") {
        Some("Organization")
    } else if lower_question.contains("location") || lower_question.contains("place") {
        Some("Location")
    } else {
        None
    };

    let mut matched: Vec<String> = match type_filter {
        Some(entity_type) => entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .map(|e| e.id.clone())
            .collect(),
        None => entities
            .iter()
            .filter(|e| answer.contains(&e.name))
            .map(|e| e.id.clone())
            .collect(),
    };

    matched.truncate(MAX_HEURISTIC_HIGHLIGHTS);
    matched
}

fn strip_highlight_marker(answer: &str) -> String {
    highlight_regex().replace_all(answer, "").trim().to_string()
}
