//! Multi-chapter narrated walkthrough of one article's graph. The requested
//! chapter count scales with graph size; each chapter's free-text entity
//! names are mapped back to entity ids for highlighting.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use graphstore::ArticleGraphRows;

use crate::NarrateError;
use crate::llm::NarrationClient;

const STORY_TEMPERATURE: f32 = 0.7;
const DEFAULT_CHAPTER_DURATION_MS: u64 = 5000;
const MAX_RELATIONSHIPS_IN_PROMPT: usize = 20;

const STORY_SYSTEM_PROMPT: &str =
    "You are a data storytelling expert. Return only valid JSON with a 'chapters' array.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter: u32,
    pub title: String,
    pub narrative: String,
    #[serde(rename = "entityIds")]
    pub entity_ids: Vec<String>,
    pub duration: u64,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    #[serde(default)]
    chapter: Option<u32>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    narrative: String,
    #[serde(rename = "entityNames", default)]
    entity_names: Vec<String>,
    #[serde(default)]
    duration: Option<u64>,
}

/// Monotonic step function from entity count to the requested chapter-count
/// range (inclusive).
pub fn chapter_range(entity_count: usize) -> (usize, usize) {
    match entity_count {
        0..=5 => (2, 3),
        6..=15 => (3, 5),
        16..=30 => (4, 6),
        _ => (5, 8),
    }
}

pub fn build_story_prompt(rows: &ArticleGraphRows) -> String {
    let (min_chapters, max_chapters) = chapter_range(rows.entities.len());

    let mut prompt = format!(
        "You are a data storytelling expert. Create an engaging narrative story about this knowledge graph.\n\n\
         Article: {}\nArticle Type: {}\n\nEntities ({}):\n",
        rows.article.title,
        rows.article.article_type,
        rows.entities.len()
    );

    for entity in &rows.entities {
        prompt.push_str(&format!("- {} ({})", entity.name, entity.entity_type));
        if let Some(description) = &entity.description {
            prompt.push_str(&format!(": {}", description));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("\nRelationships ({}):\n", rows.relationships.len()));
    for rel in rows.relationships.iter().take(MAX_RELATIONSHIPS_IN_PROMPT) {
        let from = entity_name(rows, &rel.from);
        let to = entity_name(rows, &rel.to);
        prompt.push_str(&format!("- {} → {} ({})\n", from, to, rel.relationship_type));
    }

    prompt.push_str(&format!(
        r#"
Create a story with {} to {} chapters that guides the reader through this data. Each chapter should:
1. Have a clear title
2. Focus on specific entities (mention their exact names)
3. Tell a cohesive narrative
4. Build upon previous chapters

Return ONLY a JSON array with this structure:
[
  {{
    "chapter": 1,
    "title": "Chapter title",
    "narrative": "The story text that mentions specific entity names",
    "entityNames": ["Entity Name 1", "Entity Name 2"],
    "duration": 5000
  }}
]

Make it engaging and insightful. Focus on the most important entities and relationships."#,
        min_chapters, max_chapters
    ));

    prompt
}

/// Generate the narrated walkthrough. A model failure or a zero-chapter
/// response is fatal.
pub async fn generate_story(
    client: &NarrationClient,
    rows: &ArticleGraphRows,
) -> Result<Vec<Chapter>, NarrateError> {
    let prompt = build_story_prompt(rows);
    let content = client
        .chat(STORY_SYSTEM_PROMPT, &prompt, STORY_TEMPERATURE)
        .await?;

    let chapters = resolve_chapters(&content, rows)?;
    debug!(chapters = chapters.len(), "Generated story");
    Ok(chapters)
}

/// Parse the model payload and map chapter entity names to entity ids.
/// Names with no case-insensitive match are dropped from that chapter's
/// highlight set.
fn resolve_chapters(content: &str, rows: &ArticleGraphRows) -> Result<Vec<Chapter>, NarrateError> {
    let raw_chapters = parse_story_payload(content)?;
    if raw_chapters.is_empty() {
        return Err(NarrateError::Story(
            "model returned zero chapters".to_string(),
        ));
    }

    let id_by_name: HashMap<String, &str> = rows
        .entities
        .iter()
        .map(|e| (e.name.to_lowercase(), e.id.as_str()))
        .collect();

    Ok(raw_chapters
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Chapter {
            chapter: raw.chapter.unwrap_or(index as u32 + 1),
            title: raw.title,
            narrative: raw.narrative,
            entity_ids: raw
                .entity_names
                .iter()
                .filter_map(|name| id_by_name.get(&name.to_lowercase()))
                .map(|id| id.to_string())
                .collect(),
            duration: raw.duration.unwrap_or(DEFAULT_CHAPTER_DURATION_MS),
        })
        .collect())
}

/// The model sometimes wraps its JSON in markdown fences or a `story`/
/// `chapters` object; accept all of those shapes.
fn parse_story_payload(content: &str) -> Result<Vec<RawChapter>, NarrateError> {
    let cleaned = strip_code_fences(content);

    let mut value: Value = serde_json::from_str(cleaned)
        .map_err(|e| NarrateError::Story(format!("unparsable story payload: {}", e)))?;

    if let Some(inner) = value.get_mut("story") {
        value = inner.take();
    }
    if let Some(inner) = value.get_mut("chapters") {
        value = inner.take();
    }

    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| NarrateError::Story(format!("invalid chapter: {}", e)))
        })
        .collect()
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn entity_name<'a>(rows: &'a ArticleGraphRows, id: &'a str) -> &'a str {
    rows.entities
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.name.as_str())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphstore::{ArticleRecord, EntityRow};

    fn rows_with_entities(count: usize) -> ArticleGraphRows {
        ArticleGraphRows {
            article: ArticleRecord {
                id: "article-1".to_string(),
                title: "The Heist".to_string(),
                content: String::new(),
                summary: String::new(),
                article_type: "mystery-investigation".to_string(),
                mode: "easy".to_string(),
                ontology_id: None,
                ontology_name: None,
                created_at: String::new(),
            },
            entities: (0..count)
                .map(|i| EntityRow {
                    id: format!("entity-{}", i),
                    name: format!("Entity {}", i),
                    entity_type: "Person".to_string(),
                    description: None,
                    importance: None,
                })
                .collect(),
            relationships: Vec::new(),
        }
    }

    #[test]
    fn chapter_range_is_a_monotonic_step_function() {
        assert_eq!(chapter_range(0), (2, 3));
        assert_eq!(chapter_range(5), (2, 3));
        assert_eq!(chapter_range(6), (3, 5));
        assert_eq!(chapter_range(15), (3, 5));
        assert_eq!(chapter_range(20), (4, 6));
        assert_eq!(chapter_range(30), (4, 6));
        assert_eq!(chapter_range(31), (5, 8));
        assert_eq!(chapter_range(100), (5, 8));
    }

    #[test]
    fn prompt_embeds_the_requested_chapter_range() {
        let prompt = build_story_prompt(&rows_with_entities(20));
        assert!(prompt.contains("4 to 6 chapters"));
        assert!(prompt.contains("Article: The Heist"));
    }

    #[test]
    fn parses_plain_array_payload() {
        let chapters = parse_story_payload(
            r#"[{"chapter": 1, "title": "Opening", "narrative": "...", "entityNames": ["Entity 0"]}]"#,
        )
        .unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Opening");
    }

    #[test]
    fn parses_fenced_and_wrapped_payload() {
        let content = "```json\n{\"chapters\": [{\"title\": \"One\", \"narrative\": \"n\"}]}\n```";
        let chapters = parse_story_payload(content).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "One");
    }

    #[test]
    fn lone_object_becomes_single_chapter() {
        let chapters =
            parse_story_payload(r#"{"title": "Solo", "narrative": "n"}"#).unwrap();
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn unparsable_payload_is_a_story_error() {
        assert!(matches!(
            parse_story_payload("not json at all"),
            Err(NarrateError::Story(_))
        ));
    }

    #[test]
    fn maps_entity_names_to_ids_case_insensitively() {
        let rows = rows_with_entities(3);
        let content = r#"[{"title": "t", "narrative": "n",
            "entityNames": ["ENTITY 0", "entity 2", "Nobody Known"]}]"#;
        let chapters = resolve_chapters(content, &rows).unwrap();
        assert_eq!(chapters[0].entity_ids, vec!["entity-0", "entity-2"]);
        assert_eq!(chapters[0].chapter, 1);
        assert_eq!(chapters[0].duration, DEFAULT_CHAPTER_DURATION_MS);
    }

    #[test]
    fn empty_chapter_list_is_fatal() {
        let rows = rows_with_entities(1);
        assert!(matches!(
            resolve_chapters("[]", &rows),
            Err(NarrateError::Story(_))
        ));
    }
}
