pub mod constraint;
pub mod dedup;
pub mod llm;
pub mod prompt;
pub mod schema;

pub use constraint::TypeConstraint;
pub use dedup::Canonicalizer;
pub use llm::OpenAiClient;
pub use schema::{Entity, ExtractedData, Importance, Relationship, Sentiment, Strength};

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Inputs shorter than this may legitimately contain nothing to extract;
/// anything longer yielding zero entities is treated as a failed extraction.
const NON_TRIVIAL_INPUT_CHARS: usize = 80;

const EXTRACTION_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("language model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model returned an error: {0}")]
    Api(String),

    #[error("language model returned no content")]
    NoContent,

    #[error("failed to parse extraction payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("extraction returned no entities for non-trivial input")]
    EmptyExtraction,
}

pub struct Extractor {
    client: OpenAiClient,
}

impl Extractor {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Run one schema-constrained extraction over the article text and
    /// validate the payload against the resolved type constraint.
    ///
    /// Failure is fatal to the request: nothing is persisted here, so a
    /// failed extraction leaves any prior article graph untouched.
    pub async fn extract(
        &self,
        text: &str,
        title: &str,
        constraint: &TypeConstraint,
    ) -> Result<ExtractedData, ExtractError> {
        let user_prompt = prompt::build_extraction_prompt(title, text);

        let content = self
            .client
            .chat_structured(
                &constraint.system_prompt,
                &user_prompt,
                "knowledge_graph_extraction",
                constraint.response_schema(),
                EXTRACTION_TEMPERATURE,
            )
            .await?;

        let mut data: ExtractedData = serde_json::from_str(&content)?;

        enforce_type_constraint(&mut data, constraint);
        Canonicalizer::new().apply(&mut data);
        drop_dangling_relationships(&mut data);

        if data.entities.is_empty() && is_non_trivial(text) {
            return Err(ExtractError::EmptyExtraction);
        }

        debug!(
            entities = data.entities.len(),
            relationships = data.relationships.len(),
            "Extraction validated"
        );
        Ok(data)
    }
}

/// Reject entities whose type falls outside the closed enumeration. The
/// schema already constrains generation; this is the belt to that suspender,
/// and it never coerces a type.
fn enforce_type_constraint(data: &mut ExtractedData, constraint: &TypeConstraint) {
    let allowed: HashSet<&str> = constraint.allowed_set();
    data.entities.retain(|entity| {
        let ok = allowed.contains(entity.entity_type.as_str());
        if !ok {
            warn!(
                entity = %entity.name,
                entity_type = %entity.entity_type,
                "Rejected entity with type outside the allowed enumeration"
            );
        }
        ok
    });
}

/// Relationships must connect entity ids present in the same extraction
/// batch; anything dangling is dropped silently.
fn drop_dangling_relationships(data: &mut ExtractedData) {
    let ids: HashSet<&str> = data.entities.iter().map(|e| e.id.as_str()).collect();
    let before = data.relationships.len();
    data.relationships
        .retain(|rel| ids.contains(rel.from.as_str()) && ids.contains(rel.to.as_str()));
    let dropped = before - data.relationships.len();
    if dropped > 0 {
        debug!(dropped, "Dropped relationships with dangling endpoints");
    }
}

fn is_non_trivial(text: &str) -> bool {
    text.trim().chars().count() >= NON_TRIVIAL_INPUT_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Entity, Relationship};
    use ontology::ArticleType;

    fn entity(id: &str, entity_type: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: id.to_string(),
            entity_type: entity_type.to_string(),
            description: None,
            sentiment: None,
            importance: None,
        }
    }

    fn relationship(from: &str, to: &str) -> Relationship {
        Relationship {
            from: from.to_string(),
            to: to.to_string(),
            relationship_type: "uses".to_string(),
            description: None,
            strength: None,
        }
    }

    #[test]
    fn rejects_types_outside_the_enumeration() {
        let constraint = TypeConstraint::for_article_type(ArticleType::General);
        let mut data = ExtractedData {
            summary: String::new(),
            entities: vec![entity("a", "Person"), entity("b", "Spaceship")],
            relationships: vec![],
        };
        enforce_type_constraint(&mut data, &constraint);
        assert_eq!(data.entities.len(), 1);
        assert_eq!(data.entities[0].entity_type, "Person");
    }

    #[test]
    fn drops_relationships_with_dangling_endpoints() {
        let mut data = ExtractedData {
            summary: String::new(),
            entities: vec![entity("a", "Person"), entity("b", "Person")],
            relationships: vec![
                relationship("a", "b"),
                relationship("a", "ghost"),
                relationship("ghost", "b"),
            ],
        };
        drop_dangling_relationships(&mut data);
        assert_eq!(data.relationships.len(), 1);
        assert_eq!(data.relationships[0].to, "b");
    }

    #[test]
    fn short_input_is_trivial() {
        assert!(!is_non_trivial("Cat."));
        assert!(is_non_trivial(&"word ".repeat(30)));
    }
}
