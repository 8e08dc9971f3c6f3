//! Per-request resolution of the allowed entity-type set, and construction of
//! the schema the language model's structured output is constrained to.

use serde_json::{Value, json};
use std::collections::HashSet;

use ontology::{ArticleType, Ontology, article_type_config};

/// The resolved extraction constraint for one request: a curated system
/// prompt plus a closed enumeration of entity-type strings. The enumeration
/// is embedded into the response schema, so the model cannot emit a type
/// outside it.
#[derive(Debug, Clone)]
pub struct TypeConstraint {
    pub system_prompt: String,
    pub allowed_entity_types: Vec<String>,
}

impl TypeConstraint {
    /// Easy mode: fixed built-in list per article-type category.
    pub fn for_article_type(article_type: ArticleType) -> Self {
        let config = article_type_config(article_type);
        Self {
            system_prompt: config.system_prompt.to_string(),
            allowed_entity_types: config.entity_types.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Advanced mode: the type set comes from a user-defined ontology. The
    /// system prompt is synthesized from the ontology's own definitions.
    pub fn for_ontology(ontology: &Ontology) -> Self {
        let mut prompt = format!(
            "You are an expert analyst extracting a knowledge graph using the '{}' ontology.\n",
            ontology.name
        );
        if !ontology.description.is_empty() {
            prompt.push_str(&ontology.description);
            prompt.push('\n');
        }
        prompt.push_str(
            "\nIMPORTANT: Keep all entity names and descriptions in the SAME LANGUAGE \
             as the original article. Do NOT translate anything.\n\
             \nExtract entities using ONLY these entity types (enforced by schema):\n",
        );
        for entity in &ontology.entities {
            prompt.push_str(&format!(
                "- {}: {}",
                entity.entity_type, entity.description
            ));
            if !entity.examples.is_empty() {
                prompt.push_str(&format!(" (examples: {})", entity.examples.join(", ")));
            }
            prompt.push('\n');
        }

        if !ontology.relationships.is_empty() {
            prompt.push_str("\nPrefer these relationship types:\n");
            for rel in &ontology.relationships {
                prompt.push_str(&format!("- {}: {}", rel.relationship_type, rel.description));
                match (&rel.from_type, &rel.to_type) {
                    (Some(from), Some(to)) => {
                        prompt.push_str(&format!(" ({} → {})", from, to));
                    }
                    (Some(from), None) => prompt.push_str(&format!(" (from {})", from)),
                    (None, Some(to)) => prompt.push_str(&format!(" (to {})", to)),
                    (None, None) => {}
                }
                prompt.push('\n');
            }
        }

        prompt.push_str(
            "\nAlso produce a concise summary, a sentiment (positive/negative/neutral) and \
             an importance (high/medium/low) per entity, and a strength (strong/medium/weak) \
             per relationship.\n\
             Each unique real-world referent must appear ONLY ONCE: name variants, \
             honorifics, and case differences refer to the same entity and must share \
             one entity id.",
        );

        Self {
            system_prompt: prompt,
            allowed_entity_types: ontology.entity_type_names(),
        }
    }

    pub fn allowed_set(&self) -> HashSet<&str> {
        self.allowed_entity_types.iter().map(|s| s.as_str()).collect()
    }

    /// The JSON schema the model's structured output must conform to. The
    /// `type` field of every entity is a closed enum built at request time
    /// from the resolved type set.
    pub fn response_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {"type": "string"},
                "entities": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "name": {"type": "string"},
                            "type": {"type": "string", "enum": self.allowed_entity_types},
                            "description": {"type": "string"},
                            "sentiment": {"type": "string", "enum": ["positive", "negative", "neutral"]},
                            "importance": {"type": "string", "enum": ["high", "medium", "low"]}
                        },
                        "required": ["id", "name", "type"],
                        "additionalProperties": false
                    }
                },
                "relationships": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "from": {"type": "string"},
                            "to": {"type": "string"},
                            "type": {"type": "string"},
                            "description": {"type": "string"},
                            "strength": {"type": "string", "enum": ["strong", "medium", "weak"]}
                        },
                        "required": ["from", "to", "type"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["summary", "entities", "relationships"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontology::{EntityDefinition, RelationshipDefinition};

    fn health_ontology() -> Ontology {
        Ontology {
            id: "ontology-1".to_string(),
            name: "Health".to_string(),
            description: String::new(),
            entities: vec![EntityDefinition {
                entity_type: "Patient".to_string(),
                description: "A person receiving care".to_string(),
                examples: vec!["John".to_string()],
                color: None,
            }],
            relationships: vec![RelationshipDefinition {
                relationship_type: "treated-by".to_string(),
                description: "care relationship".to_string(),
                from_type: Some("Patient".to_string()),
                to_type: None,
            }],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn easy_mode_uses_builtin_type_list() {
        let constraint = TypeConstraint::for_article_type(ArticleType::General);
        assert!(constraint.allowed_entity_types.contains(&"Person".to_string()));
        assert!(constraint.allowed_entity_types.contains(&"Date".to_string()));
        assert!(constraint.system_prompt.contains("expert analyst"));
    }

    #[test]
    fn advanced_mode_uses_ontology_types_only() {
        let constraint = TypeConstraint::for_ontology(&health_ontology());
        assert_eq!(constraint.allowed_entity_types, vec!["Patient"]);
        assert!(constraint.system_prompt.contains("Patient"));
        assert!(constraint.system_prompt.contains("treated-by"));
        assert!(constraint.system_prompt.contains("examples: John"));
    }

    #[test]
    fn response_schema_closes_the_type_enum() {
        let constraint = TypeConstraint::for_ontology(&health_ontology());
        let schema = constraint.response_schema();
        let type_enum = &schema["properties"]["entities"]["items"]["properties"]["type"]["enum"];
        assert_eq!(type_enum, &json!(["Patient"]));
    }

    #[test]
    fn response_schema_requires_all_sections() {
        let constraint = TypeConstraint::for_article_type(ArticleType::Investment);
        let schema = constraint.response_schema();
        assert_eq!(
            schema["required"],
            json!(["summary", "entities", "relationships"])
        );
        let type_enum = schema["properties"]["entities"]["items"]["properties"]["type"]["enum"]
            .as_array()
            .unwrap();
        assert!(type_enum.iter().any(|v| v == "Investor"));
    }
}
