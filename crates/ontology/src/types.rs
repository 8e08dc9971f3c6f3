use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::OntologyError;

pub const DEFAULT_ENTITY_COLOR: &str = "#64748b";

/// One allowed entity type inside an ontology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// One allowed relationship type inside an ontology. The from/to type
/// constraints are optional hints, not enforced endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub description: String,
    #[serde(rename = "fromType", default)]
    pub from_type: Option<String>,
    #[serde(rename = "toType", default)]
    pub to_type: Option<String>,
}

/// A stored ontology with its definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ontology {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl Ontology {
    /// The closed set of entity-type strings this ontology allows.
    pub fn entity_type_names(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.entity_type.clone()).collect()
    }
}

/// Create/update payload for an ontology. Validated before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
}

impl OntologyDraft {
    pub fn validate(&self) -> Result<(), OntologyError> {
        if self.name.trim().is_empty() {
            return Err(OntologyError::Validation(
                "ontology name is required".to_string(),
            ));
        }
        if self.entities.is_empty() {
            return Err(OntologyError::Validation(
                "at least one entity type is required".to_string(),
            ));
        }

        let mut entity_types = HashSet::new();
        for entity in &self.entities {
            if entity.entity_type.trim().is_empty() {
                return Err(OntologyError::Validation(
                    "entity type is required".to_string(),
                ));
            }
            if entity.description.trim().is_empty() {
                return Err(OntologyError::Validation(format!(
                    "entity type '{}' is missing a description",
                    entity.entity_type
                )));
            }
            if !entity_types.insert(entity.entity_type.as_str()) {
                return Err(OntologyError::Validation(format!(
                    "duplicate entity type '{}'",
                    entity.entity_type
                )));
            }
        }

        let mut relationship_types = HashSet::new();
        for rel in &self.relationships {
            if rel.relationship_type.trim().is_empty() {
                return Err(OntologyError::Validation(
                    "relationship type is required".to_string(),
                ));
            }
            if rel.description.trim().is_empty() {
                return Err(OntologyError::Validation(format!(
                    "relationship type '{}' is missing a description",
                    rel.relationship_type
                )));
            }
            if !relationship_types.insert(rel.relationship_type.as_str()) {
                return Err(OntologyError::Validation(format!(
                    "duplicate relationship type '{}'",
                    rel.relationship_type
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(entity_type: &str, description: &str) -> EntityDefinition {
        EntityDefinition {
            entity_type: entity_type.to_string(),
            description: description.to_string(),
            examples: Vec::new(),
            color: None,
        }
    }

    fn valid_draft() -> OntologyDraft {
        OntologyDraft {
            name: "Health".to_string(),
            description: String::new(),
            entities: vec![entity("Patient", "A person receiving care")],
            relationships: Vec::new(),
        }
    }

    #[test]
    fn accepts_minimal_valid_draft() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let mut draft = valid_draft();
        draft.name = "  ".to_string();
        assert!(matches!(
            draft.validate(),
            Err(OntologyError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_entity_definitions() {
        let mut draft = valid_draft();
        draft.entities.clear();
        assert!(matches!(
            draft.validate(),
            Err(OntologyError::Validation(_))
        ));
    }

    #[test]
    fn rejects_entity_without_description() {
        let mut draft = valid_draft();
        draft.entities.push(entity("Doctor", ""));
        assert!(matches!(
            draft.validate(),
            Err(OntologyError::Validation(_))
        ));
    }

    #[test]
    fn rejects_duplicate_entity_types() {
        let mut draft = valid_draft();
        draft.entities.push(entity("Patient", "duplicate"));
        assert!(matches!(
            draft.validate(),
            Err(OntologyError::Validation(_))
        ));
    }

    #[test]
    fn rejects_relationship_missing_type() {
        let mut draft = valid_draft();
        draft.relationships.push(RelationshipDefinition {
            relationship_type: String::new(),
            description: "treats".to_string(),
            from_type: None,
            to_type: None,
        });
        assert!(matches!(
            draft.validate(),
            Err(OntologyError::Validation(_))
        ));
    }

    #[test]
    fn entity_type_names_preserve_order() {
        let ontology = Ontology {
            id: "ontology-1".to_string(),
            name: "Health".to_string(),
            description: String::new(),
            entities: vec![
                entity("Patient", "a patient"),
                entity("Doctor", "a doctor"),
            ],
            relationships: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(ontology.entity_type_names(), vec!["Patient", "Doctor"]);
    }

    #[test]
    fn wire_format_uses_original_field_names() {
        let json = r#"{
            "name": "Health",
            "entities": [
                {"type": "Patient", "description": "a patient", "examples": ["John"]}
            ],
            "relationships": [
                {"type": "treated-by", "description": "care", "fromType": "Patient", "toType": "Doctor"}
            ]
        }"#;
        let draft: OntologyDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.entities[0].entity_type, "Patient");
        assert_eq!(
            draft.relationships[0].from_type.as_deref(),
            Some("Patient")
        );
        assert!(draft.validate().is_ok());
    }
}
