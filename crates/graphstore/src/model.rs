use serde::{Deserialize, Serialize};

/// A stored article with its graph metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "articleType")]
    pub article_type: String,
    pub mode: String,
    #[serde(rename = "ontologyId", skip_serializing_if = "Option::is_none")]
    pub ontology_id: Option<String>,
    #[serde(rename = "ontologyName", skip_serializing_if = "Option::is_none")]
    pub ontology_name: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

/// Listing row for the article index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// An entity row as persisted, read back for assembly and narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
}

/// An entity-to-entity relationship row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

/// Everything the read path needs to assemble one article's graph view.
#[derive(Debug, Clone)]
pub struct ArticleGraphRows {
    pub article: ArticleRecord,
    pub entities: Vec<EntityRow>,
    pub relationships: Vec<RelationshipRow>,
}

/// Distinct entity types plus a few sample names, used for suggested
/// questions.
#[derive(Debug, Clone)]
pub struct EntityTypeOverview {
    pub entity_types: Vec<String>,
    pub sample_names: Vec<String>,
}
