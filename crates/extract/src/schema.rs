use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Medium,
    Weak,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Medium => "medium",
            Self::Weak => "weak",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "strong" => Some(Self::Strong),
            "medium" => Some(Self::Medium),
            "weak" => Some(Self::Weak),
            _ => None,
        }
    }
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A typed node extracted from an article. One entity per real-world referent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

/// A typed, directed edge between two entities of the same article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<Strength>,
}

/// The validated result of one extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedData {
    pub summary: String,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extraction_payload() {
        let json = r#"{
            "summary": "A short incident report.",
            "entities": [
                {"id": "acme", "name": "Acme", "type": "Organization",
                 "description": "victim company", "sentiment": "negative", "importance": "high"}
            ],
            "relationships": [
                {"from": "acme", "to": "acme-2", "type": "attacked-by", "strength": "strong"}
            ]
        }"#;
        let data: ExtractedData = serde_json::from_str(json).unwrap();
        assert_eq!(data.entities[0].entity_type, "Organization");
        assert_eq!(data.entities[0].sentiment, Some(Sentiment::Negative));
        assert_eq!(data.relationships[0].strength, Some(Strength::Strong));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{
            "summary": "s",
            "entities": [{"id": "e1", "name": "E", "type": "Person"}],
            "relationships": [{"from": "e1", "to": "e1", "type": "knows"}]
        }"#;
        let data: ExtractedData = serde_json::from_str(json).unwrap();
        assert!(data.entities[0].description.is_none());
        assert!(data.relationships[0].strength.is_none());
    }

    #[test]
    fn strength_round_trips() {
        for s in [Strength::Strong, Strength::Medium, Strength::Weak] {
            assert_eq!(Strength::parse(s.as_str()), Some(s));
        }
        assert_eq!(Strength::parse("unknown"), None);
    }
}
