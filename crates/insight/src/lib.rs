//! Graph assembly: turns stored rows into the node/edge view model and
//! derives key insights from notable relationships. Pure, synchronous, and
//! deterministic over already-fetched data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use graphstore::ArticleGraphRows;

pub const MENTIONS_EDGE_TYPE: &str = "MENTIONS";
pub const ARTICLE_NODE_TYPE: &str = "Article";

const MAX_KEY_INSIGHTS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

/// A derived, human-readable summary of one notable relationship. Computed
/// at read time, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInsight {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "nodeIds")]
    pub node_ids: Vec<String>,
    #[serde(rename = "edgeId")]
    pub edge_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(rename = "keyInsights")]
    pub key_insights: Vec<KeyInsight>,
    #[serde(rename = "articleType")]
    pub article_type: String,
}

/// Assemble the view model: the article as a synthetic node, one MENTIONS
/// edge per entity, the stored entity-to-entity edges, nodes deduplicated
/// by id.
pub fn assemble(rows: &ArticleGraphRows) -> GraphData {
    let article = &rows.article;

    let mut nodes = Vec::with_capacity(rows.entities.len() + 1);
    let mut node_ids = HashSet::new();

    nodes.push(GraphNode {
        id: article.id.clone(),
        name: article.title.clone(),
        node_type: ARTICLE_NODE_TYPE.to_string(),
        description: if article.summary.is_empty() {
            None
        } else {
            Some(article.summary.clone())
        },
    });
    node_ids.insert(article.id.clone());

    let mut edges = Vec::new();
    for entity in &rows.entities {
        if !node_ids.insert(entity.id.clone()) {
            continue;
        }
        nodes.push(GraphNode {
            id: entity.id.clone(),
            name: entity.name.clone(),
            node_type: entity.entity_type.clone(),
            description: entity.description.clone(),
        });
        edges.push(GraphEdge {
            from: article.id.clone(),
            to: entity.id.clone(),
            edge_type: MENTIONS_EDGE_TYPE.to_string(),
            description: None,
            strength: None,
        });
    }

    for rel in &rows.relationships {
        if !node_ids.contains(&rel.from) || !node_ids.contains(&rel.to) {
            continue;
        }
        edges.push(GraphEdge {
            from: rel.from.clone(),
            to: rel.to.clone(),
            edge_type: rel.relationship_type.clone(),
            description: rel.description.clone(),
            strength: rel.strength.clone(),
        });
    }

    let key_insights = derive_insights(&nodes, &edges);

    GraphData {
        nodes,
        edges,
        key_insights,
        article_type: article.article_type.clone(),
    }
}

/// Prefer edges flagged strong; if none exist, fall back to all
/// non-MENTIONS edges. First-8 truncation in store order, no re-sorting.
pub fn derive_insights(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<KeyInsight> {
    let strong: Vec<&GraphEdge> = edges
        .iter()
        .filter(|e| e.strength.as_deref() == Some("strong"))
        .collect();

    let candidates: Vec<&GraphEdge> = if !strong.is_empty() {
        strong
    } else {
        edges
            .iter()
            .filter(|e| e.edge_type != MENTIONS_EDGE_TYPE)
            .collect()
    };

    candidates
        .into_iter()
        .take(MAX_KEY_INSIGHTS)
        .filter_map(|edge| {
            let from = nodes.iter().find(|n| n.id == edge.from)?;
            let to = nodes.iter().find(|n| n.id == edge.to)?;
            Some(KeyInsight {
                text: format!(
                    "{} → {} → {}",
                    from.name,
                    humanize_type(&edge.edge_type),
                    to.name
                ),
                description: edge.description.clone(),
                node_ids: vec![edge.from.clone(), edge.to.clone()],
                edge_id: format!("{}-{}", edge.from, edge.to),
            })
        })
        .collect()
}

fn humanize_type(edge_type: &str) -> String {
    edge_type.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphstore::{ArticleRecord, EntityRow, RelationshipRow};

    fn article() -> ArticleRecord {
        ArticleRecord {
            id: "article-1".to_string(),
            title: "Breach at Acme".to_string(),
            content: "...".to_string(),
            summary: "Acme was breached.".to_string(),
            article_type: "general".to_string(),
            mode: "easy".to_string(),
            ontology_id: None,
            ontology_name: None,
            created_at: String::new(),
        }
    }

    fn entity(id: &str, name: &str) -> EntityRow {
        EntityRow {
            id: id.to_string(),
            name: name.to_string(),
            entity_type: "Organization".to_string(),
            description: None,
            importance: None,
        }
    }

    fn rel(from: &str, to: &str, strength: Option<&str>) -> RelationshipRow {
        RelationshipRow {
            from: from.to_string(),
            to: to.to_string(),
            relationship_type: "attacked-by".to_string(),
            description: None,
            strength: strength.map(|s| s.to_string()),
        }
    }

    fn rows(entities: Vec<EntityRow>, relationships: Vec<RelationshipRow>) -> ArticleGraphRows {
        ArticleGraphRows {
            article: article(),
            entities,
            relationships,
        }
    }

    #[test]
    fn assembles_article_node_plus_mentions_edges() {
        let data = assemble(&rows(
            vec![entity("acme", "Acme"), entity("gang", "Gang")],
            vec![rel("acme", "gang", None)],
        ));

        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.nodes[0].node_type, ARTICLE_NODE_TYPE);
        let mentions = data
            .edges
            .iter()
            .filter(|e| e.edge_type == MENTIONS_EDGE_TYPE)
            .count();
        assert_eq!(mentions, 2);
        assert_eq!(data.edges.len(), 3);
        assert_eq!(data.article_type, "general");
    }

    #[test]
    fn deduplicates_nodes_by_id() {
        let data = assemble(&rows(
            vec![entity("acme", "Acme"), entity("acme", "Acme again")],
            vec![],
        ));
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[1].name, "Acme");
    }

    #[test]
    fn strong_relationship_wins_insight_selection() {
        let data = assemble(&rows(
            vec![
                entity("a", "A"),
                entity("b", "B"),
                entity("c", "C"),
            ],
            vec![rel("a", "b", Some("strong")), rel("b", "c", Some("weak"))],
        ));

        assert_eq!(data.key_insights.len(), 1);
        let insight = &data.key_insights[0];
        assert_eq!(insight.node_ids, vec!["a", "b"]);
        assert_eq!(insight.edge_id, "a-b");
        assert_eq!(insight.text, "A → attacked by → B");
    }

    #[test]
    fn falls_back_to_all_non_mentions_edges() {
        let data = assemble(&rows(
            vec![entity("a", "A"), entity("b", "B")],
            vec![rel("a", "b", Some("weak"))],
        ));

        assert_eq!(data.key_insights.len(), 1);
        assert_eq!(data.key_insights[0].edge_id, "a-b");
    }

    #[test]
    fn truncates_to_first_eight_in_store_order() {
        let names: Vec<String> = (0..12).map(|i| format!("e{}", i)).collect();
        let entities: Vec<EntityRow> = names.iter().map(|n| entity(n, n)).collect();
        let relationships: Vec<RelationshipRow> = (0..11)
            .map(|i| rel(&names[i], &names[i + 1], Some("strong")))
            .collect();

        let data = assemble(&rows(entities, relationships));
        assert_eq!(data.key_insights.len(), 8);
        assert_eq!(data.key_insights[0].edge_id, "e0-e1");
        assert_eq!(data.key_insights[7].edge_id, "e7-e8");
    }

    #[test]
    fn derivation_is_deterministic() {
        let input = rows(
            vec![entity("a", "A"), entity("b", "B")],
            vec![rel("a", "b", Some("strong"))],
        );
        let first = assemble(&input);
        let second = assemble(&input);
        assert_eq!(
            serde_json::to_string(&first.key_insights).unwrap(),
            serde_json::to_string(&second.key_insights).unwrap()
        );
    }
}
