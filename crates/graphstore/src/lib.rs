//! Graph Store Adapter: persists articles, entities, and relationships in a
//! property graph and reads them back for assembly.
//!
//! Write invariants:
//! - the Article node is upserted by id; re-running with the same id updates
//!   its properties instead of duplicating,
//! - every persisted entity is linked to its article via a MENTIONS edge at
//!   write time,
//! - relationship edges only connect entities mentioned by the same article,
//! - multi-statement writes run inside one transaction, so a concurrent
//!   reader never observes a half-written graph.

pub mod model;

pub use model::{
    ArticleGraphRows, ArticleRecord, ArticleSummary, EntityRow, EntityTypeOverview,
    RelationshipRow,
};

use chrono::Utc;
use neo4rs::{Graph, Txn, query};
use thiserror::Error;
use tracing::info;

use extract::{Entity, Relationship};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article not found: {0}")]
    NotFound(String),

    #[error("graph store error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("failed to decode graph row: {0}")]
    Decode(String),
}

/// Parameters for a newly ingested article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub article_type: String,
    pub mode: String,
}

#[derive(Clone)]
pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Create lookup indexes. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in [
            "CREATE INDEX article_id_index IF NOT EXISTS FOR (a:Article) ON (a.id)",
            "CREATE INDEX entity_id_index IF NOT EXISTS FOR (e:Entity) ON (e.id)",
            "CREATE INDEX ontology_id_index IF NOT EXISTS FOR (o:Ontology) ON (o.id)",
        ] {
            self.graph.run(query(statement)).await?;
        }
        info!("Graph indexes ready");
        Ok(())
    }

    /// Persist a freshly extracted article graph. The Article node itself is
    /// an upsert by id; entities and relationships are written as new rows,
    /// so update paths must go through [`replace_article_graph`] instead of
    /// calling this twice.
    pub async fn create_article_graph(
        &self,
        article: &NewArticle,
        entities: &[Entity],
        relationships: &[Relationship],
        ontology_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut txn = self.graph.start_txn().await?;

        txn.run(
            query(
                "MERGE (a:Article {id: $articleId}) \
                 SET a.title = $title, a.content = $content, a.summary = $summary, \
                     a.articleType = $articleType, a.mode = $mode, \
                     a.createdAt = coalesce(a.createdAt, $now)",
            )
            .param("articleId", article.id.clone())
            .param("title", article.title.clone())
            .param("content", article.content.clone())
            .param("summary", article.summary.clone())
            .param("articleType", article.article_type.clone())
            .param("mode", article.mode.clone())
            .param("now", now),
        )
        .await?;

        if let Some(ontology_id) = ontology_id {
            txn.run(
                query(
                    "MATCH (a:Article {id: $articleId}) \
                     MATCH (o:Ontology {id: $ontologyId}) \
                     MERGE (a)-[:USES_ONTOLOGY]->(o)",
                )
                .param("articleId", article.id.clone())
                .param("ontologyId", ontology_id.to_string()),
            )
            .await?;
        }

        write_entities(&mut txn, &article.id, entities).await?;
        write_relationships(&mut txn, &article.id, relationships).await?;
        txn.commit().await?;

        info!(
            article_id = %article.id,
            entities = entities.len(),
            relationships = relationships.len(),
            "Persisted article graph"
        );
        Ok(())
    }

    /// Re-extraction swap: delete the article's old entities and write the
    /// new graph in one transaction. Callers must have a fully validated
    /// extraction in hand before invoking this, so a failed extraction never
    /// destroys prior state.
    pub async fn replace_article_graph(
        &self,
        article_id: &str,
        title: &str,
        content: &str,
        summary: &str,
        entities: &[Entity],
        relationships: &[Relationship],
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut txn = self.graph.start_txn().await?;

        txn.run(
            query("MATCH (a:Article {id: $articleId})-[:MENTIONS]->(e:Entity) DETACH DELETE e")
                .param("articleId", article_id.to_string()),
        )
        .await?;

        txn.run(
            query(
                "MATCH (a:Article {id: $articleId}) \
                 SET a.title = $title, a.content = $content, a.summary = $summary, \
                     a.updatedAt = $now",
            )
            .param("articleId", article_id.to_string())
            .param("title", title.to_string())
            .param("content", content.to_string())
            .param("summary", summary.to_string())
            .param("now", now),
        )
        .await?;

        write_entities(&mut txn, article_id, entities).await?;
        write_relationships(&mut txn, article_id, relationships).await?;
        txn.commit().await?;

        info!(
            article_id = %article_id,
            entities = entities.len(),
            "Replaced article graph"
        );
        Ok(())
    }

    pub async fn get_article(&self, article_id: &str) -> Result<ArticleRecord, StoreError> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (a:Article {id: $articleId}) \
                     OPTIONAL MATCH (a)-[:USES_ONTOLOGY]->(o:Ontology) \
                     RETURN a.title as title, a.content as content, a.summary as summary, \
                            a.articleType as articleType, a.mode as mode, \
                            a.createdAt as createdAt, \
                            o.id as ontologyId, o.name as ontologyName",
                )
                .param("articleId", article_id.to_string()),
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Err(StoreError::NotFound(article_id.to_string()));
        };

        Ok(ArticleRecord {
            id: article_id.to_string(),
            title: decode(row.get("title"))?,
            content: row.get("content").unwrap_or_default(),
            summary: row.get("summary").unwrap_or_default(),
            article_type: row
                .get("articleType")
                .unwrap_or_else(|_| "general".to_string()),
            mode: row.get("mode").unwrap_or_else(|_| "easy".to_string()),
            ontology_id: row.get("ontologyId").ok(),
            ontology_name: row.get("ontologyName").ok(),
            created_at: row.get("createdAt").unwrap_or_default(),
        })
    }

    /// Read back the article plus its entity and relationship rows.
    /// `NotFound` when the article id does not exist.
    pub async fn fetch_graph(&self, article_id: &str) -> Result<ArticleGraphRows, StoreError> {
        let article = self.get_article(article_id).await?;

        let mut entities = Vec::new();
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (a:Article {id: $articleId})-[:MENTIONS]->(e:Entity) \
                     RETURN e.id as id, e.name as name, e.type as type, \
                            e.description as description, e.importance as importance",
                )
                .param("articleId", article_id.to_string()),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            entities.push(EntityRow {
                id: decode(row.get("id"))?,
                name: decode(row.get("name"))?,
                entity_type: row.get("type").unwrap_or_else(|_| "Concept".to_string()),
                description: non_empty(row.get("description").unwrap_or_default()),
                importance: non_empty(row.get("importance").unwrap_or_default()),
            });
        }

        let mut relationships = Vec::new();
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (a:Article {id: $articleId})-[:MENTIONS]->(from:Entity) \
                     MATCH (a)-[:MENTIONS]->(to:Entity) \
                     MATCH (from)-[r:RELATES_TO]->(to) \
                     RETURN from.id as fromId, to.id as toId, r.type as type, \
                            r.description as description, r.strength as strength",
                )
                .param("articleId", article_id.to_string()),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            relationships.push(RelationshipRow {
                from: decode(row.get("fromId"))?,
                to: decode(row.get("toId"))?,
                relationship_type: row
                    .get("type")
                    .unwrap_or_else(|_| "related-to".to_string()),
                description: non_empty(row.get("description").unwrap_or_default()),
                strength: non_empty(row.get("strength").unwrap_or_default()),
            });
        }

        Ok(ArticleGraphRows {
            article,
            entities,
            relationships,
        })
    }

    pub async fn list_articles(&self) -> Result<Vec<ArticleSummary>, StoreError> {
        let mut rows = self
            .graph
            .execute(query(
                "MATCH (a:Article) \
                 RETURN a.id as id, a.title as title, a.createdAt as createdAt \
                 ORDER BY a.createdAt DESC",
            ))
            .await?;

        let mut articles = Vec::new();
        while let Some(row) = rows.next().await? {
            articles.push(ArticleSummary {
                id: decode(row.get("id"))?,
                title: row.get("title").unwrap_or_default(),
                created_at: row.get("createdAt").unwrap_or_default(),
            });
        }
        Ok(articles)
    }

    /// Delete every entity mentioned by the article, with their edges.
    pub async fn delete_article_entities(&self, article_id: &str) -> Result<(), StoreError> {
        self.graph
            .run(
                query("MATCH (a:Article {id: $articleId})-[:MENTIONS]->(e:Entity) DETACH DELETE e")
                    .param("articleId", article_id.to_string()),
            )
            .await?;
        Ok(())
    }

    /// Distinct entity types and up to five sample names for one article.
    pub async fn entity_type_overview(
        &self,
        article_id: &str,
    ) -> Result<EntityTypeOverview, StoreError> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (a:Article {id: $articleId})-[:MENTIONS]->(e:Entity) \
                     RETURN collect(DISTINCT e.type) as entityTypes, \
                            collect(DISTINCT e.name)[0..5] as sampleNames",
                )
                .param("articleId", article_id.to_string()),
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(EntityTypeOverview {
                entity_types: row.get("entityTypes").unwrap_or_default(),
                sample_names: row.get("sampleNames").unwrap_or_default(),
            }),
            None => Ok(EntityTypeOverview {
                entity_types: Vec::new(),
                sample_names: Vec::new(),
            }),
        }
    }

    /// Liveness check for the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.graph.run(query("RETURN 1")).await?;
        Ok(())
    }
}

async fn write_entities(
    txn: &mut Txn,
    article_id: &str,
    entities: &[Entity],
) -> Result<(), StoreError> {
    for entity in entities {
        txn.run(
            query(
                "MERGE (e:Entity {id: $id}) \
                 SET e.name = $name, e.type = $type, e.description = $description, \
                     e.sentiment = $sentiment, e.importance = $importance \
                 WITH e \
                 MATCH (a:Article {id: $articleId}) \
                 MERGE (a)-[:MENTIONS]->(e)",
            )
            .param("id", entity.id.clone())
            .param("name", entity.name.clone())
            .param("type", entity.entity_type.clone())
            .param("description", entity.description.clone().unwrap_or_default())
            .param(
                "sentiment",
                entity
                    .sentiment
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
            )
            .param(
                "importance",
                entity
                    .importance
                    .map(|i| i.as_str().to_string())
                    .unwrap_or_default(),
            )
            .param("articleId", article_id.to_string()),
        )
        .await?;
    }
    Ok(())
}

async fn write_relationships(
    txn: &mut Txn,
    article_id: &str,
    relationships: &[Relationship],
) -> Result<(), StoreError> {
    for rel in relationships {
        txn.run(
            query(
                "MATCH (a:Article {id: $articleId})-[:MENTIONS]->(from:Entity {id: $fromId}) \
                 MATCH (a)-[:MENTIONS]->(to:Entity {id: $toId}) \
                 MERGE (from)-[r:RELATES_TO {type: $type}]->(to) \
                 SET r.description = $description, r.strength = $strength",
            )
            .param("articleId", article_id.to_string())
            .param("fromId", rel.from.clone())
            .param("toId", rel.to.clone())
            .param("type", rel.relationship_type.clone())
            .param("description", rel.description.clone().unwrap_or_default())
            .param(
                "strength",
                rel.strength
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
            ),
        )
        .await?;
    }
    Ok(())
}

fn decode<T>(value: Result<T, neo4rs::DeError>) -> Result<T, StoreError> {
    value.map_err(|e| StoreError::Decode(e.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
