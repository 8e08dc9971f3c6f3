//! Neo4j-backed CRUD for user-defined ontologies.
//!
//! Storage model: `(:Ontology)-[:DEFINES]->(:EntityDefinition)` and
//! `(:Ontology)-[:DEFINES]->(:RelationshipDefinition)`. Updates are a full
//! replace of all definitions inside one transaction, never a patch.

use chrono::Utc;
use neo4rs::{Graph, query};
use tracing::info;
use uuid::Uuid;

use crate::OntologyError;
use crate::types::{
    DEFAULT_ENTITY_COLOR, EntityDefinition, Ontology, OntologyDraft, RelationshipDefinition,
};

#[derive(Clone)]
pub struct OntologyRegistry {
    graph: Graph,
}

impl OntologyRegistry {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Create a new ontology and its definitions. Returns the generated id.
    pub async fn create(&self, draft: &OntologyDraft) -> Result<String, OntologyError> {
        draft.validate()?;

        let ontology_id = format!("ontology-{}", Uuid::new_v4());
        let now = Utc::now().to_rfc3339();

        let mut txn = self.graph.start_txn().await?;
        txn.run(
            query(
                "CREATE (o:Ontology {id: $id, name: $name, description: $description, \
                 createdAt: $now, updatedAt: $now})",
            )
            .param("id", ontology_id.clone())
            .param("name", draft.name.clone())
            .param("description", draft.description.clone())
            .param("now", now),
        )
        .await?;

        write_definitions(&mut txn, &ontology_id, &draft.entities, &draft.relationships).await?;
        txn.commit().await?;

        info!(ontology_id = %ontology_id, entities = draft.entities.len(), "Created ontology");
        Ok(ontology_id)
    }

    pub async fn get(&self, ontology_id: &str) -> Result<Ontology, OntologyError> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (o:Ontology {id: $id}) \
                     RETURN o.name as name, o.description as description, \
                            o.createdAt as createdAt, o.updatedAt as updatedAt",
                )
                .param("id", ontology_id.to_string()),
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Err(OntologyError::NotFound(ontology_id.to_string()));
        };

        let name: String = decode(row.get("name"))?;
        let description: String = row.get("description").unwrap_or_default();
        let created_at: String = row.get("createdAt").unwrap_or_default();
        let updated_at: String = row.get("updatedAt").unwrap_or_default();

        Ok(Ontology {
            id: ontology_id.to_string(),
            name,
            description,
            entities: self.entity_definitions(ontology_id).await?,
            relationships: self.relationship_definitions(ontology_id).await?,
            created_at,
            updated_at,
        })
    }

    pub async fn list(&self) -> Result<Vec<Ontology>, OntologyError> {
        let mut rows = self
            .graph
            .execute(query(
                "MATCH (o:Ontology) RETURN o.id as id ORDER BY o.createdAt DESC",
            ))
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(decode::<String>(row.get("id"))?);
        }

        let mut ontologies = Vec::with_capacity(ids.len());
        for id in ids {
            ontologies.push(self.get(&id).await?);
        }
        Ok(ontologies)
    }

    /// Full replace: every prior definition is deleted before the new set is
    /// written, inside one transaction. A reader never observes a partial mix.
    pub async fn update(
        &self,
        ontology_id: &str,
        draft: &OntologyDraft,
    ) -> Result<(), OntologyError> {
        draft.validate()?;
        self.ensure_exists(ontology_id).await?;

        let now = Utc::now().to_rfc3339();
        let mut txn = self.graph.start_txn().await?;

        txn.run(
            query(
                "MATCH (o:Ontology {id: $id}) \
                 SET o.name = $name, o.description = $description, o.updatedAt = $now",
            )
            .param("id", ontology_id.to_string())
            .param("name", draft.name.clone())
            .param("description", draft.description.clone())
            .param("now", now),
        )
        .await?;

        txn.run(
            query("MATCH (o:Ontology {id: $id})-[:DEFINES]->(def) DETACH DELETE def")
                .param("id", ontology_id.to_string()),
        )
        .await?;

        write_definitions(&mut txn, ontology_id, &draft.entities, &draft.relationships).await?;
        txn.commit().await?;

        info!(ontology_id = %ontology_id, "Replaced ontology definitions");
        Ok(())
    }

    /// Deletes the ontology and its owned definitions. Articles that reference
    /// the ontology are left alone; their link simply dangles.
    pub async fn delete(&self, ontology_id: &str) -> Result<(), OntologyError> {
        self.graph
            .run(
                query(
                    "MATCH (o:Ontology {id: $id}) \
                     OPTIONAL MATCH (o)-[:DEFINES]->(def) \
                     DETACH DELETE o, def",
                )
                .param("id", ontology_id.to_string()),
            )
            .await?;
        info!(ontology_id = %ontology_id, "Deleted ontology");
        Ok(())
    }

    async fn ensure_exists(&self, ontology_id: &str) -> Result<(), OntologyError> {
        let mut rows = self
            .graph
            .execute(
                query("MATCH (o:Ontology {id: $id}) RETURN count(o) as count")
                    .param("id", ontology_id.to_string()),
            )
            .await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>("count").unwrap_or(0),
            None => 0,
        };
        if count == 0 {
            return Err(OntologyError::NotFound(ontology_id.to_string()));
        }
        Ok(())
    }

    async fn entity_definitions(
        &self,
        ontology_id: &str,
    ) -> Result<Vec<EntityDefinition>, OntologyError> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (o:Ontology {id: $id})-[:DEFINES]->(e:EntityDefinition) \
                     RETURN e.type as type, e.description as description, \
                            e.examples as examples, e.color as color",
                )
                .param("id", ontology_id.to_string()),
            )
            .await?;

        let mut definitions = Vec::new();
        while let Some(row) = rows.next().await? {
            definitions.push(EntityDefinition {
                entity_type: decode(row.get("type"))?,
                description: row.get("description").unwrap_or_default(),
                examples: row.get("examples").unwrap_or_default(),
                color: Some(
                    row.get("color")
                        .unwrap_or_else(|_| DEFAULT_ENTITY_COLOR.to_string()),
                ),
            });
        }
        Ok(definitions)
    }

    async fn relationship_definitions(
        &self,
        ontology_id: &str,
    ) -> Result<Vec<RelationshipDefinition>, OntologyError> {
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (o:Ontology {id: $id})-[:DEFINES]->(r:RelationshipDefinition) \
                     RETURN r.type as type, r.description as description, \
                            r.fromType as fromType, r.toType as toType",
                )
                .param("id", ontology_id.to_string()),
            )
            .await?;

        let mut definitions = Vec::new();
        while let Some(row) = rows.next().await? {
            definitions.push(RelationshipDefinition {
                relationship_type: decode(row.get("type"))?,
                description: row.get("description").unwrap_or_default(),
                from_type: non_empty(row.get("fromType").unwrap_or_default()),
                to_type: non_empty(row.get("toType").unwrap_or_default()),
            });
        }
        Ok(definitions)
    }
}

async fn write_definitions(
    txn: &mut neo4rs::Txn,
    ontology_id: &str,
    entities: &[EntityDefinition],
    relationships: &[RelationshipDefinition],
) -> Result<(), OntologyError> {
    for entity in entities {
        txn.run(
            query(
                "MATCH (o:Ontology {id: $ontologyId}) \
                 CREATE (e:EntityDefinition {type: $type, description: $description, \
                         examples: $examples, color: $color}) \
                 CREATE (o)-[:DEFINES]->(e)",
            )
            .param("ontologyId", ontology_id.to_string())
            .param("type", entity.entity_type.clone())
            .param("description", entity.description.clone())
            .param("examples", entity.examples.clone())
            .param(
                "color",
                entity
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ENTITY_COLOR.to_string()),
            ),
        )
        .await?;
    }

    for rel in relationships {
        txn.run(
            query(
                "MATCH (o:Ontology {id: $ontologyId}) \
                 CREATE (r:RelationshipDefinition {type: $type, description: $description, \
                         fromType: $fromType, toType: $toType}) \
                 CREATE (o)-[:DEFINES]->(r)",
            )
            .param("ontologyId", ontology_id.to_string())
            .param("type", rel.relationship_type.clone())
            .param("description", rel.description.clone())
            .param("fromType", rel.from_type.clone().unwrap_or_default())
            .param("toType", rel.to_type.clone().unwrap_or_default()),
        )
        .await?;
    }

    Ok(())
}

fn decode<T>(value: Result<T, neo4rs::DeError>) -> Result<T, OntologyError> {
    value.map_err(|e| OntologyError::Decode(e.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
