pub mod article_types;
pub mod registry;
pub mod types;

pub use article_types::{ArticleType, ArticleTypeConfig, article_type_config};
pub use registry::OntologyRegistry;
pub use types::{EntityDefinition, Ontology, OntologyDraft, RelationshipDefinition};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("invalid ontology: {0}")]
    Validation(String),

    #[error("ontology not found: {0}")]
    NotFound(String),

    #[error("graph store error: {0}")]
    Store(#[from] neo4rs::Error),

    #[error("failed to decode ontology row: {0}")]
    Decode(String),
}
