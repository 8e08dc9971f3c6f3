use std::sync::Arc;

use extract::Extractor;
use graphstore::GraphStore;
use narrate::NarrationClient;
use ontology::OntologyRegistry;

use crate::cache::AnswerCache;
use crate::metrics::Metrics;

pub struct AppState {
    pub store: GraphStore,
    pub ontologies: OntologyRegistry,
    pub extractor: Extractor,
    pub narrator: NarrationClient,
    pub cache: AnswerCache,
    pub metrics: Arc<Metrics>,
}

pub type SharedState = Arc<AppState>;
