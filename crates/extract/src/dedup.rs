//! Deterministic post-extraction canonicalization. The prompt already
//! instructs the model to collapse name variants to one entity id, but
//! correctness must not depend on model compliance: this pass merges
//! near-duplicate entities and remaps relationship endpoints.

use regex::Regex;
use std::collections::HashMap;

use crate::schema::ExtractedData;

pub struct Canonicalizer {
    punctuation: Regex,
    whitespace: Regex,
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self {
            punctuation: Regex::new(r"[.,!?;:']").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Merge entities whose names normalize to the same referent. The first
    /// occurrence wins: its id, name, and metadata are kept. Relationship
    /// endpoints are remapped to the surviving ids; self-loops produced by a
    /// merge are dropped.
    pub fn apply(&self, data: &mut ExtractedData) {
        // normalized key -> surviving entity id
        let mut canonical_by_key: HashMap<String, String> = HashMap::new();
        // original entity id -> surviving entity id
        let mut id_remap: HashMap<String, String> = HashMap::new();

        let mut survivors = Vec::with_capacity(data.entities.len());
        for entity in data.entities.drain(..) {
            let key = self.normalize(&entity.name);

            let existing = canonical_by_key.get(&key).cloned().or_else(|| {
                canonical_by_key
                    .iter()
                    .find(|(seen, _)| are_similar(&key, seen))
                    .map(|(_, id)| id.clone())
            });

            match existing {
                Some(canonical_id) => {
                    tracing::debug!(
                        merged = %entity.name,
                        into = %canonical_id,
                        "Merged duplicate entity"
                    );
                    id_remap.insert(entity.id.clone(), canonical_id.clone());
                    canonical_by_key.insert(key, canonical_id);
                }
                None => {
                    id_remap.insert(entity.id.clone(), entity.id.clone());
                    canonical_by_key.insert(key, entity.id.clone());
                    survivors.push(entity);
                }
            }
        }
        data.entities = survivors;

        for rel in &mut data.relationships {
            if let Some(canonical) = id_remap.get(&rel.from) {
                rel.from = canonical.clone();
            }
            if let Some(canonical) = id_remap.get(&rel.to) {
                rel.to = canonical.clone();
            }
        }
        data.relationships.retain(|rel| rel.from != rel.to);
    }

    /// Lowercase, strip punctuation, collapse whitespace.
    fn normalize(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let stripped = self.punctuation.replace_all(lowered.trim(), "");
        self.whitespace
            .replace_all(stripped.trim(), " ")
            .to_string()
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Two normalized names refer to the same entity when one contains the other
/// (handles honorifics and suffixes) or, for multi-word names, when most of
/// their words overlap.
fn are_similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    if a.contains(b) || b.contains(a) {
        return true;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    if words_a.len() > 1 && words_b.len() > 1 {
        let common = words_a.iter().filter(|w| words_b.contains(w)).count();
        let total = words_a.len().max(words_b.len());
        return common as f64 / total as f64 > 0.7;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Entity, Relationship};

    fn entity(id: &str, name: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: name.to_string(),
            entity_type: "Person".to_string(),
            description: None,
            sentiment: None,
            importance: None,
        }
    }

    fn relationship(from: &str, to: &str) -> Relationship {
        Relationship {
            from: from.to_string(),
            to: to.to_string(),
            relationship_type: "knows".to_string(),
            description: None,
            strength: None,
        }
    }

    fn data(entities: Vec<Entity>, relationships: Vec<Relationship>) -> ExtractedData {
        ExtractedData {
            summary: String::new(),
            entities,
            relationships,
        }
    }

    #[test]
    fn merges_case_and_punctuation_variants() {
        let mut d = data(
            vec![entity("john", "John"), entity("john-2", "john!")],
            vec![],
        );
        Canonicalizer::new().apply(&mut d);
        assert_eq!(d.entities.len(), 1);
        assert_eq!(d.entities[0].id, "john");
        assert_eq!(d.entities[0].name, "John");
    }

    #[test]
    fn merges_honorific_variant_by_containment() {
        let mut d = data(
            vec![entity("smith", "Smith"), entity("dr-smith", "Dr. Smith")],
            vec![],
        );
        Canonicalizer::new().apply(&mut d);
        assert_eq!(d.entities.len(), 1);
        assert_eq!(d.entities[0].id, "smith");
    }

    #[test]
    fn remaps_relationship_endpoints_after_merge() {
        let mut d = data(
            vec![
                entity("acme", "Acme Corp"),
                entity("acme-corp", "acme corp."),
                entity("jane", "Jane"),
            ],
            vec![relationship("jane", "acme-corp")],
        );
        Canonicalizer::new().apply(&mut d);
        assert_eq!(d.entities.len(), 2);
        assert_eq!(d.relationships.len(), 1);
        assert_eq!(d.relationships[0].to, "acme");
    }

    #[test]
    fn drops_self_loops_created_by_merge() {
        let mut d = data(
            vec![entity("nan", "Nan"), entity("pee-nan", "Pee Nan")],
            vec![relationship("nan", "pee-nan")],
        );
        Canonicalizer::new().apply(&mut d);
        assert_eq!(d.entities.len(), 1);
        assert!(d.relationships.is_empty());
    }

    #[test]
    fn keeps_distinct_entities_apart() {
        let mut d = data(
            vec![
                entity("alice-cooper", "Alice Cooper"),
                entity("bob-marley", "Bob Marley"),
            ],
            vec![relationship("alice-cooper", "bob-marley")],
        );
        Canonicalizer::new().apply(&mut d);
        assert_eq!(d.entities.len(), 2);
        assert_eq!(d.relationships.len(), 1);
    }
}
