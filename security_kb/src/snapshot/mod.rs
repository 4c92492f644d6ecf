//! Knowledge Snapshot - the immutable session view of the knowledge base.
//!
//! A snapshot consists of:
//! - **Categories**: Ordered buckets of entity names (e.g. "ThreatEntity")
//! - **Relationship kinds**: Named directed relations (e.g. "MitigatedBy"),
//!   each an ordered mapping from subject to related entities
//!
//! Only the forward direction is stored. Reverse views are derived by the
//! engine crate.

mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::Result;

/// Relationship kind for "threat is mitigated by defense".
pub const MITIGATED_BY: &str = "MitigatedBy";

/// Relationship kind for "threat is detected by tool".
pub const DETECTED_BY: &str = "DetectedBy";

/// A named grouping of entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub entities: Vec<String>,
}

impl Category {
    /// Check if the category lists an entity (exact match).
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.iter().any(|e| e == entity)
    }
}

/// Stored forward list for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRelations {
    pub subject: String,
    pub related: Vec<String>,
}

/// All subjects of one relationship kind, in payload order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipKind {
    name: String,
    subjects: Vec<SubjectRelations>,
    subject_index: HashMap<String, usize>,
}

impl RelationshipKind {
    fn new(name: impl Into<String>, subjects: Vec<SubjectRelations>) -> Self {
        let subject_index = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (s.subject.clone(), i))
            .collect();
        Self {
            name: name.into(),
            subjects,
            subject_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subjects in payload order.
    pub fn subjects(&self) -> &[SubjectRelations] {
        &self.subjects
    }

    /// The stored related list for a subject, if the subject is present.
    pub fn related_to(&self, subject: &str) -> Option<&[String]> {
        self.subject_index
            .get(subject)
            .map(|&i| self.subjects[i].related.as_slice())
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject_index.contains_key(subject)
    }
}

/// The validated knowledge snapshot.
///
/// Constructed once per session from the delivered payload and never mutated
/// afterward. Iteration order of categories, entities, kinds and subjects is
/// the order of the payload document.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeSnapshot {
    categories: Vec<Category>,
    category_index: HashMap<String, usize>,
    kinds: Vec<RelationshipKind>,
    kind_index: HashMap<String, usize>,
}

impl KnowledgeSnapshot {
    /// Validate a payload document and build a snapshot from it.
    ///
    /// The document must be an object with an `entities` object of
    /// category → array of strings and a `relationships` object of
    /// kind → object of subject → array of strings. Anything else fails with
    /// [`KnowledgeError::MalformedSnapshot`](crate::KnowledgeError::MalformedSnapshot)
    /// and no snapshot is produced.
    pub fn load(payload: &Value) -> Result<Self> {
        let (categories, kinds) = validate::validate_payload(payload)?;
        let snapshot = Self::from_parts(categories, kinds);

        tracing::info!(
            categories = snapshot.categories.len(),
            entities = snapshot.entity_count(),
            kinds = snapshot.kinds.len(),
            "Knowledge snapshot loaded"
        );

        let dangling = snapshot.dangling_references();
        if !dangling.is_empty() {
            tracing::warn!(
                count = dangling.len(),
                "Relationships reference entities outside every category"
            );
        }

        Ok(snapshot)
    }

    /// Parse a JSON document and load it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let payload: Value = serde_json::from_str(json)?;
        Self::load(&payload)
    }

    fn from_parts(categories: Vec<Category>, kinds: Vec<RelationshipKind>) -> Self {
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        let kind_index = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| (k.name.clone(), i))
            .collect();
        Self {
            categories,
            category_index,
            kinds,
            kind_index,
        }
    }

    /// All categories in payload order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Get a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.category_index.get(name).map(|&i| &self.categories[i])
    }

    /// All relationship kinds in payload order.
    pub fn kinds(&self) -> &[RelationshipKind] {
        &self.kinds
    }

    /// Get a relationship kind by name.
    pub fn kind(&self, name: &str) -> Option<&RelationshipKind> {
        self.kind_index.get(name).map(|&i| &self.kinds[i])
    }

    /// Total number of entity listings across categories.
    pub fn entity_count(&self) -> usize {
        self.categories.iter().map(|c| c.entities.len()).sum()
    }

    /// Check if any category lists the entity.
    pub fn is_categorized(&self, entity: &str) -> bool {
        self.categories.iter().any(|c| c.contains(entity))
    }

    /// Names used as relationship subjects or objects that no category lists.
    ///
    /// Each name is reported once, in first-seen order.
    pub fn dangling_references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for kind in &self.kinds {
            for entry in &kind.subjects {
                let names = std::iter::once(&entry.subject).chain(entry.related.iter());
                for name in names {
                    if !self.is_categorized(name) && !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
            }
        }
        out
    }

    /// Publish the snapshot in the payload's own shape.
    pub fn to_json(&self) -> Value {
        let mut entities = Map::new();
        for category in &self.categories {
            entities.insert(
                category.name.clone(),
                Value::from(category.entities.clone()),
            );
        }

        let mut relationships = Map::new();
        for kind in &self.kinds {
            let mut subjects = Map::new();
            for entry in &kind.subjects {
                subjects.insert(entry.subject.clone(), Value::from(entry.related.clone()));
            }
            relationships.insert(kind.name.clone(), Value::Object(subjects));
        }

        let mut doc = Map::new();
        doc.insert("entities".to_string(), Value::Object(entities));
        doc.insert("relationships".to_string(), Value::Object(relationships));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnowledgeError;
    use serde_json::json;

    fn scenario() -> Value {
        json!({
            "entities": {
                "Threats": ["SQLInjection", "Phishing"],
                "Mitigations": ["InputValidation", "UserTraining"],
                "Empty": []
            },
            "relationships": {
                "MitigatedBy": {
                    "SQLInjection": ["InputValidation"],
                    "Phishing": ["UserTraining", "EmailFiltering"]
                },
                "DetectedBy": {}
            }
        })
    }

    #[test]
    fn test_load_preserves_order() {
        let snapshot = KnowledgeSnapshot::load(&scenario()).unwrap();

        let names: Vec<_> = snapshot.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Threats", "Mitigations", "Empty"]);

        let kind = snapshot.kind(MITIGATED_BY).unwrap();
        let subjects: Vec<_> = kind.subjects().iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["SQLInjection", "Phishing"]);
        assert_eq!(
            kind.related_to("Phishing").unwrap(),
            &["UserTraining".to_string(), "EmailFiltering".to_string()]
        );
    }

    #[test]
    fn test_load_missing_entities() {
        let result = KnowledgeSnapshot::load(&json!({ "relationships": {} }));
        assert!(matches!(result, Err(KnowledgeError::MalformedSnapshot(_))));
    }

    #[test]
    fn test_load_missing_relationships() {
        let result = KnowledgeSnapshot::load(&json!({ "entities": {} }));
        assert!(matches!(result, Err(KnowledgeError::MalformedSnapshot(_))));
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        let result = KnowledgeSnapshot::from_json_str("not a document");
        assert!(matches!(result, Err(KnowledgeError::MalformedSnapshot(_))));
    }

    #[test]
    fn test_empty_category_is_valid() {
        let snapshot = KnowledgeSnapshot::load(&scenario()).unwrap();
        let empty = snapshot.category("Empty").unwrap();
        assert!(empty.entities.is_empty());
        assert!(snapshot.category("Bogus").is_none());
    }

    #[test]
    fn test_dangling_references_tolerated() {
        let snapshot = KnowledgeSnapshot::load(&scenario()).unwrap();
        assert_eq!(snapshot.dangling_references(), vec!["EmailFiltering"]);
        assert!(!snapshot.is_categorized("EmailFiltering"));
    }

    #[test]
    fn test_to_json_matches_payload_shape() {
        let payload = scenario();
        let snapshot = KnowledgeSnapshot::load(&payload).unwrap();
        assert_eq!(snapshot.to_json(), payload);
    }

    #[test]
    fn test_entity_count() {
        let snapshot = KnowledgeSnapshot::load(&scenario()).unwrap();
        assert_eq!(snapshot.entity_count(), 4);
    }
}
