//! Relationship Index - forward, reverse and existence queries over a snapshot.
//!
//! The payload stores only "X mitigated-by Y". This layer synthesizes the
//! inverse view ("Y mitigates X") on demand. Every query is total: absent
//! kinds, subjects or objects produce empty results, never errors. Only the
//! category accessors can fail.

use security_kb::{KnowledgeError, KnowledgeSnapshot, Result};

/// Stateless query layer borrowing an immutable snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipIndex<'a> {
    snapshot: &'a KnowledgeSnapshot,
}

impl<'a> RelationshipIndex<'a> {
    pub fn new(snapshot: &'a KnowledgeSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a KnowledgeSnapshot {
        self.snapshot
    }

    /// Stored related entities for `subject` under `kind`.
    pub fn forward(&self, kind: &str, subject: &str) -> &'a [String] {
        self.snapshot
            .kind(kind)
            .and_then(|k| k.related_to(subject))
            .unwrap_or(&[])
    }

    /// Every subject whose forward list under `kind` contains `object`,
    /// in the order subjects appear in the payload.
    pub fn reverse_subjects(&self, kind: &str, object: &str) -> Vec<&'a str> {
        let Some(kind) = self.snapshot.kind(kind) else {
            return Vec::new();
        };

        let subjects: Vec<&'a str> = kind
            .subjects()
            .iter()
            .filter(|entry| entry.related.iter().any(|r| r == object))
            .map(|entry| entry.subject.as_str())
            .collect();

        tracing::debug!(kind = kind.name(), object, matches = subjects.len(), "Reverse lookup");
        subjects
    }

    /// True if `entity` is a subject or an object in any kind.
    pub fn has_any_relationship(&self, entity: &str) -> bool {
        self.snapshot.kinds().iter().any(|kind| {
            kind.has_subject(entity)
                || kind
                    .subjects()
                    .iter()
                    .any(|entry| entry.related.iter().any(|r| r == entity))
        })
    }

    /// True only if `entity` is a subject with a non-empty forward list in
    /// at least one kind.
    pub fn has_direct_relationships(&self, entity: &str) -> bool {
        self.snapshot
            .kinds()
            .iter()
            .any(|kind| kind.related_to(entity).is_some_and(|r| !r.is_empty()))
    }

    /// Category names in payload order.
    pub fn all_categories(&self) -> Vec<&'a str> {
        self.snapshot
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Entities of a category. An empty category yields an empty slice; a
    /// missing one fails with [`KnowledgeError::UnknownCategory`].
    pub fn entities_in(&self, category: &str) -> Result<&'a [String]> {
        self.snapshot
            .category(category)
            .map(|c| c.entities.as_slice())
            .ok_or_else(|| KnowledgeError::UnknownCategory(category.to_string()))
    }

    /// First category listing `entity`, `None` for dangling references.
    pub fn category_of(&self, entity: &str) -> Option<&'a str> {
        self.snapshot
            .categories()
            .iter()
            .find(|c| c.contains(entity))
            .map(|c| c.name.as_str())
    }

    /// Check if the entity is known at all, either categorized or referenced
    /// by some relationship.
    pub fn is_known_entity(&self, entity: &str) -> bool {
        self.snapshot.is_categorized(entity) || self.has_any_relationship(entity)
    }

    /// Relationship kind names in payload order.
    pub fn kinds(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.snapshot.kinds().iter().map(|k| k.name())
    }
}
