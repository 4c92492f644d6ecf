//! Activation matcher - which known entities the conversation touches.
//!
//! Matching is bidirectional, case-insensitive substring containment: an
//! entity is active for a signal when either string contains the other.
//! Short signals such as "ip" light up many entities.

use serde::Serialize;

use super::ActivationSignals;
use crate::relationship_index::RelationshipIndex;

/// A subject whose own name is active, with its stored forward list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSubject<'a> {
    pub subject: &'a str,
    pub related: &'a [String],
}

/// An active related entity and the subjects whose forward lists name it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedToActive<'a> {
    pub entity: &'a str,
    pub subjects: Vec<&'a str>,
}

/// Check if `entity` matches any signal under the containment rule.
///
/// An empty signal set never activates anything.
pub fn is_active(entity: &str, signals: &ActivationSignals) -> bool {
    if signals.is_empty() {
        return false;
    }
    let entity = entity.to_lowercase();
    signals.iter().any(|signal| {
        let signal = signal.to_lowercase();
        entity.contains(&signal) || signal.contains(&entity)
    })
}

/// Activation queries bound to one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ActivationMatcher<'a> {
    index: RelationshipIndex<'a>,
}

impl<'a> ActivationMatcher<'a> {
    pub fn new(index: RelationshipIndex<'a>) -> Self {
        Self { index }
    }

    pub fn is_active(&self, entity: &str, signals: &ActivationSignals) -> bool {
        is_active(entity, signals)
    }

    /// Subjects of `kind` whose names are active, in payload order.
    pub fn active_subjects_for(
        &self,
        kind: &str,
        signals: &ActivationSignals,
    ) -> Vec<ActiveSubject<'a>> {
        let Some(kind) = self.index.snapshot().kind(kind) else {
            return Vec::new();
        };

        kind.subjects()
            .iter()
            .filter(|entry| is_active(&entry.subject, signals))
            .map(|entry| ActiveSubject {
                subject: entry.subject.as_str(),
                related: entry.related.as_slice(),
            })
            .collect()
    }

    /// Active entities that appear in some forward list of `kind`, each with
    /// the subjects naming it.
    ///
    /// Answers "what does this active defense mitigate". Entities are ordered
    /// by first appearance while walking subjects and their lists in payload
    /// order.
    pub fn entities_that_relate_to_active(
        &self,
        kind: &str,
        signals: &ActivationSignals,
    ) -> Vec<RelatedToActive<'a>> {
        let Some(stored) = self.index.snapshot().kind(kind) else {
            return Vec::new();
        };

        let mut out: Vec<RelatedToActive<'a>> = Vec::new();
        for entry in stored.subjects() {
            for related in &entry.related {
                if out.iter().any(|r| r.entity == related) || !is_active(related, signals) {
                    continue;
                }
                out.push(RelatedToActive {
                    entity: related.as_str(),
                    subjects: self.index.reverse_subjects(kind, related),
                });
            }
        }

        tracing::debug!(kind, active = out.len(), "Collected entities relating to active signals");
        out
    }

    /// Categories holding an entity whose lowercased name is exactly one of
    /// the signals.
    pub fn expanded_categories(&self, signals: &ActivationSignals) -> Vec<&'a str> {
        self.index
            .snapshot()
            .categories()
            .iter()
            .filter(|c| c.entities.iter().any(|e| signals.contains(&e.to_lowercase())))
            .map(|c| c.name.as_str())
            .collect()
    }
}
