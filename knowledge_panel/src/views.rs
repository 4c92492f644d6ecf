//! Presentation-facing results. Rendering is left to the caller; these are
//! what it renders.

use serde::Serialize;

use crate::activation::{ActiveSubject, RelatedToActive};

/// One card in the category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary<'a> {
    pub name: &'a str,
    pub display_name: String,
    pub entity_count: usize,
    /// Card is open. Seeded from the signals, flipped by the user.
    pub expanded: bool,
}

/// One row in the entity list of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityListing<'a> {
    pub name: &'a str,
    /// "Has relationships" badge: subject or object anywhere.
    pub has_relationships: bool,
    /// Subject with a non-empty forward list somewhere.
    pub has_direct_relationships: bool,
    pub active: bool,
}

/// Which way a section reads relative to the stored relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Stored direction, e.g. "SQLInjection is mitigated by InputValidation".
    Forward,
    /// Derived direction, e.g. "InputValidation mitigates SQLInjection".
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipSection<'a> {
    pub kind: &'a str,
    pub direction: Direction,
    pub label: String,
    pub entities: Vec<&'a str>,
    /// The subset of `entities` matched by the current signals, in order.
    pub active_entities: Vec<&'a str>,
}

impl RelationshipSection<'_> {
    pub fn is_entity_active(&self, entity: &str) -> bool {
        self.active_entities.iter().any(|e| *e == entity)
    }
}

/// Everything known about one entity's relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipView<'a> {
    pub entity: &'a str,
    /// `None` for entities that only appear inside relationships.
    pub category: Option<&'a str>,
    pub sections: Vec<RelationshipSection<'a>>,
    pub has_any: bool,
    /// The selected entity itself matches the current signals.
    pub active: bool,
}

impl RelationshipView<'_> {
    pub fn section(&self, kind: &str, direction: Direction) -> Option<&RelationshipSection<'_>> {
        self.sections
            .iter()
            .find(|s| s.kind == kind && s.direction == direction)
    }
}

/// Activation results for one relationship kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveKindSummary<'a> {
    pub kind: &'a str,
    pub forward_label: String,
    pub reverse_label: String,
    pub active_subjects: Vec<ActiveSubject<'a>>,
    pub related_to_active: Vec<RelatedToActive<'a>>,
}

impl ActiveKindSummary<'_> {
    pub fn is_empty(&self) -> bool {
        self.active_subjects.is_empty() && self.related_to_active.is_empty()
    }
}

/// The side panel's "Relationships" footer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ActiveRelationships<'a> {
    pub kinds: Vec<ActiveKindSummary<'a>>,
}

impl ActiveRelationships<'_> {
    pub fn is_empty(&self) -> bool {
        self.kinds.iter().all(ActiveKindSummary::is_empty)
    }
}

/// What the explorer shows for the current navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PanelView<'a> {
    Categories(Vec<CategorySummary<'a>>),
    Entities {
        category: &'a str,
        display_name: String,
        entities: Vec<EntityListing<'a>>,
    },
    Relationships(RelationshipView<'a>),
}
