//! Knowledge Panel - derives what to render from the snapshot, the navigation
//! state and the current conversation signals.

use std::collections::BTreeSet;

use security_kb::{display_name, KnowledgeError, KnowledgeSnapshot, PanelConfig, Result};

use crate::activation::{ActivationMatcher, ActivationSignals};
use crate::navigation::{NavigationError, NavigationMode, NavigationState};
use crate::relationship_index::RelationshipIndex;
use crate::views::{
    ActiveKindSummary, ActiveRelationships, CategorySummary, Direction, EntityListing, PanelView,
    RelationshipSection, RelationshipView,
};

/// One mounted panel instance over one snapshot.
#[derive(Debug, Clone)]
pub struct KnowledgePanel {
    snapshot: KnowledgeSnapshot,
    config: PanelConfig,
    navigation: NavigationState,
    signals: ActivationSignals,
    /// Open category cards, by category name.
    expanded: BTreeSet<String>,
}

impl KnowledgePanel {
    /// Mount a panel at the category list.
    pub fn new(snapshot: KnowledgeSnapshot, config: PanelConfig) -> Self {
        Self {
            snapshot,
            config,
            navigation: NavigationState::new(),
            signals: ActivationSignals::new(),
            expanded: BTreeSet::new(),
        }
    }

    /// Mount a panel with default configuration.
    pub fn with_defaults(snapshot: KnowledgeSnapshot) -> Self {
        Self::new(snapshot, PanelConfig::default())
    }

    pub fn snapshot(&self) -> &KnowledgeSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn index(&self) -> RelationshipIndex<'_> {
        RelationshipIndex::new(&self.snapshot)
    }

    pub fn matcher(&self) -> ActivationMatcher<'_> {
        ActivationMatcher::new(self.index())
    }

    pub fn signals(&self) -> &ActivationSignals {
        &self.signals
    }

    /// Replace the conversation signals.
    pub fn set_signals(&mut self, signals: ActivationSignals) {
        self.signals = signals;
        self.seed_expanded();
    }

    /// Add the signals found in a chat message to the current set.
    pub fn observe_message(&mut self, text: &str) {
        let found = ActivationSignals::from_message(text, self.config.min_signal_len);
        tracing::debug!(tokens = found.len(), "Observed chat message");
        self.signals.merge(&found);
        self.seed_expanded();
    }

    /// Open or close a category card. Returns the new expanded state.
    pub fn toggle_category(&mut self, name: &str) -> Result<bool> {
        let Some(category) = self.snapshot.category(name) else {
            return Err(KnowledgeError::UnknownCategory(name.to_string()));
        };

        let expanded = if self.expanded.remove(name) {
            false
        } else {
            self.expanded.insert(category.name.clone());
            true
        };
        tracing::debug!(category = name, expanded, "Toggled category");
        Ok(expanded)
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    /// Replace the open cards with the categories the signals name exactly.
    ///
    /// A signal set that names no entity leaves the user's choices alone.
    fn seed_expanded(&mut self) {
        if !self.config.expand_active_categories {
            return;
        }
        let seeded: BTreeSet<String> = self
            .matcher()
            .expanded_categories(&self.signals)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !seeded.is_empty() {
            self.expanded = seeded;
        }
    }

    pub fn current_navigation_state(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn select_category(&mut self, name: &str) -> std::result::Result<(), NavigationError> {
        let index = RelationshipIndex::new(&self.snapshot);
        self.navigation.select_category(&index, name)
    }

    pub fn select_entity(&mut self, name: &str) -> std::result::Result<(), NavigationError> {
        let index = RelationshipIndex::new(&self.snapshot);
        self.navigation.select_entity(&index, name)
    }

    pub fn go_back(&mut self) {
        self.navigation.go_back();
    }

    /// Category cards in payload order.
    pub fn list_categories(&self) -> Vec<CategorySummary<'_>> {
        self.snapshot
            .categories()
            .iter()
            .map(|c| CategorySummary {
                name: c.name.as_str(),
                display_name: display_name(&c.name),
                entity_count: c.entities.len(),
                expanded: self.is_expanded(&c.name),
            })
            .collect()
    }

    /// Entity rows of a category with their relationship hints.
    pub fn list_entities(&self, category: &str) -> Result<Vec<EntityListing<'_>>> {
        let index = self.index();
        let entities = index.entities_in(category)?;

        Ok(entities
            .iter()
            .map(|name| EntityListing {
                name: name.as_str(),
                has_relationships: index.has_any_relationship(name),
                has_direct_relationships: index.has_direct_relationships(name),
                active: self.matcher().is_active(name, &self.signals),
            })
            .collect())
    }

    /// Forward and reverse sections for every kind, in payload order, with
    /// the entities matched by the current signals marked.
    ///
    /// Fails with [`KnowledgeError::UnknownEntity`] for a name that is neither
    /// categorized nor referenced by any relationship.
    pub fn relationships_for<'s>(&'s self, entity: &str) -> Result<RelationshipView<'s>> {
        let index = self.index();
        let Some(name) = self.resolve_entity(entity) else {
            return Err(KnowledgeError::UnknownEntity {
                category: None,
                entity: entity.to_string(),
            });
        };

        let matcher = self.matcher();
        let section = |kind: &'s str, direction, label, entities: Vec<&'s str>| {
            let active_entities = entities
                .iter()
                .copied()
                .filter(|e| matcher.is_active(e, &self.signals))
                .collect();
            RelationshipSection {
                kind,
                direction,
                label,
                entities,
                active_entities,
            }
        };

        let mut sections = Vec::new();
        for kind in self.snapshot.kinds() {
            let labels = self.config.labels_for(kind.name());

            let forward = index.forward(kind.name(), name);
            if !forward.is_empty() {
                sections.push(section(
                    kind.name(),
                    Direction::Forward,
                    labels.forward_label.clone(),
                    forward.iter().map(String::as_str).collect(),
                ));
            }

            let reverse = index.reverse_subjects(kind.name(), name);
            if !reverse.is_empty() {
                sections.push(section(
                    kind.name(),
                    Direction::Reverse,
                    labels.reverse_label,
                    reverse,
                ));
            }
        }

        Ok(RelationshipView {
            entity: name,
            category: index.category_of(name),
            sections,
            has_any: index.has_any_relationship(name),
            active: matcher.is_active(name, &self.signals),
        })
    }

    /// Activation-filtered relationships for the current signals.
    pub fn active_relationships(&self) -> ActiveRelationships<'_> {
        if self.signals.is_empty() {
            return ActiveRelationships::default();
        }

        let matcher = self.matcher();
        let kinds = self
            .snapshot
            .kinds()
            .iter()
            .map(|kind| {
                let labels = self.config.labels_for(kind.name());
                ActiveKindSummary {
                    kind: kind.name(),
                    forward_label: labels.forward_label,
                    reverse_label: labels.reverse_label,
                    active_subjects: matcher.active_subjects_for(kind.name(), &self.signals),
                    related_to_active: matcher
                        .entities_that_relate_to_active(kind.name(), &self.signals),
                }
            })
            .filter(|summary| !summary.is_empty())
            .collect();

        ActiveRelationships { kinds }
    }

    /// The view selected by the navigation state.
    pub fn current_view(&self) -> Result<PanelView<'_>> {
        match self.navigation.mode() {
            NavigationMode::Categories => Ok(PanelView::Categories(self.list_categories())),
            NavigationMode::EntitiesInCategory => {
                let category = self.selected_category_key()?;
                Ok(PanelView::Entities {
                    category,
                    display_name: display_name(category),
                    entities: self.list_entities(category)?,
                })
            }
            NavigationMode::RelationshipsForEntity => {
                let entity = self.navigation.selected_entity().unwrap_or_default();
                Ok(PanelView::Relationships(self.relationships_for(entity)?))
            }
        }
    }

    /// Borrow the entity name from the snapshot so views do not outlive it.
    fn resolve_entity(&self, entity: &str) -> Option<&str> {
        let categorized = self
            .snapshot
            .categories()
            .iter()
            .flat_map(|c| c.entities.iter());
        let referenced = self
            .snapshot
            .kinds()
            .iter()
            .flat_map(|k| k.subjects().iter())
            .flat_map(|s| std::iter::once(&s.subject).chain(s.related.iter()));

        categorized
            .chain(referenced)
            .find(|name| name.as_str() == entity)
            .map(String::as_str)
    }

    fn selected_category_key(&self) -> Result<&str> {
        let selected = self.navigation.selected_category().unwrap_or_default();
        self.snapshot
            .category(selected)
            .map(|c| c.name.as_str())
            .ok_or_else(|| KnowledgeError::UnknownCategory(selected.to_string()))
    }
}
