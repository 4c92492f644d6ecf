//! Drill-down navigation: categories → entities in a category → relationships
//! for one entity.
//!
//! The state is an explicit value owned by the panel. Rejected actions leave
//! it untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relationship_index::RelationshipIndex;
use security_kb::{display_name, KnowledgeError};

/// Which view is displayed, ordered by drill-down depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NavigationMode {
    Categories,
    EntitiesInCategory,
    RelationshipsForEntity,
}

impl NavigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::Categories => "categories",
            NavigationMode::EntitiesInCategory => "entities",
            NavigationMode::RelationshipsForEntity => "relationships",
        }
    }
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a navigation action was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// `UnknownCategory` or `UnknownEntity` for the current snapshot.
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// The action is not available from the current view.
    #[error("Cannot {action} from the {mode} view")]
    InvalidTransition {
        mode: NavigationMode,
        action: &'static str,
    },
}

/// Current view and selections.
///
/// `selected_entity` implies `selected_category`; `Categories` implies
/// neither is set. Deserialized states are checked against the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredNavigation")]
pub struct NavigationState {
    mode: NavigationMode,
    selected_category: Option<String>,
    selected_entity: Option<String>,
}

#[derive(Deserialize)]
struct StoredNavigation {
    mode: NavigationMode,
    #[serde(default)]
    selected_category: Option<String>,
    #[serde(default)]
    selected_entity: Option<String>,
}

impl TryFrom<StoredNavigation> for NavigationState {
    type Error = String;

    fn try_from(stored: StoredNavigation) -> Result<Self, Self::Error> {
        let valid = match stored.mode {
            NavigationMode::Categories => {
                stored.selected_category.is_none() && stored.selected_entity.is_none()
            }
            NavigationMode::EntitiesInCategory => {
                stored.selected_category.is_some() && stored.selected_entity.is_none()
            }
            NavigationMode::RelationshipsForEntity => {
                stored.selected_category.is_some() && stored.selected_entity.is_some()
            }
        };
        if !valid {
            return Err(format!("selections do not match the {} view", stored.mode));
        }

        Ok(Self {
            mode: stored.mode,
            selected_category: stored.selected_category,
            selected_entity: stored.selected_entity,
        })
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    /// Start at the category list.
    pub fn new() -> Self {
        Self {
            mode: NavigationMode::Categories,
            selected_category: None,
            selected_entity: None,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    pub fn selected_entity(&self) -> Option<&str> {
        self.selected_entity.as_deref()
    }

    /// Open a category from the category list.
    pub fn select_category(
        &mut self,
        index: &RelationshipIndex<'_>,
        name: &str,
    ) -> Result<(), NavigationError> {
        if self.mode != NavigationMode::Categories {
            return Err(self.reject("select a category"));
        }
        if let Err(err) = index.entities_in(name) {
            tracing::warn!(category = name, "Rejected navigation to unknown category");
            return Err(err.into());
        }

        self.mode = NavigationMode::EntitiesInCategory;
        self.selected_category = Some(name.to_string());
        tracing::info!(category = name, "Navigated to category");
        Ok(())
    }

    /// Open an entity of the selected category.
    pub fn select_entity(
        &mut self,
        index: &RelationshipIndex<'_>,
        name: &str,
    ) -> Result<(), NavigationError> {
        if self.mode != NavigationMode::EntitiesInCategory {
            return Err(self.reject("select an entity"));
        }
        let category = self.selected_category.as_deref().unwrap_or_default();
        let entities = index.entities_in(category)?;
        if !entities.iter().any(|e| e == name) {
            tracing::warn!(category, entity = name, "Rejected navigation to unknown entity");
            return Err(KnowledgeError::UnknownEntity {
                category: Some(category.to_string()),
                entity: name.to_string(),
            }
            .into());
        }

        self.mode = NavigationMode::RelationshipsForEntity;
        self.selected_entity = Some(name.to_string());
        tracing::info!(category, entity = name, "Navigated to entity");
        Ok(())
    }

    /// Step one level up. A no-op at the category list.
    pub fn go_back(&mut self) {
        match self.mode {
            NavigationMode::Categories => {}
            NavigationMode::EntitiesInCategory => {
                self.mode = NavigationMode::Categories;
                self.selected_category = None;
            }
            NavigationMode::RelationshipsForEntity => {
                self.mode = NavigationMode::EntitiesInCategory;
                self.selected_entity = None;
            }
        }
        tracing::debug!(mode = %self.mode, "Navigated back");
    }

    /// Return to the category list, clearing every selection.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Label for the back affordance of the current view.
    pub fn back_label(&self) -> Option<String> {
        match self.mode {
            NavigationMode::Categories => None,
            NavigationMode::EntitiesInCategory => Some("Categories".to_string()),
            NavigationMode::RelationshipsForEntity => {
                self.selected_category.as_deref().map(display_name)
            }
        }
    }

    fn reject(&self, action: &'static str) -> NavigationError {
        tracing::warn!(mode = %self.mode, action, "Rejected navigation action");
        NavigationError::InvalidTransition {
            mode: self.mode,
            action,
        }
    }
}
