//! Panel configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KnowledgeError, Result};
use crate::labels::KindLabels;

/// Configuration for the knowledge panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Where the transport collaborator fetches the payload from.
    #[serde(default = "default_knowledge_endpoint")]
    pub knowledge_endpoint: String,

    /// Shortest token kept when extracting signals from a chat message.
    #[serde(default = "default_min_signal_len")]
    pub min_signal_len: usize,

    /// Mark categories holding an active entity as expanded.
    #[serde(default = "default_expand_active_categories")]
    pub expand_active_categories: bool,

    #[serde(default = "KindLabels::builtin")]
    pub kinds: Vec<KindLabels>,
}

fn default_knowledge_endpoint() -> String {
    "/knowledge".to_string()
}

fn default_min_signal_len() -> usize {
    3
}

fn default_expand_active_categories() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            knowledge_endpoint: default_knowledge_endpoint(),
            min_signal_len: default_min_signal_len(),
            expand_active_categories: default_expand_active_categories(),
            kinds: KindLabels::builtin(),
        }
    }
}

impl PanelConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let config: PanelConfig = toml::from_str(doc)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|e| {
            KnowledgeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&doc)?;
        tracing::info!(path = %path.display(), "Panel configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.min_signal_len == 0 {
            return Err(KnowledgeError::Config(
                "min_signal_len must be at least 1".to_string(),
            ));
        }
        for (i, labels) in self.kinds.iter().enumerate() {
            if self.kinds[..i].iter().any(|l| l.kind == labels.kind) {
                return Err(KnowledgeError::Config(format!(
                    "duplicate labels for kind '{}'",
                    labels.kind
                )));
            }
        }
        Ok(())
    }

    /// Labels for a relationship kind, derived from its name when unconfigured.
    pub fn labels_for(&self, kind: &str) -> KindLabels {
        self.kinds
            .iter()
            .find(|l| l.kind == kind)
            .cloned()
            .unwrap_or_else(|| KindLabels::derived(kind))
    }
}
