use thiserror::Error;

/// Errors produced while loading or navigating the knowledge snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// Payload is missing a required key or has the wrong shape.
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Category key absent from the snapshot.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Entity absent from the selected category, or from the whole snapshot
    /// when `category` is `None`.
    #[error("Unknown entity '{entity}'{}", category_suffix(.category))]
    UnknownEntity {
        category: Option<String>,
        entity: String,
    },

    /// The transport collaborator could not deliver the payload.
    #[error("Failed to load knowledge base data: {0}")]
    LoadFailed(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for KnowledgeError {
    fn from(err: serde_json::Error) -> Self {
        KnowledgeError::MalformedSnapshot(err.to_string())
    }
}

impl From<toml::de::Error> for KnowledgeError {
    fn from(err: toml::de::Error) -> Self {
        KnowledgeError::Config(err.to_string())
    }
}

fn category_suffix(category: &Option<String>) -> String {
    category
        .as_ref()
        .map(|c| format!(" in {}", c))
        .unwrap_or_default()
}

/// Convenient Result type using KnowledgeError
pub type Result<T> = std::result::Result<T, KnowledgeError>;
