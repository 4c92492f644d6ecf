//! Display labels for categories and relationship directions.

use serde::{Deserialize, Serialize};

use crate::snapshot::{DETECTED_BY, MITIGATED_BY};

/// Convert a PascalCase or camelCase key into spaced words.
///
/// `"ThreatEntity"` becomes `"Threat Entity"`. Only ASCII `A-Z` starts a
/// new word.
pub fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Labels shown for the two directions of one relationship kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindLabels {
    pub kind: String,
    /// Heading for the stored direction, e.g. "Mitigated By".
    pub forward_label: String,
    /// Heading for the derived direction, e.g. "Mitigates".
    pub reverse_label: String,
}

impl KindLabels {
    pub fn new(
        kind: impl Into<String>,
        forward_label: impl Into<String>,
        reverse_label: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            forward_label: forward_label.into(),
            reverse_label: reverse_label.into(),
        }
    }

    /// Labels for a kind with no configured entry.
    pub fn derived(kind: &str) -> Self {
        let forward = display_name(kind);
        let reverse = format!("Inverse of {}", forward);
        Self::new(kind, forward, reverse)
    }

    /// Labels for the two kinds every security payload carries.
    pub fn builtin() -> Vec<KindLabels> {
        vec![
            KindLabels::new(MITIGATED_BY, "Mitigated By", "Mitigates"),
            KindLabels::new(DETECTED_BY, "Detected By", "Detects"),
        ]
    }
}
