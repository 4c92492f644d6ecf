//! Activation signals - lowercase tokens taken from the conversation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Common words dropped by [`ActivationSignals::from_message`]. Under the
/// containment rule "the" alone would activate `CredentialTheft`.
pub const STOPWORDS: &[&str] = &[
    "about", "all", "and", "any", "are", "but", "can", "does", "for", "from", "has", "have",
    "how", "into", "its", "not", "our", "that", "the", "their", "there", "this", "was", "what",
    "when", "where", "which", "who", "why", "with", "you", "your",
];

/// An unordered set of lowercase free-text tokens.
///
/// Tokens are lowercased on insert, so callers may pass raw topic strings.
/// Deserialization goes through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "StoredSignals")]
pub struct ActivationSignals {
    tokens: BTreeSet<String>,
}

#[derive(Deserialize)]
struct StoredSignals {
    #[serde(default)]
    tokens: Vec<String>,
}

impl From<StoredSignals> for ActivationSignals {
    fn from(stored: StoredSignals) -> Self {
        stored.tokens.into_iter().collect()
    }
}

impl ActivationSignals {
    /// Create an empty signal set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract signals from a chat message.
    ///
    /// Splits on anything that is not alphanumeric, keeps tokens of at least
    /// `min_len` characters and drops [`STOPWORDS`].
    pub fn from_message(text: &str, min_len: usize) -> Self {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() >= min_len)
            .map(str::to_lowercase)
            .filter(|token| !STOPWORDS.contains(&token.as_str()))
            .collect()
    }

    /// Add a token (lowercased). Empty tokens are ignored.
    pub fn insert(&mut self, token: impl AsRef<str>) {
        let token = token.as_ref().trim().to_lowercase();
        if !token.is_empty() {
            self.tokens.insert(token);
        }
    }

    /// Exact membership of an already-lowercased name.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Merge another signal set into this one.
    pub fn merge(&mut self, other: &ActivationSignals) {
        self.tokens.extend(other.tokens.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

impl<S: AsRef<str>> FromIterator<S> for ActivationSignals {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut signals = Self::new();
        signals.extend(iter);
        signals
    }
}

impl<S: AsRef<str>> Extend<S> for ActivationSignals {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for token in iter {
            self.insert(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_lowercased() {
        let signals: ActivationSignals = ["SQL", "Phishing"].into_iter().collect();
        assert!(signals.contains("sql"));
        assert!(signals.contains("phishing"));
        assert!(!signals.contains("SQL"));
    }

    #[test]
    fn test_set_semantics() {
        let signals: ActivationSignals = ["waf", "WAF", " waf "].into_iter().collect();
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn test_empty_tokens_ignored() {
        let mut signals = ActivationSignals::new();
        signals.insert("");
        signals.insert("   ");
        assert!(signals.is_empty());
    }

    #[test]
    fn test_from_message() {
        let signals =
            ActivationSignals::from_message("How can I protect against SQL-injection attacks?", 3);

        assert!(signals.contains("sql"));
        assert!(signals.contains("injection"));
        assert!(signals.contains("protect"));
        // Shorter than the minimum
        assert!(!signals.contains("i"));
        // Stopwords
        assert!(!signals.contains("how"));
        assert!(!signals.contains("can"));

        let strict = ActivationSignals::from_message("How can I stop SQL injection?", 4);
        assert!(!strict.contains("sql"));
        assert!(strict.contains("stop"));
    }

    #[test]
    fn test_from_message_drops_stopwords() {
        let signals = ActivationSignals::from_message("What is the best firewall?", 3);
        assert_eq!(signals.iter().collect::<Vec<_>>(), vec!["best", "firewall"]);

        let upper = ActivationSignals::from_message("THE WAF", 3);
        assert_eq!(upper.iter().collect::<Vec<_>>(), vec!["waf"]);
    }

    #[test]
    fn test_deserialize_normalizes_tokens() {
        let signals: ActivationSignals =
            serde_json::from_value(serde_json::json!({ "tokens": ["WAF", " Siem ", ""] })).unwrap();
        assert_eq!(signals.iter().collect::<Vec<_>>(), vec!["siem", "waf"]);

        let round: ActivationSignals =
            serde_json::from_value(serde_json::to_value(&signals).unwrap()).unwrap();
        assert_eq!(round, signals);
    }

    #[test]
    fn test_merge_and_clear() {
        let mut a: ActivationSignals = ["ids"].into_iter().collect();
        let b: ActivationSignals = ["ips", "ids"].into_iter().collect();

        a.merge(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["ids", "ips"]);

        a.clear();
        assert!(a.is_empty());
    }
}
