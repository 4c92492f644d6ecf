//! Panel loader - turns transport responses into a mounted panel.
//!
//! Every fetch gets a [`LoadTicket`] with a sequence number. A response is
//! applied only if no newer ticket has already completed, so a slow early
//! request cannot overwrite the result of a faster later one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::activation::ActivationSignals;
use crate::panel::KnowledgePanel;
use security_kb::{KnowledgeError, KnowledgeSnapshot, PanelConfig};

/// Identifier for one panel instance, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What the panel currently shows.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// No fetch issued yet.
    Idle,
    /// A fetch is in flight and nothing has been published.
    Loading,
    Ready(Box<KnowledgePanel>),
    /// `MalformedSnapshot` or `LoadFailed`. No retry is attempted.
    Failed(KnowledgeError),
}

/// Result of handing a response to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Published,
    Failed,
    /// A newer response already completed; this one was discarded.
    Stale,
}

/// Sequences knowledge payload loads for one panel instance.
#[derive(Debug)]
pub struct PanelLoader {
    session: SessionId,
    config: PanelConfig,
    state: LoadState,
    next_sequence: u64,
    latest_completed: Option<u64>,
}

impl PanelLoader {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            session: SessionId::new(),
            config,
            state: LoadState::Idle,
            next_sequence: 0,
            latest_completed: None,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The mounted panel, once a snapshot has been published.
    pub fn panel(&self) -> Option<&KnowledgePanel> {
        match &self.state {
            LoadState::Ready(panel) => Some(&**panel),
            _ => None,
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut KnowledgePanel> {
        match &mut self.state {
            LoadState::Ready(panel) => Some(&mut **panel),
            _ => None,
        }
    }

    /// Issue a ticket for a new fetch.
    ///
    /// A published panel stays visible while the new fetch is in flight.
    pub fn begin(&mut self) -> LoadTicket {
        self.next_sequence += 1;
        let ticket = LoadTicket(self.next_sequence);

        if matches!(self.state, LoadState::Idle | LoadState::Failed(_)) {
            self.state = LoadState::Loading;
        }

        tracing::debug!(
            session = %self.session,
            ticket = ticket.0,
            endpoint = %self.config.knowledge_endpoint,
            "Knowledge load started"
        );
        ticket
    }

    /// Hand over a delivered payload.
    ///
    /// A valid payload replaces the panel, resetting navigation to the
    /// category list and keeping the current conversation signals. An invalid
    /// one leaves the loader in `Failed(MalformedSnapshot)`.
    pub fn complete(&mut self, ticket: LoadTicket, payload: &Value) -> LoadOutcome {
        if self.is_stale(ticket) {
            return LoadOutcome::Stale;
        }
        self.latest_completed = Some(ticket.0);

        match KnowledgeSnapshot::load(payload) {
            Ok(snapshot) => {
                let signals = self.current_signals();
                let mut panel = KnowledgePanel::new(snapshot, self.config.clone());
                panel.set_signals(signals);
                self.state = LoadState::Ready(Box::new(panel));
                tracing::info!(session = %self.session, ticket = ticket.0, "Knowledge panel published");
                LoadOutcome::Published
            }
            Err(err) => {
                tracing::error!(session = %self.session, ticket = ticket.0, error = %err, "Invalid knowledge base data");
                self.state = LoadState::Failed(err);
                LoadOutcome::Failed
            }
        }
    }

    /// Report that the transport collaborator failed to deliver.
    pub fn fail(&mut self, ticket: LoadTicket, message: impl Into<String>) -> LoadOutcome {
        if self.is_stale(ticket) {
            return LoadOutcome::Stale;
        }
        self.latest_completed = Some(ticket.0);

        let err = KnowledgeError::LoadFailed(message.into());
        tracing::error!(session = %self.session, ticket = ticket.0, error = %err, "Knowledge load failed");
        self.state = LoadState::Failed(err);
        LoadOutcome::Failed
    }

    fn is_stale(&self, ticket: LoadTicket) -> bool {
        let stale = self.latest_completed.is_some_and(|latest| latest >= ticket.0);
        if stale {
            tracing::warn!(
                session = %self.session,
                ticket = ticket.0,
                latest = ?self.latest_completed,
                "Discarding stale knowledge response"
            );
        }
        stale
    }

    fn current_signals(&self) -> ActivationSignals {
        self.panel()
            .map(|p| p.signals().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationMode;
    use serde_json::json;

    fn payload(threat: &str) -> Value {
        let mut mitigated = serde_json::Map::new();
        mitigated.insert(threat.to_string(), json!(["InputValidation"]));
        json!({
            "entities": { "Threats": [threat] },
            "relationships": { "MitigatedBy": mitigated }
        })
    }

    fn first_entity(loader: &PanelLoader) -> String {
        let panel = loader.panel().unwrap();
        panel.snapshot().categories()[0].entities[0].clone()
    }

    #[test]
    fn test_initial_state() {
        let loader = PanelLoader::new(PanelConfig::default());
        assert!(matches!(loader.state(), LoadState::Idle));
        assert!(loader.panel().is_none());
    }

    #[test]
    fn test_publish() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let ticket = loader.begin();
        assert!(matches!(loader.state(), LoadState::Loading));

        assert_eq!(loader.complete(ticket, &payload("SQLInjection")), LoadOutcome::Published);
        assert_eq!(first_entity(&loader), "SQLInjection");
    }

    #[test]
    fn test_malformed_payload_fails() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let ticket = loader.begin();

        assert_eq!(loader.complete(ticket, &json!({ "entities": {} })), LoadOutcome::Failed);
        assert!(matches!(
            loader.state(),
            LoadState::Failed(KnowledgeError::MalformedSnapshot(_))
        ));
        assert!(loader.panel().is_none());
    }

    #[test]
    fn test_transport_failure() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let ticket = loader.begin();

        assert_eq!(loader.fail(ticket, "connection refused"), LoadOutcome::Failed);
        match loader.state() {
            LoadState::Failed(err) => {
                assert!(err.to_string().contains("connection refused"));
                assert!(matches!(err, KnowledgeError::LoadFailed(_)));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_completion() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let slow = loader.begin();
        let fast = loader.begin();
        assert!(slow < fast);

        assert_eq!(loader.complete(fast, &payload("Phishing")), LoadOutcome::Published);
        assert_eq!(loader.complete(slow, &payload("SQLInjection")), LoadOutcome::Stale);
        assert_eq!(first_entity(&loader), "Phishing");

        // A stale failure does not clobber the published panel either
        assert_eq!(loader.fail(slow, "timeout"), LoadOutcome::Stale);
        assert!(loader.panel().is_some());
    }

    #[test]
    fn test_in_order_completion_last_wins() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let first = loader.begin();
        let second = loader.begin();

        assert_eq!(loader.complete(first, &payload("SQLInjection")), LoadOutcome::Published);
        assert_eq!(loader.complete(second, &payload("Phishing")), LoadOutcome::Published);
        assert_eq!(first_entity(&loader), "Phishing");
    }

    #[test]
    fn test_reload_resets_navigation_keeps_signals() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let ticket = loader.begin();
        loader.complete(ticket, &payload("SQLInjection"));

        let panel = loader.panel_mut().unwrap();
        panel.select_category("Threats").unwrap();
        panel.observe_message("sql injection");

        let reload = loader.begin();
        // Still showing the previous panel while the reload is in flight
        assert!(loader.panel().is_some());
        loader.complete(reload, &payload("SQLInjection"));

        let panel = loader.panel().unwrap();
        assert_eq!(panel.current_navigation_state().mode(), NavigationMode::Categories);
        assert!(panel.signals().contains("sql"));
    }

    #[test]
    fn test_malformed_reload_replaces_published_panel() {
        let mut loader = PanelLoader::new(PanelConfig::default());
        let ticket = loader.begin();
        assert_eq!(loader.complete(ticket, &payload("SQLInjection")), LoadOutcome::Published);

        let reload = loader.begin();
        assert_eq!(
            loader.complete(reload, &json!({ "relationships": {} })),
            LoadOutcome::Failed
        );
        assert!(matches!(
            loader.state(),
            LoadState::Failed(KnowledgeError::MalformedSnapshot(_))
        ));
        assert!(loader.panel().is_none());

        // The next good load publishes again
        let retry = loader.begin();
        assert!(matches!(loader.state(), LoadState::Loading));
        assert_eq!(loader.complete(retry, &payload("Phishing")), LoadOutcome::Published);
        assert_eq!(first_entity(&loader), "Phishing");
    }

    #[test]
    fn test_session_ids_unique() {
        let a = PanelLoader::new(PanelConfig::default());
        let b = PanelLoader::new(PanelConfig::default());
        assert_ne!(a.session(), b.session());
    }
}
