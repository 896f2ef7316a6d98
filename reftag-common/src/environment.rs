//! Environment reader capability and per-visit context
//!
//! The host page (browser shim, CLI harness, test double) implements
//! [`VisitEnvironment`]. The core reads it exactly once per page load to
//! build an immutable [`VisitContext`].

use crate::session::SessionState;
use crate::Result;

/// Read-only access to the host's page and session state
///
/// Every accessor may fail; a failure aborts the whole tagging attempt.
pub trait VisitEnvironment {
    /// Browser-supplied referring URL; `None` when the host has none
    fn referrer(&self) -> Result<Option<String>>;

    /// Raw query string of the current page, with or without a leading `?`
    fn query_string(&self) -> Result<String>;

    /// Raw session-storage entry for `key`
    fn session_item(&self, key: &str) -> Result<Option<String>>;

    /// Value currently held under `key` in the data layer state
    fn recorded_value(&self, key: &str) -> Result<Option<String>>;
}

/// Inputs for one classification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitContext {
    /// Referrer; absent is normalized to empty
    pub referrer: String,
    pub query_string: String,
    pub is_first_event_of_session: bool,
    /// Identifier already recorded for this session
    pub recorded_identifier: Option<String>,
}

impl VisitContext {
    /// Read all external state in one pass
    ///
    /// The recorded identifier is read on every page load, not only when the
    /// query carries an identifier. An unreadable data-layer state therefore
    /// fails the attempt even on later page views that the gate would skip.
    ///
    /// * `counter_key` - session-storage key of the event counter
    /// * `identifier_key` - data-layer key holding the recorded identifier
    pub fn read(
        env: &dyn VisitEnvironment,
        counter_key: &str,
        identifier_key: &str,
    ) -> Result<Self> {
        let referrer = env.referrer()?.unwrap_or_default();
        let query_string = env.query_string()?;
        let counter = env.session_item(counter_key)?;
        let session = SessionState::from_raw(
            counter.as_deref(),
            env.recorded_value(identifier_key)?,
        );

        Ok(Self {
            referrer,
            query_string,
            is_first_event_of_session: session.is_first_view(),
            recorded_identifier: session.recorded_identifier,
        })
    }

    /// True when the referrer is empty or was absent
    pub fn has_referrer(&self) -> bool {
        !self.referrer.is_empty()
    }
}

/// Fixed in-memory environment
///
/// Used by hosts that already hold every value up front (the CLI harness,
/// server-side replays) and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub referrer: Option<String>,
    pub query_string: String,
    pub session_items: Vec<(String, String)>,
    pub recorded_values: Vec<(String, String)>,
}

impl StaticEnvironment {
    pub fn new(referrer: Option<&str>, query_string: &str) -> Self {
        Self {
            referrer: referrer.map(str::to_string),
            query_string: query_string.to_string(),
            ..Default::default()
        }
    }

    pub fn with_session_item(mut self, key: &str, value: &str) -> Self {
        self.session_items.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_recorded_value(mut self, key: &str, value: &str) -> Self {
        self.recorded_values.push((key.to_string(), value.to_string()));
        self
    }
}

fn lookup(entries: &[(String, String)], key: &str) -> Option<String> {
    entries
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

impl VisitEnvironment for StaticEnvironment {
    fn referrer(&self) -> Result<Option<String>> {
        Ok(self.referrer.clone())
    }

    fn query_string(&self) -> Result<String> {
        Ok(self.query_string.clone())
    }

    fn session_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lookup(&self.session_items, key))
    }

    fn recorded_value(&self, key: &str) -> Result<Option<String>> {
        Ok(lookup(&self.recorded_values, key))
    }
}
