use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::client::{TerminologyClient, TerminologyEntity};
use super::error::TerminologyError;

#[derive(Debug, Clone)]
enum Behavior {
    Entities(Vec<TerminologyEntity>),
    MissingCredentials,
    TokenRejected,
    Timeout,
}

/// In-memory [`TerminologyClient`] returning canned entities or a canned failure.
#[derive(Debug)]
pub struct MockTerminologyClient {
    behavior: Behavior,
    calls: AtomicUsize,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockTerminologyClient {
    pub fn new(entities: Vec<TerminologyEntity>) -> Self {
        Self::with_behavior(Behavior::Entities(entities))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Every search fails as if no client credentials were configured.
    pub fn missing_credentials() -> Self {
        Self::with_behavior(Behavior::MissingCredentials)
    }

    /// Every search fails at the token exchange.
    pub fn token_rejected() -> Self {
        Self::with_behavior(Behavior::TokenRejected)
    }

    pub fn timing_out() -> Self {
        Self::with_behavior(Behavior::Timeout)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(text, limit)` of every search, in call order.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

impl TerminologyClient for MockTerminologyClient {
    fn is_configured(&self) -> bool {
        !matches!(self.behavior, Behavior::MissingCredentials)
    }

    async fn search(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<TerminologyEntity>, TerminologyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push((text.to_string(), limit));

        match &self.behavior {
            Behavior::Entities(entities) => Ok(entities.iter().take(limit).cloned().collect()),
            Behavior::MissingCredentials => Err(TerminologyError::MissingCredentials),
            Behavior::TokenRejected => Err(TerminologyError::TokenRejected {
                status: 400,
                body: "invalid_client".to_string(),
            }),
            Behavior::Timeout => Err(TerminologyError::Timeout { secs: 10 }),
        }
    }
}
