use crate::error::FetchError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// One result row: variable name to the endpoint's JSON term object.
///
/// Keys are kept sorted so the encoded row does not depend on the order the
/// endpoint reported them in.
pub type Binding = BTreeMap<String, Value>;

/// Where a pagination session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// A page shorter than the limit was received.
    Done,
    /// A fetch failed; the pages before it are kept.
    Failed(FetchError),
    /// The session deadline passed between two fetches.
    TimedOut,
}

impl SessionStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SessionStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }
}

/// State of one pagination run: everything the driver accumulates and the
/// sink reports.
#[derive(Debug, Clone)]
pub struct PaginationSession {
    bindings: Vec<Binding>,
    calls: usize,
    response_times: Vec<Duration>,
    status: SessionStatus,
    elapsed: Duration,
}

impl Default for PaginationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationSession {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            calls: 0,
            response_times: Vec::new(),
            status: SessionStatus::Running,
            elapsed: Duration::ZERO,
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    /// Number of endpoint calls issued, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn response_times(&self) -> &[Duration] {
        &self.response_times
    }

    /// Mean response time over every recorded call.
    pub fn average_response_time(&self) -> Duration {
        if self.response_times.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.response_times.iter().sum();
        total / self.response_times.len() as u32
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn record_call(&mut self) {
        self.calls += 1;
    }

    pub(crate) fn record_response_time(&mut self, took: Duration) {
        self.response_times.push(took);
    }

    pub(crate) fn append_page(&mut self, page: Vec<Binding>) {
        self.bindings.extend(page);
    }

    /// Enter a terminal state. The first terminal state wins.
    pub(crate) fn finish(&mut self, status: SessionStatus) {
        if self.status.is_running() {
            self.status = status;
        }
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_running() {
        let session = PaginationSession::new();
        assert!(session.status().is_running());
        assert_eq!(session.calls(), 0);
        assert!(session.bindings().is_empty());
        assert_eq!(session.average_response_time(), Duration::ZERO);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut session = PaginationSession::new();
        session.finish(SessionStatus::Failed(FetchError::Network("reset".into())));
        session.finish(SessionStatus::Done);
        assert!(matches!(session.status(), SessionStatus::Failed(_)));
        assert!(session.status().is_terminal());
    }

    #[test]
    fn test_average_response_time() {
        let mut session = PaginationSession::new();
        session.record_response_time(Duration::from_millis(10));
        session.record_response_time(Duration::from_millis(30));
        assert_eq!(session.average_response_time(), Duration::from_millis(20));
    }
}
