use crate::endpoint::Endpoint;
use crate::fetcher::PageFetcher;
use crate::rewriter::PagingPlan;
use crate::session::{PaginationSession, SessionStatus};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Walks a paging plan window by window until the result set is exhausted,
/// a fetch fails, or the session deadline passes.
///
/// Exactly one fetch is in flight at any time. A page shorter than the limit
/// is the only exhaustion signal, so a result count that is an exact multiple
/// of the limit costs one extra, empty fetch.
pub struct PaginationDriver<E> {
    fetcher: PageFetcher<E>,
    timeout: Option<Duration>,
}

impl<E: Endpoint> PaginationDriver<E> {
    pub fn new(fetcher: PageFetcher<E>) -> Self {
        Self {
            fetcher,
            timeout: None,
        }
    }

    /// Bound the whole session. The deadline is checked before each fetch;
    /// a fetch already in flight is never aborted.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fetcher(&self) -> &PageFetcher<E> {
        &self.fetcher
    }

    pub fn run(&self, mut plan: PagingPlan) -> PaginationSession {
        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut session = PaginationSession::new();

        while session.status().is_running() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(
                    calls = session.calls(),
                    rows = session.bindings().len(),
                    "session timeout reached, stopping early"
                );
                session.finish(SessionStatus::TimedOut);
                break;
            }

            let window = plan.window();
            let query = plan.render();
            match self.fetcher.fetch(&mut session, &query) {
                Ok(page) => {
                    let rows = page.len();
                    debug!(offset = window.offset, limit = window.limit, rows, "page fetched");
                    session.append_page(page);
                    if window.is_last_page(rows) {
                        session.finish(SessionStatus::Done);
                    } else {
                        plan.advance();
                    }
                }
                Err(error) => {
                    warn!(offset = window.offset, %error, "page fetch failed");
                    session.finish(SessionStatus::Failed(error));
                }
            }
        }

        session.set_elapsed(started.elapsed());
        info!(
            calls = session.calls(),
            rows = session.bindings().len(),
            elapsed_ms = session.elapsed().as_millis() as u64,
            status = ?session.status(),
            "pagination session finished"
        );
        session
    }
}
