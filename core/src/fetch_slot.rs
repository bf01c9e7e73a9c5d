//! Latest-wins asynchronous fetch slot.
//!
//! A slot holds at most one outstanding request. Starting a new request
//! cancels the previous one and hands back a [`FetchTicket`]; a response may
//! only be applied while its ticket is still current. Both halves matter:
//! the token tells the transport to abort, and the generation check
//! unconditionally suppresses late results even when the transport cannot
//! truly abort. "Last issued wins", not "last resolved wins".

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub struct FetchSlot<K> {
    key: Option<K>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Handle for one outstanding request. Cheap to clone; carries the
/// cancellation capability and the generation it was issued under.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl<K: PartialEq> FetchSlot<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            generation: 0,
            cancel: None,
        }
    }

    /// The key of the most recently issued request, if any.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Supersedes any outstanding request and occupies the slot for `key`.
    pub fn begin(&mut self, key: K) -> FetchTicket {
        self.cancel_outstanding();
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        self.key = Some(key);
        FetchTicket {
            generation: self.generation,
            cancel,
        }
    }

    /// Like [`FetchSlot::begin`], but a no-op when `key` equals the slot's
    /// current key: re-committing an identical consecutive value must not
    /// re-fetch.
    pub fn begin_if_changed(&mut self, key: K) -> Option<FetchTicket> {
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        Some(self.begin(key))
    }

    /// Whether `ticket` belongs to the most recently issued request. A late
    /// response whose ticket is no longer current must be discarded.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generation == ticket.generation
    }

    /// Cancels any outstanding request and vacates the slot. Tickets issued
    /// earlier all become stale.
    pub fn clear(&mut self) {
        self.cancel_outstanding();
        self.generation += 1;
        self.key = None;
    }

    fn cancel_outstanding(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl<K: PartialEq> Default for FetchSlot<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for FetchSlot<K> {
    /// Teardown of the owning component must not leave a request able to
    /// mutate state afterwards.
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `fut` to completion unless this ticket is superseded first.
    /// Returns `None` on cancellation, even when `fut` finished in the same
    /// poll, so a cancelled request can never produce an applicable result.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            out = fut => {
                if self.cancel.is_cancelled() {
                    None
                } else {
                    Some(out)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn newer_request_supersedes_older_ticket() {
        let mut slot = FetchSlot::new();
        let first = slot.begin("cat".to_string());
        let second = slot.begin("dog".to_string());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
    }

    #[test]
    fn out_of_order_resolution_cannot_overwrite_newer_state() {
        // The older request resolving after (or before) the newer one must
        // never be applicable once the newer one was issued.
        let mut slot = FetchSlot::new();
        let older = slot.begin(1);
        let newer = slot.begin(2);

        // Newer resolves first and is applied.
        assert!(slot.is_current(&newer));
        // Older resolves late; it stays stale regardless of arrival order.
        assert!(!slot.is_current(&older));
    }

    #[test]
    fn begin_if_changed_deduplicates_consecutive_keys() {
        let mut slot = FetchSlot::new();
        let first = slot.begin_if_changed("1girl".to_string());
        assert!(first.is_some());
        assert!(slot.begin_if_changed("1girl".to_string()).is_none());
        // The outstanding request survives the no-op re-commit.
        assert!(!first.unwrap().is_cancelled());
        assert!(slot.begin_if_changed("1boy".to_string()).is_some());
    }

    #[test]
    fn clear_cancels_and_vacates() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin("x");
        slot.clear();
        assert!(ticket.is_cancelled());
        assert!(slot.key().is_none());
        assert!(!slot.is_current(&ticket));
    }

    #[test]
    fn dropping_the_slot_cancels_the_outstanding_request() {
        let ticket = {
            let mut slot = FetchSlot::new();
            slot.begin("x")
        };
        assert!(ticket.is_cancelled());
    }

    #[tokio::test]
    async fn guard_passes_through_uncancelled_results() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin("x");
        assert_eq!(ticket.guard(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn guard_suppresses_results_after_cancellation() {
        let mut slot = FetchSlot::new();
        let ticket = slot.begin("x");
        slot.begin("y");
        // Even though the future is immediately ready, the superseded ticket
        // must not yield a result.
        assert_eq!(ticket.guard(async { 42 }).await, None);
    }
}
