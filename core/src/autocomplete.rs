//! Per-keystroke tag completion with race avoidance.
//!
//! Without cancellation and sequencing, a slow response to an early
//! keystroke could clobber the suggestion list intended for a later one.
//! Every input change supersedes the outstanding lookup; only a response for
//! the still-current lookup may replace the list.

use tagscope_api_client::model::Suggestion;
use tracing::debug;

use crate::TAG_KEY;
use crate::fetch_slot::FetchSlot;
use crate::fetch_slot::FetchTicket;
use crate::query::QueryStore;

pub struct AutocompleteSession {
    slot: FetchSlot<String>,
    suggestions: Vec<Suggestion>,
}

impl AutocompleteSession {
    pub fn new() -> Self {
        Self {
            slot: FetchSlot::new(),
            suggestions: Vec::new(),
        }
    }

    /// The currently displayed suggestion list.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// React to a change of the raw input text (including to empty):
    /// cancel the outstanding lookup regardless of progress and issue a new
    /// one for the new prefix. The caller runs the fetch under the returned
    /// ticket and feeds the outcome back below.
    pub fn on_input(&mut self, text: &str) -> FetchTicket {
        self.slot.begin(text.to_string())
    }

    /// Replaces the suggestion list wholesale, but only when `ticket` still
    /// belongs to the current lookup. Returns whether the response was
    /// applied; a late response for a superseded lookup is discarded.
    pub fn apply_result(&mut self, ticket: &FetchTicket, suggestions: Vec<Suggestion>) -> bool {
        if !self.slot.is_current(ticket) {
            debug!("discarding superseded completion response");
            return false;
        }
        self.suggestions = suggestions;
        true
    }

    /// A failed lookup leaves the prior list displayed; cancellations never
    /// even reach here. The next input change is the only retry path.
    pub fn on_failure(&mut self, ticket: &FetchTicket) {
        if self.slot.is_current(ticket) {
            debug!("completion lookup failed; keeping prior suggestions");
        }
    }

    /// Commit a chosen suggestion (or the raw text itself): write the tag
    /// into the query store and clear the transient lookup state.
    pub fn commit(&mut self, tag: &str, store: &mut QueryStore) {
        store.set(TAG_KEY, tag);
        self.dismiss();
    }

    /// Drop the suggestion list and cancel the outstanding lookup without
    /// committing anything.
    pub fn dismiss(&mut self) {
        self.slot.clear();
        self.suggestions.clear();
    }
}

impl Default for AutocompleteSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::query::Query;
    use pretty_assertions::assert_eq;
    use tagscope_api_client::model::TagCategory;

    fn suggestion(text: &str) -> Suggestion {
        Suggestion {
            text: text.to_string(),
            category: TagCategory::General,
        }
    }

    #[test]
    fn only_the_last_issued_lookup_is_reflected() {
        let mut session = AutocompleteSession::new();
        let for_a = session.on_input("a");
        let for_ab = session.on_input("ab");

        // Responses arrive out of order: the newer one first.
        assert!(session.apply_result(&for_ab, vec![suggestion("abyss")]));
        assert!(!session.apply_result(&for_a, vec![suggestion("apple")]));
        assert_eq!(session.suggestions(), &[suggestion("abyss")]);
    }

    #[test]
    fn stale_response_is_discarded_even_when_it_resolves_first() {
        let mut session = AutocompleteSession::new();
        let for_a = session.on_input("a");
        let for_ab = session.on_input("ab");

        assert!(!session.apply_result(&for_a, vec![suggestion("apple")]));
        assert!(session.suggestions().is_empty());
        assert!(session.apply_result(&for_ab, vec![suggestion("abyss")]));
        assert_eq!(session.suggestions(), &[suggestion("abyss")]);
    }

    #[test]
    fn every_input_change_cancels_the_outstanding_lookup() {
        let mut session = AutocompleteSession::new();
        let first = session.on_input("a");
        assert!(!first.is_cancelled());
        let second = session.on_input("");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn failure_keeps_the_prior_list() {
        let mut session = AutocompleteSession::new();
        let first = session.on_input("a");
        assert!(session.apply_result(&first, vec![suggestion("apple")]));

        let second = session.on_input("ab");
        session.on_failure(&second);
        assert_eq!(session.suggestions(), &[suggestion("apple")]);
    }

    #[test]
    fn commit_writes_the_tag_and_clears_suggestions() {
        let mut store = QueryStore::new(Query::new());
        let mut session = AutocompleteSession::new();
        let ticket = session.on_input("1g");
        assert!(session.apply_result(&ticket, vec![suggestion("1girl")]));

        session.commit("1girl", &mut store);
        assert_eq!(store.get("tag"), Some("1girl"));
        assert!(session.suggestions().is_empty());

        // A late response for the pre-commit lookup stays discarded.
        assert!(!session.apply_result(&ticket, vec![suggestion("1boy")]));
        assert!(session.suggestions().is_empty());
    }
}
