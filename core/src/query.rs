//! The canonical current query and its navigable history.
//!
//! The query is an ordered string map mirrored 1:1 into a URL-style query
//! string, so a shared link reproduces the exact session state. Every
//! committed change pushes a new snapshot onto an append-only log with a
//! cursor; `back`/`forward` move the cursor the way browser history would,
//! and every transition notifies subscribers synchronously.

use indexmap::IndexMap;
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(IndexMap<String, String>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a `key=value&…` string. Unparseable fragments are dropped by
    /// the lenient decoder; producing a sensible location is the caller's
    /// responsibility.
    pub fn from_query_string(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self(
            form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// A copy of this query with `key` overwritten. The only way queries are
    /// ever mutated; existing snapshots are never edited in place.
    #[must_use]
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut next = self.0.clone();
        next.insert(key.to_string(), value.to_string());
        Self(next)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

type Subscriber = Box<dyn FnMut(&Query)>;

/// Single source of truth for the session's navigable state.
pub struct QueryStore {
    log: Vec<Query>,
    cursor: usize,
    subscribers: Vec<Subscriber>,
}

impl QueryStore {
    pub fn new(initial: Query) -> Self {
        Self {
            log: vec![initial],
            cursor: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn current(&self) -> &Query {
        &self.log[self.cursor]
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.current().get(key)
    }

    /// Subscribers are invoked synchronously with the new query on every
    /// transition: `set`, `back`, and `forward` alike.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Query) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Overwrites `key` in a copy of the current query and pushes the copy as
    /// a new forward-navigable entry. Never replaces in place: each committed
    /// change stays independently revisitable via `back`/`forward`.
    pub fn set(&mut self, key: &str, value: &str) {
        let next = self.current().with(key, value);
        self.push(next);
    }

    /// Appends a snapshot at the cursor, discarding any forward entries, and
    /// notifies subscribers.
    pub fn push(&mut self, next: Query) {
        self.log.truncate(self.cursor + 1);
        self.log.push(next);
        self.cursor = self.log.len() - 1;
        self.notify();
    }

    /// Moves to the previous snapshot if one exists. Returns whether a
    /// transition happened; subscribers are notified only on transition.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.notify();
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.log.len() {
            return false;
        }
        self.cursor += 1;
        self.notify();
        true
    }

    fn notify(&mut self) {
        let query = self.log[self.cursor].clone();
        for subscriber in &mut self.subscribers {
            subscriber(&query);
        }
    }
}
