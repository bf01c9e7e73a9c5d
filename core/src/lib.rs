//! Query/data orchestration core for the tag-exploration session.
//!
//! One mutable current query ([`query::QueryStore`]) drives three
//! independent, cancellable fetch slots built on a single latest-wins
//! primitive ([`fetch_slot::FetchSlot`]): autocompletion
//! ([`autocomplete::AutocompleteSession`]) and the two per-committed-tag
//! fetches ([`session::TagSession`]). Correlation results pass through a
//! pure, network-free category filter ([`filter`]). This crate performs no
//! I/O of its own; callers run the actual requests and feed outcomes back
//! through tickets, which is what makes the supersession rules testable
//! without a network.

pub mod autocomplete;
pub mod fetch_slot;
pub mod filter;
pub mod query;
pub mod session;

pub use autocomplete::AutocompleteSession;
pub use fetch_slot::FetchSlot;
pub use fetch_slot::FetchTicket;
pub use filter::VisibleCategories;
pub use query::Query;
pub use query::QueryStore;
pub use session::TagSession;

/// The one query key the session currently navigates by.
pub const TAG_KEY: &str = "tag";
