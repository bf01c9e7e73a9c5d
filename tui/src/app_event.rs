use tagscope_api_client::model::CorrelationResult;
use tagscope_api_client::model::Suggestion;
use tagscope_api_client::model::TimeSeriesPoint;
use tagscope_core::FetchTicket;
use tagscope_core::Query;

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// The query store transitioned (commit, back, or forward). Carries the
    /// new query so the session can re-derive its fetches.
    QueryChanged(Query),

    /// Result of a completed completion lookup. The ticket echoes the
    /// request it belongs to so stale responses can be discarded at apply
    /// time; a cancelled lookup sends nothing at all.
    CompletionResult {
        ticket: FetchTicket,
        suggestions: Vec<Suggestion>,
    },

    /// A completion lookup failed (not cancelled). The prior suggestion list
    /// stays on screen.
    CompletionFailed { ticket: FetchTicket },

    /// Outcome of a correlation fetch; `None` means the request failed and
    /// the slot must go blank.
    CorrelationsResult {
        ticket: FetchTicket,
        outcome: Option<CorrelationResult>,
    },

    /// Outcome of a posts-over-time fetch; same conventions as above.
    PostsOverTimeResult {
        ticket: FetchTicket,
        outcome: Option<Vec<TimeSeriesPoint>>,
    },

    /// Request to exit the application gracefully.
    ExitRequest,
}
