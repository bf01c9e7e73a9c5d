//! Committed-tag fan-out: correlations and posts-over-time.
//!
//! Both fetch slots key on the committed tag and follow the same
//! supersession discipline as autocompletion, with one difference: a slot's
//! displayed result is cleared the moment its tag changes, so the view never
//! shows data for a different tag than the one committed. The two slots are
//! fully independent; a failure in one never blocks the other.

use tagscope_api_client::model::CorrelationResult;
use tagscope_api_client::model::TimeSeriesPoint;
use tracing::debug;

use crate::TAG_KEY;
use crate::fetch_slot::FetchSlot;
use crate::fetch_slot::FetchTicket;
use crate::query::Query;

/// Fetches the caller must now start, one ticket per slot. Empty when the
/// committed tag did not change (identical consecutive commits never
/// re-fetch) or became empty.
#[derive(Default)]
pub struct FetchPlan {
    pub correlations: Option<(String, FetchTicket)>,
    pub posts_over_time: Option<(String, FetchTicket)>,
}

pub struct TagSession {
    correlation_slot: FetchSlot<String>,
    time_series_slot: FetchSlot<String>,
    correlations: Option<CorrelationResult>,
    time_series: Option<Vec<TimeSeriesPoint>>,
}

impl TagSession {
    pub fn new() -> Self {
        Self {
            correlation_slot: FetchSlot::new(),
            time_series_slot: FetchSlot::new(),
            correlations: None,
            time_series: None,
        }
    }

    /// Current correlation result, if the latest fetch for the committed tag
    /// succeeded.
    pub fn correlations(&self) -> Option<&CorrelationResult> {
        self.correlations.as_ref()
    }

    pub fn time_series(&self) -> Option<&[TimeSeriesPoint]> {
        self.time_series.as_deref()
    }

    /// React to a query transition (commit, back, or forward). The committed
    /// tag is trimmed; an empty value means "no fetch, no result".
    pub fn on_query_changed(&mut self, query: &Query) -> FetchPlan {
        let tag = query.get(TAG_KEY).unwrap_or("").trim().to_string();
        if tag.is_empty() {
            self.correlation_slot.clear();
            self.time_series_slot.clear();
            self.correlations = None;
            self.time_series = None;
            return FetchPlan::default();
        }

        let mut plan = FetchPlan::default();
        if let Some(ticket) = self.correlation_slot.begin_if_changed(tag.clone()) {
            self.correlations = None;
            plan.correlations = Some((tag.clone(), ticket));
        }
        if let Some(ticket) = self.time_series_slot.begin_if_changed(tag.clone()) {
            self.time_series = None;
            plan.posts_over_time = Some((tag, ticket));
        }
        plan
    }

    /// Stores a fetch outcome if `ticket` is still current. `None` means the
    /// request completed but failed (transport, status, or malformed body):
    /// the slot goes blank rather than showing stale data. Cancelled
    /// requests never deliver an outcome at all.
    pub fn apply_correlations(
        &mut self,
        ticket: &FetchTicket,
        outcome: Option<CorrelationResult>,
    ) -> bool {
        if !self.correlation_slot.is_current(ticket) {
            debug!("discarding superseded correlation response");
            return false;
        }
        self.correlations = outcome;
        true
    }

    pub fn apply_time_series(
        &mut self,
        ticket: &FetchTicket,
        outcome: Option<Vec<TimeSeriesPoint>>,
    ) -> bool {
        if !self.time_series_slot.is_current(ticket) {
            debug!("discarding superseded time-series response");
            return false;
        }
        self.time_series = outcome;
        true
    }
}

impl Default for TagSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tagscope_api_client::model::Correlation;
    use tagscope_api_client::model::TagCategory;

    fn query_for(tag: &str) -> Query {
        Query::new().with(TAG_KEY, tag)
    }

    fn result_for(tag: &str) -> CorrelationResult {
        CorrelationResult {
            n_posts_for_tag: 1000,
            correlations: vec![Correlation {
                tag: format!("{tag}_friend"),
                tag_category: TagCategory::General,
                n_correlated: 400,
            }],
        }
    }

    #[test]
    fn commit_plans_both_fetches() {
        let mut session = TagSession::new();
        let plan = session.on_query_changed(&query_for("1girl"));
        assert_eq!(
            plan.correlations.as_ref().map(|(tag, _)| tag.as_str()),
            Some("1girl")
        );
        assert!(plan.posts_over_time.is_some());
    }

    #[test]
    fn identical_consecutive_commit_does_not_refetch() {
        let mut session = TagSession::new();
        let first = session.on_query_changed(&query_for("1girl"));
        let (_, ticket) = first.correlations.unwrap();
        let again = session.on_query_changed(&query_for("1girl"));
        assert!(again.correlations.is_none());
        assert!(again.posts_over_time.is_none());
        // The original fetch is still outstanding and still current.
        assert!(!ticket.is_cancelled());
    }

    #[test]
    fn committed_tag_is_trimmed_before_comparison() {
        let mut session = TagSession::new();
        assert!(
            session
                .on_query_changed(&query_for("1girl"))
                .correlations
                .is_some()
        );
        let padded = session.on_query_changed(&query_for("  1girl "));
        assert!(padded.correlations.is_none());
    }

    #[test]
    fn empty_tag_clears_results_and_cancels() {
        let mut session = TagSession::new();
        let plan = session.on_query_changed(&query_for("1girl"));
        let (_, ticket) = plan.correlations.unwrap();
        session.apply_correlations(&ticket, Some(result_for("1girl")));
        assert!(session.correlations().is_some());

        let cleared = session.on_query_changed(&query_for("   "));
        assert!(cleared.correlations.is_none());
        assert!(session.correlations().is_none());
        assert!(session.time_series().is_none());
    }

    #[test]
    fn late_response_for_previous_tag_is_never_displayed() {
        // A fetch for "cat" is in flight when the user commits "dog"; the
        // late "cat" response must not surface.
        let mut session = TagSession::new();
        let cat_plan = session.on_query_changed(&query_for("cat"));
        let (_, cat_ticket) = cat_plan.correlations.unwrap();

        let dog_plan = session.on_query_changed(&query_for("dog"));
        let (_, dog_ticket) = dog_plan.correlations.unwrap();
        assert!(cat_ticket.is_cancelled());

        // "dog" not resolved yet: the view is blank, not "cat".
        assert!(!session.apply_correlations(&cat_ticket, Some(result_for("cat"))));
        assert!(session.correlations().is_none());

        assert!(session.apply_correlations(&dog_ticket, Some(result_for("dog"))));
        assert_eq!(
            session.correlations().unwrap().correlations[0].tag,
            "dog_friend"
        );

        // And a second late "cat" arrival after "dog" resolved: still ignored.
        assert!(!session.apply_correlations(&cat_ticket, Some(result_for("cat"))));
        assert_eq!(
            session.correlations().unwrap().correlations[0].tag,
            "dog_friend"
        );
    }

    #[test]
    fn failure_blanks_the_slot_instead_of_keeping_stale_data() {
        let mut session = TagSession::new();
        let plan = session.on_query_changed(&query_for("cat"));
        let (_, ticket) = plan.correlations.unwrap();
        session.apply_correlations(&ticket, Some(result_for("cat")));

        let plan = session.on_query_changed(&query_for("dog"));
        let (_, ticket) = plan.correlations.unwrap();
        assert!(session.apply_correlations(&ticket, None));
        assert!(session.correlations().is_none());
    }

    #[test]
    fn the_two_slots_are_independent() {
        let mut session = TagSession::new();
        let plan = session.on_query_changed(&query_for("1girl"));
        let (_, correlation_ticket) = plan.correlations.unwrap();
        let (_, series_ticket) = plan.posts_over_time.unwrap();

        // Correlations fail; the time series still lands.
        assert!(session.apply_correlations(&correlation_ticket, None));
        let points = vec![
            TimeSeriesPoint {
                period: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                count: 5,
            },
            TimeSeriesPoint {
                period: Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
                count: 9,
            },
        ];
        assert!(session.apply_time_series(&series_ticket, Some(points.clone())));
        assert!(session.correlations().is_none());
        assert_eq!(session.time_series(), Some(points.as_slice()));
    }
}
