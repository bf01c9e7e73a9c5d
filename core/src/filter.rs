//! Client-side category filtering of correlation results.
//!
//! Pure and synchronous: no network access, no mutable slot. Recomputed by
//! the caller whenever either input changes.

use tagscope_api_client::model::Correlation;
use tagscope_api_client::model::CorrelationResult;
use tagscope_api_client::model::TagCategory;

/// Which categories the user currently wants to see. Default all-true.
/// Purely local UI state; never serialized or sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleCategories {
    visible: [bool; TagCategory::ALL.len()],
}

impl VisibleCategories {
    pub fn all_visible() -> Self {
        Self {
            visible: [true; TagCategory::ALL.len()],
        }
    }

    pub fn none_visible() -> Self {
        Self {
            visible: [false; TagCategory::ALL.len()],
        }
    }

    pub fn is_visible(&self, category: TagCategory) -> bool {
        self.visible[Self::index_of(category)]
    }

    pub fn set(&mut self, category: TagCategory, visible: bool) {
        self.visible[Self::index_of(category)] = visible;
    }

    pub fn toggle(&mut self, category: TagCategory) {
        let index = Self::index_of(category);
        self.visible[index] = !self.visible[index];
    }

    fn index_of(category: TagCategory) -> usize {
        match category {
            TagCategory::General => 0,
            TagCategory::Artist => 1,
            TagCategory::Copyright => 2,
            TagCategory::Character => 3,
            TagCategory::Meta => 4,
        }
    }
}

impl Default for VisibleCategories {
    fn default() -> Self {
        Self::all_visible()
    }
}

/// The sub-sequence of `result.correlations` whose category is visible, in
/// original relative order. The backend already rank-orders the sequence, so
/// this must not re-sort. Idempotent and side-effect-free.
pub fn filter<'a>(result: &'a CorrelationResult, visible: &VisibleCategories) -> Vec<&'a Correlation> {
    result
        .correlations
        .iter()
        .filter(|correlation| visible.is_visible(correlation.tag_category))
        .collect()
}

/// Rounded share of the tag's posts that also carry the correlated tag.
pub fn match_percent(n_correlated: u64, n_posts_for_tag: u64) -> u8 {
    if n_posts_for_tag == 0 {
        return 0;
    }
    // n_correlated <= n_posts_for_tag, so the result fits in 0..=100.
    ((n_correlated * 100 + n_posts_for_tag / 2) / n_posts_for_tag) as u8
}
