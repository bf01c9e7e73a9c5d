//! Wire models for the tag-exploration API.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Closed set of tag categories. The numeric ids and the display palette are
/// fixed by the dataset; id 2 is unassigned there and rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TagCategory {
    General,
    Artist,
    Copyright,
    Character,
    Meta,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown tag category id {0}")]
pub struct UnknownTagCategory(pub u8);

impl TagCategory {
    pub const ALL: [TagCategory; 5] = [
        TagCategory::General,
        TagCategory::Artist,
        TagCategory::Copyright,
        TagCategory::Character,
        TagCategory::Meta,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            TagCategory::General => "General",
            TagCategory::Artist => "Artist",
            TagCategory::Copyright => "Copyright",
            TagCategory::Character => "Character",
            TagCategory::Meta => "Meta",
        }
    }

    /// Display color, `(r, g, b)`.
    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            TagCategory::General => (0x00, 0x9b, 0xe6),
            TagCategory::Artist => (0xff, 0x8a, 0x8b),
            TagCategory::Copyright => (0xc7, 0x97, 0xff),
            TagCategory::Character => (0x35, 0xc6, 0x4a),
            TagCategory::Meta => (0xea, 0xd0, 0x84),
        }
    }

    pub const fn wire_id(self) -> u8 {
        match self {
            TagCategory::General => 0,
            TagCategory::Artist => 1,
            TagCategory::Copyright => 3,
            TagCategory::Character => 4,
            TagCategory::Meta => 5,
        }
    }
}

impl TryFrom<u8> for TagCategory {
    type Error = UnknownTagCategory;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(TagCategory::General),
            1 => Ok(TagCategory::Artist),
            3 => Ok(TagCategory::Copyright),
            4 => Ok(TagCategory::Character),
            5 => Ok(TagCategory::Meta),
            other => Err(UnknownTagCategory(other)),
        }
    }
}

impl From<TagCategory> for u8 {
    fn from(category: TagCategory) -> Self {
        category.wire_id()
    }
}

/// One autocompletion entry. Lists of these are replaced wholesale on every
/// completed lookup, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireSuggestion")]
pub struct Suggestion {
    pub text: String,
    pub category: TagCategory,
}

/// The completion endpoint has two historical shapes: `{text, category}`
/// objects and plain strings. Both normalize into [`Suggestion`]; bare
/// strings carry no category and default to General.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireSuggestion {
    Tagged { text: String, category: TagCategory },
    Bare(String),
}

impl From<WireSuggestion> for Suggestion {
    fn from(wire: WireSuggestion) -> Self {
        match wire {
            WireSuggestion::Tagged { text, category } => Suggestion { text, category },
            WireSuggestion::Bare(text) => Suggestion {
                text,
                category: TagCategory::General,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    pub tag: String,
    pub tag_category: TagCategory,
    pub n_correlated: u64,
}

/// Correlation statistics for one committed tag. The sequence arrives already
/// rank-ordered by the backend and is never re-sorted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub n_posts_for_tag: u64,
    pub correlations: Vec<Correlation>,
}

impl CorrelationResult {
    /// Every correlation count must fit within the tag's own post count.
    /// A response violating this is malformed and must be rejected.
    pub fn check_invariants(&self) -> Result<(), String> {
        for correlation in &self.correlations {
            if correlation.n_correlated > self.n_posts_for_tag {
                return Err(format!(
                    "correlation {:?} has n_correlated {} > n_posts_for_tag {}",
                    correlation.tag, correlation.n_correlated, self.n_posts_for_tag
                ));
            }
        }
        Ok(())
    }
}

/// One point of the post-count time series, month granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub period: DateTime<Utc>,
    pub count: u64,
}

impl TimeSeriesPoint {
    /// Numeric instant for the charting collaborator.
    pub fn period_epoch_ms(&self) -> i64 {
        self.period.timestamp_millis()
    }
}

/// Converts the wire `[timestamp_string, count]` pairs into points, requiring
/// RFC 3339 timestamps in strictly ascending order (one point per period).
pub fn parse_time_series(raw: Vec<(String, u64)>) -> Result<Vec<TimeSeriesPoint>, String> {
    let mut points = Vec::with_capacity(raw.len());
    let mut previous: Option<DateTime<Utc>> = None;
    for (timestamp, count) in raw {
        let period = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|err| format!("bad timestamp {timestamp:?}: {err}"))?
            .with_timezone(&Utc);
        if let Some(previous) = previous
            && period <= previous
        {
            return Err(format!(
                "time series is not strictly ascending at {timestamp:?}"
            ));
        }
        previous = Some(period);
        points.push(TimeSeriesPoint { period, count });
    }
    Ok(points)
}
