use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::model::CorrelationResult;
use crate::model::Suggestion;
use crate::model::TimeSeriesPoint;
use crate::model::parse_time_series;

/// Public instance of the tag-exploration service.
pub const DEFAULT_API_BASE: &str = "https://danbooru-tags-explorer.nanoskript.dev";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin typed client over the three read-only endpoints.
///
/// The client itself is stateless and cheap to clone; cancellation and
/// supersession of in-flight calls are the caller's concern (the fetch slots
/// in `tagscope-core`).
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base: Url,
}

impl ExplorerClient {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("tagscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, base })
    }

    pub fn from_base_url(base: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base).map_err(ApiError::BaseUrl)?;
        Self::new(base)
    }

    /// `GET /tag_complete?prefix=…`, normalized into [`Suggestion`]s.
    pub async fn tag_complete(&self, prefix: &str) -> Result<Vec<Suggestion>, ApiError> {
        self.get_json("tag_complete", &[("prefix", prefix)]).await
    }

    /// `GET /tag_correlations?tag=…`. Responses violating the
    /// `n_correlated <= n_posts_for_tag` invariant are rejected as malformed.
    pub async fn tag_correlations(&self, tag: &str) -> Result<CorrelationResult, ApiError> {
        let result: CorrelationResult = self.get_json("tag_correlations", &[("tag", tag)]).await?;
        result.check_invariants().map_err(ApiError::Malformed)?;
        Ok(result)
    }

    /// `GET /tag_posts_over_time?tag=…`, an ascending sequence of
    /// `[timestamp, count]` pairs converted to concrete instants.
    pub async fn tag_posts_over_time(&self, tag: &str) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        let raw: Vec<(String, u64)> = self.get_json("tag_posts_over_time", &[("tag", tag)]).await?;
        parse_time_series(raw).map_err(ApiError::Malformed)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.base.join(path).map_err(ApiError::BaseUrl)?;
        debug!("GET {url} {query:?}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Malformed(err.to_string()))
    }
}
