use itertools::Itertools;
use serde_json::{json, Value};

use crate::{parameters::ThumbnailParameters, thumbnail_errors::ThumbnailError};

/// Inbound thumbnail request, already split from its transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThumbnailRequest {
    query: Vec<(String, String)>,
    authorization: Option<String>,
}

impl ThumbnailRequest {
    /// Arguments
    /// ---------
    /// * `query`: query string pairs in request order
    /// * `authorization`: the raw `Authorization` header, forwarded to the archive API
    pub fn new(query: Vec<(String, String)>, authorization: Option<String>) -> Self {
        ThumbnailRequest {
            query,
            authorization,
        }
    }

    /// First value of the query parameter `name`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Strict form used by the eligibility check: only `color=true` counts.
    pub fn is_color_request(&self) -> bool {
        self.arg("color") == Some("true")
    }

    /// A non empty `image` parameter asks for a redirect instead of a JSON document.
    pub fn wants_redirect(&self) -> bool {
        self.arg("image").is_some_and(|value| !value.is_empty())
    }

    /// Rendering parameters, the first occurrence of a repeated name winning.
    pub fn parameters(&self) -> Result<ThumbnailParameters, ThumbnailError> {
        ThumbnailParameters::from_query(
            self.query
                .iter()
                .unique_by(|(name, _)| name.clone())
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailResponse {
    /// `{url, propid}` document
    Json { url: String, propid: Option<String> },
    /// HTTP redirect to the thumbnail
    Redirect(String),
}

impl ThumbnailResponse {
    pub fn url(&self) -> &str {
        match self {
            ThumbnailResponse::Json { url, .. } | ThumbnailResponse::Redirect(url) => url,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ThumbnailResponse::Json { .. } => 200,
            ThumbnailResponse::Redirect(_) => 302,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ThumbnailResponse::Json { url, propid } => json!({"url": url, "propid": propid}),
            ThumbnailResponse::Redirect(url) => json!({"location": url}),
        }
    }
}
