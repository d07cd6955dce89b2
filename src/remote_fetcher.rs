//! # Remote fetcher
//!
//! [`RemoteFetcher`] owns the HTTP client shared by every call the pipeline makes to the archive
//! API and to raw frame storage. Each call issues exactly one GET with its own timeout and maps
//! the outcome onto [`ThumbnailError`]:
//!
//! | outcome                              | error                                   | status |
//! |--------------------------------------|-----------------------------------------|--------|
//! | timeout                              | [`ThumbnailError::UpstreamTimeout`]     | 504    |
//! | 5xx, or no response at all           | [`ThumbnailError::UpstreamServer`]      | 502    |
//! | 404                                  | [`ThumbnailError::NotFound`]            | 404    |
//! | any other 4xx                        | [`ThumbnailError::UpstreamClient`]      | as is  |
//!
//! Nothing is retried here: a pipeline run is request scoped and the failure goes straight back
//! to the caller.

use std::time::Duration;

use reqwest::{blocking::Client, header::AUTHORIZATION, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::thumbnail_errors::ThumbnailError;

/// Query parameters of one outbound call.
pub type QueryParams = [(&'static str, String)];

#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    http_client: Client,
}

impl RemoteFetcher {
    /// Create the fetcher and its HTTP client.
    ///
    /// Timeouts are set per call, so the client itself carries none.
    pub fn new() -> Result<Self, ThumbnailError> {
        let http_client = Client::builder().build().map_err(|err| {
            ThumbnailError::Io(std::io::Error::other(format!(
                "unable to build the HTTP client: {err}"
            )))
        })?;
        Ok(RemoteFetcher { http_client })
    }

    /// Fetch and decode a JSON document from the archive API.
    ///
    /// Arguments
    /// ---------
    /// * `url`: the endpoint to query
    /// * `params`: query string parameters, also reported back on timeout
    /// * `authorization`: the caller's `Authorization` header, forwarded unchanged
    /// * `timeout`: the deadline of this single call
    ///
    /// Return
    /// ------
    /// * The decoded document, or the classified failure. A body that does not decode as `T`
    ///   is treated like an upstream failure (502).
    pub fn fetch_metadata<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &QueryParams,
        authorization: Option<&str>,
        timeout: Duration,
    ) -> Result<T, ThumbnailError> {
        let body = self.get(url, params, authorization, timeout)?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!("Undecodable response from {url}: {err}");
            ThumbnailError::UpstreamServer { url: url.into() }
        })
    }

    /// Fetch raw bytes without credentials, used for frame downloads.
    pub fn fetch_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ThumbnailError> {
        self.get(url, &[], None, timeout)
    }

    fn get(
        &self,
        url: &str,
        params: &QueryParams,
        authorization: Option<&str>,
        timeout: Duration,
    ) -> Result<Vec<u8>, ThumbnailError> {
        debug!("GET {url} {params:?}");
        let mut request = self.http_client.get(url).query(params).timeout(timeout);
        if let Some(token) = authorization {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request
            .send()
            .map_err(|err| classify_transport(url, params, &err))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|err| classify_transport(url, params, &err))?;

        if status.is_client_error() || status.is_server_error() {
            return Err(classify_status(url, status, &body));
        }
        Ok(body.to_vec())
    }
}

/// Map a failure that happened before a complete response was received.
pub(crate) fn classify_transport(
    url: &str,
    params: &QueryParams,
    err: &reqwest::Error,
) -> ThumbnailError {
    if err.is_timeout() {
        ThumbnailError::UpstreamTimeout {
            url: url.into(),
            params: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    } else {
        warn!("No response from {url}: {err}");
        ThumbnailError::UpstreamServer { url: url.into() }
    }
}

/// Map an error status received from upstream.
///
/// A structured (JSON) body of a client error is attached as diagnostic payload; a body that
/// is not JSON is dropped silently.
pub(crate) fn classify_status(url: &str, status: StatusCode, body: &[u8]) -> ThumbnailError {
    if status.is_server_error() {
        ThumbnailError::UpstreamServer { url: url.into() }
    } else if status == StatusCode::NOT_FOUND {
        ThumbnailError::not_found()
    } else {
        ThumbnailError::UpstreamClient {
            url: url.into(),
            status: status.as_u16(),
            response: serde_json::from_slice(body).ok(),
        }
    }
}
