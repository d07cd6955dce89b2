//! # Thumbnail errors
//!
//! [`ThumbnailError`] is the single, closed error type surfaced by the pipeline. Every variant
//! carries its HTTP-like status through [`ThumbnailError::status_code`] and renders a caller-facing
//! JSON body through [`ThumbnailError::to_body`]. Internal details of fatal failures
//! (conversion, storage, disk I/O) stay in the `Display` output used for logs and are never
//! copied into the body.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::conversion::ConversionError;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value for parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("RVB frames not found")]
    BandsNotFound,

    #[error("Timeout while accessing {url}")]
    UpstreamTimeout {
        url: String,
        params: Vec<(String, String)>,
    },

    #[error("Upstream failure while accessing {url}")]
    UpstreamServer { url: String },

    #[error("Upstream answered {status} for {url}")]
    UpstreamClient {
        url: String,
        status: u16,
        response: Option<Value>,
    },

    #[error("Conversion to JPEG failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

impl ThumbnailError {
    pub fn validation(message: impl Into<String>) -> Self {
        ThumbnailError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        ThumbnailError::NotFound {
            message: "Not found".into(),
        }
    }

    /// HTTP status code the front end must answer with.
    pub fn status_code(&self) -> u16 {
        use ThumbnailError::*;
        match self {
            Validation { .. } | InvalidParameter { .. } => 400,
            NotFound { .. } | BandsNotFound => 404,
            UpstreamTimeout { .. } => 504,
            UpstreamServer { .. } => 502,
            UpstreamClient { status, .. } => *status,
            Conversion(_) | Storage(_) | Io(_) => 500,
        }
    }

    /// Machine readable message exposed to the caller.
    pub fn message(&self) -> String {
        use ThumbnailError::*;
        match self {
            Validation { message } | NotFound { message } => message.clone(),
            InvalidParameter { name, .. } => format!("Invalid value for parameter {name}"),
            BandsNotFound => "RVB frames not found".into(),
            UpstreamTimeout { .. } => "Timeout while accessing resource".into(),
            UpstreamServer { .. } | UpstreamClient { .. } => "Got error response".into(),
            Conversion(_) | Storage(_) | Io(_) => "Internal server error".into(),
        }
    }

    /// Render the error as the JSON body `{message, ...payload}`.
    ///
    /// Return
    /// ------
    /// * A JSON object always containing `message`. Timeouts add the `url` and `params` of the
    ///   failed call, upstream client errors add the structured upstream `response` when one was
    ///   received.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        match self {
            ThumbnailError::UpstreamTimeout { url, params } => {
                let params: Map<String, Value> = params
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from(value.as_str())))
                    .collect();
                body.insert("url".into(), json!(url));
                body.insert("params".into(), Value::Object(params));
            }
            ThumbnailError::UpstreamClient {
                response: Some(response),
                ..
            } => {
                body.insert("response".into(), response.clone());
            }
            _ => {}
        }
        body.insert("message".into(), Value::from(self.message()));
        Value::Object(body)
    }
}

impl PartialEq for ThumbnailError {
    fn eq(&self, other: &Self) -> bool {
        use ThumbnailError::*;
        match (self, other) {
            (Validation { message: a }, Validation { message: b }) => a == b,
            (
                InvalidParameter { name: a, value: va },
                InvalidParameter { name: b, value: vb },
            ) => a == b && va == vb,
            (NotFound { message: a }, NotFound { message: b }) => a == b,
            (BandsNotFound, BandsNotFound) => true,
            (
                UpstreamTimeout { url: a, params: pa },
                UpstreamTimeout { url: b, params: pb },
            ) => a == b && pa == pb,
            (UpstreamServer { url: a }, UpstreamServer { url: b }) => a == b,
            (
                UpstreamClient {
                    url: a,
                    status: sa,
                    response: ra,
                },
                UpstreamClient {
                    url: b,
                    status: sb,
                    response: rb,
                },
            ) => a == b && sa == sb && ra == rb,
            (Storage(a), Storage(b)) => a == b,

            // not comparable: same variant is enough
            (Conversion(_), Conversion(_)) => true,
            (Io(_), Io(_)) => true,

            _ => false,
        }
    }
}
