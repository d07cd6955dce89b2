//! # Cache keys
//!
//! A rendered thumbnail is stored under `{frame_id}.{digest}.jpg`, where `digest` is the
//! hex-encoded SHA-256 of the canonical form of the rendering parameters. The canonical form
//! sorts parameters by name and encodes every value as JSON, so the key never depends on the
//! order in which parameters were supplied.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::constants::FrameId;

/// Object storage key of one rendered thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize a parameter mapping independently of its iteration order.
///
/// Arguments
/// ---------
/// * `params`: parameter name / value pairs, in any order. When a name appears twice the last
///   value wins.
///
/// Return
/// ------
/// * A string of the form `{"a":1,"b":"x"}` with names sorted lexicographically
pub fn canonical_params<I, K>(params: I) -> String
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let sorted: BTreeMap<String, Value> = params
        .into_iter()
        .map(|(name, value)| (name.as_ref().to_owned(), value))
        .collect();
    let body = sorted
        .iter()
        .map(|(name, value)| format!("{}:{}", Value::from(name.as_str()), value))
        .join(",");
    format!("{{{body}}}")
}

/// Derive the storage key of the thumbnail of `frame_id` rendered with `params`.
///
/// Arguments
/// ---------
/// * `frame_id`: archive id of the frame the thumbnail is rendered from
/// * `params`: rendering parameters, in any order
///
/// Return
/// ------
/// * The key `{frame_id}.{sha256-hex}.jpg`
pub fn key_for_jpeg<I, K>(frame_id: FrameId, params: I) -> CacheKey
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let digest = Sha256::digest(canonical_params(params).as_bytes());
    CacheKey(format!("{frame_id}.{digest:x}.jpg"))
}
