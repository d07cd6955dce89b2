use serde::Serialize;
use serde_json::{json, Value};

use crate::cache_key::{key_for_jpeg, CacheKey};
use crate::constants::{
    FrameId, DEFAULT_HEIGHT, DEFAULT_PERCENTILE, DEFAULT_QUALITY, DEFAULT_WIDTH, MAX_DIMENSION,
};
use crate::thumbnail_errors::ThumbnailError;

/// Rendering parameters of one thumbnail.
///
/// Together with the frame set they fully determine the produced JPEG, which is why they are
/// hashed into the [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailParameters {
    pub width: u32,
    pub height: u32,
    pub label_text: Option<String>,
    pub color: bool,
    pub median: bool,
    pub percentile: f64,
    pub quality: u8,
}

impl Default for ThumbnailParameters {
    fn default() -> Self {
        ThumbnailParameters {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            label_text: None,
            color: false,
            median: false,
            percentile: DEFAULT_PERCENTILE,
            quality: DEFAULT_QUALITY,
        }
    }
}

fn invalid(name: &str, value: &str) -> ThumbnailError {
    ThumbnailError::InvalidParameter {
        name: name.into(),
        value: value.into(),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ThumbnailError> {
    value.trim().parse().map_err(|_| invalid(name, value))
}

fn parse_dimension(name: &str, value: &str) -> Result<u32, ThumbnailError> {
    match parse_number(name, value)? {
        dimension @ 1..=MAX_DIMENSION => Ok(dimension),
        _ => Err(invalid(name, value)),
    }
}

impl ThumbnailParameters {
    /// Build parameters from request query pairs.
    ///
    /// Unknown names are ignored, missing names keep their default. `color` and `median` are
    /// enabled by any value other than `false`. Dimensions must lie in `1..=MAX_DIMENSION`.
    ///
    /// Arguments
    /// ---------
    /// * `query`: the `(name, value)` pairs of the request query string
    ///
    /// Return
    /// ------
    /// * The parameters, or [`ThumbnailError::InvalidParameter`] when a numeric value cannot be
    ///   parsed
    pub fn from_query<'a, I>(query: I) -> Result<Self, ThumbnailError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = ThumbnailParameters::default();
        for (name, value) in query {
            match name {
                "width" => params.width = parse_dimension(name, value)?,
                "height" => params.height = parse_dimension(name, value)?,
                "label" => params.label_text = Some(value.to_owned()),
                "color" => params.color = value != "false",
                "median" => params.median = value != "false",
                "percentile" => {
                    let percentile: f64 = parse_number(name, value)?;
                    if !(0.0..=100.0).contains(&percentile) {
                        return Err(invalid(name, value));
                    }
                    params.percentile = percentile;
                }
                "quality" => params.quality = parse_number(name, value)?,
                _ => {}
            }
        }
        Ok(params)
    }

    /// Parameters as a name / value mapping, the input of the cache key derivation.
    pub fn as_pairs(&self) -> [(&'static str, Value); 7] {
        [
            ("width", json!(self.width)),
            ("height", json!(self.height)),
            ("label_text", json!(self.label_text)),
            ("color", json!(self.color)),
            ("median", json!(self.median)),
            ("percentile", json!(self.percentile)),
            ("quality", json!(self.quality)),
        ]
    }

    pub fn cache_key(&self, frame_id: FrameId) -> CacheKey {
        key_for_jpeg(frame_id, self.as_pairs())
    }
}
