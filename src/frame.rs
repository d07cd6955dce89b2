use serde::{Deserialize, Serialize};

use crate::constants::{FrameId, RequestId};

/// Descriptor of one raw frame as returned by the archive API.
///
/// Only `id` is mandatory at the wire level; the remaining fields are optional so that
/// incomplete records can still be rejected with a meaningful eligibility reason instead of a
/// decoding failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    #[serde(default)]
    pub request_id: Option<RequestId>,
    #[serde(default)]
    pub filename: Option<String>,
    /// Location of the raw bytes
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub configuration_type: Option<String>,
    /// Spectral band tag, e.g. `rp` or `V`
    #[serde(default)]
    pub primary_optical_element: Option<String>,
    #[serde(default)]
    pub proposal_id: Option<String>,
}

impl Frame {
    /// Name used for the local copy of this frame.
    ///
    /// Falls back to the frame id when the archive did not report a filename.
    pub fn local_name(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| format!("{}.fits", self.id))
    }
}

/// Paginated frame listing: `{count, results}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameList {
    pub count: usize,
    pub results: Vec<Frame>,
}
