//! # Archive access
//!
//! The [`FrameSource`] trait is the seam between the pipeline and the archive: it resolves
//! frame descriptors through the metadata API and downloads raw frame bytes to local files.
//! [`ArchiveClient`] is the HTTP implementation; tests substitute in-memory sources.
//!
//! The caller's `Authorization` header is forwarded unchanged to the metadata API. Raw frame
//! URLs are fetched without it since frame storage URLs are pre-authorized.

use std::fs;

use camino::Utf8Path;
use tracing::debug;

use crate::{
    constants::{
        FrameId, RequestId, FRAME_DOWNLOAD_TIMEOUT, METADATA_TIMEOUT, REQUEST_FRAMES_TIMEOUT,
    },
    frame::{Frame, FrameList},
    remote_fetcher::RemoteFetcher,
    settings::Settings,
    thumbnail_errors::ThumbnailError,
};

pub trait FrameSource {
    /// Resolve one frame by its archive id.
    fn frame_by_id(
        &self,
        frame_id: FrameId,
        authorization: Option<&str>,
    ) -> Result<Frame, ThumbnailError>;

    /// List the frames whose basename is exactly `basename`.
    fn frames_by_basename(
        &self,
        basename: &str,
        authorization: Option<&str>,
    ) -> Result<FrameList, ThumbnailError>;

    /// List the frames of an observation request at the given reduction level.
    fn frames_for_request(
        &self,
        request_id: RequestId,
        reduction_level: u32,
        authorization: Option<&str>,
    ) -> Result<Vec<Frame>, ThumbnailError>;

    /// Write the raw bytes of `frame` to `destination`.
    fn download_frame(&self, frame: &Frame, destination: &Utf8Path) -> Result<(), ThumbnailError>;
}

/// [`FrameSource`] backed by the archive HTTP API.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    fetcher: RemoteFetcher,
    settings: Settings,
}

impl ArchiveClient {
    pub fn new(fetcher: RemoteFetcher, settings: Settings) -> Self {
        ArchiveClient { fetcher, settings }
    }
}

impl FrameSource for ArchiveClient {
    fn frame_by_id(
        &self,
        frame_id: FrameId,
        authorization: Option<&str>,
    ) -> Result<Frame, ThumbnailError> {
        self.fetcher.fetch_metadata(
            &self.settings.frame_url(frame_id),
            &[],
            authorization,
            METADATA_TIMEOUT,
        )
    }

    fn frames_by_basename(
        &self,
        basename: &str,
        authorization: Option<&str>,
    ) -> Result<FrameList, ThumbnailError> {
        self.fetcher.fetch_metadata(
            &self.settings.frames_url(),
            &[("basename_exact", basename.to_owned())],
            authorization,
            METADATA_TIMEOUT,
        )
    }

    fn frames_for_request(
        &self,
        request_id: RequestId,
        reduction_level: u32,
        authorization: Option<&str>,
    ) -> Result<Vec<Frame>, ThumbnailError> {
        let listing: FrameList = self.fetcher.fetch_metadata(
            &self.settings.frames_url(),
            &[
                ("request_id", request_id.to_string()),
                ("reduction_level", reduction_level.to_string()),
            ],
            authorization,
            REQUEST_FRAMES_TIMEOUT,
        )?;
        Ok(listing.results)
    }

    fn download_frame(&self, frame: &Frame, destination: &Utf8Path) -> Result<(), ThumbnailError> {
        let url = frame.url.as_deref().ok_or_else(|| ThumbnailError::NotFound {
            message: format!("Frame {} has no download url", frame.id),
        })?;
        let bytes = self.fetcher.fetch_bytes(url, FRAME_DOWNLOAD_TIMEOUT)?;
        fs::write(destination, &bytes)?;
        debug!("Downloaded frame {} to {destination} ({} bytes)", frame.id, bytes.len());
        Ok(())
    }
}
