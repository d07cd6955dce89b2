//! # Thumbnail pipeline
//!
//! [`ThumbnailPipeline`] composes the archive, the aligner, the converter and the object store
//! into the end-to-end "generate or retrieve thumbnail" operation:
//!
//! ```text
//! eligibility ─▶ cache check ─┬─ hit ──────────────────────────────────────────▶ sign URL
//!                             └─ miss ─▶ acquire ─▶ [select bands ─▶ align] ─▶ convert
//!                                        ─▶ upload ─▶ cleanup ─▶ sign URL
//! ```
//!
//! A cache hit performs no download, alignment, conversion or upload. On a miss, every local
//! file is tracked by a [`TempArtifacts`] arena which is drained whatever step fails, before
//! the error is returned.
//!
//! Each run is self contained and synchronous; concurrency comes from running one pipeline call
//! per worker thread. The only shared state is the object store.

use std::fs;
use std::time::Instant;

use camino::Utf8PathBuf;
use tracing::{debug, info};

use crate::{
    alignment::{align_frames, AlignmentSolver},
    archive::FrameSource,
    band_selection::rvb_frames,
    cache_key::CacheKey,
    constants::{FrameId, COLOR_REDUCTION_LEVEL, JPEG_CONTENT_TYPE, PRESIGNED_URL_TTL},
    conversion::JpegConverter,
    eligibility::can_generate_thumbnail_on,
    frame::Frame,
    parameters::ThumbnailParameters,
    request::{ThumbnailRequest, ThumbnailResponse},
    settings::Settings,
    storage::ObjectStore,
    temp_artifacts::TempArtifacts,
    thumbnail_errors::ThumbnailError,
};

#[derive(Debug)]
pub struct ThumbnailPipeline<F, S, C, A> {
    settings: Settings,
    frames: F,
    store: S,
    converter: C,
    aligner: A,
}

impl<F, S, C, A> ThumbnailPipeline<F, S, C, A>
where
    F: FrameSource,
    S: ObjectStore,
    C: JpegConverter,
    A: AlignmentSolver,
{
    pub fn new(settings: Settings, frames: F, store: S, converter: C, aligner: A) -> Self {
        ThumbnailPipeline {
            settings,
            frames,
            store,
            converter,
            aligner,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Serve a thumbnail for the frame with archive id `frame_id`.
    pub fn handle_frame_id(
        &self,
        frame_id: FrameId,
        request: &ThumbnailRequest,
    ) -> Result<ThumbnailResponse, ThumbnailError> {
        let frame = self
            .frames
            .frame_by_id(frame_id, request.authorization())?;
        self.handle_response(frame, request)
    }

    /// Serve a thumbnail for the frame whose basename is exactly `basename`.
    ///
    /// The lookup must match exactly one frame, anything else is a 404.
    pub fn handle_basename(
        &self,
        basename: &str,
        request: &ThumbnailRequest,
    ) -> Result<ThumbnailResponse, ThumbnailError> {
        let listing = self
            .frames
            .frames_by_basename(basename, request.authorization())?;
        if listing.count != 1 {
            return Err(ThumbnailError::not_found());
        }
        let frame = listing
            .results
            .into_iter()
            .next()
            .ok_or_else(ThumbnailError::not_found)?;
        self.handle_response(frame, request)
    }

    fn handle_response(
        &self,
        frame: Frame,
        request: &ThumbnailRequest,
    ) -> Result<ThumbnailResponse, ThumbnailError> {
        can_generate_thumbnail_on(&frame, request.is_color_request(), &self.settings)?;
        let params = request.parameters()?;

        let url = self.generate_thumbnail(&frame, &params, request.authorization())?;
        if request.wants_redirect() {
            Ok(ThumbnailResponse::Redirect(url))
        } else {
            Ok(ThumbnailResponse::Json {
                url,
                propid: frame.proposal_id,
            })
        }
    }

    /// Return the URL of the thumbnail of `frame`, rendering and uploading it first on a cache
    /// miss.
    ///
    /// Arguments
    /// ---------
    /// * `frame`: the frame descriptor, already checked for eligibility
    /// * `params`: rendering parameters
    /// * `authorization`: caller credential forwarded to the archive API (color mode only)
    ///
    /// Return
    /// ------
    /// * A presigned URL valid for 8 hours, or the first error raised by a pipeline step. No
    ///   transient file survives the call in either case.
    pub fn generate_thumbnail(
        &self,
        frame: &Frame,
        params: &ThumbnailParameters,
        authorization: Option<&str>,
    ) -> Result<String, ThumbnailError> {
        let key = params.cache_key(frame.id);
        if self.store.exists(&key) {
            info!("Cache hit for frame {}: {key}", frame.id);
            return self.store.presigned_url(&key, PRESIGNED_URL_TTL);
        }

        info!("Cache miss for frame {}: {key}", frame.id);
        let start = Instant::now();
        let mut artifacts = TempArtifacts::new(&self.settings);
        let outcome = self
            .acquire(frame, params, authorization, &mut artifacts)
            .and_then(|()| self.convert_and_upload(&key, params, &mut artifacts));
        artifacts.cleanup();
        outcome?;

        info!("Generated {key} in {:.2?}", start.elapsed());
        self.store.presigned_url(&key, PRESIGNED_URL_TTL)
    }

    fn download(
        &self,
        frame: &Frame,
        artifacts: &mut TempArtifacts,
    ) -> Result<Utf8PathBuf, ThumbnailError> {
        let path = artifacts.reserve(&frame.local_name());
        self.frames.download_frame(frame, &path)?;
        Ok(path)
    }

    fn acquire(
        &self,
        frame: &Frame,
        params: &ThumbnailParameters,
        authorization: Option<&str>,
        artifacts: &mut TempArtifacts,
    ) -> Result<(), ThumbnailError> {
        if !params.color {
            let path = self.download(frame, artifacts)?;
            artifacts.register(vec![path]);
            return Ok(());
        }

        let request_id = frame.request_id.ok_or_else(|| {
            ThumbnailError::validation(
                "Cannot generate color thumbnail for a frame that does not have a request",
            )
        })?;
        let siblings =
            self.frames
                .frames_for_request(request_id, COLOR_REDUCTION_LEVEL, authorization)?;
        let selected = rvb_frames(&siblings)?;
        debug!(
            "Selected frames {:?} for request {request_id}",
            selected.map(|f| f.id)
        );

        let mut paths = Vec::with_capacity(selected.len());
        for sibling in selected {
            paths.push(self.download(sibling, artifacts)?);
        }
        artifacts.register(paths);

        let current = artifacts.current().to_vec();
        let aligned = align_frames(&self.aligner, &current[0], &current, artifacts.tmp_dir());
        artifacts.register(aligned.into_paths());
        Ok(())
    }

    fn convert_and_upload(
        &self,
        key: &CacheKey,
        params: &ThumbnailParameters,
        artifacts: &mut TempArtifacts,
    ) -> Result<(), ThumbnailError> {
        let jpg_path = artifacts.reserve(key.as_str());
        self.converter
            .convert(artifacts.current(), &jpg_path, params)?;
        let body = fs::read(&jpg_path)?;
        debug!("Uploading {key} ({} bytes)", body.len());
        self.store.upload(key, body, JPEG_CONTENT_TYPE)
    }
}
