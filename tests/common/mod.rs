#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use thumbservice::{
    alignment::{AffineTransform, AlignmentError, AlignmentSolver, Identification},
    archive::FrameSource,
    cache_key::CacheKey,
    constants::{FrameId, RequestId},
    conversion::{ConversionError, JpegConverter},
    frame::{Frame, FrameList},
    parameters::ThumbnailParameters,
    settings::Settings,
    storage::{InMemoryStore, ObjectStore},
    ThumbnailError, ThumbnailPipeline, ThumbnailRequest,
};

pub type TestPipeline = ThumbnailPipeline<FakeArchive, CountingStore, FakeConverter, FakeSolver>;

/// Settings pointing transient files at a fresh temporary directory.
pub fn tmp_settings() -> (TempDir, Settings) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, Settings::default().with_tmp_dir(path))
}

/// Names of the files left in `dir`.
pub fn leftover_files(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

pub fn request(pairs: &[(&str, &str)]) -> ThumbnailRequest {
    ThumbnailRequest::new(
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Some("Token secret".into()),
    )
}

pub fn frame(id: FrameId, request_id: Option<RequestId>, filter: &str) -> Frame {
    Frame {
        id,
        request_id,
        filename: Some(format!("ogg2m001-ep04-20240101-{id:04}-e91.fits.fz")),
        url: Some(format!("https://frames.example/{id}")),
        configuration_type: Some("EXPOSE".into()),
        primary_optical_element: Some(filter.into()),
        proposal_id: Some("LCO2024A-001".into()),
    }
}

/// Three band request: red 11, visual 12, blue 13, plus an unrelated frame.
pub fn rvb_request(request_id: RequestId) -> Vec<Frame> {
    vec![
        frame(10, Some(request_id), "up"),
        frame(11, Some(request_id), "rp"),
        frame(12, Some(request_id), "V"),
        frame(13, Some(request_id), "B"),
    ]
}

pub fn pipeline(settings: Settings, archive: FakeArchive) -> TestPipeline {
    ThumbnailPipeline::new(
        settings,
        archive,
        CountingStore::default(),
        FakeConverter::default(),
        FakeSolver::default(),
    )
}

// -------------------------------------------------------------------------------------------------
// Archive
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeArchive {
    pub frames: HashMap<FrameId, Frame>,
    pub request_frames: Vec<Frame>,
    pub fail_download_of: Option<FrameId>,
    pub lookups: AtomicUsize,
    pub listings: AtomicUsize,
    pub downloads: AtomicUsize,
    pub reduction_levels: Mutex<Vec<u32>>,
    pub authorizations: Mutex<Vec<Option<String>>>,
}

impl FakeArchive {
    pub fn with_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        FakeArchive {
            frames: frames.into_iter().map(|f| (f.id, f)).collect(),
            ..FakeArchive::default()
        }
    }

    fn seen(&self, authorization: Option<&str>) {
        self.authorizations
            .lock()
            .unwrap()
            .push(authorization.map(str::to_owned));
    }

    pub fn network_calls(&self) -> usize {
        self.listings.load(Ordering::SeqCst) + self.downloads.load(Ordering::SeqCst)
    }
}

impl FrameSource for FakeArchive {
    fn frame_by_id(
        &self,
        frame_id: FrameId,
        authorization: Option<&str>,
    ) -> Result<Frame, ThumbnailError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.seen(authorization);
        self.frames
            .get(&frame_id)
            .cloned()
            .ok_or_else(ThumbnailError::not_found)
    }

    fn frames_by_basename(
        &self,
        basename: &str,
        authorization: Option<&str>,
    ) -> Result<FrameList, ThumbnailError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.seen(authorization);
        let results: Vec<Frame> = self
            .frames
            .values()
            .filter(|f| {
                f.filename
                    .as_deref()
                    .is_some_and(|name| name.starts_with(basename))
            })
            .cloned()
            .collect();
        Ok(FrameList {
            count: results.len(),
            results,
        })
    }

    fn frames_for_request(
        &self,
        request_id: RequestId,
        reduction_level: u32,
        authorization: Option<&str>,
    ) -> Result<Vec<Frame>, ThumbnailError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.seen(authorization);
        self.reduction_levels.lock().unwrap().push(reduction_level);
        Ok(self
            .request_frames
            .iter()
            .filter(|f| f.request_id == Some(request_id))
            .cloned()
            .collect())
    }

    fn download_frame(&self, frame: &Frame, destination: &Utf8Path) -> Result<(), ThumbnailError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_download_of == Some(frame.id) {
            // truncated transfer
            fs::write(destination, b"SIMPLE  =")?;
            return Err(ThumbnailError::UpstreamServer {
                url: frame.url.clone().unwrap_or_default(),
            });
        }
        fs::write(destination, format!("raw frame {}", frame.id))?;
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Converter
// -------------------------------------------------------------------------------------------------

/// Converter writing a fixed payload and recording what it was handed.
#[derive(Debug, Default)]
pub struct FakeConverter {
    pub fail: bool,
    pub calls: AtomicUsize,
    /// Inputs of each call, with whether every input existed on disk at that time
    pub inputs: Mutex<Vec<(Vec<Utf8PathBuf>, bool)>>,
}

pub const FAKE_JPEG: &[u8] = b"\xff\xd8\xff\xe0fake jpeg\xff\xd9";

impl JpegConverter for FakeConverter {
    fn convert(
        &self,
        frames: &[Utf8PathBuf],
        output: &Utf8Path,
        _params: &ThumbnailParameters,
    ) -> Result<(), ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let all_present = frames.iter().all(|path| path.exists());
        self.inputs
            .lock()
            .unwrap()
            .push((frames.to_vec(), all_present));
        if self.fail {
            fs::write(output, b"\xff\xd8partial")?;
            return Err(ConversionError::Decode {
                path: frames[0].to_string(),
                reason: "corrupt".into(),
            });
        }
        fs::write(output, FAKE_JPEG)?;
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Store
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub fail_upload: bool,
    pub exists_calls: AtomicUsize,
    pub uploads: AtomicUsize,
    pub presigned: AtomicUsize,
}

impl ObjectStore for CountingStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(key)
    }

    fn upload(
        &self,
        key: &CacheKey,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ThumbnailError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_upload {
            return Err(ThumbnailError::Storage(format!("PutObject {key}: access denied")));
        }
        self.inner.upload(key, body, content_type)
    }

    fn presigned_url(&self, key: &CacheKey, ttl: Duration) -> Result<String, ThumbnailError> {
        self.presigned.fetch_add(1, Ordering::SeqCst);
        self.inner.presigned_url(key, ttl)
    }
}

// -------------------------------------------------------------------------------------------------
// Alignment
// -------------------------------------------------------------------------------------------------

/// Solver identifying every candidate when `succeed` is set, none otherwise.
#[derive(Debug, Default)]
pub struct FakeSolver {
    pub succeed: bool,
    pub remaps: AtomicUsize,
}

impl AlignmentSolver for FakeSolver {
    fn identify(
        &self,
        _reference: &Utf8Path,
        candidates: &[Utf8PathBuf],
    ) -> Result<Vec<Identification>, AlignmentError> {
        Ok(candidates
            .iter()
            .map(|candidate| Identification {
                candidate: candidate.clone(),
                ok: self.succeed,
                transform: AffineTransform {
                    matrix: [[1.0, 0.0], [0.0, 1.0]],
                    offset: [1.5, -0.5],
                },
            })
            .collect())
    }

    fn remap(
        &self,
        source: &Utf8Path,
        _transform: &AffineTransform,
        outdir: &Utf8Path,
    ) -> Result<Utf8PathBuf, AlignmentError> {
        self.remaps.fetch_add(1, Ordering::SeqCst);
        let target = outdir.join(format!(
            "{}_affineremap.fits",
            source.file_stem().unwrap_or("frame")
        ));
        fs::copy(source, &target)?;
        Ok(target)
    }
}
