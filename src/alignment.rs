//! # Frame alignment
//!
//! Color thumbnails stack three frames taken through different filters. The frames are
//! registered onto the first one with an external [`AlignmentSolver`] before conversion.
//!
//! Alignment is an enhancement, never a requirement: [`align_frames`] either returns the
//! reference plus exactly two aligned copies, or falls back to the unaligned input after
//! deleting whatever aligned copies it had produced. Failures are logged as warnings and never
//! reach the caller.

use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("No transform found: {0}")]
    NoTransform(String),

    #[error("Alignment is not available in this deployment")]
    Unavailable,

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

/// Affine transform mapping pixel coordinates of a candidate onto the reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub matrix: [[f64; 2]; 2],
    pub offset: [f64; 2],
}

/// Outcome of the identification of one candidate against the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub candidate: Utf8PathBuf,
    pub ok: bool,
    pub transform: AffineTransform,
}

/// External registration capability.
pub trait AlignmentSolver {
    /// Find the transforms registering each candidate onto `reference`.
    fn identify(
        &self,
        reference: &Utf8Path,
        candidates: &[Utf8PathBuf],
    ) -> Result<Vec<Identification>, AlignmentError>;

    /// Write a copy of `source` resampled through `transform` into `outdir`.
    fn remap(
        &self,
        source: &Utf8Path,
        transform: &AffineTransform,
        outdir: &Utf8Path,
    ) -> Result<Utf8PathBuf, AlignmentError>;
}

/// Solver for deployments without a registration backend: every attempt falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSolver;

impl AlignmentSolver for UnavailableSolver {
    fn identify(
        &self,
        _reference: &Utf8Path,
        _candidates: &[Utf8PathBuf],
    ) -> Result<Vec<Identification>, AlignmentError> {
        Err(AlignmentError::Unavailable)
    }

    fn remap(
        &self,
        _source: &Utf8Path,
        _transform: &AffineTransform,
        _outdir: &Utf8Path,
    ) -> Result<Utf8PathBuf, AlignmentError> {
        Err(AlignmentError::Unavailable)
    }
}

/// Frames to convert after an alignment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentResult {
    /// The reference followed by the two aligned copies
    Aligned(Vec<Utf8PathBuf>),
    /// The untouched input
    Unaligned(Vec<Utf8PathBuf>),
}

impl AlignmentResult {
    pub fn paths(&self) -> &[Utf8PathBuf] {
        match self {
            AlignmentResult::Aligned(paths) | AlignmentResult::Unaligned(paths) => paths,
        }
    }

    pub fn into_paths(self) -> Vec<Utf8PathBuf> {
        match self {
            AlignmentResult::Aligned(paths) | AlignmentResult::Unaligned(paths) => paths,
        }
    }
}

fn remap_identified<S: AlignmentSolver + ?Sized>(
    solver: &S,
    reference: &Utf8Path,
    candidates: &[Utf8PathBuf],
    outdir: &Utf8Path,
    aligned: &mut Vec<Utf8PathBuf>,
) -> Result<(), AlignmentError> {
    for identification in solver.identify(reference, candidates)? {
        if identification.ok {
            aligned.push(solver.remap(
                &identification.candidate,
                &identification.transform,
                outdir,
            )?);
        }
    }
    Ok(())
}

/// Register `frames[1]` and `frames[2]` onto `reference`.
///
/// Arguments
/// ---------
/// * `solver`: the registration capability
/// * `reference`: the frame the others are registered onto, normally `frames[0]`
/// * `frames`: the three frames of a color composition, reference included
/// * `outdir`: where aligned copies are written
///
/// Return
/// ------
/// * [`AlignmentResult::Aligned`] with `[reference, aligned_1, aligned_2]` when exactly two
///   candidates were remapped
/// * [`AlignmentResult::Unaligned`] with a copy of `frames` otherwise. Aligned copies produced
///   before the failure are deleted.
pub fn align_frames<S: AlignmentSolver + ?Sized>(
    solver: &S,
    reference: &Utf8Path,
    frames: &[Utf8PathBuf],
    outdir: &Utf8Path,
) -> AlignmentResult {
    let candidates = &frames[frames.len().min(1)..frames.len().min(3)];
    let mut aligned = Vec::with_capacity(2);

    if let Err(err) = remap_identified(solver, reference, candidates, outdir, &mut aligned) {
        warn!("Error aligning images, falling back to original image list: {err}");
    }

    if aligned.len() == 2 {
        debug!("Aligned {} frames onto {reference}", aligned.len());
        let mut paths = Vec::with_capacity(3);
        paths.push(reference.to_path_buf());
        paths.extend(aligned);
        return AlignmentResult::Aligned(paths);
    }

    if !aligned.is_empty() {
        warn!(
            "Only {} of 2 frames aligned, falling back to original image list",
            aligned.len()
        );
    }
    // an in-place remap hands back an input frame, which must survive the fallback
    for path in aligned.into_iter().filter(|path| !frames.contains(path)) {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("Unable to remove unused aligned frame {path}: {err}"),
        }
    }
    AlignmentResult::Unaligned(frames.to_vec())
}
