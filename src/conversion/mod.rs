//! # Conversion to JPEG
//!
//! [`JpegConverter`] is the capability turning one (grayscale) or three (color, `[red, visual,
//! blue]`) local frame files into a JPEG. It is CPU bound and possibly slow; its errors are fatal
//! for the pipeline run.
//!
//! The crate ships [`render::RenderingConverter`], which delegates pixel decoding to a
//! [`render::FrameDecoder`] and performs the stretch, resize and encoding itself. With the `fits`
//! feature, [`fits::FitsDecoder`] decodes FITS files through cfitsio.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::parameters::ThumbnailParameters;

#[cfg(feature = "fits")]
pub mod fits;
pub mod render;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Expected 1 or 3 frames, got {0}")]
    FrameCount(usize),

    #[error("Unable to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Frame dimensions differ: {0:?}")]
    DimensionMismatch(Vec<(u32, u32)>),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

pub trait JpegConverter {
    /// Render `frames` into a JPEG written at `output`.
    ///
    /// Arguments
    /// ---------
    /// * `frames`: one frame, or the `[red, visual, blue]` frames of a color composition
    /// * `output`: path of the JPEG to create
    /// * `params`: rendering parameters
    fn convert(
        &self,
        frames: &[Utf8PathBuf],
        output: &Utf8Path,
        params: &ThumbnailParameters,
    ) -> Result<(), ConversionError>;
}
