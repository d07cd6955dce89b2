use std::fs::File;
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GrayImage, ImageBuffer, Luma,
    Rgb, RgbImage,
};
use tracing::debug;

use super::{ConversionError, JpegConverter};
use crate::parameters::ThumbnailParameters;

/// Single channel of raw pixel values, row major, first row at the bottom of the image as
/// stored in FITS files.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Plane {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, ConversionError> {
        if data.len() != width as usize * height as usize || data.is_empty() {
            return Err(ConversionError::DimensionMismatch(vec![(width, height)]));
        }
        Ok(Plane {
            width,
            height,
            data,
        })
    }

    fn at(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }
}

/// Pixel decoding capability.
pub trait FrameDecoder {
    fn decode(&self, path: &Utf8Path) -> Result<Plane, ConversionError>;
}

/// Value at `percentile` (0 to 100) of an ascending sorted slice, linearly interpolated.
pub(crate) fn percentile_of(sorted: &[f32], percentile: f64) -> f32 {
    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let weight = (rank - low as f64) as f32;
    sorted[low] + (sorted[high] - sorted[low]) * weight
}

/// Replace every pixel by the median of its 3x3 neighbourhood, edges clamped.
pub(crate) fn median_filter(plane: &Plane) -> Plane {
    let (width, height) = (plane.width as i64, plane.height as i64);
    let mut data = Vec::with_capacity(plane.data.len());
    let mut window = [0f32; 9];
    for y in 0..height {
        for x in 0..width {
            let mut n = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let sx = (x + dx).clamp(0, width - 1) as u32;
                    let sy = (y + dy).clamp(0, height - 1) as u32;
                    window[n] = plane.at(sx, sy);
                    n += 1;
                }
            }
            window.sort_by(f32::total_cmp);
            data.push(window[4]);
        }
    }
    Plane {
        width: plane.width,
        height: plane.height,
        data,
    }
}

/// Map pixel values to 8 bits, clipping below the `100 - percentile` and above the `percentile`
/// quantiles. Non finite pixels render black.
pub(crate) fn stretch(plane: &Plane, percentile: f64) -> Vec<u8> {
    let mut finite: Vec<f32> = plane.data.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return vec![0; plane.data.len()];
    }
    finite.sort_by(f32::total_cmp);
    let upper = percentile_of(&finite, percentile.max(100.0 - percentile));
    let lower = percentile_of(&finite, percentile.min(100.0 - percentile));
    let span = upper - lower;

    plane
        .data
        .iter()
        .map(|&value| {
            if !value.is_finite() || span <= 0.0 {
                0
            } else {
                (((value - lower) / span).clamp(0.0, 1.0) * 255.0).round() as u8
            }
        })
        .collect()
}

/// Renders frames decoded by `D` with a percentile stretch.
///
/// The label text is part of the cache key but is not drawn by this renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderingConverter<D> {
    decoder: D,
}

impl<D: FrameDecoder> RenderingConverter<D> {
    pub fn new(decoder: D) -> Self {
        RenderingConverter { decoder }
    }

    /// Decode, filter, stretch and resize `frames` into an 8 bit image.
    pub fn render(
        &self,
        frames: &[Utf8PathBuf],
        params: &ThumbnailParameters,
    ) -> Result<DynamicImage, ConversionError> {
        if frames.len() != 1 && frames.len() != 3 {
            return Err(ConversionError::FrameCount(frames.len()));
        }

        let mut planes = Vec::with_capacity(frames.len());
        for path in frames {
            let plane = self.decoder.decode(path)?;
            planes.push(if params.median {
                median_filter(&plane)
            } else {
                plane
            });
        }
        let (width, height) = (planes[0].width, planes[0].height);
        if planes.iter().any(|p| p.width != width || p.height != height) {
            return Err(ConversionError::DimensionMismatch(
                planes.iter().map(|p| (p.width, p.height)).collect(),
            ));
        }

        let channels: Vec<Vec<u8>> = planes
            .iter()
            .map(|plane| stretch(plane, params.percentile))
            .collect();
        // FITS rows start at the bottom
        let index = |x: u32, y: u32| ((height - 1 - y) * width + x) as usize;

        let image = if channels.len() == 3 {
            let rgb: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
                let i = index(x, y);
                Rgb([channels[0][i], channels[1][i], channels[2][i]])
            });
            DynamicImage::ImageRgb8(rgb)
        } else {
            let gray: GrayImage =
                ImageBuffer::from_fn(width, height, |x, y| Luma([channels[0][index(x, y)]]));
            DynamicImage::ImageLuma8(gray)
        };

        Ok(image.resize(params.width, params.height, FilterType::Lanczos3))
    }
}

impl<D: FrameDecoder> JpegConverter for RenderingConverter<D> {
    fn convert(
        &self,
        frames: &[Utf8PathBuf],
        output: &Utf8Path,
        params: &ThumbnailParameters,
    ) -> Result<(), ConversionError> {
        let image = self.render(frames, params)?;
        let mut writer = BufWriter::new(File::create(output)?);
        image.write_with_encoder(JpegEncoder::new_with_quality(
            &mut writer,
            params.quality.clamp(1, 100),
        ))?;
        writer.flush()?;
        debug!(
            "Rendered {} frame(s) into {output} ({}x{})",
            frames.len(),
            image.width(),
            image.height()
        );
        Ok(())
    }
}
