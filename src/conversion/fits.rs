use camino::Utf8Path;
use fitsio::{hdu::HduInfo, FitsFile};

use super::{render::FrameDecoder, render::Plane, ConversionError};

/// Decodes the first two dimensional image HDU of a FITS file.
///
/// Tile compressed files (`.fits.fz`) keep an empty primary HDU and their pixels in the first
/// extension, which cfitsio exposes as a regular image HDU.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsDecoder;

impl FrameDecoder for FitsDecoder {
    fn decode(&self, path: &Utf8Path) -> Result<Plane, ConversionError> {
        let decode_error = |reason: String| ConversionError::Decode {
            path: path.to_string(),
            reason,
        };

        let mut fptr = FitsFile::open(path).map_err(|e| decode_error(e.to_string()))?;
        let hdu_count = fptr.iter().count();

        for index in 0..hdu_count {
            let hdu = fptr.hdu(index).map_err(|e| decode_error(e.to_string()))?;
            let HduInfo::ImageInfo { shape, .. } = &hdu.info else {
                continue;
            };
            if shape.len() != 2 {
                continue;
            }
            // shape is [NAXIS2, NAXIS1]
            let height = u32::try_from(shape[0]).map_err(|e| decode_error(e.to_string()))?;
            let width = u32::try_from(shape[1]).map_err(|e| decode_error(e.to_string()))?;
            let data: Vec<f32> = hdu
                .read_image(&mut fptr)
                .map_err(|e| decode_error(e.to_string()))?;
            return Plane::new(width, height, data);
        }

        Err(decode_error("no two dimensional image HDU".into()))
    }
}
