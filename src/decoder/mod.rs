//! Image decoder pipeline: binarize, locate finder patterns, assemble
//! corner candidates, fit transforms and extract the symbol.
//!
//! Every per-candidate failure is logged through the `log` facade and
//! the loop moves on to the next candidate; only the complete absence of
//! a successful decoding surfaces to the caller, as an empty result.

/// Alignment pattern location
pub mod alignment;
/// Pixel source and binarization
pub mod binarize;
/// Sliding-window bit reader
pub mod bits;
/// Corner geometry
pub mod corner;
/// Matrix extraction and segment decoding
pub mod extract;
/// Finder pattern location
pub mod finder;
/// Affine and perspective transforms
pub mod transform;

use log::debug;

pub use binarize::Bitmap;

use crate::decoder::alignment::locate_alignment;
use crate::decoder::binarize::binarize;
use crate::decoder::corner::Corner;
use crate::decoder::extract::{extract, Extraction};
use crate::decoder::finder::locate_finders;
use crate::decoder::transform::{
    AffineTransform, PerspectiveTransform, Transform, FINDER_CENTER_OFFSET,
};
use crate::error::DecodeError;
use crate::models::{BitMatrix, Charset, DecodedSymbol, Point, Version};

/// Fraction of the corner side lengths used as the alignment search
/// window
const ALIGNMENT_WINDOW_RATIO: f64 = 0.3;

/// Image decoder with a configurable byte-segment character set
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    /// Character set applied to byte-mode segments
    pub charset: Charset,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder {
    /// Create a decoder with the UTF-8 character set
    pub fn new() -> Self {
        Self {
            charset: Charset::Utf8,
        }
    }

    /// Create a decoder with an explicit character set
    pub fn with_charset(charset: Charset) -> Self {
        Self { charset }
    }

    /// Decode every symbol found in a bitmap.
    ///
    /// Returns one entry per successful decoding; different corner
    /// candidates may decode the same symbol, so duplicates are possible.
    /// An empty vector means nothing was found (the reason is logged).
    pub fn decode(&self, bitmap: &Bitmap) -> Vec<DecodedSymbol> {
        let binary = match binarize(bitmap) {
            Ok(binary) => binary,
            Err(reason) => {
                debug!("binarization failed: {reason}");
                return Vec::new();
            }
        };
        self.decode_binary(&binary)
    }

    /// Decode from an already binarized image
    pub fn decode_binary(&self, binary: &BitMatrix) -> Vec<DecodedSymbol> {
        let finders = locate_finders(binary);
        if finders.len() < 3 {
            debug!("{}", DecodeError::NoFinders);
            return Vec::new();
        }
        debug!("{} finder candidates", finders.len());

        let mut results = Vec::new();
        let mut corners_seen = 0usize;
        for i in 0..finders.len() {
            for j in (i + 1)..finders.len() {
                for k in (j + 1)..finders.len() {
                    let Some(corner) =
                        Corner::from_candidates(&finders[i], &finders[j], &finders[k])
                    else {
                        continue;
                    };
                    corners_seen += 1;
                    match self.decode_corner(binary, &corner) {
                        Ok(symbol) => results.push(symbol),
                        Err(reason) => {
                            debug!("corner ({i},{j},{k}) failed: {reason}");
                        }
                    }
                }
            }
        }
        if corners_seen == 0 {
            debug!("{}", DecodeError::NoCorner);
        }
        results
    }

    /// Try one corner: affine transform first, then alignment-refined
    /// perspective transforms for versions above 1
    fn decode_corner(
        &self,
        binary: &BitMatrix,
        corner: &Corner,
    ) -> Result<DecodedSymbol, DecodeError> {
        let version = corner.estimated_version();

        let affine_result = self.extract_with_version_retry(binary, version, &|v| {
            let affine = AffineTransform::from_corner(corner, v.dimension())?;
            Ok(Transform::Affine(affine))
        });
        let affine_err = match affine_result {
            Ok(symbol) => return Ok(symbol),
            Err(e) => e,
        };

        // Version 1 has no alignment pattern to refine with.
        if version <= 1 {
            return Err(affine_err);
        }

        let dimension = Version::new(version)
            .map_err(|_| DecodeError::NoCorner)?
            .dimension() as f64;
        let affine = AffineTransform::from_corner(corner, dimension as usize)?;
        let predicted = affine.map(dimension - 6.5, dimension - 6.5);
        let window = ALIGNMENT_WINDOW_RATIO * (corner.top_len + corner.left_len);
        let module = (corner.module_top + corner.module_left) / 2.0;

        for candidate in locate_alignment(binary, predicted, window, module) {
            let result = self.extract_with_version_retry(binary, version, &|v| {
                perspective_through_alignment(corner, candidate, v.dimension())
            });
            match result {
                Ok(symbol) => return Ok(symbol),
                Err(reason) => debug!("alignment candidate {candidate:?} failed: {reason}"),
            }
        }
        Err(affine_err)
    }

    /// Extract with the geometry-estimated version; when the symbol's
    /// version information disagrees, rebuild the transform once at the
    /// recovered version and retry
    fn extract_with_version_retry(
        &self,
        binary: &BitMatrix,
        version: u8,
        build: &dyn Fn(Version) -> Result<Transform, DecodeError>,
    ) -> Result<DecodedSymbol, DecodeError> {
        let first = Version::new(version).map_err(|_| DecodeError::NoCorner)?;
        let transform = build(first)?;
        match extract(binary, &transform, first, self.charset) {
            Ok(extraction) => Ok(into_symbol(extraction, first)),
            Err(DecodeError::VersionMismatch { actual, .. }) => {
                debug!("version info says {actual}, geometry said {version}");
                let second = Version::new(actual).map_err(|_| DecodeError::VersionInfoDamaged)?;
                let transform = build(second)?;
                let extraction = extract(binary, &transform, second, self.charset)?;
                Ok(into_symbol(extraction, second))
            }
            Err(other) => Err(other),
        }
    }
}

/// Fit the perspective transform through the three finder centers and one
/// alignment-center candidate
fn perspective_through_alignment(
    corner: &Corner,
    alignment: Point,
    dimension: usize,
) -> Result<Transform, DecodeError> {
    let far = dimension as f64 - FINDER_CENTER_OFFSET;
    let align_module = dimension as f64 - 6.5;
    let src = [
        Point::new(FINDER_CENTER_OFFSET, FINDER_CENTER_OFFSET),
        Point::new(far, FINDER_CENTER_OFFSET),
        Point::new(FINDER_CENTER_OFFSET, far),
        Point::new(align_module, align_module),
    ];
    let dst = [corner.top_left, corner.top_right, corner.bottom_left, alignment];
    Ok(Transform::Perspective(PerspectiveTransform::from_points(
        &src, &dst,
    )?))
}

fn into_symbol(extraction: Extraction, version: Version) -> DecodedSymbol {
    DecodedSymbol {
        bytes: extraction.bytes,
        text: extraction.text,
        version,
        dimension: version.dimension(),
        ec_level: extraction.ec_level,
        mask: extraction.mask,
        eci: extraction.eci,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::QrEncoder;
    use crate::models::ECLevel;
    use crate::render::to_bit_grid;

    fn roundtrip(payload: &[u8], ec: ECLevel, mask: Option<u8>, version: u8) -> Vec<DecodedSymbol> {
        let mut enc = QrEncoder::new(ec);
        enc.encode(payload, mask, version).expect("encode");
        let grid = to_bit_grid(enc.matrix().unwrap(), 4, 4);
        ImageDecoder::new().decode_binary(&grid)
    }

    #[test]
    fn test_binary_roundtrip_v1() {
        let results = roundtrip(b"HELLO WORLD", ECLevel::M, Some(5), 1);
        assert!(!results.is_empty(), "no decoding found");
        let symbol = &results[0];
        assert_eq!(symbol.bytes, b"HELLO WORLD");
        assert_eq!(symbol.version.number(), 1);
        assert_eq!(symbol.ec_level, ECLevel::M);
        assert_eq!(symbol.mask.code(), 5);
    }

    #[test]
    fn test_binary_roundtrip_v2_uses_alignment_era_version() {
        let results = roundtrip(b"0123456789", ECLevel::L, Some(0), 2);
        assert!(!results.is_empty());
        assert_eq!(results[0].text, "0123456789");
        assert_eq!(results[0].version.number(), 2);
    }

    #[test]
    fn test_empty_image_finds_nothing() {
        let grid = BitMatrix::new(50, 50);
        assert!(ImageDecoder::new().decode_binary(&grid).is_empty());
    }
}
