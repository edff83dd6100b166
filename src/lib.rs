//! qrcodec - QR Code (ISO/IEC 18004) encoder and camera-image decoder.
//!
//! The crate encodes byte payloads into Model 2 QR symbols (versions
//! 1-40, numeric/alphanumeric/byte modes) and decodes symbols from
//! scanned bitmaps: binarization, 1:1:3:1:1 finder location, corner
//! geometry with affine or alignment-refined perspective transforms,
//! Reed-Solomon block correction and segment decoding.
//!
//! ```no_run
//! use qrcodec::{Bitmap, ECLevel, ImageDecoder, QrEncoder};
//!
//! let mut encoder = QrEncoder::new(ECLevel::M);
//! encoder.encode(b"HELLO WORLD", None, 1)?;
//! encoder.save_png("hello.png")?;
//!
//! # let (pixels, width, height) = (vec![0u8; 300], 10usize, 10usize);
//! let bitmap = Bitmap::from_bgr24(width, height, &pixels)?;
//! for symbol in ImageDecoder::new().decode(&bitmap) {
//!     println!("{}", symbol.text);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

/// Symbol decoding from bitmaps
pub mod decoder;
/// Error correction arithmetic (GF(256), Reed-Solomon, BCH)
pub mod ecc;
/// Symbol encoding
pub mod encoder;
/// Error types
pub mod error;
/// Symbol layout: base matrix, data path, masking
pub mod layout;
/// Shared data structures
pub mod models;
/// Rasterization and PNG output
pub mod render;
/// ISO/IEC 18004 constant tables
pub mod tables;

pub use decoder::{Bitmap, ImageDecoder};
pub use encoder::QrEncoder;
pub use error::{DecodeError, EncodeError};
pub use models::{
    BitMatrix, Charset, DecodedSymbol, ECLevel, EncodingMode, MaskPattern, ModuleMatrix, Point,
    Version,
};

/// Decode every QR symbol in a tightly packed 24bpp BGR buffer
pub fn decode_bgr(pixels: &[u8], width: usize, height: usize) -> Vec<DecodedSymbol> {
    match Bitmap::from_bgr24(width, height, pixels) {
        Ok(bitmap) => ImageDecoder::new().decode(&bitmap),
        Err(reason) => {
            log::debug!("invalid bitmap: {reason}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bgr_empty_image() {
        let pixels = vec![0u8; 10 * 10 * 3];
        assert!(decode_bgr(&pixels, 10, 10).is_empty());
    }

    #[test]
    fn test_decode_bgr_rejects_short_buffer() {
        let pixels = vec![0u8; 10];
        assert!(decode_bgr(&pixels, 10, 10).is_empty());
    }
}
