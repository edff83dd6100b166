//! QR symbol encoder: segments the payload, pads and block-interleaves
//! codewords with their Reed-Solomon protection, stamps the bits into a
//! base matrix and finishes the symbol with mask and format/version
//! information.

/// MSB-first bit writer
pub mod bits;
/// Mode selection and segment emission
pub mod segment;

use std::path::Path;

use crate::ecc::reed_solomon;
use crate::encoder::bits::BitWriter;
use crate::encoder::segment::{mode_admits, segment_bit_len, select_mode, write_segment};
use crate::error::EncodeError;
use crate::layout::mask::{apply_mask, choose_mask};
use crate::layout::{build_base_matrix, data_path::data_path, write_format_info, write_version_info};
use crate::models::{Charset, ECLevel, EncodingMode, MaskPattern, ModuleMatrix, Version};
use crate::render;
use crate::tables::{char_count_bits, ec_block_plan, EcBlockPlan};

/// Stateful symbol encoder.
///
/// Set the error correction level, call one of the `encode*` methods,
/// then read the finished matrix or write it out as a PNG.
#[derive(Debug)]
pub struct QrEncoder {
    /// Error correction level applied by subsequent encode calls
    pub ec_level: ECLevel,
    matrix: Option<ModuleMatrix>,
    version: Option<Version>,
    mask: Option<MaskPattern>,
}

impl QrEncoder {
    /// Create an encoder with the given error correction level
    pub fn new(ec_level: ECLevel) -> Self {
        Self {
            ec_level,
            matrix: None,
            version: None,
            mask: None,
        }
    }

    /// Encode a byte payload, selecting the tightest mode automatically.
    ///
    /// `mask` of `None` selects the lowest-penalty mask.
    pub fn encode(
        &mut self,
        payload: &[u8],
        mask: Option<u8>,
        version: u8,
    ) -> Result<(), EncodeError> {
        self.encode_with_mode(payload, select_mode(payload), mask, version)
    }

    /// Encode with a caller-forced mode
    pub fn encode_with_mode(
        &mut self,
        payload: &[u8],
        mode: EncodingMode,
        mask: Option<u8>,
        version: u8,
    ) -> Result<(), EncodeError> {
        let version = Version::new(version)?;
        let mask = mask.map(MaskPattern::new).transpose()?;

        if !mode_admits(mode, payload) {
            return Err(EncodeError::InvalidCharForMode { mode });
        }

        let plan = ec_block_plan(version, self.ec_level);
        let capacity = plan.data_codewords * 8;
        let needed = segment_bit_len(mode, payload.len(), version);
        let count_bits = char_count_bits(mode, version);
        if needed > capacity || payload.len() >= (1usize << count_bits) {
            return Err(EncodeError::CapacityExceeded {
                needed,
                capacity,
                version: version.number(),
                ec: self.ec_level,
            });
        }

        let data = build_data_codewords(payload, mode, version, &plan);
        let wire = interleave_blocks(&data, &plan);

        let mut matrix = build_base_matrix(version);
        let path = data_path(&matrix, wire.len() * 8);
        for (idx, &(row, col)) in path.iter().enumerate() {
            let bit = (wire[idx / 8] >> (7 - idx % 8)) & 1 == 1;
            matrix.set_dark(row, col, bit);
        }

        let mask = match mask {
            Some(m) => m,
            None => choose_mask(&matrix, self.ec_level),
        };
        apply_mask(&mut matrix, mask);
        write_format_info(&mut matrix, self.ec_level, mask);
        write_version_info(&mut matrix, version);

        self.matrix = Some(matrix);
        self.version = Some(version);
        self.mask = Some(mask);
        Ok(())
    }

    /// Encode text through a character set; `version` of `None` picks the
    /// smallest fitting version
    pub fn encode_text(
        &mut self,
        text: &str,
        charset: Charset,
        mask: Option<u8>,
        version: Option<u8>,
    ) -> Result<(), EncodeError> {
        let payload = charset.encode(text)?;
        let version = match version {
            Some(v) => v,
            None => self.fit_version(&payload)?.number(),
        };
        self.encode(&payload, mask, version)
    }

    /// Smallest version whose data capacity admits the payload
    pub fn fit_version(&self, payload: &[u8]) -> Result<Version, EncodeError> {
        let mode = select_mode(payload);
        for v in 1..=40u8 {
            let version = Version::new(v)?;
            let plan = ec_block_plan(version, self.ec_level);
            let count_bits = char_count_bits(mode, version);
            if payload.len() < (1usize << count_bits)
                && segment_bit_len(mode, payload.len(), version) <= plan.data_codewords * 8
            {
                return Ok(version);
            }
        }
        Err(EncodeError::NoFittingVersion {
            len: payload.len(),
            ec: self.ec_level,
        })
    }

    /// The finished module matrix, once a payload was encoded
    pub fn matrix(&self) -> Option<&ModuleMatrix> {
        self.matrix.as_ref()
    }

    /// The version of the last encoded symbol
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// The mask applied to the last encoded symbol
    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    /// Write the encoded symbol as a monochrome PNG with default module
    /// size and quiet zone
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        match &self.matrix {
            Some(matrix) => render::save_png(
                matrix,
                path,
                render::DEFAULT_MODULE_PX,
                render::DEFAULT_QUIET_ZONE,
            ),
            None => Err(image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no symbol has been encoded",
            ))),
        }
    }
}

/// Segment bits, terminator, bit padding and 0xEC/0x11 byte padding up to
/// the version's data capacity
fn build_data_codewords(
    payload: &[u8],
    mode: EncodingMode,
    version: Version,
    plan: &EcBlockPlan,
) -> Vec<u8> {
    let capacity = plan.data_codewords * 8;
    let mut w = BitWriter::new();
    write_segment(&mut w, mode, payload, version);

    let terminator = (capacity - w.bit_len()).min(4);
    w.append(0, terminator);

    let mut data = w.into_bytes();
    let mut even_pad = true;
    while data.len() < plan.data_codewords {
        data.push(if even_pad { 0xEC } else { 0x11 });
        even_pad = !even_pad;
    }
    data
}

/// Split data codewords into the block plan, compute each block's EC
/// codewords and interleave both column-wise into wire order
fn interleave_blocks(data: &[u8], plan: &EcBlockPlan) -> Vec<u8> {
    let mut blocks: Vec<&[u8]> = Vec::with_capacity(plan.num_blocks);
    let mut offset = 0;
    for b in 0..plan.num_blocks {
        let len = plan.block_data_len(b);
        blocks.push(&data[offset..offset + len]);
        offset += len;
    }

    let eccs: Vec<Vec<u8>> = blocks
        .iter()
        .map(|block| reed_solomon::compute_ecc(block, plan.ecc_per_block))
        .collect();

    let total = plan.data_codewords + plan.num_blocks * plan.ecc_per_block;
    let mut wire = Vec::with_capacity(total);
    let longest = plan.short_len + usize::from(plan.long_blocks > 0);
    for i in 0..longest {
        for (b, block) in blocks.iter().enumerate() {
            if i < plan.block_data_len(b) {
                wire.push(block[i]);
            }
        }
    }
    for i in 0..plan.ecc_per_block {
        for ecc in &eccs {
            wire.push(ecc[i]);
        }
    }
    wire
}

/// Data capacity in payload bytes for (version, ec) in byte mode
pub fn byte_mode_capacity(version: Version, ec: ECLevel) -> usize {
    let plan = ec_block_plan(version, ec);
    let capacity = plan.data_codewords * 8;
    let header = 4 + char_count_bits(EncodingMode::Byte, version);
    (capacity - header) / 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_version_and_mask() {
        let mut enc = QrEncoder::new(ECLevel::M);
        assert!(matches!(
            enc.encode(b"HI", None, 0),
            Err(EncodeError::InvalidVersion(0))
        ));
        assert!(matches!(
            enc.encode(b"HI", None, 41),
            Err(EncodeError::InvalidVersion(41))
        ));
        assert!(matches!(
            enc.encode(b"HI", Some(8), 1),
            Err(EncodeError::InvalidMask(8))
        ));
    }

    #[test]
    fn test_forced_mode_rejects_foreign_bytes() {
        let mut enc = QrEncoder::new(ECLevel::L);
        let err = enc.encode_with_mode(b"hello", EncodingMode::Numeric, None, 1);
        assert!(matches!(err, Err(EncodeError::InvalidCharForMode { .. })));
    }

    #[test]
    fn test_known_data_codewords_hello_world() {
        // ISO reference: "HELLO WORLD", version 1-Q.
        let version = Version::new(1).unwrap();
        let plan = ec_block_plan(version, ECLevel::Q);
        let data = build_data_codewords(b"HELLO WORLD", EncodingMode::Alphanumeric, version, &plan);
        assert_eq!(
            data,
            vec![0x20, 0x5B, 0x0B, 0x78, 0xD1, 0x72, 0xDC, 0x4D, 0x43, 0x40, 0xEC, 0x11, 0xEC]
        );
    }

    #[test]
    fn test_padding_alternates() {
        let version = Version::new(1).unwrap();
        let plan = ec_block_plan(version, ECLevel::L); // 19 data codewords
        let data = build_data_codewords(b"1", EncodingMode::Numeric, version, &plan);
        assert_eq!(data.len(), 19);
        // 4 + 10 + 4 bits = 18 bits -> 3 bytes of content, 16 pad bytes.
        assert_eq!(&data[3..7], &[0xEC, 0x11, 0xEC, 0x11]);
    }

    #[test]
    fn test_capacity_boundary_v9_m() {
        let version = Version::new(9).unwrap();
        let capacity = byte_mode_capacity(version, ECLevel::M);

        let mut enc = QrEncoder::new(ECLevel::M);
        let exact = vec![0x7Eu8; capacity];
        assert!(enc.encode(&exact, Some(2), 9).is_ok());

        let over = vec![0x7Eu8; capacity + 1];
        assert!(matches!(
            enc.encode(&over, Some(2), 9),
            Err(EncodeError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_interleave_v5_q_shape() {
        // v5-Q: 134 total codewords, 4 blocks x 18 ecc = 72, 62 data
        // codewords split (15, 15, 16, 16).
        let version = Version::new(5).unwrap();
        let plan = ec_block_plan(version, ECLevel::Q);
        assert_eq!(plan.num_blocks, 4);
        assert_eq!(plan.short_len, 15);
        assert_eq!(plan.long_blocks, 2);

        let data: Vec<u8> = (0..plan.data_codewords as u8).collect();
        let wire = interleave_blocks(&data, &plan);
        assert_eq!(wire.len(), 134);
        // First column of the data interleave: byte 0 of each block.
        assert_eq!(wire[0], 0);
        assert_eq!(wire[1], 15);
        assert_eq!(wire[2], 30);
        assert_eq!(wire[3], 46);
        // Last data column only exists in the two long blocks.
        assert_eq!(wire[60], 45);
        assert_eq!(wire[61], 61);
    }

    #[test]
    fn test_fit_version_grows_with_payload() {
        let enc = QrEncoder::new(ECLevel::M);
        assert_eq!(enc.fit_version(b"HELLO").unwrap().number(), 1);
        let big = vec![b'7'; 1000];
        assert!(enc.fit_version(&big).unwrap().number() > 9);
    }

    #[test]
    fn test_encode_produces_matrix_with_requested_mask() {
        let mut enc = QrEncoder::new(ECLevel::M);
        enc.encode(b"HELLO WORLD", Some(5), 1).unwrap();
        assert_eq!(enc.mask().unwrap().code(), 5);
        assert_eq!(enc.version().unwrap().number(), 1);
        let matrix = enc.matrix().unwrap();
        assert_eq!(matrix.size(), 21);
        // Dark module must survive masking.
        assert!(matrix.is_dark(21 - 8, 8));
    }
}
