//! Static ISO/IEC 18004 constants: codeword capacities, error correction
//! block structure, alignment pattern coordinates, the alphanumeric code
//! table and character-count indicator widths.

use crate::models::{ECLevel, EncodingMode, Version};

/// Total codewords (data + EC) per version, index = version number.
pub const TOTAL_CODEWORDS: [u16; 41] = [
    0, 26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761, 2876,
    3034, 3196, 3362, 3532, 3706,
];

// Index: [ec_level][version], L/M/Q/H order.
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Fixed-module mismatch tolerance per EC level, in percent (L/M/Q/H order).
pub const ERR_CORR_PERCENT: [u32; 4] = [7, 15, 25, 30];

/// Error correction block structure for one (version, EC level) pair.
///
/// Data codewords are split into `short_blocks` blocks of `short_len`
/// bytes followed by `long_blocks` blocks of `short_len + 1` bytes; each
/// block carries `ecc_per_block` EC codewords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlockPlan {
    /// Number of error correction blocks
    pub num_blocks: usize,
    /// EC codewords per block
    pub ecc_per_block: usize,
    /// Total data codewords across all blocks
    pub data_codewords: usize,
    /// Blocks in the first (shorter) group
    pub short_blocks: usize,
    /// Data codewords per short block
    pub short_len: usize,
    /// Blocks in the second group (one extra data codeword each)
    pub long_blocks: usize,
}

impl EcBlockPlan {
    /// Data codewords in block `b` (short blocks come first)
    pub fn block_data_len(&self, b: usize) -> usize {
        if b < self.short_blocks {
            self.short_len
        } else {
            self.short_len + 1
        }
    }
}

/// Block structure for a (version, EC level) pair
pub fn ec_block_plan(version: Version, ec: ECLevel) -> EcBlockPlan {
    let v = version.number() as usize;
    let idx = ec.index();
    let num_blocks = NUM_ERROR_CORRECTION_BLOCKS[idx][v] as usize;
    let ecc_per_block = ECC_CODEWORDS_PER_BLOCK[idx][v] as usize;
    let total = TOTAL_CODEWORDS[v] as usize;
    let data_codewords = total - num_blocks * ecc_per_block;
    let long_blocks = data_codewords % num_blocks;
    EcBlockPlan {
        num_blocks,
        ecc_per_block,
        data_codewords,
        short_blocks: num_blocks - long_blocks,
        short_len: data_codewords / num_blocks,
        long_blocks,
    }
}

/// Alignment pattern center coordinates for a version, ascending.
/// Empty for version 1.
pub fn alignment_positions(version: Version) -> Vec<usize> {
    let v = version.number() as usize;
    if v == 1 {
        return Vec::new();
    }
    let num_align = v / 7 + 2;
    let size = version.dimension();
    let step = if v == 32 {
        26
    } else {
        (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };

    let mut positions = vec![0usize; num_align];
    positions[0] = 6;
    let mut pos = (size - 7) as isize;
    for slot in positions.iter_mut().skip(1).rev() {
        *slot = pos as usize;
        pos -= step as isize;
    }
    positions
}

/// The 45-symbol alphanumeric code table, index = code value.
pub const ALPHANUMERIC_CHARS: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Code value of a byte in the alphanumeric set, if it belongs
pub fn alphanumeric_index(byte: u8) -> Option<u8> {
    ALPHANUMERIC_CHARS
        .iter()
        .position(|&c| c == byte)
        .map(|i| i as u8)
}

/// Width of the character-count indicator for (mode, version bucket)
pub fn char_count_bits(mode: EncodingMode, version: Version) -> usize {
    let v = version.number();
    match mode {
        EncodingMode::Numeric => {
            if v <= 9 {
                10
            } else if v <= 26 {
                12
            } else {
                14
            }
        }
        EncodingMode::Alphanumeric => {
            if v <= 9 {
                9
            } else if v <= 26 {
                11
            } else {
                13
            }
        }
        EncodingMode::Byte => {
            if v <= 9 {
                8
            } else {
                16
            }
        }
    }
}
