//! Matrix extraction: sample every module through the fitted transform,
//! validate fixed patterns, recover format/version information, unmask,
//! unload the zig-zag path, de-interleave, correct each Reed-Solomon
//! block and decode the bit segments.

use crate::decoder::bits::BitReader;
use crate::decoder::transform::Transform;
use crate::ecc::{bch, reed_solomon};
use crate::error::DecodeError;
use crate::layout::mask::apply_mask;
use crate::layout::{
    build_base_matrix, data_path::data_path, format_positions_main, format_positions_second,
    version_positions_bottom_left, version_positions_top_right,
};
use crate::models::{BitMatrix, Charset, ECLevel, EncodingMode, MaskPattern, Version};
use crate::tables::{char_count_bits, ec_block_plan, EcBlockPlan, ERR_CORR_PERCENT, TOTAL_CODEWORDS};

/// Everything recovered from one successful matrix extraction
#[derive(Debug)]
pub struct Extraction {
    /// Decoded payload bytes
    pub bytes: Vec<u8>,
    /// Payload text through the decoder's charset
    pub text: String,
    /// Error correction level from the format information
    pub ec_level: ECLevel,
    /// Mask pattern from the format information
    pub mask: MaskPattern,
    /// ECI assignment value, when present
    pub eci: Option<u32>,
}

/// Run the full extraction pipeline for one (transform, version) candidate
pub fn extract(
    binary: &BitMatrix,
    transform: &Transform,
    version: Version,
    charset: Charset,
) -> Result<Extraction, DecodeError> {
    let base = build_base_matrix(version);
    let dim = version.dimension();

    // Sample every module center through the transform.
    let mut sampled = BitMatrix::new(dim, dim);
    for row in 0..dim {
        for col in 0..dim {
            let p = transform.map(col as f64 + 0.5, row as f64 + 0.5);
            let (x, y) = (p.x.round(), p.y.round());
            let dark = x >= 0.0 && y >= 0.0 && binary.get(x as usize, y as usize);
            sampled.set(col, row, dark);
        }
    }

    let (ec_level, mask) = read_format(&sampled, dim)?;

    if version.has_version_info() {
        let actual = read_version(&sampled, dim)?;
        if actual != version.number() {
            return Err(DecodeError::VersionMismatch {
                estimated: version.number(),
                actual,
            });
        }
    }

    // Fixed-pattern validation against the EC tolerance.
    let mut errors = 0usize;
    let mut total = 0usize;
    for row in 0..dim as i32 {
        for col in 0..dim as i32 {
            if base.is_fixed(row, col) {
                total += 1;
                if sampled.get(col as usize, row as usize) != base.is_dark(row, col) {
                    errors += 1;
                }
            }
        }
    }
    if errors as u32 * 100 > total as u32 * ERR_CORR_PERCENT[ec_level.index()] {
        return Err(DecodeError::FixedModuleMismatch { errors, total });
    }

    // Copy sampled data modules over the base matrix and remove the mask.
    let mut work = base.clone();
    for row in 0..dim as i32 {
        for col in 0..dim as i32 {
            if !work.is_non_data(row, col) {
                work.set_dark(row, col, sampled.get(col as usize, row as usize));
            }
        }
    }
    apply_mask(&mut work, mask);

    // Unload the zig-zag path into wire-order codewords.
    let total_cw = TOTAL_CODEWORDS[version.number() as usize] as usize;
    let path = data_path(&work, total_cw * 8);
    let mut codewords = vec![0u8; total_cw];
    for (idx, &(row, col)) in path.iter().enumerate() {
        if work.is_dark(row, col) {
            codewords[idx / 8] |= 1 << (7 - idx % 8);
        }
    }

    let plan = ec_block_plan(version, ec_level);
    let data = deinterleave_and_correct(&codewords, &plan)?;

    let (bytes, text, eci) = decode_segments(&data, version, charset)?;
    Ok(Extraction {
        bytes,
        text,
        ec_level,
        mask,
        eci,
    })
}

fn gather_bits<const N: usize>(sampled: &BitMatrix, positions: [(i32, i32); N]) -> u32 {
    let mut bits = 0u32;
    for (i, &(row, col)) in positions.iter().enumerate() {
        bits |= (sampled.get(col as usize, row as usize) as u32) << i;
    }
    bits
}

/// Decode the format information: main copy first, then the split replica
fn read_format(sampled: &BitMatrix, dim: usize) -> Result<(ECLevel, MaskPattern), DecodeError> {
    let main = gather_bits(sampled, format_positions_main()) as u16;
    if let Some(found) = bch::decode_format(main) {
        return Ok(found);
    }
    let second = gather_bits(sampled, format_positions_second(dim as i32)) as u16;
    bch::decode_format(second).ok_or(DecodeError::FormatInfoDamaged)
}

/// Decode the version information: top-right block first, then bottom-left
fn read_version(sampled: &BitMatrix, dim: usize) -> Result<u8, DecodeError> {
    let top_right = gather_bits(sampled, version_positions_top_right(dim as i32));
    if let Some(version) = bch::decode_version(top_right) {
        return Ok(version);
    }
    let bottom_left = gather_bits(sampled, version_positions_bottom_left(dim as i32));
    bch::decode_version(bottom_left).ok_or(DecodeError::VersionInfoDamaged)
}

/// Reverse the encoder's column-wise interleave and correct every block
fn deinterleave_and_correct(
    codewords: &[u8],
    plan: &EcBlockPlan,
) -> Result<Vec<u8>, DecodeError> {
    let mut blocks: Vec<Vec<u8>> = (0..plan.num_blocks)
        .map(|b| Vec::with_capacity(plan.block_data_len(b) + plan.ecc_per_block))
        .collect();

    let mut idx = 0;
    let longest = plan.short_len + usize::from(plan.long_blocks > 0);
    for i in 0..longest {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < plan.block_data_len(b) {
                block.push(codewords[idx]);
                idx += 1;
            }
        }
    }
    for _ in 0..plan.ecc_per_block {
        for block in blocks.iter_mut() {
            block.push(codewords[idx]);
            idx += 1;
        }
    }

    let mut data = Vec::with_capacity(plan.data_codewords);
    for (b, block) in blocks.iter_mut().enumerate() {
        reed_solomon::correct(block, plan.ecc_per_block)?;
        data.extend_from_slice(&block[..plan.block_data_len(b)]);
    }
    Ok(data)
}

/// Walk the mode segments of the corrected data codewords
fn decode_segments(
    data: &[u8],
    version: Version,
    charset: Charset,
) -> Result<(Vec<u8>, String, Option<u32>), DecodeError> {
    let mut reader = BitReader::new(data);
    let mut bytes = Vec::new();
    let mut text = String::new();
    let mut eci = None;

    loop {
        if reader.remaining() < 4 {
            break;
        }
        let mode = reader.read(4)? as u8;
        match mode {
            0b0000 => break,
            0b0001 => {
                let count_bits = char_count_bits(EncodingMode::Numeric, version) as u32;
                let mut remaining = reader.read(count_bits)? as usize;
                while remaining > 0 {
                    let group = remaining.min(3);
                    let bits = [0, 4, 7, 10][group];
                    let value = reader.read(bits)?;
                    let digits = match group {
                        3 => format!("{value:03}"),
                        2 => format!("{value:02}"),
                        _ => format!("{value}"),
                    };
                    bytes.extend_from_slice(digits.as_bytes());
                    text.push_str(&digits);
                    remaining -= group;
                }
            }
            0b0010 => {
                let count_bits = char_count_bits(EncodingMode::Alphanumeric, version) as u32;
                let mut remaining = reader.read(count_bits)? as usize;
                while remaining > 0 {
                    if remaining >= 2 {
                        let value = reader.read(11)?;
                        push_alphanumeric(&mut bytes, &mut text, value / 45);
                        push_alphanumeric(&mut bytes, &mut text, value % 45);
                        remaining -= 2;
                    } else {
                        let value = reader.read(6)?;
                        push_alphanumeric(&mut bytes, &mut text, value);
                        remaining -= 1;
                    }
                }
            }
            0b0100 => {
                let count_bits = char_count_bits(EncodingMode::Byte, version) as u32;
                let count = reader.read(count_bits)? as usize;
                let mut segment = Vec::with_capacity(count);
                for _ in 0..count {
                    segment.push(reader.read(8)? as u8);
                }
                text.push_str(&charset.decode(&segment));
                bytes.extend_from_slice(&segment);
            }
            0b0111 => {
                // ECI assignment: 1, 2 or 3 bytes, length signalled by the
                // leading bit run. Recorded, not applied (the caller's
                // charset stays in force).
                let first = reader.read(8)?;
                let value = if first & 0x80 == 0 {
                    first & 0x7F
                } else if first & 0xC0 == 0x80 {
                    ((first & 0x3F) << 8) | reader.read(8)?
                } else {
                    ((first & 0x1F) << 16) | (reader.read(8)? << 8) | reader.read(8)?
                };
                eci = Some(value);
            }
            other => return Err(DecodeError::UnsupportedMode(other)),
        }
    }

    Ok((bytes, text, eci))
}

fn push_alphanumeric(bytes: &mut Vec<u8>, text: &mut String, code: u32) {
    if let Some(&ch) = crate::tables::ALPHANUMERIC_CHARS.get(code as usize) {
        bytes.push(ch);
        text.push(ch as char);
    }
}
