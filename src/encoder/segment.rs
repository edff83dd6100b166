//! Mode selection and segment bit emission.

use crate::encoder::bits::BitWriter;
use crate::models::{EncodingMode, Version};
use crate::tables::{alphanumeric_index, char_count_bits};

/// Tightest mode able to represent every payload byte
pub fn select_mode(payload: &[u8]) -> EncodingMode {
    if payload.iter().all(|b| b.is_ascii_digit()) {
        EncodingMode::Numeric
    } else if payload.iter().all(|&b| alphanumeric_index(b).is_some()) {
        EncodingMode::Alphanumeric
    } else {
        EncodingMode::Byte
    }
}

/// Whether `mode` can represent every payload byte
pub fn mode_admits(mode: EncodingMode, payload: &[u8]) -> bool {
    match mode {
        EncodingMode::Numeric => payload.iter().all(|b| b.is_ascii_digit()),
        EncodingMode::Alphanumeric => payload.iter().all(|&b| alphanumeric_index(b).is_some()),
        EncodingMode::Byte => true,
    }
}

/// Payload bits for `len` characters in `mode`, headers excluded
pub fn payload_bit_len(mode: EncodingMode, len: usize) -> usize {
    match mode {
        EncodingMode::Numeric => 10 * (len / 3) + [0, 4, 7][len % 3],
        EncodingMode::Alphanumeric => 11 * (len / 2) + 6 * (len % 2),
        EncodingMode::Byte => 8 * len,
    }
}

/// Total bits for a single segment: mode indicator, count indicator and
/// payload
pub fn segment_bit_len(mode: EncodingMode, len: usize, version: Version) -> usize {
    4 + char_count_bits(mode, version) + payload_bit_len(mode, len)
}

/// Emit the segment header and payload.
///
/// The caller guarantees that `mode` admits the payload.
pub fn write_segment(w: &mut BitWriter, mode: EncodingMode, payload: &[u8], version: Version) {
    w.append(mode.indicator() as u32, 4);
    w.append(payload.len() as u32, char_count_bits(mode, version));

    match mode {
        EncodingMode::Numeric => {
            for group in payload.chunks(3) {
                let mut value = 0u32;
                for &d in group {
                    value = value * 10 + (d - b'0') as u32;
                }
                let bits = match group.len() {
                    3 => 10,
                    2 => 7,
                    _ => 4,
                };
                w.append(value, bits);
            }
        }
        EncodingMode::Alphanumeric => {
            for pair in payload.chunks(2) {
                if pair.len() == 2 {
                    let hi = alphanumeric_index(pair[0]).unwrap() as u32;
                    let lo = alphanumeric_index(pair[1]).unwrap() as u32;
                    w.append(hi * 45 + lo, 11);
                } else {
                    w.append(alphanumeric_index(pair[0]).unwrap() as u32, 6);
                }
            }
        }
        EncodingMode::Byte => {
            for &b in payload {
                w.append(b as u32, 8);
            }
        }
    }
}
