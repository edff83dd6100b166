//! Error types.
//!
//! Encoder errors are fatal and surfaced immediately. Decoder errors are
//! per-candidate: the decode driver logs them and moves on to the next
//! finder triple, so they reach the caller only through diagnostics.

use crate::models::{ECLevel, EncodingMode};

/// Fatal encoder-side failures
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// Version number outside 1..=40
    #[error("version must be 1..=40, got {0}")]
    InvalidVersion(u32),
    /// Mask code outside 0..=7
    #[error("mask pattern must be 0..=7, got {0}")]
    InvalidMask(u8),
    /// Payload does not fit the requested version and EC level
    #[error("payload needs {needed} bits but version {version} at {ec:?} holds {capacity}")]
    CapacityExceeded {
        /// Bits required by the segment, header included
        needed: usize,
        /// Data capacity of the symbol in bits
        capacity: usize,
        /// Requested version number
        version: u8,
        /// Requested error correction level
        ec: ECLevel,
    },
    /// A forced encoding mode cannot represent the payload
    #[error("payload contains bytes outside the {mode:?} character set")]
    InvalidCharForMode {
        /// The forced mode
        mode: EncodingMode,
    },
    /// Text cannot be represented in the requested character set
    #[error("text cannot be represented in the requested character set")]
    CharsetMismatch,
    /// No version 1..=40 can hold the payload
    #[error("payload of {len} bytes fits no version at {ec:?}")]
    NoFittingVersion {
        /// Payload length in bytes
        len: usize,
        /// Requested error correction level
        ec: ECLevel,
    },
}

/// Per-candidate decoder failures; the outer decode loop treats every
/// variant as "skip this candidate"
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Bitmap stride or pixel format is unsupported
    #[error("unsupported bitmap layout (stride or pixel format)")]
    InvalidInputFormat,
    /// Gray-level histogram spans fewer than two buckets
    #[error("image gray levels span fewer than two buckets")]
    UniformImage,
    /// Fewer than three finder patterns survived the scan
    #[error("fewer than three finder patterns located")]
    NoFinders,
    /// No finder triple forms a valid L-corner
    #[error("no finder triple forms a corner")]
    NoCorner,
    /// The transform system is singular
    #[error("transform matrix is singular")]
    LinearSolveFailure,
    /// Too many fixed-pattern modules sampled with the wrong color
    #[error("fixed-module mismatch {errors}/{total} exceeds tolerance")]
    FixedModuleMismatch {
        /// Mismatched fixed modules
        errors: usize,
        /// Total fixed modules
        total: usize,
    },
    /// Neither format-information copy decodes within distance 3
    #[error("format information unrecoverable")]
    FormatInfoDamaged,
    /// Neither version-information copy decodes within distance 3
    #[error("version information unrecoverable")]
    VersionInfoDamaged,
    /// Version information disagrees with the geometric estimate
    #[error("version info decodes to {actual}, geometry estimated {estimated}")]
    VersionMismatch {
        /// Version estimated from module pitch
        estimated: u8,
        /// Version recovered from the BCH blocks
        actual: u8,
    },
    /// A Reed-Solomon block holds more errors than it can correct
    #[error("Reed-Solomon block exceeds {max_errors} correctable errors")]
    UncorrectableBlock {
        /// Correction capacity of the block
        max_errors: usize,
    },
    /// The bit stream ended inside a segment
    #[error("bit stream ended inside a segment")]
    PrematureEndOfData,
    /// A mode indicator other than numeric/alphanumeric/byte/ECI/terminator
    #[error("unsupported mode indicator {0:#06b}")]
    UnsupportedMode(u8),
}
