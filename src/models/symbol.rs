//! Symbol-level vocabulary: version, error correction level, mask
//! pattern, character sets and the decode result type.

use crate::error::EncodeError;

/// QR Code version (Model 2, 1..=40)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    /// Create a version, rejecting numbers outside 1..=40
    pub fn new(number: u8) -> Result<Self, EncodeError> {
        if (1..=40).contains(&number) {
            Ok(Self(number))
        } else {
            Err(EncodeError::InvalidVersion(number as u32))
        }
    }

    /// Version number (1..=40)
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Symbol dimension in modules: 17 + 4 * version
    pub fn dimension(&self) -> usize {
        17 + 4 * self.0 as usize
    }

    /// Whether the symbol carries version information blocks
    pub fn has_version_info(&self) -> bool {
        self.0 >= 7
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// Table index in L, M, Q, H order
    pub fn index(&self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }

    /// Two-bit field of the format information (L=01, M=00, Q=11, H=10)
    pub fn format_bits(&self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }

    /// Inverse of [`format_bits`](Self::format_bits)
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => ECLevel::M,
            0b01 => ECLevel::L,
            0b10 => ECLevel::H,
            _ => ECLevel::Q,
        }
    }

    /// Nominal recovery capacity in percent
    pub fn recovery_percent(&self) -> u32 {
        match self {
            ECLevel::L => 7,
            ECLevel::M => 15,
            ECLevel::Q => 25,
            ECLevel::H => 30,
        }
    }
}

/// Data mask pattern (0..=7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Create a mask pattern, rejecting codes outside 0..=7
    pub fn new(code: u8) -> Result<Self, EncodeError> {
        if code <= 7 {
            Ok(Self(code))
        } else {
            Err(EncodeError::InvalidMask(code))
        }
    }

    /// Three-bit mask code
    pub fn code(&self) -> u8 {
        self.0
    }

    /// All eight patterns, in code order
    pub fn all() -> [MaskPattern; 8] {
        [0, 1, 2, 3, 4, 5, 6, 7].map(MaskPattern)
    }

    /// Whether the data module at (row, col) is inverted by this mask
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        let (r, c) = (row, col);
        match self.0 {
            0 => (r + c) % 2 == 0,
            1 => r % 2 == 0,
            2 => c % 3 == 0,
            3 => (r + c) % 3 == 0,
            4 => (r / 2 + c / 3) % 2 == 0,
            5 => (r * c) % 2 + (r * c) % 3 == 0,
            6 => ((r * c) % 2 + (r * c) % 3) % 2 == 0,
            _ => ((r + c) % 2 + (r * c) % 3) % 2 == 0,
        }
    }
}

/// Payload encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Decimal digits, 3 per 10 bits
    Numeric,
    /// The 45-symbol alphanumeric set, 2 per 11 bits
    Alphanumeric,
    /// Raw octets
    Byte,
}

impl EncodingMode {
    /// Four-bit mode indicator
    pub fn indicator(&self) -> u8 {
        match self {
            EncodingMode::Numeric => 0b0001,
            EncodingMode::Alphanumeric => 0b0010,
            EncodingMode::Byte => 0b0100,
        }
    }
}

/// Character set for text payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Latin-1, the historical default of byte-mode symbols
    Iso8859_1,
    /// UTF-8
    Utf8,
}

impl Charset {
    /// Encode text into payload bytes
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| {
                    let code = c as u32;
                    if code <= 0xFF {
                        Ok(code as u8)
                    } else {
                        Err(EncodeError::CharsetMismatch)
                    }
                })
                .collect(),
        }
    }

    /// Decode payload bytes into text; undecodable sequences are replaced
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// One successfully decoded symbol with its post-decode properties
#[derive(Debug, Clone)]
pub struct DecodedSymbol {
    /// Raw decoded payload bytes
    pub bytes: Vec<u8>,
    /// Payload rendered through the decoder's character set
    pub text: String,
    /// Symbol version
    pub version: Version,
    /// Symbol dimension in modules
    pub dimension: usize,
    /// Error correction level from the format information
    pub ec_level: ECLevel,
    /// Mask pattern from the format information
    pub mask: MaskPattern,
    /// ECI assignment value, when an ECI segment was present
    pub eci: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_dimension() {
        assert_eq!(Version::new(1).unwrap().dimension(), 21);
        assert_eq!(Version::new(9).unwrap().dimension(), 53);
        assert_eq!(Version::new(40).unwrap().dimension(), 177);
        assert!(Version::new(0).is_err());
        assert!(Version::new(41).is_err());
    }

    #[test]
    fn test_ec_format_bits_roundtrip() {
        for ec in [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H] {
            assert_eq!(ECLevel::from_format_bits(ec.format_bits()), ec);
        }
        // The external numbering swaps L and M.
        assert_eq!(ECLevel::L.format_bits(), 0b01);
        assert_eq!(ECLevel::M.format_bits(), 0b00);
    }

    #[test]
    fn test_mask_predicates() {
        let m0 = MaskPattern::new(0).unwrap();
        assert!(m0.is_masked(0, 0));
        assert!(!m0.is_masked(0, 1));
        assert!(m0.is_masked(1, 1));

        let m1 = MaskPattern::new(1).unwrap();
        assert!(m1.is_masked(0, 5));
        assert!(!m1.is_masked(1, 5));

        assert!(MaskPattern::new(8).is_err());
    }

    #[test]
    fn test_charset_latin1() {
        let cs = Charset::Iso8859_1;
        assert_eq!(cs.encode("caf\u{e9}").unwrap(), b"caf\xe9");
        assert_eq!(cs.decode(b"caf\xe9"), "caf\u{e9}");
        assert!(cs.encode("\u{4e16}").is_err());
    }
}
