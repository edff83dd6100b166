//! Error correction arithmetic shared by the encoder and the decoder:
//! GF(256) tables, the Reed-Solomon codeword codec and the BCH format
//! and version information words.

/// BCH(15,5) format and BCH(18,6) version codewords
pub mod bch;
/// GF(2^8) field arithmetic
pub mod gf256;
/// Reed-Solomon encode and correct
pub mod reed_solomon;
