//! Error types for NTFS boot sector and MFT parsing.
//!
//! Every variant other than `Io` and `Codec` means a structural invariant of
//! the on-disk metadata is violated: the boot sector or an MFT record is
//! malformed and the volume load fails as a whole.

use std::io;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur while loading NTFS volume metadata.
#[derive(Error, Debug)]
pub enum NtfsError {
    /// The boot sector OEM field is not "NTFS    ".
    #[error("invalid OEM id: `{0}`, expected \"NTFS    \"")]
    InvalidOemId(String),

    /// The boot sector does not end with the 0x55AA signature.
    #[error("invalid boot sector signature: `{0}`, expected 0x55AA")]
    InvalidBootSignature(String),

    /// Bytes per sector must be greater than 0.
    #[error("invalid count of bytes per sector: `{0}`")]
    InvalidBytesPerSector(u16),

    /// Sectors per cluster must be greater than 0.
    #[error("invalid number of sectors per cluster: `{0}`")]
    InvalidSectorsPerCluster(u8),

    /// The total sector count does not describe a representable volume size.
    #[error("invalid total sector count: `{0}`")]
    InvalidTotalSectors(u64),

    /// The MFT cluster number points outside the volume.
    #[error("invalid MFT cluster number: `{0}`")]
    InvalidMftCluster(u64),

    /// The raw MFT record size field derives to a record size outside the
    /// legal range.
    #[error("invalid MFT record size field: `{0}`")]
    InvalidMftRecordSize(i8),

    /// An MFT record does not open with the "FILE" signature.
    #[error("MFT record {index} has signature `{found}`, expected \"FILE\"")]
    BadRecordSignature { index: usize, found: String },

    /// An MFT record header claims more used bytes than the record holds.
    #[error("MFT record {index} claims {used} used bytes in a {record_size}-byte record")]
    OversizedRecord {
        index: usize,
        used: u32,
        record_size: u64,
    },

    /// Underlying I/O errors while reading volume metadata.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-layout field could not be decoded from its buffer.
    #[error("decode error: {0}")]
    Codec(#[from] CodecError),
}
