//! Error types for partition table parsing.
//!
//! Table-level failures abort the whole disk load: an unreadable source or a
//! GPT header that fails validation after the protective MBR committed the
//! scheme. An unrecognized scheme is not an error and is reported as
//! `PartitionTableScheme::Unknown` instead.

use std::io;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur while reading a partition table.
#[derive(Error, Debug)]
pub enum TableError {
    /// Wraps an I/O error that occurred while reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-layout field could not be decoded from its buffer.
    #[error("decode error: {0}")]
    Codec(#[from] CodecError),

    /// The header at LBA 1 does not start with the ASCII signature "EFI PART".
    /// Raised only after a protective MBR entry committed the GPT path.
    #[error("invalid GPT signature: {0:02X?}, expected \"EFI PART\"")]
    InvalidGptSignature([u8; 8]),

    /// The GPT header size field is outside the legal range for the sector.
    #[error("invalid GPT header size: {0}")]
    InvalidGptHeaderSize(u32),

    /// The CRC32 stored in the GPT header does not match the checksum computed
    /// over the header with the crc32 field zeroed.
    #[error("GPT header CRC32 mismatch: stored 0x{stored:08X}, computed 0x{computed:08X}")]
    GptCrcMismatch { stored: u32, computed: u32 },

    /// The GPT partition entry size is too small to hold an entry.
    #[error("invalid GPT partition entry size: {0}")]
    InvalidGptEntrySize(u32),

    /// The GPT header declares an entry array that does not fit the device.
    #[error("GPT entry array ({num_partitions} entries of {part_size} bytes) does not fit the device")]
    GptEntryArrayOutOfRange { num_partitions: u32, part_size: u32 },

    /// A GPT partition entry carries an LBA range whose byte offsets are not
    /// representable.
    #[error("invalid GPT partition entry {index}: LBA range {first_lba}..={last_lba} is not representable")]
    InvalidGptEntryRange {
        index: usize,
        first_lba: u64,
        last_lba: u64,
    },
}

impl TableError {
    /// True for the variants that mean the GPT header itself is malformed,
    /// as opposed to the source being unreadable.
    pub fn is_malformed_header(&self) -> bool {
        matches!(
            self,
            TableError::InvalidGptSignature(_)
                | TableError::InvalidGptHeaderSize(_)
                | TableError::GptCrcMismatch { .. }
                | TableError::InvalidGptEntrySize(_)
                | TableError::GptEntryArrayOutOfRange { .. }
                | TableError::InvalidGptEntryRange { .. }
        )
    }
}
