//! Partition table parsing.
//!
//! This module determines how a disk image is partitioned (MBR or GPT) and
//! produces an ordered list of partition descriptors. The scheme is computed
//! exactly once per load and is immutable afterwards; the entry list preserves
//! on-disk slot order.

pub mod disk;
pub mod gpt;
pub mod mbr;
pub mod table_error;

use std::fmt;
use std::fmt::Display;

use getset::Getters;
use uuid::Uuid;

use crate::source::ByteSource;
use mbr::Mbr;
use table_error::TableError;

/// The default sector size assumed when the device does not report one.
pub const SECTOR_SIZE: usize = 512;

/// The partitioning scheme found on a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionTableScheme {
    /// Legacy Master Boot Record table in sector 0.
    Mbr,
    /// GUID Partition Table: protective MBR plus a header at LBA 1.
    Gpt,
    /// Neither an MBR boot signature nor a valid GPT header was found.
    Unknown,
}

impl Display for PartitionTableScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartitionTableScheme::Mbr => "MBR",
            PartitionTableScheme::Gpt => "GPT",
            PartitionTableScheme::Unknown => "Unknown",
        };
        f.pad(s)
    }
}

/// The coarse filesystem identifier carried by a partition entry.
///
/// An MBR entry carries a single type byte; a GPT entry carries a 16-byte
/// partition-type GUID. Either is necessary but not sufficient evidence of
/// filesystem identity: detectors confirm with their own reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionId {
    Mbr(u8),
    Gpt(Uuid),
}

impl Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionId::Mbr(ty) => write!(f, "0x{:02X}", ty),
            PartitionId::Gpt(guid) => write!(f, "{}", guid),
        }
    }
}

/// A single partition, normalized across schemes.
#[derive(Debug, Clone, Getters)]
pub struct PartitionEntry {
    /// The type identifier used for detector lookup.
    #[get = "pub"]
    id: PartitionId,
    /// Byte offset of the partition from the start of the disk.
    #[get = "pub"]
    start_offset: u64,
    /// Partition size in bytes, as reported by the table.
    #[get = "pub"]
    size: u64,
    /// Whether the MBR boot indicator is set. Always false for GPT entries.
    #[get = "pub"]
    bootable: bool,
    /// The UTF-16 entry name, present only for GPT entries.
    #[get = "pub"]
    name: Option<String>,
}

impl PartitionEntry {
    pub(crate) fn new(
        id: PartitionId,
        start_offset: u64,
        size: u64,
        bootable: bool,
        name: Option<String>,
    ) -> Self {
        PartitionEntry {
            id,
            start_offset,
            size,
            bootable,
            name,
        }
    }
}

/// Reads the partition table from `source`.
///
/// # Returns
/// - `(PartitionTableScheme::Unknown, [])` if sector 0 carries no 0x55AA boot
///   signature.
/// - `(PartitionTableScheme::Mbr, entries)` for a plain MBR; unused slots
///   (type 0) are excluded and slot order is preserved.
/// - `(PartitionTableScheme::Gpt, entries)` if a protective entry (type 0xEE)
///   is present and the GPT header at LBA 1 validates.
///
/// # Errors
/// - `TableError::Io` if the source cannot be read.
/// - A malformed-header variant if the protective entry committed the GPT
///   path but the header fails signature, size or CRC32 validation. There is
///   no silent fallback to MBR or Unknown once GPT is indicated.
pub fn read_table(
    source: &ByteSource,
    sector_size: usize,
) -> Result<(PartitionTableScheme, Vec<PartitionEntry>), TableError> {
    let mbr = Mbr::from_source(source)?;

    if !mbr.has_boot_signature() {
        return Ok((PartitionTableScheme::Unknown, Vec::new()));
    }

    if mbr.has_protective_slot() {
        let entries = gpt::read_gpt(source, sector_size)?;
        return Ok((PartitionTableScheme::Gpt, entries));
    }

    Ok((PartitionTableScheme::Mbr, mbr.partition_entries(sector_size)))
}
