//! GUID Partition Table parsing.
//!
//! The GPT header lives at LBA 1 behind a protective MBR. The header is only
//! trusted after three checks: the ASCII "EFI PART" signature, a sane header
//! size, and a CRC32 over the header with its own crc32 field zeroed matching
//! the stored value. Once the protective MBR has committed the disk to GPT,
//! any of these failing is a hard error with no fallback.

use getset::Getters;
use uuid::Uuid;

use crate::codec::{self, Endian};
use crate::source::ByteSource;

use super::table_error::TableError;
use super::{PartitionEntry, PartitionId};

/// ASCII signature opening every GPT header. Raw bytes, not a numeric field.
pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";

/// Minimum legal GPT header size (the fixed fields through part_array_crc32).
const MIN_HEADER_SIZE: u32 = 92;

/// Minimum legal partition entry size. The standard entry is 128 bytes; the
/// fixed fields plus the 36-code-unit name need 128.
const MIN_ENTRY_SIZE: u32 = 128;

/// A validated GPT header (LBA 1).
#[derive(Debug, Getters)]
pub struct GptHeader {
    /// GPT revision, 0x00010000 for the current specification.
    #[get = "pub"]
    revision: u32,
    /// Total length of the header in bytes.
    #[get = "pub"]
    header_size: u32,
    /// Stored CRC32 of the header (computed with this field zeroed).
    #[get = "pub"]
    crc32: u32,
    /// LBA of this header.
    #[get = "pub"]
    current_lba: u64,
    /// LBA of the backup header at the end of the disk.
    #[get = "pub"]
    backup_lba: u64,
    /// First LBA usable by partitions.
    #[get = "pub"]
    first_usable_lba: u64,
    /// Last LBA usable by partitions.
    #[get = "pub"]
    last_usable_lba: u64,
    /// GUID identifying the disk itself.
    #[get = "pub"]
    disk_guid: Uuid,
    /// Starting LBA of the partition entry array.
    #[get = "pub"]
    part_lba: u64,
    /// Number of slots in the partition entry array.
    #[get = "pub"]
    num_partitions: u32,
    /// Size in bytes of a single partition entry, usually 128.
    #[get = "pub"]
    part_size: u32,
    /// Stored CRC32 of the partition entry array. Decoded but not verified;
    /// only the header checksum gates table acceptance.
    #[get = "pub"]
    part_array_crc32: u32,
}

impl GptHeader {
    /// Decodes and validates a GPT header from the sector read at LBA 1.
    ///
    /// # Errors
    /// - `TableError::InvalidGptSignature` if the buffer does not open with
    ///   "EFI PART".
    /// - `TableError::InvalidGptHeaderSize` if header_size is below the fixed
    ///   field region or beyond the sector.
    /// - `TableError::GptCrcMismatch` if the zeroed-field CRC32 does not match.
    pub fn decode(buf: &[u8]) -> Result<GptHeader, TableError> {
        let sig = codec::read_bytes(buf, 0, 8)?;
        if sig != GPT_SIGNATURE {
            let mut found = [0u8; 8];
            found.copy_from_slice(sig);
            return Err(TableError::InvalidGptSignature(found));
        }

        let header_size = codec::read_uint(buf, 12, 4, Endian::Little)? as u32;
        if header_size < MIN_HEADER_SIZE || header_size as usize > buf.len() {
            return Err(TableError::InvalidGptHeaderSize(header_size));
        }

        let stored_crc = codec::read_uint(buf, 16, 4, Endian::Little)? as u32;
        let mut scratch = buf[..header_size as usize].to_vec();
        scratch[16..20].fill(0);
        let computed_crc = crc32fast::hash(&scratch);
        if computed_crc != stored_crc {
            return Err(TableError::GptCrcMismatch {
                stored: stored_crc,
                computed: computed_crc,
            });
        }

        let mut disk_guid = [0u8; 16];
        disk_guid.copy_from_slice(codec::read_bytes(buf, 56, 16)?);

        Ok(GptHeader {
            revision: codec::read_uint(buf, 8, 4, Endian::Little)? as u32,
            header_size,
            crc32: stored_crc,
            current_lba: codec::read_uint(buf, 24, 8, Endian::Little)?,
            backup_lba: codec::read_uint(buf, 32, 8, Endian::Little)?,
            first_usable_lba: codec::read_uint(buf, 40, 8, Endian::Little)?,
            last_usable_lba: codec::read_uint(buf, 48, 8, Endian::Little)?,
            disk_guid: Uuid::from_bytes_le(disk_guid),
            part_lba: codec::read_uint(buf, 72, 8, Endian::Little)?,
            num_partitions: codec::read_uint(buf, 80, 4, Endian::Little)? as u32,
            part_size: codec::read_uint(buf, 84, 4, Endian::Little)? as u32,
            part_array_crc32: codec::read_uint(buf, 88, 4, Endian::Little)? as u32,
        })
    }
}

/// Decodes the UTF-16LE partition name field, stopping at the first NUL.
fn decode_entry_name(raw: &[u8]) -> Option<String> {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    if units.is_empty() {
        None
    } else {
        Some(String::from_utf16_lossy(&units))
    }
}

/// Decodes a single slot of the partition entry array.
///
/// Returns `None` for an unused slot (all-zero partition-type GUID).
///
/// The LBA fields come straight from disk and are not covered by the header
/// checksum, so all offset arithmetic is checked: a reversed range or one
/// whose byte offsets overflow a u64 is rejected, never wrapped.
fn decode_entry(
    index: usize,
    raw: &[u8],
    sector_size: usize,
) -> Result<Option<PartitionEntry>, TableError> {
    let type_guid = codec::read_bytes(raw, 0, 16)?;
    if type_guid.iter().all(|&b| b == 0) {
        return Ok(None);
    }
    let mut guid = [0u8; 16];
    guid.copy_from_slice(type_guid);

    let first_lba = codec::read_uint(raw, 32, 8, Endian::Little)?;
    let last_lba = codec::read_uint(raw, 40, 8, Endian::Little)?;
    let name = decode_entry_name(codec::read_bytes(raw, 56, 72)?);

    let bad_range = || TableError::InvalidGptEntryRange {
        index,
        first_lba,
        last_lba,
    };
    let start_offset = first_lba
        .checked_mul(sector_size as u64)
        .ok_or_else(bad_range)?;
    let size = last_lba
        .checked_sub(first_lba)
        .and_then(|span| span.checked_add(1))
        .and_then(|sectors| sectors.checked_mul(sector_size as u64))
        .ok_or_else(bad_range)?;

    Ok(Some(PartitionEntry::new(
        PartitionId::Gpt(Uuid::from_bytes_le(guid)),
        start_offset,
        size,
        false,
        name,
    )))
}

/// Reads and validates the GPT, returning the used partition entries in
/// on-disk slot order.
///
/// # Errors
/// - `TableError::Io` if the header or entry array cannot be read.
/// - A malformed-header variant if validation fails (see [`GptHeader::decode`]),
///   the entry size field is too small to hold an entry, or the declared entry
///   array does not fit inside the device.
pub fn read_gpt(source: &ByteSource, sector_size: usize) -> Result<Vec<PartitionEntry>, TableError> {
    let buf = source.read_at(sector_size as u64, sector_size)?;
    let header = GptHeader::decode(&buf)?;

    if header.part_size < MIN_ENTRY_SIZE {
        return Err(TableError::InvalidGptEntrySize(header.part_size));
    }

    // The count and entry size are attacker-controlled relative to the device
    // size, so bound the array against the source before allocating for it.
    let out_of_range = || TableError::GptEntryArrayOutOfRange {
        num_partitions: header.num_partitions,
        part_size: header.part_size,
    };
    let array_len = u64::from(header.num_partitions)
        .checked_mul(u64::from(header.part_size))
        .ok_or_else(out_of_range)?;
    let array_offset = header
        .part_lba
        .checked_mul(sector_size as u64)
        .ok_or_else(out_of_range)?;
    let array_end = array_offset.checked_add(array_len).ok_or_else(out_of_range)?;
    if array_end > source.len() {
        return Err(out_of_range());
    }

    let part_size = header.part_size as usize;
    let array = source.read_at(array_offset, array_len as usize)?;

    let mut entries = Vec::new();
    for (index, slot) in array.chunks_exact(part_size).enumerate() {
        if let Some(entry) = decode_entry(index, slot, sector_size)? {
            entries.push(entry);
        }
    }

    Ok(entries)
}
