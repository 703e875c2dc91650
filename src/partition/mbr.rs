//! Master Boot Record parsing.
//!
//! The MBR occupies sector 0: four 16-byte partition slots at offset 0x1BE
//! and the 0x55AA boot signature at 0x1FE. Each slot is decoded at explicit
//! field offsets; the packed CHS fields are carried as raw bytes and not
//! interpreted further.

use crate::codec::{self, Endian};
use crate::source::ByteSource;

use super::table_error::TableError;
use super::{PartitionEntry, PartitionId};

/// The number of primary partition slots in an MBR.
pub const SLOT_CNT: usize = 4;

/// Byte offset of the partition table within sector 0.
const TABLE_OFFSET: usize = 0x1BE;

/// Byte offset of the boot signature within sector 0.
const SIGNATURE_OFFSET: usize = 0x1FE;

/// The partition type byte of a protective MBR entry, indicating that the
/// real table is a GPT at LBA 1.
pub const PROTECTIVE_TYPE: u8 = 0xEE;

/// A raw 16-byte partition slot.
///
/// Layout: boot_indicator (1), start CHS (3, packed, kept opaque), part_type
/// (1), end CHS (3, packed, kept opaque), relative_sector (u32 LE),
/// total_sectors (u32 LE). The relative_sector field is the 4-byte field of
/// the on-disk MBR specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct MbrSlot {
    boot_indicator: u8,
    part_type: u8,
    relative_sector: u32,
    total_sectors: u32,
}

impl MbrSlot {
    fn decode(buf: &[u8], offset: usize) -> Result<MbrSlot, TableError> {
        Ok(MbrSlot {
            boot_indicator: codec::read_uint(buf, offset, 1, Endian::Little)? as u8,
            part_type: codec::read_uint(buf, offset + 0x04, 1, Endian::Little)? as u8,
            relative_sector: codec::read_uint(buf, offset + 0x08, 4, Endian::Little)? as u32,
            total_sectors: codec::read_uint(buf, offset + 0x0C, 4, Endian::Little)? as u32,
        })
    }

    /// Returns the partition type byte.
    pub fn part_type(&self) -> u8 {
        self.part_type
    }

    /// A slot with partition type 0 is unused.
    pub fn is_used(&self) -> bool {
        self.part_type != 0
    }
}

/// A decoded Master Boot Record.
#[derive(Debug)]
pub struct Mbr {
    slots: [MbrSlot; SLOT_CNT],
    boot_signature: [u8; 2],
}

impl Mbr {
    /// Reads and decodes sector 0 of `source`.
    ///
    /// Decoding never fails on content: an absent boot signature is reported
    /// through [`Mbr::has_boot_signature`], not as an error.
    ///
    /// # Errors
    /// - `TableError::Io` if sector 0 cannot be read.
    pub fn from_source(source: &ByteSource) -> Result<Mbr, TableError> {
        let buf = source.read_at(0, super::SECTOR_SIZE)?;

        let mut slots = [MbrSlot::default(); SLOT_CNT];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = MbrSlot::decode(&buf, TABLE_OFFSET + i * 16)?;
        }

        let sig = codec::read_bytes(&buf, SIGNATURE_OFFSET, 2)?;

        Ok(Mbr {
            slots,
            boot_signature: [sig[0], sig[1]],
        })
    }

    /// True when sector 0 ends with the 0x55AA boot signature.
    pub fn has_boot_signature(&self) -> bool {
        self.boot_signature == [0x55, 0xAA]
    }

    /// True when any slot carries the protective type 0xEE, committing the
    /// disk to GPT interpretation.
    pub fn has_protective_slot(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.part_type == PROTECTIVE_TYPE)
    }

    /// Returns the used slots as normalized partition entries, in slot order.
    ///
    /// Byte offsets and sizes are derived from the sector-granular on-disk
    /// fields by multiplying with `sector_size`.
    pub fn partition_entries(&self, sector_size: usize) -> Vec<PartitionEntry> {
        self.slots
            .iter()
            .filter(|slot| slot.is_used())
            .map(|slot| {
                PartitionEntry::new(
                    PartitionId::Mbr(slot.part_type),
                    u64::from(slot.relative_sector) * sector_size as u64,
                    u64::from(slot.total_sectors) * sector_size as u64,
                    slot.boot_indicator == 0x80,
                    None,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_from(bytes: &[u8]) -> (NamedTempFile, ByteSource) {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp.flush().unwrap();
        let src = ByteSource::open(tmp.path()).unwrap();
        (tmp, src)
    }

    fn sector_with_slot(index: usize, part_type: u8, lba: u32, sectors: u32, boot: u8) -> Vec<u8> {
        let mut sector = vec![0u8; 512];
        sector[0x1FE] = 0x55;
        sector[0x1FF] = 0xAA;
        let base = 0x1BE + index * 16;
        sector[base] = boot;
        sector[base + 0x04] = part_type;
        sector[base + 0x08..base + 0x0C].copy_from_slice(&lba.to_le_bytes());
        sector[base + 0x0C..base + 0x10].copy_from_slice(&sectors.to_le_bytes());
        sector
    }

    #[test]
    fn missing_signature_detected() {
        let (_tmp, src) = source_from(&[0u8; 512]);
        let mbr = Mbr::from_source(&src).unwrap();
        assert!(!mbr.has_boot_signature());
    }

    #[test]
    fn unused_slots_excluded() {
        let sector = sector_with_slot(1, 0x07, 128, 2048, 0x80);
        let (_tmp, src) = source_from(&sector);

        let mbr = Mbr::from_source(&src).unwrap();
        assert!(mbr.has_boot_signature());
        assert!(!mbr.has_protective_slot());

        let entries = mbr.partition_entries(512);
        assert_eq!(entries.len(), 1);
        assert_eq!(*entries[0].id(), PartitionId::Mbr(0x07));
        assert_eq!(*entries[0].start_offset(), 128 * 512);
        assert_eq!(*entries[0].size(), 2048 * 512);
        assert!(entries[0].bootable());
    }

    #[test]
    fn relative_sector_is_four_bytes() {
        // An LBA above 255 only round-trips if all 4 bytes of the field are read.
        let sector = sector_with_slot(0, 0x0C, 0x0012_3456, 64, 0);
        let (_tmp, src) = source_from(&sector);

        let mbr = Mbr::from_source(&src).unwrap();
        let entries = mbr.partition_entries(512);
        assert_eq!(*entries[0].start_offset(), 0x0012_3456 * 512);
    }

    #[test]
    fn protective_slot_flagged() {
        let sector = sector_with_slot(0, PROTECTIVE_TYPE, 1, 0xFFFF_FFFF, 0);
        let (_tmp, src) = source_from(&sector);

        let mbr = Mbr::from_source(&src).unwrap();
        assert!(mbr.has_protective_slot());
    }
}
