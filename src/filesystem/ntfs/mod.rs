//! NTFS volume loading.
//!
//! Loading is a two-stage chain: decode and validate the boot sector, derive
//! the cluster size, MFT record size and MFT offset from it, then preload the
//! table's 12 reserved system records. The chain is atomic — a volume is
//! either fully loaded or the open fails.

pub mod boot_sector;
pub mod mft;
pub mod ntfs_error;

use std::fmt::Write;

use getset::Getters;
use log::debug;

use crate::detector::FilesystemDetector;
use crate::filesystem::{Volume, VolumeError};
use crate::source::ByteSource;
use crate::traits::LayoutDisplay;

use boot_sector::{BootSector, BOOT_SECTOR_SIZE, NTFS_OEM_ID};
use mft::MftTable;
use ntfs_error::NtfsError;

/// A loaded NTFS volume: boot sector plus preloaded MFT system records.
#[derive(Debug, Getters)]
pub struct NtfsVolume {
    /// Byte offset of the volume from the start of the disk.
    #[get = "pub"]
    offset: u64,
    /// The validated boot sector.
    #[get = "pub"]
    boot_sector: BootSector,
    /// The MFT with its system records preloaded.
    #[get = "pub"]
    mft_table: MftTable,
}

impl NtfsVolume {
    /// Loads the volume metadata at `offset`.
    ///
    /// # Errors
    /// - `NtfsError::Io` if the boot sector or an MFT record cannot be read.
    /// - A malformed-boot-sector or MFT record error if validation fails at
    ///   any stage. No partially loaded volume is ever returned.
    pub fn load(source: &ByteSource, offset: u64) -> Result<NtfsVolume, NtfsError> {
        let buf = source.read_at(offset, BOOT_SECTOR_SIZE)?;
        let boot_sector = BootSector::decode(&buf)?;

        let mft_offset = boot_sector
            .mft_cluster()
            .checked_mul(boot_sector.cluster_size())
            .and_then(|rel| offset.checked_add(rel))
            .ok_or(NtfsError::InvalidMftCluster(*boot_sector.mft_cluster()))?;
        let mft_table = MftTable::load(source, mft_offset, boot_sector.mft_record_size())?;

        Ok(NtfsVolume {
            offset,
            boot_sector,
            mft_table,
        })
    }

    /// Total volume size in bytes, from the volume's own boot sector.
    pub fn size(&self) -> u64 {
        self.boot_sector.volume_size()
    }

    /// Byte offset of the MFT from the start of the disk.
    pub fn mft_table_offset(&self) -> u64 {
        *self.mft_table.table_offset()
    }
}

impl LayoutDisplay for NtfsVolume {
    fn display_layout(&self, indent: u8) -> String {
        let mut out = String::new();
        let indent = " ".repeat(indent.into());

        writeln!(out, "{}┌{:─^55}┐", indent, " NTFS Volume ").unwrap();
        writeln!(
            out,
            "{}├{:<25}{:>30}┤",
            indent,
            "Offset",
            format!("0x{:X}", self.offset)
        )
        .unwrap();
        writeln!(out, "{}├{:<25}{:>30}┤", indent, "Size (bytes)", self.size()).unwrap();
        writeln!(
            out,
            "{}├{:<25}{:>30}┤",
            indent,
            "Cluster size",
            self.boot_sector.cluster_size()
        )
        .unwrap();
        writeln!(
            out,
            "{}├{:<25}{:>30}┤",
            indent,
            "MFT offset",
            format!("0x{:X}", self.mft_table_offset())
        )
        .unwrap();
        writeln!(
            out,
            "{}├{:<25}{:>30}┤",
            indent,
            "MFT record size",
            self.boot_sector.mft_record_size()
        )
        .unwrap();
        writeln!(out, "{}├{:─^55}┤", indent, " System records ").unwrap();

        for record in self.mft_table.preloaded() {
            writeln!(
                out,
                "{}│{:>4}  {:<10}{:>32} {:>6}│",
                indent,
                record.index(),
                record.system_name().unwrap_or("?"),
                if record.is_directory() { "dir" } else { "file" },
                if record.is_in_use() { "in use" } else { "free" },
            )
            .unwrap();
        }

        writeln!(out, "{}└{:─<55}┘", indent, "").unwrap();
        out
    }
}

/// Detector plugin for NTFS.
///
/// The probe reads the candidate boot sector and checks the "NTFS    " OEM
/// id and the 0x55AA end signature, evidence independent of the partition
/// table's type identifier.
pub struct NtfsDetector;

impl FilesystemDetector for NtfsDetector {
    fn name(&self) -> &'static str {
        "NTFS"
    }

    fn probe(&self, source: &ByteSource, offset: u64) -> bool {
        let buf = match source.read_at(offset, BOOT_SECTOR_SIZE) {
            Ok(buf) => buf,
            Err(err) => {
                debug!("NTFS probe at 0x{:X} failed to read: {}", offset, err);
                return false;
            }
        };

        buf[0x03..0x0B] == NTFS_OEM_ID && buf[0x1FE..0x200] == [0x55, 0xAA]
    }

    fn open(&self, source: &ByteSource, offset: u64) -> Result<Volume, VolumeError> {
        Ok(Volume::Ntfs(NtfsVolume::load(source, offset)?))
    }
}
