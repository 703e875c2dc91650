//! NTFS boot sector parsing.
//!
//! The first 512 bytes of an NTFS volume hold the BIOS Parameter Block
//! describing the volume geometry and the location of the Master File Table.
//! Every field is decoded at its explicit offset; the decoded structure is
//! validated before it is handed out, so a `BootSector` value always has a
//! positive sector size and a derivable MFT record size.

use getset::Getters;

use crate::codec::{self, Endian};

use super::ntfs_error::NtfsError;

/// Size of the NTFS boot sector in bytes.
pub const BOOT_SECTOR_SIZE: usize = 512;

/// OEM id carried by every NTFS boot sector at offset 0x03.
pub const NTFS_OEM_ID: [u8; 8] = *b"NTFS    ";

/// Bounds on the derived MFT record size. Real volumes use 1 or 4 KiB
/// records; anything outside this range is a malformed boot sector.
const MIN_MFT_RECORD_SIZE: u64 = 1 << 10;
const MAX_MFT_RECORD_SIZE: u64 = 1 << 16;

/// A decoded and validated NTFS boot sector.
#[derive(Debug, Getters)]
pub struct BootSector {
    oem_id: [u8; 8],
    /// Bytes per sector (offset 0x0B).
    #[get = "pub"]
    bytes_per_sector: u16,
    /// Sectors per cluster (offset 0x0D).
    #[get = "pub"]
    sectors_per_cluster: u8,
    /// Total sectors in the volume (offset 0x28).
    #[get = "pub"]
    total_sectors: u64,
    /// Logical cluster number of the MFT (offset 0x30).
    #[get = "pub"]
    mft_cluster: u64,
    /// Raw MFT record size field (offset 0x40). Negative values encode a
    /// power of two in bytes; positive values count clusters.
    #[get = "pub"]
    mft_record_size_raw: i8,
}

impl BootSector {
    /// Decodes and validates a boot sector from its 512-byte buffer.
    ///
    /// # Errors
    /// - `NtfsError::Codec` if the buffer is too small for a field.
    /// - `NtfsError::InvalidOemId`, `InvalidBootSignature`,
    ///   `InvalidBytesPerSector`, `InvalidSectorsPerCluster` or
    ///   `InvalidMftRecordSize` if a structural invariant is violated.
    pub fn decode(buf: &[u8]) -> Result<BootSector, NtfsError> {
        let mut oem_id = [0u8; 8];
        oem_id.copy_from_slice(codec::read_bytes(buf, 0x03, 8)?);

        let sector = BootSector {
            oem_id,
            bytes_per_sector: codec::read_uint(buf, 0x0B, 2, Endian::Little)? as u16,
            sectors_per_cluster: codec::read_uint(buf, 0x0D, 1, Endian::Little)? as u8,
            total_sectors: codec::read_uint(buf, 0x28, 8, Endian::Little)?,
            mft_cluster: codec::read_uint(buf, 0x30, 8, Endian::Little)?,
            mft_record_size_raw: codec::read_int(buf, 0x40, 1, Endian::Little)? as i8,
        };

        let sig = codec::read_bytes(buf, 0x1FE, 2)?;
        if sig != [0x55, 0xAA] {
            return Err(NtfsError::InvalidBootSignature(format!(
                "0x{:02X}{:02X}",
                sig[0], sig[1]
            )));
        }

        sector.validate()
    }

    /// Validates the structural invariants of the decoded fields.
    fn validate(self) -> Result<Self, NtfsError> {
        if self.oem_id != NTFS_OEM_ID {
            return Err(NtfsError::InvalidOemId(
                String::from_utf8_lossy(&self.oem_id).into_owned(),
            ));
        }

        if self.bytes_per_sector == 0 {
            return Err(NtfsError::InvalidBytesPerSector(self.bytes_per_sector));
        }

        if self.sectors_per_cluster == 0 {
            return Err(NtfsError::InvalidSectorsPerCluster(self.sectors_per_cluster));
        }

        // Negative raw values encode 2^(-raw); anything that would shift past
        // a u64, or derive a record size of zero, is malformed.
        match self.mft_record_size_raw {
            0 => return Err(NtfsError::InvalidMftRecordSize(0)),
            raw if raw < 0 && -i32::from(raw) >= 64 => {
                return Err(NtfsError::InvalidMftRecordSize(raw));
            }
            _ => {}
        }

        // The derived record size is allocated per preloaded record, so an
        // out-of-range value is rejected here, before any read sizes on it.
        if !(MIN_MFT_RECORD_SIZE..=MAX_MFT_RECORD_SIZE).contains(&self.mft_record_size()) {
            return Err(NtfsError::InvalidMftRecordSize(self.mft_record_size_raw));
        }

        if u64::from(self.bytes_per_sector)
            .checked_mul(self.total_sectors)
            .is_none()
        {
            return Err(NtfsError::InvalidTotalSectors(self.total_sectors));
        }

        // The MFT must start on a sector inside the volume.
        match self
            .mft_cluster
            .checked_mul(u64::from(self.sectors_per_cluster))
        {
            Some(mft_sector) if mft_sector < self.total_sectors => {}
            _ => return Err(NtfsError::InvalidMftCluster(self.mft_cluster)),
        }

        Ok(self)
    }

    /// Cluster size in bytes.
    pub fn cluster_size(&self) -> u64 {
        u64::from(self.bytes_per_sector) * u64::from(self.sectors_per_cluster)
    }

    /// MFT record size in bytes, derived from the raw field: 2^(−raw) when
    /// raw is negative, raw × cluster size when positive.
    pub fn mft_record_size(&self) -> u64 {
        if self.mft_record_size_raw < 0 {
            1u64 << (-i32::from(self.mft_record_size_raw))
        } else {
            self.mft_record_size_raw as u64 * self.cluster_size()
        }
    }

    /// Total volume size in bytes according to this boot sector, independent
    /// of the size the outer partition table reports.
    pub fn volume_size(&self) -> u64 {
        u64::from(self.bytes_per_sector) * self.total_sectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 512-byte boot sector with the given geometry.
    fn boot_sector_bytes(
        bytes_per_sector: u16,
        sectors_per_cluster: u8,
        total_sectors: u64,
        mft_cluster: u64,
        record_size_raw: i8,
    ) -> Vec<u8> {
        let mut buf = vec![0u8; BOOT_SECTOR_SIZE];
        buf[0x03..0x0B].copy_from_slice(&NTFS_OEM_ID);
        buf[0x0B..0x0D].copy_from_slice(&bytes_per_sector.to_le_bytes());
        buf[0x0D] = sectors_per_cluster;
        buf[0x28..0x30].copy_from_slice(&total_sectors.to_le_bytes());
        buf[0x30..0x38].copy_from_slice(&mft_cluster.to_le_bytes());
        buf[0x40] = record_size_raw as u8;
        buf[0x1FE] = 0x55;
        buf[0x1FF] = 0xAA;
        buf
    }

    #[test]
    fn negative_raw_field_is_a_power_of_two() {
        let buf = boot_sector_bytes(512, 8, 20480, 4, -10);
        let bs = BootSector::decode(&buf).unwrap();
        assert_eq!(bs.mft_record_size(), 1024);
        assert_eq!(bs.cluster_size(), 4096);
    }

    #[test]
    fn positive_raw_field_counts_clusters() {
        let buf = boot_sector_bytes(512, 8, 20480, 4, 1);
        let bs = BootSector::decode(&buf).unwrap();
        assert_eq!(bs.mft_record_size(), 4096);
    }

    #[test]
    fn volume_size_uses_own_geometry() {
        let buf = boot_sector_bytes(512, 8, 20480, 4, -10);
        let bs = BootSector::decode(&buf).unwrap();
        assert_eq!(bs.volume_size(), 512 * 20480);
    }

    #[test]
    fn zero_bytes_per_sector_rejected() {
        let buf = boot_sector_bytes(0, 8, 20480, 4, -10);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidBytesPerSector(0))
        ));
    }

    #[test]
    fn zero_record_size_field_rejected() {
        let buf = boot_sector_bytes(512, 8, 20480, 4, 0);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidMftRecordSize(0))
        ));
    }

    #[test]
    fn oversized_shift_in_record_size_rejected() {
        // -63 would derive a 2^63-byte record.
        let buf = boot_sector_bytes(512, 8, 20480, 4, -63);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidMftRecordSize(-63))
        ));
    }

    #[test]
    fn cluster_counted_record_size_is_bounded() {
        // 127 clusters of 4096 bytes is far past the largest legal record.
        let buf = boot_sector_bytes(512, 8, 20480, 4, 127);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidMftRecordSize(127))
        ));
    }

    #[test]
    fn unrepresentable_volume_size_rejected() {
        let buf = boot_sector_bytes(512, 8, u64::MAX, 4, -10);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidTotalSectors(u64::MAX))
        ));
    }

    #[test]
    fn mft_cluster_outside_volume_rejected() {
        let buf = boot_sector_bytes(512, 8, 20480, u64::MAX, -10);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidMftCluster(u64::MAX))
        ));

        // First sector past the end is already out.
        let buf = boot_sector_bytes(512, 8, 20480, 20480 / 8, -10);
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidMftCluster(2560))
        ));
    }

    #[test]
    fn wrong_oem_id_rejected() {
        let mut buf = boot_sector_bytes(512, 8, 20480, 4, -10);
        buf[0x03..0x0B].copy_from_slice(b"MSDOS5.0");
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidOemId(_))
        ));
    }

    #[test]
    fn missing_end_signature_rejected() {
        let mut buf = boot_sector_bytes(512, 8, 20480, 4, -10);
        buf[0x1FE] = 0;
        assert!(matches!(
            BootSector::decode(&buf),
            Err(NtfsError::InvalidBootSignature(_))
        ));
    }
}
