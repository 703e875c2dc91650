//! Registration of the built-in filesystem detectors.

use std::sync::Arc;

use uuid::Uuid;

use crate::detector::DetectorRegistry;
use crate::filesystem::ntfs::NtfsDetector;

/// MBR partition type byte for NTFS (and exFAT).
pub const MBR_TYPE_NTFS: u8 = 0x07;

/// MBR partition type byte for hidden NTFS partitions.
pub const MBR_TYPE_NTFS_HIDDEN: u8 = 0x17;

/// GPT basic-data partition type GUID, EBD0A0A2-B9E5-4433-87C0-68B6B72699C7.
/// Windows places NTFS volumes under this GUID.
pub const GPT_BASIC_DATA: Uuid = Uuid::from_u128(0xEBD0A0A2_B9E5_4433_87C0_68B6B72699C7);

/// Registers every built-in detector with `registry`.
///
/// Call once at startup before any detection pass; the registry stays
/// read-only afterwards.
pub fn register_builtin_detectors(registry: &mut DetectorRegistry) {
    let ntfs = Arc::new(NtfsDetector);

    registry.add_mbr_plugin(MBR_TYPE_NTFS, ntfs.clone());
    registry.add_mbr_plugin(MBR_TYPE_NTFS_HIDDEN, ntfs.clone());
    registry.add_gpt_plugin(GPT_BASIC_DATA, ntfs);
}
