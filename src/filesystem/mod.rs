//! Filesystem volumes and their detector plugins.

pub mod ntfs;
pub mod registration;

use thiserror::Error;

use crate::traits::LayoutDisplay;
use ntfs::ntfs_error::NtfsError;
use ntfs::NtfsVolume;

/// The result of successfully identifying and loading a partition's
/// filesystem metadata.
///
/// A `Volume` is only ever constructed complete: a detector's `open` either
/// returns a fully loaded variant or fails, never a partial one.
#[derive(Debug)]
pub enum Volume {
    /// An NTFS volume with its boot sector and preloaded MFT system records.
    Ntfs(NtfsVolume),
}

impl Volume {
    /// Short name of the filesystem occupying the volume.
    pub fn type_name(&self) -> &'static str {
        match self {
            Volume::Ntfs(_) => "NTFS",
        }
    }

    /// Byte offset of the volume from the start of the disk.
    pub fn offset(&self) -> u64 {
        match self {
            Volume::Ntfs(vol) => *vol.offset(),
        }
    }

    /// Total size of the volume in bytes, as reported by the volume's own
    /// metadata rather than the partition table.
    pub fn size(&self) -> u64 {
        match self {
            Volume::Ntfs(vol) => vol.size(),
        }
    }
}

impl LayoutDisplay for Volume {
    fn display_layout(&self, indent: u8) -> String {
        match self {
            Volume::Ntfs(vol) => vol.display_layout(indent),
        }
    }
}

/// Errors raised by a detector's `open` while loading volume metadata.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// NTFS metadata could not be loaded.
    #[error("NTFS: {0}")]
    Ntfs(#[from] NtfsError),
}
