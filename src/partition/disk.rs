//! Disk image parsing and analysis.
//!
//! This module ties the pieces together: it opens a disk image, reads its
//! partition table, and asks the detector registry to resolve each
//! partition's filesystem. Table-level failures abort the load; per-partition
//! detection failures are isolated and recorded, so one bad partition never
//! hides its siblings.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use getset::Getters;
use log::warn;

use crate::detector::DetectorRegistry;
use crate::filesystem::Volume;
use crate::source::ByteSource;
use crate::traits::LayoutDisplay;

use super::table_error::TableError;
use super::{read_table, PartitionEntry, PartitionTableScheme};

/// Outcome of filesystem detection for one partition.
#[derive(Debug)]
pub enum VolumeStatus {
    /// A detector claimed the partition and loaded its volume.
    Detected(Volume),
    /// No registered detector claimed the partition. The partition is still
    /// listed, without filesystem metadata.
    NoMatch,
    /// A detector claimed the partition but loading its metadata failed.
    Failed(String),
}

impl VolumeStatus {
    /// The loaded volume, if detection succeeded.
    pub fn volume(&self) -> Option<&Volume> {
        match self {
            VolumeStatus::Detected(volume) => Some(volume),
            _ => None,
        }
    }
}

/// A parsed disk image: scheme, partitions and per-partition volumes.
///
/// The scheme and partition list are computed once by
/// [`Disk::from_file`] and immutable afterwards. The underlying file handle
/// is owned by this value and released when it drops, on every exit path.
#[derive(Debug, Getters)]
pub struct Disk {
    /// The disk image file path.
    #[get = "pub"]
    file_path: PathBuf,
    source: ByteSource,
    scheme: PartitionTableScheme,
    partitions: Vec<PartitionEntry>,
    statuses: Vec<VolumeStatus>,
    /// The size in bytes of a sector.
    #[get = "pub"]
    sector_size: usize,
}

impl Disk {
    /// Opens a disk image read-only and analyzes its structure.
    ///
    /// # Parameters
    /// - `path`: Path to the disk image file or block device.
    /// - `sector_size`: Size of each sector in bytes (512 unless known
    ///   otherwise).
    /// - `registry`: The detector registry resolving each partition's
    ///   filesystem. Registrations must be complete before this call.
    ///
    /// # Errors
    /// - `TableError::Io` if the image cannot be opened or the table read.
    /// - A malformed-header variant if a protective MBR committed the GPT
    ///   path but the header fails validation.
    ///
    /// Per-partition detection failures do not abort the load; they are
    /// recorded in the partition's [`VolumeStatus`].
    pub fn from_file(
        path: &Path,
        sector_size: usize,
        registry: &DetectorRegistry,
    ) -> Result<Disk, TableError> {
        let source = ByteSource::open(path)?;
        let (scheme, partitions) = read_table(&source, sector_size)?;

        let statuses = partitions
            .iter()
            .map(|entry| {
                match registry.detect(&source, *entry.start_offset(), entry.id()) {
                    Ok(Some(volume)) => VolumeStatus::Detected(volume),
                    Ok(None) => VolumeStatus::NoMatch,
                    Err(err) => {
                        warn!(
                            "partition at offset 0x{:X}: filesystem load failed: {}",
                            entry.start_offset(),
                            err
                        );
                        VolumeStatus::Failed(err.to_string())
                    }
                }
            })
            .collect();

        Ok(Disk {
            file_path: path.to_path_buf(),
            source,
            scheme,
            partitions,
            statuses,
            sector_size,
        })
    }

    /// The partitioning scheme found on the disk.
    pub fn scheme(&self) -> PartitionTableScheme {
        self.scheme
    }

    /// The partition entries, in on-disk slot order.
    pub fn partitions(&self) -> &[PartitionEntry] {
        &self.partitions
    }

    /// Per-partition detection outcomes, parallel to [`Disk::partitions`].
    pub fn statuses(&self) -> &[VolumeStatus] {
        &self.statuses
    }

    /// The volume loaded for the partition at `index`, if any.
    pub fn volume_for(&self, index: usize) -> Option<&Volume> {
        self.statuses.get(index).and_then(VolumeStatus::volume)
    }

    /// The byte source backing this disk, for callers that need raw reads.
    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    /// Prints the table layout followed by each detected volume's layout.
    pub fn print_layout(&self, indent: u8) {
        print!("{}", self.display_layout(indent));

        for status in &self.statuses {
            if let Some(volume) = status.volume() {
                print!("\n{}", volume.display_layout(indent + 3));
            }
        }
    }
}

impl LayoutDisplay for Disk {
    fn display_layout(&self, indent: u8) -> String {
        let mut out = String::new();
        let indent = " ".repeat(indent.into());

        writeln!(out, "{}┌{:─^72}┐", indent, " Partition Table ").unwrap();
        writeln!(out, "{}├{:<62}{:>10}┤", indent, "Scheme", self.scheme).unwrap();
        writeln!(out, "{}├{:<62}{:>10}┤", indent, "Disk size", self.source.len()).unwrap();
        writeln!(
            out,
            "{}├{:^6}┬{:^14}┬{:^14}┬{:^20}┬{:^14}┤",
            indent, "Part", "Offset", "Size", "Identifier", "Filesystem"
        )
        .unwrap();

        for (i, (entry, status)) in self.partitions.iter().zip(&self.statuses).enumerate() {
            let fs = match status {
                VolumeStatus::Detected(volume) => volume.type_name(),
                VolumeStatus::NoMatch => "-",
                VolumeStatus::Failed(_) => "error",
            };
            writeln!(
                out,
                "{}│{:^6}│{:>14}│{:>14}│{:>20}│{:>14}│",
                indent,
                i + 1,
                format!("0x{:X}", entry.start_offset()),
                entry.size(),
                // GUIDs are wider than the column; truncate for the table view.
                entry.id().to_string().chars().take(20).collect::<String>(),
                fs
            )
            .unwrap();
        }

        writeln!(
            out,
            "{}└{:─<6}┴{:─<14}┴{:─<14}┴{:─<20}┴{:─<14}┘",
            indent, "", "", "", "", ""
        )
        .unwrap();

        out
    }
}
