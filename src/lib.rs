//!
//! diskprobe: A library and CLI for identifying the partitioning scheme and
//! filesystems of raw disk images.
//!
//! This crate provides tools for:
//! - Parsing MBR and GPT partition tables
//! - Resolving each partition's filesystem through pluggable detector plugins
//! - Loading per-filesystem volume metadata (NTFS boot sector and MFT)
//! - Printing disk and volume layouts
//!
//! Detection goes through a [`DetectorRegistry`]: plugins register against a
//! coarse partition-type identifier and confirm their match with their own
//! reads, so two filesystems sharing a type byte cannot be confused.
//!
//! # Re-exports
//! - [`Disk`]: Disk abstraction with partition table and volume management
//! - [`Volume`]: Enum for supported volume types
//! - [`DetectorRegistry`] / [`FilesystemDetector`]: plugin dispatch
//! - [`ByteSource`]: read-only positioned access to an image

pub mod codec;
pub mod commands;
pub mod detector;
pub mod filesystem;
pub mod partition;
pub mod source;
pub mod traits;

/// Read-only positioned access to a disk image (see [`source::ByteSource`]).
pub use crate::source::ByteSource;
/// Plugin dispatch (see [`detector::DetectorRegistry`]).
pub use crate::detector::{DetectorRegistry, FilesystemDetector};
/// Enum for supported volume types (see [`filesystem::Volume`]).
pub use crate::filesystem::Volume;
/// Built-in detector registration (see [`filesystem::registration`]).
pub use crate::filesystem::registration::register_builtin_detectors;
/// Disk abstraction with partition and volume management (see [`partition::disk::Disk`]).
pub use crate::partition::disk::Disk;
/// Partitioning scheme of a disk (see [`partition::PartitionTableScheme`]).
pub use crate::partition::PartitionTableScheme;
