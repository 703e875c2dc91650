//! Filesystem detector plugins and their registry.
//!
//! A partition entry only carries a coarse type identifier (an MBR type byte
//! or a GPT type GUID), and distinct filesystems may share one. Detection
//! therefore delegates to plugins: every plugin registered for an identifier
//! gets to `probe` the partition with its own confirmatory read, in
//! registration order, and the first one that recognizes the bytes opens the
//! volume.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::filesystem::{Volume, VolumeError};
use crate::partition::PartitionId;
use crate::source::ByteSource;

/// A filesystem-specific detection plugin.
///
/// `probe` must be a cheap, read-only check of filesystem-internal evidence
/// (for example a magic signature inside the partition's own boot sector);
/// the partition-table identifier alone is never proof of identity. `open`
/// performs the full metadata load and either returns a completely
/// constructed [`Volume`] or fails — it must never expose a partial one.
pub trait FilesystemDetector {
    /// Short name of the filesystem this plugin detects, e.g. "NTFS".
    fn name(&self) -> &'static str;

    /// Returns true if the bytes at `offset` look like this filesystem.
    fn probe(&self, source: &ByteSource, offset: u64) -> bool;

    /// Loads the volume metadata at `offset`.
    fn open(&self, source: &ByteSource, offset: u64) -> Result<Volume, VolumeError>;
}

/// Maps coarse partition-type identifiers to ordered plugin lists.
///
/// The registry is an explicit value constructed once at startup and passed
/// by reference wherever detection happens; there is no process-wide
/// singleton. Registration and [`reset`](DetectorRegistry::reset) take
/// `&mut self` while queries take `&self`, so no registration can interleave
/// with an in-flight detection pass.
#[derive(Default)]
pub struct DetectorRegistry {
    mbr_plugins: HashMap<u8, Vec<Arc<dyn FilesystemDetector>>>,
    gpt_plugins: HashMap<Uuid, Vec<Arc<dyn FilesystemDetector>>>,
}

impl DetectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> DetectorRegistry {
        DetectorRegistry::default()
    }

    /// Associates `plugin` with the MBR partition type byte `fs_id`.
    ///
    /// Plugins registered for the same identifier are tried in registration
    /// order.
    pub fn add_mbr_plugin(&mut self, fs_id: u8, plugin: Arc<dyn FilesystemDetector>) {
        debug!("registering {} for MBR type 0x{:02X}", plugin.name(), fs_id);
        self.mbr_plugins.entry(fs_id).or_default().push(plugin);
    }

    /// Associates `plugin` with the GPT partition-type GUID `fs_guid`.
    pub fn add_gpt_plugin(&mut self, fs_guid: Uuid, plugin: Arc<dyn FilesystemDetector>) {
        debug!("registering {} for GPT GUID {}", plugin.name(), fs_guid);
        self.gpt_plugins.entry(fs_guid).or_default().push(plugin);
    }

    /// Removes every registered plugin, returning the registry to its empty
    /// state. Intended for test isolation.
    pub fn reset(&mut self) {
        self.mbr_plugins.clear();
        self.gpt_plugins.clear();
    }

    /// Resolves the filesystem of an MBR partition.
    ///
    /// # Returns
    /// - `Ok(Some(volume))` from the first registered plugin whose probe
    ///   succeeds.
    /// - `Ok(None)` if the identifier is unregistered or no probe succeeds —
    ///   not an error; the partition is still reported without a volume.
    ///
    /// # Errors
    /// - `VolumeError` if the winning plugin's `open` fails.
    pub fn detect_mbr(
        &self,
        source: &ByteSource,
        offset: u64,
        fs_id: u8,
    ) -> Result<Option<Volume>, VolumeError> {
        Self::run_plugins(self.mbr_plugins.get(&fs_id), source, offset)
    }

    /// Resolves the filesystem of a GPT partition. Same contract as
    /// [`detect_mbr`](DetectorRegistry::detect_mbr).
    pub fn detect_gpt(
        &self,
        source: &ByteSource,
        offset: u64,
        fs_guid: Uuid,
    ) -> Result<Option<Volume>, VolumeError> {
        Self::run_plugins(self.gpt_plugins.get(&fs_guid), source, offset)
    }

    /// Dispatches on the identifier variant of a partition entry.
    pub fn detect(
        &self,
        source: &ByteSource,
        offset: u64,
        id: &PartitionId,
    ) -> Result<Option<Volume>, VolumeError> {
        match id {
            PartitionId::Mbr(fs_id) => self.detect_mbr(source, offset, *fs_id),
            PartitionId::Gpt(fs_guid) => self.detect_gpt(source, offset, *fs_guid),
        }
    }

    fn run_plugins(
        plugins: Option<&Vec<Arc<dyn FilesystemDetector>>>,
        source: &ByteSource,
        offset: u64,
    ) -> Result<Option<Volume>, VolumeError> {
        let Some(plugins) = plugins else {
            return Ok(None);
        };

        for plugin in plugins {
            if plugin.probe(source, offset) {
                debug!("{} claimed partition at offset 0x{:X}", plugin.name(), offset);
                return plugin.open(source, offset).map(Some);
            }
        }

        Ok(None)
    }
}
