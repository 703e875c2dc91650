//! Master File Table access.
//!
//! The MFT is the central metadata table of an NTFS volume. Its first 12
//! records describe the filesystem itself ($MFT through $Extend) and are
//! preloaded eagerly when a volume is opened: record 0 is the table's own
//! self-descriptor, and a full implementation would re-resolve the table's
//! on-disk extents from it, since the table may be fragmented beyond the
//! single contiguous region assumed here. Records past the preloaded set are
//! read lazily on demand.

use getset::Getters;

use crate::codec::{self, Endian};
use crate::source::ByteSource;

use super::ntfs_error::NtfsError;

/// Number of reserved system records preloaded when a volume is opened.
pub const SYSTEM_RECORD_CNT: usize = 12;

/// Signature opening every in-use MFT record.
pub const RECORD_SIGNATURE: [u8; 4] = *b"FILE";

/// Well-known names of the reserved system records, by table index.
pub const SYSTEM_RECORD_NAMES: [&str; SYSTEM_RECORD_CNT] = [
    "$MFT", "$MFTMirr", "$LogFile", "$Volume", "$AttrDef", ".", "$Bitmap", "$Boot", "$BadClus",
    "$Secure", "$UpCase", "$Extend",
];

/// An MFT record is in use.
const FLAG_IN_USE: u16 = 0x0001;

/// An MFT record describes a directory.
const FLAG_DIRECTORY: u16 = 0x0002;

/// The decoded header of a single MFT record.
#[derive(Debug, Clone, Getters)]
pub struct MftRecord {
    /// Index of the record within the table.
    #[get = "pub"]
    index: usize,
    /// Sequence number, bumped every time the record is reused.
    #[get = "pub"]
    sequence: u16,
    /// Number of directory entries referencing this record.
    #[get = "pub"]
    link_count: u16,
    /// Record flags (in-use, directory).
    #[get = "pub"]
    flags: u16,
    /// Bytes of the record actually in use.
    #[get = "pub"]
    used_size: u32,
    /// Bytes allocated for the record on disk.
    #[get = "pub"]
    allocated_size: u32,
    /// Reference to the base record, non-zero for extension records.
    #[get = "pub"]
    base_record: u64,
}

impl MftRecord {
    /// Decodes a record header from one record-sized buffer.
    ///
    /// # Errors
    /// - `NtfsError::BadRecordSignature` if the record does not open with
    ///   "FILE".
    /// - `NtfsError::OversizedRecord` if the header claims more used bytes
    ///   than the record holds.
    pub fn decode(index: usize, buf: &[u8]) -> Result<MftRecord, NtfsError> {
        let sig = codec::read_bytes(buf, 0x00, 4)?;
        if sig != RECORD_SIGNATURE {
            return Err(NtfsError::BadRecordSignature {
                index,
                found: String::from_utf8_lossy(sig).into_owned(),
            });
        }

        let record = MftRecord {
            index,
            sequence: codec::read_uint(buf, 0x10, 2, Endian::Little)? as u16,
            link_count: codec::read_uint(buf, 0x12, 2, Endian::Little)? as u16,
            flags: codec::read_uint(buf, 0x16, 2, Endian::Little)? as u16,
            used_size: codec::read_uint(buf, 0x18, 4, Endian::Little)? as u32,
            allocated_size: codec::read_uint(buf, 0x1C, 4, Endian::Little)? as u32,
            base_record: codec::read_uint(buf, 0x20, 8, Endian::Little)?,
        };

        if record.used_size as usize > buf.len() {
            return Err(NtfsError::OversizedRecord {
                index,
                used: record.used_size,
                record_size: buf.len() as u64,
            });
        }

        Ok(record)
    }

    pub fn is_in_use(&self) -> bool {
        self.flags & FLAG_IN_USE != 0
    }

    pub fn is_directory(&self) -> bool {
        self.flags & FLAG_DIRECTORY != 0
    }

    /// Name of the record if it is one of the reserved system records.
    pub fn system_name(&self) -> Option<&'static str> {
        SYSTEM_RECORD_NAMES.get(self.index).copied()
    }
}

/// The Master File Table of one volume, with its system records preloaded.
#[derive(Debug, Getters)]
pub struct MftTable {
    /// Byte offset of the table from the start of the disk.
    #[get = "pub"]
    table_offset: u64,
    /// Size of one record in bytes.
    #[get = "pub"]
    record_size: u64,
    preloaded: Vec<MftRecord>,
}

impl MftTable {
    /// Loads the table and eagerly decodes the first
    /// [`SYSTEM_RECORD_CNT`] records.
    ///
    /// The preload is all-or-nothing: if any of the 12 records cannot be
    /// read and decoded, the whole load fails and no table is returned.
    ///
    /// # Errors
    /// - `NtfsError::Io` if a record cannot be read.
    /// - A record decode error if a system record is malformed.
    pub fn load(
        source: &ByteSource,
        table_offset: u64,
        record_size: u64,
    ) -> Result<MftTable, NtfsError> {
        let mut preloaded = Vec::with_capacity(SYSTEM_RECORD_CNT);
        for index in 0..SYSTEM_RECORD_CNT {
            let buf = source.read_at(
                table_offset + index as u64 * record_size,
                record_size as usize,
            )?;
            preloaded.push(MftRecord::decode(index, &buf)?);
        }

        Ok(MftTable {
            table_offset,
            record_size,
            preloaded,
        })
    }

    /// The eagerly loaded system records, indices 0 through 11.
    pub fn preloaded(&self) -> &[MftRecord] {
        &self.preloaded
    }

    /// Returns the record at `index`, reading it from `source` on demand if
    /// it is beyond the preloaded range.
    ///
    /// # Errors
    /// - `NtfsError::Io` or a decode error for a lazily read record.
    pub fn record(&self, source: &ByteSource, index: usize) -> Result<MftRecord, NtfsError> {
        if let Some(record) = self.preloaded.get(index) {
            return Ok(record.clone());
        }

        let buf = source.read_at(
            self.table_offset + index as u64 * self.record_size,
            self.record_size as usize,
        )?;
        MftRecord::decode(index, &buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// One record-sized buffer with a valid header.
    fn record_bytes(record_size: usize, sequence: u16, flags: u16) -> Vec<u8> {
        let mut buf = vec![0u8; record_size];
        buf[..4].copy_from_slice(&RECORD_SIGNATURE);
        buf[0x10..0x12].copy_from_slice(&sequence.to_le_bytes());
        buf[0x12..0x14].copy_from_slice(&1u16.to_le_bytes());
        buf[0x16..0x18].copy_from_slice(&flags.to_le_bytes());
        buf[0x18..0x1C].copy_from_slice(&(0x60u32).to_le_bytes());
        buf[0x1C..0x20].copy_from_slice(&(record_size as u32).to_le_bytes());
        buf
    }

    fn table_source(records: usize, record_size: usize) -> (NamedTempFile, ByteSource) {
        let mut tmp = NamedTempFile::new().unwrap();
        for i in 0..records {
            tmp.write_all(&record_bytes(record_size, i as u16 + 1, FLAG_IN_USE))
                .unwrap();
        }
        tmp.flush().unwrap();
        let src = ByteSource::open(tmp.path()).unwrap();
        (tmp, src)
    }

    #[test]
    fn preloads_twelve_system_records() {
        let (_tmp, src) = table_source(16, 1024);
        let table = MftTable::load(&src, 0, 1024).unwrap();
        assert_eq!(table.preloaded().len(), SYSTEM_RECORD_CNT);
        assert_eq!(table.preloaded()[0].system_name(), Some("$MFT"));
        assert_eq!(table.preloaded()[11].system_name(), Some("$Extend"));
        assert!(table.preloaded().iter().all(|r| r.is_in_use()));
    }

    #[test]
    fn truncated_table_fails_load() {
        // 8 records on disk, preload needs 12.
        let (_tmp, src) = table_source(8, 1024);
        assert!(matches!(
            MftTable::load(&src, 0, 1024),
            Err(NtfsError::Io(_))
        ));
    }

    #[test]
    fn bad_signature_fails_load() {
        let mut tmp = NamedTempFile::new().unwrap();
        for i in 0..SYSTEM_RECORD_CNT {
            let mut rec = record_bytes(1024, i as u16, FLAG_IN_USE);
            if i == 5 {
                rec[..4].copy_from_slice(b"BAAD");
            }
            tmp.write_all(&rec).unwrap();
        }
        tmp.flush().unwrap();
        let src = ByteSource::open(tmp.path()).unwrap();

        assert!(matches!(
            MftTable::load(&src, 0, 1024),
            Err(NtfsError::BadRecordSignature { index: 5, .. })
        ));
    }

    #[test]
    fn records_past_preload_are_read_lazily() {
        let (_tmp, src) = table_source(16, 1024);
        let table = MftTable::load(&src, 0, 1024).unwrap();
        let record = table.record(&src, 14).unwrap();
        assert_eq!(*record.index(), 14);
        assert_eq!(*record.sequence(), 15);
    }

    #[test]
    fn oversized_used_length_rejected() {
        let mut buf = record_bytes(1024, 1, FLAG_IN_USE);
        buf[0x18..0x1C].copy_from_slice(&4096u32.to_le_bytes());
        assert!(matches!(
            MftRecord::decode(0, &buf),
            Err(NtfsError::OversizedRecord { index: 0, .. })
        ));
    }
}
