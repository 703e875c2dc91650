//! Fixture disk images for the integration tests.
//!
//! Images are built byte by byte in memory and written to a temp file, so
//! every test runs against a real file handle the way the tool does.

use std::io::Write;

use tempfile::NamedTempFile;
use uuid::Uuid;

/// Partition geometry shared by the fixtures: the NTFS partition starts at
/// LBA 128 and spans 20480 sectors of 512 bytes.
pub const PART_LBA: u64 = 128;
pub const PART_SECTORS: u64 = 20480;

/// Writes `image` to a temp file and returns the handle keeping it alive.
pub fn write_image(image: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(image).unwrap();
    tmp.flush().unwrap();
    tmp
}

/// An NTFS partition body: boot sector (512 bytes/sector, 8 sectors/cluster,
/// MFT at cluster 4, 1024-byte records) plus 12 valid MFT system records.
pub fn ntfs_partition_body() -> Vec<u8> {
    let mut body = vec![0u8; 512];
    body[0x03..0x0B].copy_from_slice(b"NTFS    ");
    body[0x0B..0x0D].copy_from_slice(&512u16.to_le_bytes());
    body[0x0D] = 8;
    body[0x28..0x30].copy_from_slice(&PART_SECTORS.to_le_bytes());
    body[0x30..0x38].copy_from_slice(&4u64.to_le_bytes());
    body[0x40] = (-10i8) as u8;
    body[0x1FE] = 0x55;
    body[0x1FF] = 0xAA;

    // MFT at cluster 4 = 16384 bytes into the partition.
    body.resize(4 * 4096, 0);
    for i in 0..12u16 {
        let mut record = vec![0u8; 1024];
        record[..4].copy_from_slice(b"FILE");
        record[0x10..0x12].copy_from_slice(&(i + 1).to_le_bytes());
        record[0x12..0x14].copy_from_slice(&1u16.to_le_bytes());
        record[0x16..0x18].copy_from_slice(&1u16.to_le_bytes());
        record[0x18..0x1C].copy_from_slice(&0x60u32.to_le_bytes());
        record[0x1C..0x20].copy_from_slice(&1024u32.to_le_bytes());
        body.extend_from_slice(&record);
    }

    body
}

fn mbr_sector(slots: &[(usize, u8, u32, u32)]) -> Vec<u8> {
    let mut sector = vec![0u8; 512];
    sector[0x1FE] = 0x55;
    sector[0x1FF] = 0xAA;
    for &(index, part_type, lba, sectors) in slots {
        let base = 0x1BE + index * 16;
        sector[base + 0x04] = part_type;
        sector[base + 0x08..base + 0x0C].copy_from_slice(&lba.to_le_bytes());
        sector[base + 0x0C..base + 0x10].copy_from_slice(&sectors.to_le_bytes());
    }
    sector
}

/// A complete MBR disk with one NTFS (type 0x07) partition at LBA 128.
pub fn mbr_ntfs_image() -> Vec<u8> {
    let mut image = mbr_sector(&[(0, 0x07, PART_LBA as u32, PART_SECTORS as u32)]);
    image.resize(PART_LBA as usize * 512, 0);
    image.extend_from_slice(&ntfs_partition_body());
    image
}

/// A GPT disk: protective MBR, valid header at LBA 1, entry array at LBA 2
/// with one basic-data entry covering the NTFS partition at LBA 128.
pub fn gpt_ntfs_image() -> Vec<u8> {
    let mut image = mbr_sector(&[(0, 0xEE, 1, 0xFFFF_FFFF)]);

    let mut header = vec![0u8; 512];
    header[..8].copy_from_slice(b"EFI PART");
    header[8..12].copy_from_slice(&0x0001_0000u32.to_le_bytes());
    header[12..16].copy_from_slice(&92u32.to_le_bytes());
    header[24..32].copy_from_slice(&1u64.to_le_bytes());
    header[40..48].copy_from_slice(&34u64.to_le_bytes());
    header[48..56].copy_from_slice(&(PART_LBA + PART_SECTORS).to_le_bytes());
    header[72..80].copy_from_slice(&2u64.to_le_bytes());
    header[80..84].copy_from_slice(&128u32.to_le_bytes());
    header[84..88].copy_from_slice(&128u32.to_le_bytes());
    let crc = crc32fast::hash(&header[..92]);
    header[16..20].copy_from_slice(&crc.to_le_bytes());
    image.extend_from_slice(&header);

    // Entry array: slot 0 used, remaining 127 slots zero.
    let basic_data = Uuid::from_u128(0xEBD0A0A2_B9E5_4433_87C0_68B6B72699C7);
    let mut array = vec![0u8; 128 * 128];
    array[..16].copy_from_slice(&basic_data.to_bytes_le());
    array[16..32].copy_from_slice(Uuid::from_u128(1).to_bytes_le().as_slice());
    array[32..40].copy_from_slice(&PART_LBA.to_le_bytes());
    array[40..48].copy_from_slice(&(PART_LBA + PART_SECTORS - 1).to_le_bytes());
    for (i, unit) in "Basic data partition".encode_utf16().enumerate() {
        array[56 + i * 2..58 + i * 2].copy_from_slice(&unit.to_le_bytes());
    }
    image.extend_from_slice(&array);

    image.resize(PART_LBA as usize * 512, 0);
    image.extend_from_slice(&ntfs_partition_body());
    image
}

/// Same as [`gpt_ntfs_image`] but with the stored header CRC32 corrupted.
pub fn gpt_corrupted_crc_image() -> Vec<u8> {
    let mut image = gpt_ntfs_image();
    image[512 + 16] ^= 0xFF;
    image
}
