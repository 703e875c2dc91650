//! Explicit field decoding for on-disk structures.
//!
//! Every fixed-layout structure in this crate (MBR entries, the GPT header,
//! the NTFS boot sector, MFT record headers) is decoded field by field with
//! an explicit offset, width and endianness. No structure is read through an
//! in-memory layout overlay, so results do not depend on host alignment or
//! padding rules.

use thiserror::Error;

/// Byte order of a multi-byte on-disk field.
///
/// Partition tables and NTFS metadata are little-endian throughout; `Big` is
/// provided for the occasional field documented otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Errors produced while decoding fields from a byte buffer.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The requested field does not fit in the buffer.
    #[error("field read out of bounds: offset {offset} width {width}, buffer length {len}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// Integer fields are limited to 1 through 8 bytes.
    #[error("unsupported integer width: {0}")]
    UnsupportedWidth(usize),
}

fn check_bounds(buf: &[u8], offset: usize, width: usize) -> Result<(), CodecError> {
    match offset.checked_add(width) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(CodecError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        }),
    }
}

/// Decodes an unsigned integer of `width` bytes at `offset`.
///
/// # Parameters
/// - `buf`: The buffer holding the raw structure.
/// - `offset`: Byte offset of the field within the buffer.
/// - `width`: Field width in bytes (1 to 8).
/// - `endian`: Byte order of the field.
///
/// # Errors
/// - `CodecError::OutOfBounds` if `offset + width` exceeds the buffer.
/// - `CodecError::UnsupportedWidth` if `width` is 0 or greater than 8.
pub fn read_uint(buf: &[u8], offset: usize, width: usize, endian: Endian) -> Result<u64, CodecError> {
    if width == 0 || width > 8 {
        return Err(CodecError::UnsupportedWidth(width));
    }
    check_bounds(buf, offset, width)?;

    let bytes = &buf[offset..offset + width];
    let mut value: u64 = 0;
    match endian {
        Endian::Little => {
            for &b in bytes.iter().rev() {
                value = (value << 8) | u64::from(b);
            }
        }
        Endian::Big => {
            for &b in bytes {
                value = (value << 8) | u64::from(b);
            }
        }
    }
    Ok(value)
}

/// Decodes a signed integer of `width` bytes at `offset`, sign-extending
/// from the field width.
///
/// # Errors
/// Same as [`read_uint`].
pub fn read_int(buf: &[u8], offset: usize, width: usize, endian: Endian) -> Result<i64, CodecError> {
    let raw = read_uint(buf, offset, width, endian)?;
    if width == 8 {
        return Ok(raw as i64);
    }

    let sign_bit = 1u64 << (width * 8 - 1);
    if raw & sign_bit != 0 {
        let mask = !0u64 << (width * 8);
        Ok((raw | mask) as i64)
    } else {
        Ok(raw as i64)
    }
}

/// Borrows `len` raw bytes at `offset`.
///
/// Used for fields that are byte arrays rather than integers, such as the
/// GPT "EFI PART" signature or a partition-type GUID.
///
/// # Errors
/// - `CodecError::OutOfBounds` if `offset + len` exceeds the buffer.
pub fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    check_bounds(buf, offset, len)?;
    Ok(&buf[offset..offset + len])
}
