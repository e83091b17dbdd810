//! GGUF header parsing and validation
//!
//! Every GGUF file starts with a fixed 24-byte little-endian header:
//!
//! | Offset | Size | Field               |
//! |--------|------|---------------------|
//! | 0      | 4    | `magic`             |
//! | 4      | 4    | `version`           |
//! | 8      | 8    | `tensor_count`      |
//! | 16     | 8    | `metadata_kv_count` |
//!
//! The counts are declared values and are not checked against the rest of
//! the file.

use crate::{MappedFile, mmap::Mmap};
use alloc::string::String;
use core::fmt::Display;

/// `b"GGUF"` read as a little-endian `u32`.
pub const GGUF_MAGIC: u32 = u32::from_le_bytes(*b"GGUF");

/// Size of the fixed header in bytes.
pub const GGUF_HEADER_SIZE: usize = 24;

/// Header versions accepted by [`GgufHeader::is_valid`].
pub const GGUF_SUPPORTED_VERSIONS: [u32; 3] = [1, 2, 3];

/// The fixed-size header at the start of a GGUF file.
///
/// Decoding copies the 24 bytes out of the view, so a header never borrows
/// the mapping it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GgufHeader {
    pub magic: u32,
    pub version: u32,
    pub tensor_count: u64,
    pub metadata_kv_count: u64,
}

impl GgufHeader {
    /// Creates a header with the GGUF magic already filled in.
    #[inline]
    pub const fn new(version: u32, tensor_count: u64, metadata_kv_count: u64) -> Self {
        Self {
            magic: GGUF_MAGIC,
            version,
            tensor_count,
            metadata_kv_count,
        }
    }

    /// Decodes the header at the start of `data`.
    ///
    /// Returns `None` if `data` is shorter than [`GGUF_HEADER_SIZE`] or does
    /// not start with the GGUF magic. The version is not checked here; use
    /// [`GgufHeader::is_valid`] for that.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let header: &[u8; GGUF_HEADER_SIZE] = data.get(..GGUF_HEADER_SIZE)?.try_into().ok()?;
        let magic = u32::from_le_bytes(field(header, 0));
        if magic != GGUF_MAGIC {
            return None;
        }
        Some(Self {
            magic,
            version: u32::from_le_bytes(field(header, 4)),
            tensor_count: u64::from_le_bytes(field(header, 8)),
            metadata_kv_count: u64::from_le_bytes(field(header, 16)),
        })
    }

    /// Decodes the header of a mapped file.
    #[inline]
    pub fn from_mapped<M: Mmap>(file: &MappedFile<M>) -> Option<Self> {
        Self::decode(file.as_bytes())
    }

    /// Checks the magic and that the version is one of
    /// [`GGUF_SUPPORTED_VERSIONS`].
    ///
    /// This looks at the fields only, so it also catches headers that were
    /// built by hand rather than decoded.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == GGUF_MAGIC && GGUF_SUPPORTED_VERSIONS.contains(&self.version)
    }

    /// Gets the magic as text, `"GGUF"` for a valid header.
    ///
    /// The bytes are taken in native order, so the result only matches the
    /// on-disk bytes on little-endian hosts. Meant for display, not for
    /// format checks. Bytes that are not UTF-8 become `U+FFFD`.
    pub fn magic_as_text(&self) -> String {
        String::from_utf8_lossy(&self.magic.to_ne_bytes()).into_owned()
    }

    /// Encodes the header in its on-disk little-endian layout.
    pub fn to_bytes(&self) -> [u8; GGUF_HEADER_SIZE] {
        let mut bytes = [0u8; GGUF_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.tensor_count.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.metadata_kv_count.to_le_bytes());
        bytes
    }
}

#[inline]
fn field<const N: usize>(header: &[u8; GGUF_HEADER_SIZE], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&header[offset..offset + N]);
    out
}

impl Display for GgufHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} v{} (tensors: {}, metadata entries: {})",
            self.magic_as_text(),
            self.version,
            self.tensor_count,
            self.metadata_kv_count
        )
    }
}
