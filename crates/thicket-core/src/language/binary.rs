//! Binary form of language tables.
//!
//! Layout: a 16-byte header followed by the postcard-encoded [`LanguageTable`].
//!
//! - 0-3: magic `b"TKLT"`
//! - 4-7: ABI version of the table
//! - 8-11: CRC32 of everything after the header
//! - 12-15: total blob size in bytes

use super::{Language, LanguageError, LanguageTable};

pub const MAGIC: [u8; 4] = *b"TKLT";
pub const HEADER_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    magic: [u8; 4],
    abi_version: u32,
    checksum: u32,
    total_size: u32,
}

impl Header {
    fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            abi_version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            total_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }

    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.abi_version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.total_size.to_le_bytes());
        bytes
    }
}

impl LanguageTable {
    /// Serialize to the binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = postcard::to_allocvec(self).expect("serialization should not fail");
        let header = Header {
            magic: MAGIC,
            abi_version: self.abi_version,
            checksum: crc32fast::hash(&payload),
            total_size: (HEADER_SIZE + payload.len()) as u32,
        };

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        out
    }

    /// Deserialize from the binary form, verifying the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LanguageError> {
        let Some((head, payload)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(LanguageError::TooSmall(bytes.len()));
        };
        let header = Header::from_bytes(head);
        if header.magic != MAGIC {
            return Err(LanguageError::InvalidMagic);
        }
        if header.total_size as usize != bytes.len() {
            return Err(LanguageError::SizeMismatch {
                header: header.total_size as usize,
                actual: bytes.len(),
            });
        }
        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(LanguageError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        Ok(postcard::from_bytes(payload)?)
    }
}

impl Language {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.table().to_bytes()
    }

    /// Load a language from its binary form. The ABI version is checked when
    /// the language is assigned to a parser, not here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LanguageError> {
        Language::from_table(LanguageTable::from_bytes(bytes)?)
    }
}
