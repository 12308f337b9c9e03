use crate::{PageNum, Result, StorageError, DEFAULT_FREELIST_PAGE};
use bytes::{Buf, BufMut, Bytes, BytesMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Root record, always stored at page 0.
///
/// Recovery starts here: the only thing it records is where the free-list
/// lives, so every other piece of allocation state can be found from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metainfo {
    pub freelist_page: PageNum,
}

impl Metainfo {
    /// Encoded width in bytes.
    pub const SERIALIZED_LEN: usize = 8;

    pub fn new() -> Self {
        Self {
            freelist_page: DEFAULT_FREELIST_PAGE,
        }
    }

    /// `freelist_page` as 8 little-endian bytes.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SERIALIZED_LEN);
        buf.put_i64_le(self.freelist_page);
        buf.freeze()
    }

    /// Decodes the first 8 bytes of `bytes`; anything after them is ignored.
    pub fn deserialize(mut bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SERIALIZED_LEN {
            return Err(StorageError::WrongByteCount {
                record: "metainfo",
                expected: Self::SERIALIZED_LEN,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            freelist_page: bytes.get_i64_le(),
        })
    }
}

impl Default for Metainfo {
    fn default() -> Self {
        Self::new()
    }
}
