//! Free-page allocator.
//!
//! Tracks the allocation high-water mark and a stack of released page numbers.
//! Allocation reuses before it grows, most recent release first.
//!
//! Record format:
//! | max | count |  released  |
//! | 8B  |  4B   | count * 8B |

use crate::{PageNum, Result, StorageError, BEGIN_FREE_BLOCKS};
use bytes::{Buf, BufMut, Bytes, BytesMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const MAX_SIZE: usize = 8;
const COUNT_SIZE: usize = 4;
const ENTRY_SIZE: usize = 8;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Freelist {
    max: PageNum,           // Next page number growth will hand out
    released: Vec<PageNum>, // Stack; top is the last element
}

impl Freelist {
    /// Width of the fixed header (`max` + `count`).
    pub const HEADER_LEN: usize = MAX_SIZE + COUNT_SIZE;

    pub fn new() -> Self {
        Self {
            max: BEGIN_FREE_BLOCKS,
            released: Vec::new(),
        }
    }

    /// Hands out a page number: the most recently released one if any,
    /// otherwise a never-used number from the high-water mark.
    pub fn next(&mut self) -> PageNum {
        if let Some(num) = self.released.pop() {
            return num;
        }

        let num = self.max;
        self.max += 1;
        num
    }

    /// Returns `num` to the reuse pool.
    ///
    /// Numbers at or below [`BEGIN_FREE_BLOCKS`] are ignored. The caller must
    /// release a page at most once between allocations of it; a duplicate
    /// release is not detected and leads to the page being handed out twice.
    pub fn release(&mut self, num: PageNum) {
        if num <= BEGIN_FREE_BLOCKS {
            return;
        }

        self.released.push(num);
    }

    pub fn max(&self) -> PageNum {
        self.max
    }

    /// Released numbers in stack order (last is reused first).
    pub fn released(&self) -> &[PageNum] {
        &self.released
    }

    pub fn released_len(&self) -> usize {
        self.released.len()
    }

    /// Size of [`Freelist::serialize`]'s output.
    pub fn serialized_len(&self) -> usize {
        Self::HEADER_LEN + ENTRY_SIZE * self.released.len()
    }

    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.serialized_len());
        buf.put_i64_le(self.max);
        // Cannot truncate in practice: Pager::flush rejects any record wider
        // than a page long before the count nears u32::MAX.
        debug_assert!(u32::try_from(self.released.len()).is_ok());
        buf.put_u32_le(self.released.len() as u32);
        for &num in &self.released {
            buf.put_i64_le(num);
        }
        buf.freeze()
    }

    /// Decodes a record; bytes past the declared body are ignored.
    pub fn deserialize(mut bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(StorageError::WrongByteCount {
                record: "freelist header",
                expected: Self::HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let max = bytes.get_i64_le();
        // Growth must be able to hand `max` out and still advance past it
        if !(BEGIN_FREE_BLOCKS..PageNum::MAX).contains(&max) {
            return Err(StorageError::Corrupt {
                record: "freelist",
                detail: format!("max {} out of range", max),
            });
        }

        let count = bytes.get_u32_le() as usize;

        let body_len = count.saturating_mul(ENTRY_SIZE);
        if bytes.len() < body_len {
            return Err(StorageError::WrongByteCount {
                record: "freelist body",
                expected: body_len,
                actual: bytes.len(),
            });
        }

        let released: Vec<PageNum> = (0..count).map(|_| bytes.get_i64_le()).collect();
        if let Some(num) = released.iter().find(|&&num| num <= BEGIN_FREE_BLOCKS) {
            return Err(StorageError::Corrupt {
                record: "freelist",
                detail: format!("reserved page {} in released list", num),
            });
        }

        Ok(Self { max, released })
    }
}

impl Default for Freelist {
    fn default() -> Self {
        Self::new()
    }
}

/// `max` must match; released numbers compare as sets since their stored
/// order is an artifact of release history.
impl PartialEq for Freelist {
    fn eq(&self, other: &Self) -> bool {
        self.max == other.max
            && self.released.len() == other.released.len()
            && self.released.iter().all(|n| other.released.contains(n))
            && other.released.iter().all(|n| self.released.contains(n))
    }
}

impl Eq for Freelist {}
