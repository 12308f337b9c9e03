//! Storage engine for EmbedStore
//!
//! This crate provides the low-level storage primitives: fixed-size pages,
//! the free-page allocator, the metadata root at page 0, and the pager that
//! moves them between memory and a single backing file.

pub mod freelist;
pub mod meta;
pub mod page;
pub mod pager;

pub use freelist::Freelist;
pub use meta::Metainfo;
pub use page::Page;
pub use pager::{Pager, PagerOptions, SharedPager, DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE};

use thiserror::Error;

/// Position of a page in the backing file, in units of the page size.
pub type PageNum = i64;

/// Page holding the [`Metainfo`] root record.
pub const META_PAGE: PageNum = 0;

/// Where a fresh [`Metainfo`] says the [`Freelist`] lives.
pub const DEFAULT_FREELIST_PAGE: PageNum = META_PAGE + 1;

/// Reserved boundary. A fresh [`Freelist`] hands this number out first, and
/// numbers at or below it are never taken back for reuse.
pub const BEGIN_FREE_BLOCKS: PageNum = DEFAULT_FREELIST_PAGE + 1;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{record}: wrong number of bytes: need at least {expected}, got {actual}")]
    WrongByteCount {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("failed to decode {record}: {source}")]
    Decode {
        record: &'static str,
        #[source]
        source: Box<StorageError>,
    },

    #[error("{record} record of {len} bytes does not fit in a {page_size} byte page")]
    RecordTooLarge {
        record: &'static str,
        len: usize,
        page_size: usize,
    },

    #[error("page size {page_size} is below the minimum of {min} bytes")]
    InvalidPageSize { page_size: usize, min: usize },

    #[error("{record}: {detail}")]
    Corrupt {
        record: &'static str,
        detail: String,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<StorageError>,
    },
}

/// Coarse classification of a [`StorageError`], stable across context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    WrongByteCount,
    Decode,
    RecordTooLarge,
    InvalidPageSize,
    Corrupt,
}

impl StorageError {
    /// Kind of the innermost error, looking through [`StorageError::Context`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Io(_) => ErrorKind::Io,
            StorageError::WrongByteCount { .. } => ErrorKind::WrongByteCount,
            StorageError::Decode { .. } => ErrorKind::Decode,
            StorageError::RecordTooLarge { .. } => ErrorKind::RecordTooLarge,
            StorageError::InvalidPageSize { .. } => ErrorKind::InvalidPageSize,
            StorageError::Corrupt { .. } => ErrorKind::Corrupt,
            StorageError::Context { source, .. } => source.kind(),
        }
    }

    /// Wraps `self` with a description of the step that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        StorageError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn decode(record: &'static str, source: StorageError) -> Self {
        StorageError::Decode {
            record,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Attaches step descriptions to fallible storage calls.
pub(crate) trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<StorageError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|err| err.into().context(context))
    }
}
