//! Pager open options.

use crate::{Freelist, Result, StorageError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default page size; matches the memory page size of common hosts.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Smallest page that can hold an empty free-list record.
pub const MIN_PAGE_SIZE: usize = Freelist::HEADER_LEN;

/// Options for opening a [`Pager`](super::Pager).
///
/// ```rust
/// use storage::PagerOptions;
///
/// let options = PagerOptions::new().page_size(8192).sync_on_flush(true);
/// assert_eq!(options.get_page_size(), 8192);
/// ```
///
/// The page size is not stored in the file. Reopening a store with a
/// different size than it was created with reads the layout wrongly and is
/// not detected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PagerOptions {
    pub(crate) page_size: usize,
    /// `sync_data` after both control records are written by `flush`.
    pub(crate) sync_on_flush: bool,
}

impl PagerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sync_on_flush: false,
        }
    }

    /// Sets the page size in bytes.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets whether `flush` waits for the control records to reach the disk.
    #[must_use]
    pub fn sync_on_flush(mut self, sync_on_flush: bool) -> Self {
        self.sync_on_flush = sync_on_flush;
        self
    }

    pub fn get_page_size(&self) -> usize {
        self.page_size
    }

    pub fn get_sync_on_flush(&self) -> bool {
        self.sync_on_flush
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size < MIN_PAGE_SIZE {
            return Err(StorageError::InvalidPageSize {
                page_size: self.page_size,
                min: MIN_PAGE_SIZE,
            });
        }
        Ok(())
    }
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = PagerOptions::default();

        assert_eq!(options.get_page_size(), DEFAULT_PAGE_SIZE);
        assert!(!options.get_sync_on_flush());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = PagerOptions::new().page_size(512).sync_on_flush(true);

        assert_eq!(options.get_page_size(), 512);
        assert!(options.get_sync_on_flush());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(PagerOptions::new().page_size(MIN_PAGE_SIZE).validate().is_ok());

        let err = PagerOptions::new()
            .page_size(MIN_PAGE_SIZE - 1)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPageSize);
    }
}
