//! Single-writer boundary for sharing a [`Pager`] across threads.

use super::Pager;
use crate::{Page, PageNum, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Clone-able handle that serializes every call to one [`Pager`].
///
/// The pager itself stays lock-free; all synchronization lives here. Use
/// [`SharedPager::with`] to run several steps (allocate, write, flush) under
/// one lock acquisition.
#[derive(Clone)]
pub struct SharedPager {
    inner: Arc<Mutex<Pager>>,
}

impl SharedPager {
    pub fn new(pager: Pager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pager)),
        }
    }

    /// Runs `f` with exclusive access to the pager.
    pub fn with<R>(&self, f: impl FnOnce(&mut Pager) -> R) -> R {
        let mut pager = self.inner.lock();
        f(&mut pager)
    }

    /// Takes a page number from the free-list and returns a zeroed page
    /// tagged with it.
    pub fn allocate_page(&self) -> Page {
        self.with(|pager| {
            let num = pager.freelist_mut().next();
            pager.allocate().with_num(num)
        })
    }

    pub fn release(&self, num: PageNum) {
        self.with(|pager| pager.freelist_mut().release(num))
    }

    pub fn write(&self, page: &Page) -> Result<()> {
        self.with(|pager| pager.write(page))
    }

    pub fn read(&self, num: PageNum) -> Result<Page> {
        self.with(|pager| pager.read(num))
    }

    pub fn flush(&self) -> Result<()> {
        self.with(|pager| pager.flush())
    }

    /// Closes the pager if this is the last handle; otherwise hands the
    /// handle back.
    pub fn try_close(self) -> std::result::Result<Result<()>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().close()),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl std::fmt::Debug for SharedPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPager")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
