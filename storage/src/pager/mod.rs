mod options;
mod shared;

pub use options::{PagerOptions, DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE};
pub use shared::SharedPager;

use crate::{
    Freelist, Metainfo, Page, PageNum, Result, ResultExt, StorageError, META_PAGE,
};
use log::{debug, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File-backed block device.
///
/// Owns the open file, the page size, and the in-memory [`Metainfo`] and
/// [`Freelist`]. It is the only component that performs I/O.
///
/// Allocation changes are not persisted until [`Pager::flush`]. Callers must
/// write a page's contents before flushing a free-list state that records the
/// page as allocated; the reverse order only leaks the page if a crash
/// intervenes. The pager has no internal locking; see [`SharedPager`] for
/// multi-threaded use.
pub struct Pager {
    path: PathBuf,
    file: File,
    options: PagerOptions,

    meta: Metainfo,
    flist: Freelist,
}

impl Pager {
    /// Opens the store at `path`, creating it if absent.
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        Self::open_with(path, PagerOptions::new().page_size(page_size))
    }

    /// Opens the store at `path` with explicit options.
    ///
    /// A new file gets default control records, flushed immediately. An
    /// existing file is recovered from page 0. On any failure the file handle
    /// is closed before the error is returned.
    pub fn open_with(path: impl AsRef<Path>, options: PagerOptions) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;

        let exists = path
            .try_exists()
            .context(format!("pager/open {}", path.display()))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .context(format!("pager/open {}: open/create file", path.display()))?;

        let mut pager = Self {
            path: path.to_path_buf(),
            file,
            options,
            meta: Metainfo::new(),
            flist: Freelist::new(),
        };

        let res = if exists {
            pager.recover()
        } else {
            pager.flush()
        };

        if let Err(err) = res {
            warn!("pager/open {}: {}", path.display(), err);
            // Dropping the pager closes the handle
            drop(pager);
            return Err(err.context(format!("pager/open {}", path.display())));
        }

        if exists {
            info!(
                "recovered store {} (freelist page {}, max {}, {} released)",
                path.display(),
                pager.meta.freelist_page,
                pager.flist.max(),
                pager.flist.released_len()
            );
        } else {
            info!(
                "created store {} with page size {}",
                path.display(),
                pager.page_size()
            );
        }

        Ok(pager)
    }

    /// A zeroed page of the configured size, tagged with page 0. No I/O.
    pub fn allocate(&self) -> Page {
        Page::new(META_PAGE, self.options.page_size)
    }

    /// Writes the whole buffer of `page` at its slot, extending the file as
    /// needed. The page must be exactly one page wide.
    pub fn write(&mut self, page: &Page) -> Result<()> {
        if page.size() != self.options.page_size {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "page {} is {} bytes, expected page size {}",
                    page.num(),
                    page.size(),
                    self.options.page_size
                ),
            )));
        }

        let offset = self.offset(page.num())?;

        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(page.as_bytes()))
            .context(format!(
                "pager/write(num={},size={})",
                page.num(),
                page.size()
            ))?;

        debug!("wrote page {} ({} bytes)", page.num(), page.size());
        Ok(())
    }

    /// Reads exactly one page at `num`. Reading past the end of the file fails.
    pub fn read(&mut self, num: PageNum) -> Result<Page> {
        let offset = self.offset(num)?;
        let mut page = self.allocate().with_num(num);

        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.read_exact(page.as_bytes_mut()))
            .context(format!("pager/read(num={})", num))?;

        debug!("read page {}", num);
        Ok(page)
    }

    /// Writes the metainfo to page 0 and the free-list to the page the
    /// metainfo names.
    ///
    /// Nothing is rolled back on failure: the in-memory state may be ahead of
    /// the disk until a later flush succeeds.
    pub fn flush(&mut self) -> Result<()> {
        let meta_page = self
            .record_page(META_PAGE, "metainfo", &self.meta.serialize())
            .context("pager: flush metainfo")?;
        self.write(&meta_page).context("pager: flush metainfo")?;

        let flist_page = self
            .record_page(self.meta.freelist_page, "freelist", &self.flist.serialize())
            .context("pager: flush freelist")?;
        self.write(&flist_page).context("pager: flush freelist")?;

        if self.options.sync_on_flush {
            self.file.sync_data().context("pager: flush sync")?;
        }

        debug!(
            "flushed metainfo and freelist (page {}, max {}, {} released)",
            self.meta.freelist_page,
            self.flist.max(),
            self.flist.released_len()
        );
        Ok(())
    }

    /// Reloads the metainfo from page 0, then the free-list from the page it
    /// names. Any failure aborts; nothing is partially applied.
    pub fn recover(&mut self) -> Result<()> {
        let meta_page = self.read(META_PAGE).context("pager: recover metainfo")?;
        let meta = Metainfo::deserialize(meta_page.as_bytes())
            .map_err(|err| StorageError::decode("metainfo", err))
            .context("pager: recover metainfo")?;

        let flist_page = self
            .read(meta.freelist_page)
            .context("pager: recover freelist")?;
        let flist = Freelist::deserialize(flist_page.as_bytes())
            .map_err(|err| StorageError::decode("freelist", err))
            .context("pager: recover freelist")?;

        debug!(
            "recovered metainfo {:?} and freelist (max {})",
            meta,
            flist.max()
        );
        self.meta = meta;
        self.flist = flist;
        Ok(())
    }

    /// Forces written pages to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all().context("pager/sync")
    }

    /// Closes the store. Pending writes are synced first so that failures the
    /// OS would report on close are surfaced here.
    pub fn close(self) -> Result<()> {
        self.file.sync_all().context("pager/close")?;
        info!("closed store {}", self.path.display());
        Ok(())
    }

    pub fn meta(&self) -> &Metainfo {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Metainfo {
        &mut self.meta
    }

    pub fn freelist(&self) -> &Freelist {
        &self.flist
    }

    pub fn freelist_mut(&mut self) -> &mut Freelist {
        &mut self.flist
    }

    pub fn page_size(&self) -> usize {
        self.options.page_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn offset(&self, num: PageNum) -> Result<u64> {
        u64::try_from(num)
            .ok()
            .and_then(|n| n.checked_mul(self.options.page_size as u64))
            .ok_or_else(|| {
                StorageError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid page number {}", num),
                ))
            })
    }

    /// A zeroed page holding `bytes` at offset 0. Refuses records that would
    /// be truncated.
    fn record_page(&self, num: PageNum, record: &'static str, bytes: &[u8]) -> Result<Page> {
        if bytes.len() > self.options.page_size {
            return Err(StorageError::RecordTooLarge {
                record,
                len: bytes.len(),
                page_size: self.options.page_size,
            });
        }

        let mut page = self.allocate().with_num(num);
        page.write(bytes);
        Ok(page)
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("path", &self.path)
            .field("page_size", &self.options.page_size)
            .field("meta", &self.meta)
            .field("flist", &self.flist)
            .finish()
    }
}
