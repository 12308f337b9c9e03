use crate::PageNum;

/// One fixed-size block of the backing file, held in memory.
///
/// The buffer length is fixed at creation. Trailing zero bytes cannot be told
/// apart from space that was never written, so callers frame their own payload
/// length (or use [`Page::payload`] for NUL-free data).
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    num: PageNum,
    data: Vec<u8>, // Always exactly the page size
}

impl Page {
    /// Creates a zero-filled page of `size` bytes tagged with `num`.
    pub fn new(num: PageNum, size: usize) -> Self {
        Self {
            num,
            data: vec![0; size],
        }
    }

    /// Re-tags the page, keeping its buffer.
    pub fn with_num(mut self, num: PageNum) -> Self {
        self.num = num;
        self
    }

    /// Copies `bytes` into the buffer from offset 0.
    ///
    /// Input longer than the page is truncated. Input shorter than the page
    /// leaves the remaining bytes as they were: a short write after a long one
    /// keeps the tail of the long one.
    pub fn write(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(self.data.len());
        self.data[..n].copy_from_slice(&bytes[..n]);
    }

    pub fn num(&self) -> PageNum {
        self.num
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Buffer contents with trailing NUL bytes trimmed.
    pub fn payload(&self) -> &[u8] {
        let end = self
            .data
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        &self.data[..end]
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Page {{ num: {}, size: {}, payload_len: {} }}",
            self.num,
            self.data.len(),
            self.payload().len()
        )
    }
}
