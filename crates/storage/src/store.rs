use {
    crate::{buffer::TrainKey, PAGE_SIZE},
    std::{collections::HashMap, io},
};

/// Backing storage the buffer manager reads trains from and writes them to.
///
/// A train starting at `key.page_no` covers `buf.len() / PAGE_SIZE` consecutive
/// pages of the volume. `write` must not return before the data is durable.
pub trait TrainStore {
    fn read(&mut self, key: &TrainKey, buf: &mut [u8]) -> io::Result<()>;
    fn write(&mut self, key: &TrainKey, buf: &[u8]) -> io::Result<()>;
}

/// Keeps pages in memory. Pages never written read back as zeroes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: HashMap<TrainKey, Vec<u8>>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `write` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Makes every following `write` fail until switched off again.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn page(&self, key: &TrainKey) -> Option<&[u8]> {
        self.pages.get(key).map(Vec::as_slice)
    }
}

impl TrainStore for MemoryStore {
    fn read(&mut self, key: &TrainKey, buf: &mut [u8]) -> io::Result<()> {
        let pages = page_keys(key, buf.len())?;

        for (page_key, chunk) in pages.zip(buf.chunks_mut(PAGE_SIZE)) {
            match self.pages.get(&page_key) {
                Some(page) => chunk.copy_from_slice(&page[..chunk.len()]),
                None => chunk.fill(0),
            }
        }

        Ok(())
    }

    fn write(&mut self, key: &TrainKey, buf: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("write of train {} refused", key),
            ));
        }

        let pages = page_keys(key, buf.len())?;

        for (page_key, chunk) in pages.zip(buf.chunks(PAGE_SIZE)) {
            let page = self
                .pages
                .entry(page_key)
                .or_insert_with(|| vec![0; PAGE_SIZE]);

            page[..chunk.len()].copy_from_slice(chunk);
        }
        self.writes += 1;

        Ok(())
    }
}

/// Keys of the pages a train of `len` bytes covers. A train running past the
/// last page number of the volume is rejected before anything is touched.
fn page_keys(key: &TrainKey, len: usize) -> io::Result<impl Iterator<Item = TrainKey>> {
    let pages = ((len + PAGE_SIZE - 1) / PAGE_SIZE) as u64;
    let end = key.page_no as u64 + pages;

    if end > u32::MAX as u64 + 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("train {} of {} pages runs past the last page", key, pages),
        ));
    }

    let vol_no = key.vol_no;
    Ok((key.page_no as u64..end).map(move |page_no| TrainKey::new(vol_no, page_no as u32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_pages_read_as_zero() -> io::Result<()> {
        let mut store = MemoryStore::new();
        let mut buf = vec![7; PAGE_SIZE];

        store.read(&TrainKey::new(0, 3), &mut buf)?;

        assert!(buf.iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn train_spans_consecutive_pages() -> io::Result<()> {
        let mut store = MemoryStore::new();
        let mut train = vec![1; 2 * PAGE_SIZE];
        train[PAGE_SIZE..].fill(2);

        store.write(&TrainKey::new(1, 10), &train)?;

        assert_eq!(store.page(&TrainKey::new(1, 11)), Some(&vec![2; PAGE_SIZE][..]));

        let mut page = vec![0; PAGE_SIZE];
        store.read(&TrainKey::new(1, 10), &mut page)?;
        assert_eq!(page, vec![1; PAGE_SIZE]);
        assert_eq!(store.writes(), 1);

        Ok(())
    }

    #[test]
    fn refused_writes_are_not_counted() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);

        assert!(store.write(&TrainKey::new(0, 0), &[0; PAGE_SIZE]).is_err());
        assert_eq!(store.writes(), 0);
        assert_eq!(store.page(&TrainKey::new(0, 0)), None);
    }

    #[test]
    fn train_past_last_page_is_rejected() {
        let mut store = MemoryStore::new();
        let key = TrainKey::new(0, u32::MAX);
        let mut train = vec![3; 2 * PAGE_SIZE];

        let err = store.write(&key, &train).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(store.writes(), 0);
        assert_eq!(store.page(&key), None);

        assert!(store.read(&key, &mut train).is_err());

        // a single page at the last number still fits
        store.write(&key, &train[..PAGE_SIZE]).unwrap();
        assert_eq!(store.page(&key), Some(&vec![3; PAGE_SIZE][..]));
    }
}
