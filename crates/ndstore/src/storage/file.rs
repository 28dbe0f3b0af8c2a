//! File-backed storage.
//!
//! File layout:
//!
//! ```text
//! [count: u64 LE][record 0][record 1] ... [record count-1]
//! ```
//!
//! Every record is `T::WIDTH` bytes in the element's [`Persist`] encoding,
//! stored in linear (multiplier) order. Each access seeks and reads or
//! writes one record, so sequential access is the cheap path. The file
//! handle sits behind a mutex so a seek and its read are one step even when
//! the store is shared between threads.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use smallvec::SmallVec;

use crate::config::StorageKind;
use crate::element::{Element, Persist};
use crate::error::{Result, StoreError};

use super::StorageBackend;

const HEADER_LEN: u64 = 8;

/// Records written per call when filling.
const FILL_CHUNK: usize = 4096;

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

type RecordBuf = SmallVec<[u8; 16]>;

/// Storage backed by a file of fixed-width records.
///
/// Temp stores created by [`FileStore::allocate`] delete their file on drop;
/// stores re-opened with [`FileStore::open`] leave it in place.
#[derive(Debug)]
pub struct FileStore<T> {
    file: Mutex<File>,
    path: PathBuf,
    count: u64,
    zero: T,
    width: usize,
    encode: fn(&T, &mut [u8]),
    decode: fn(&[u8]) -> T,
    remove_on_drop: bool,
}

impl<T: Element> FileStore<T> {
    /// Create a temp file in `dir` holding `count` copies of `zero`.
    ///
    /// # Errors
    ///
    /// - `StoreError::AllocationError` if the file would exceed `u64` bytes
    /// - `StoreError::Io` if the file cannot be created or written
    pub fn allocate(count: u64, zero: T, dir: &Path) -> Result<Self>
    where
        T: Persist,
    {
        let limit = (u64::MAX - HEADER_LEN) / T::WIDTH as u64;
        if count > limit {
            return Err(StoreError::AllocationError {
                requested: count,
                limit,
            });
        }

        let path = temp_path(dir);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        log::debug!("created file store {} for {count} slots", path.display());

        let mut store = Self {
            file: Mutex::new(file),
            path,
            count,
            zero,
            width: T::WIDTH,
            encode: T::encode,
            decode: T::decode,
            remove_on_drop: true,
        };
        store.write_header()?;
        let zero = store.zero.clone();
        store.fill(&zero)?;
        Ok(store)
    }

    /// Re-open a file previously written by [`FileStore::persist`].
    ///
    /// # Errors
    ///
    /// - `StoreError::Io` if the file cannot be read
    /// - `StoreError::ShapeMismatch` if the file length disagrees with its header
    pub fn open(path: impl AsRef<Path>, zero: T) -> Result<Self>
    where
        T: Persist,
    {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)?;
        let count = u64::from_le_bytes(header);

        let records = (file.metadata()?.len().saturating_sub(HEADER_LEN)) / T::WIDTH as u64;
        if records != count {
            return Err(StoreError::ShapeMismatch {
                expected: count,
                actual: records,
            });
        }
        log::debug!("opened file store {} with {count} slots", path.display());

        Ok(Self {
            file: Mutex::new(file),
            path,
            count,
            zero,
            width: T::WIDTH,
            encode: T::encode,
            decode: T::decode,
            remove_on_drop: false,
        })
    }

    /// Path of the backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the backing file (header and records) to `path`.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        self.lock().flush()?;
        std::fs::copy(&self.path, path.as_ref())?;
        Ok(())
    }

    fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir)
    }

    fn write_header(&mut self) -> Result<()> {
        let count = self.count;
        let file = self.file_mut();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&count.to_le_bytes())?;
        Ok(())
    }

    /// Shared access to the handle; a poisoned lock still guards a valid file.
    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn file_mut(&mut self) -> &mut File {
        self.file.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.count {
            return Err(StoreError::IndexOutOfRange {
                index,
                size: self.count,
            });
        }
        Ok(())
    }

    #[inline]
    fn position(&self, index: u64) -> u64 {
        HEADER_LEN + index * self.width as u64
    }
}

impl<T: Element> StorageBackend<T> for FileStore<T> {
    fn kind(&self) -> StorageKind {
        StorageKind::File
    }

    #[inline]
    fn size(&self) -> u64 {
        self.count
    }

    fn zero(&self) -> &T {
        &self.zero
    }

    fn get_into(&self, index: u64, out: &mut T) -> Result<()> {
        self.check_index(index)?;
        let mut buf: RecordBuf = SmallVec::from_elem(0, self.width);
        let position = self.position(index);
        let mut file = self.lock();
        file.seek(SeekFrom::Start(position))?;
        file.read_exact(&mut buf)?;
        drop(file);
        *out = (self.decode)(&buf);
        Ok(())
    }

    fn set(&mut self, index: u64, value: &T) -> Result<()> {
        self.check_index(index)?;
        let mut buf: RecordBuf = SmallVec::from_elem(0, self.width);
        (self.encode)(value, &mut buf);
        let position = self.position(index);
        let file = self.file_mut();
        file.seek(SeekFrom::Start(position))?;
        file.write_all(&buf)?;
        Ok(())
    }

    fn fill(&mut self, value: &T) -> Result<()> {
        let mut record: RecordBuf = SmallVec::from_elem(0, self.width);
        (self.encode)(value, &mut record);

        let end = HEADER_LEN + self.count * self.width as u64;
        let (count, width) = (self.count, self.width);
        let file = self.file_mut();
        if record.iter().all(|&b| b == 0) {
            // zero records: truncate and regrow, the OS supplies zeros
            file.set_len(HEADER_LEN)?;
            file.set_len(end)?;
            return Ok(());
        }

        let chunk: Vec<u8> = record
            .iter()
            .copied()
            .cycle()
            .take(width * FILL_CHUNK)
            .collect();
        file.set_len(end)?;
        file.seek(SeekFrom::Start(HEADER_LEN))?;
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK as u64) as usize;
            file.write_all(&chunk[..n * width])?;
            remaining -= n as u64;
        }
        Ok(())
    }

    fn duplicate(&self) -> Result<Self> {
        self.lock().flush()?;
        let path = temp_path(&self.dir());
        std::fs::copy(&self.path, &path)?;
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        log::debug!(
            "duplicated file store {} into {}",
            self.path.display(),
            path.display()
        );
        Ok(Self {
            file: Mutex::new(file),
            path,
            count: self.count,
            zero: self.zero.clone(),
            width: self.width,
            encode: self.encode,
            decode: self.decode,
            remove_on_drop: true,
        })
    }

    fn allocate_like(&self, count: u64) -> Result<Self> {
        let limit = (u64::MAX - HEADER_LEN) / self.width as u64;
        if count > limit {
            return Err(StoreError::AllocationError {
                requested: count,
                limit,
            });
        }
        let path = temp_path(&self.dir());
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        log::debug!("created file store {} for {count} slots", path.display());

        let mut store = Self {
            file: Mutex::new(file),
            path,
            count,
            zero: self.zero.clone(),
            width: self.width,
            encode: self.encode,
            decode: self.decode,
            remove_on_drop: true,
        };
        store.write_header()?;
        store.zero_fill()?;
        Ok(store)
    }

    fn access_with_one_thread(&self) -> bool {
        true
    }
}

impl<T> Drop for FileStore<T> {
    fn drop(&mut self) {
        if self.remove_on_drop {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}

fn temp_path(dir: &Path) -> PathBuf {
    let id = NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("ndstore-{}-{}.bin", std::process::id(), id))
}
