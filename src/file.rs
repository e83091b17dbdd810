//! Read-only file mappings
//!
//! [`MappedFile`] owns a whole-file, read-only mapping together with the OS
//! handles that keep it alive. The bytes are exposed as a borrowed `&[u8]`,
//! so the borrow checker guarantees no view outlives the mapping.

use crate::{
    Error, Result,
    error::mmap_error,
    mmap::{DefaultMmap, Mmap},
};
use alloc::{format, string::String};
use core::{
    fmt::Debug,
    ops::{Deref, Range},
    ptr::NonNull,
};

/// A file mapped read-only into the process address space.
///
/// The mapping covers the entire file as it was when it was opened and is
/// never empty. It is released exactly once, when the value is dropped or
/// passed to [`MappedFile::release`].
///
/// # Examples
/// ```no_run
/// use gguf_mmap::MappedFile;
///
/// let file = MappedFile::open("model.gguf")?;
/// assert!(file.len() > 0);
/// let first = file.read_at(0, 4);
/// # Ok::<(), gguf_mmap::Error>(())
/// ```
pub struct MappedFile<M: Mmap = DefaultMmap> {
    /// base address of the view
    ptr: NonNull<u8>,
    /// view length, equal to the file size at open time
    len: usize,
    /// the path the file was opened from
    path: String,
    // Fields drop in declaration order: the section is closed before the file.
    #[allow(dead_code)]
    section: M::Section,
    #[allow(dead_code)]
    file: M::File,
}

// The mapped memory is read-only and never mutated, so sharing it between
// threads is sound as long as the owned handles allow it.
unsafe impl<M: Mmap> Send for MappedFile<M>
where
    M::File: Send,
    M::Section: Send,
{
}
unsafe impl<M: Mmap> Sync for MappedFile<M>
where
    M::File: Sync,
    M::Section: Sync,
{
}

impl MappedFile {
    /// Opens `path` and maps its entire contents read-only using the
    /// platform's native mechanism.
    ///
    /// # Errors
    /// * [`Error::Open`] - the file is missing, inaccessible, or the path is invalid.
    /// * [`Error::Metadata`] - the file size cannot be determined.
    /// * [`Error::EmptyFile`] - the file has no bytes.
    /// * [`Error::Section`] - the section object could not be created (Windows).
    /// * [`Error::Mmap`] - the mapping call itself failed.
    ///
    /// Handles acquired before a failure are released before returning.
    ///
    /// Paths are taken as UTF-8. On Unix a file whose name is not valid
    /// UTF-8 cannot be opened through this function.
    #[inline]
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with(path)
    }
}

impl<M: Mmap> MappedFile<M> {
    /// Same as [`MappedFile::open`], but with an explicit backend.
    pub fn open_with(path: &str) -> Result<Self> {
        let file = M::open(path)?;
        let size = M::file_size(&file)?;
        if size == 0 {
            return Err(Error::EmptyFile {
                path: String::from(path),
            });
        }
        let len = usize::try_from(size).map_err(|_| {
            mmap_error(format!(
                "[{path}] is {size} bytes, larger than the address space"
            ))
        })?;
        let (ptr, section) = unsafe { M::mmap(&file, len)? };
        debug_assert!(
            ptr.as_ptr() as usize % M::page_size() == 0,
            "mapped view is not page aligned"
        );

        #[cfg(feature = "log")]
        log::debug!(
            "Mapped [{}] at address: {:p}, length: {}",
            path,
            ptr.as_ptr(),
            len
        );

        Ok(Self {
            ptr,
            len,
            path: String::from(path),
            section,
            file,
        })
    }

    /// Unmaps the view and closes the handles in reverse acquisition order.
    ///
    /// Equivalent to dropping the value. Teardown failures are never
    /// returned; with the `log` feature they are reported as warnings.
    #[inline]
    pub fn release(self) {
        drop(self);
    }

    /// Gets the whole mapped view.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Gets the number of mapped bytes. Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty files are rejected by [`MappedFile::open`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the base address of the mapping.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Gets the path the file was opened from.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the bytes in `[start, end)`.
    ///
    /// Returns `None` if `start > end` or `end > len()`. An empty range
    /// inside the view yields an empty slice.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.as_bytes().get(Range { start, end })
    }

    /// Returns `count` bytes starting at `offset`.
    ///
    /// Returns `None` if the range runs past the end of the view. The check
    /// is written so that `offset + count` never overflows.
    #[inline]
    pub fn read_at(&self, offset: usize, count: usize) -> Option<&[u8]> {
        if offset > self.len || count > self.len - offset {
            return None;
        }
        self.slice(offset, offset + count)
    }
}

impl<M: Mmap> Drop for MappedFile<M> {
    fn drop(&mut self) {
        #[cfg(feature = "log")]
        log::trace!("Unmapping [{}] at address: {:p}", self.path, self.ptr);
        let _res = unsafe { M::munmap(self.ptr, self.len) };
        #[cfg(feature = "log")]
        if let Err(err) = _res {
            log::warn!("Failed to unmap [{}]: {}", self.path, err);
        }
    }
}

impl<M: Mmap> Deref for MappedFile<M> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<M: Mmap> AsRef<[u8]> for MappedFile<M> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<M: Mmap> Debug for MappedFile<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("addr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
