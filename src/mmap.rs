//! Memory mapping backends
//!
//! This module defines the [`Mmap`] trait, the seam between [`MappedFile`](crate::MappedFile)
//! and the operating system. Exactly one implementation, [`DefaultMmap`], is compiled
//! for each target:
//! - **POSIX** (`libc`): `open` + `fstat` + `mmap(PROT_READ, MAP_SHARED)`.
//! - **Linux raw syscalls** (feature `use-syscall`): the same steps without libc.
//! - **Windows**: `CreateFileW` + `CreateFileMappingW` + `MapViewOfFile`.
//!
//! # Safety
//! Memory mapping manipulates the process's address space. The mapped
//! region must not be accessed after it has been unmapped.

pub use crate::os::DefaultMmap;

use crate::Result;
use bitflags::bitflags;
use core::{ffi::c_int, ptr::NonNull};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Memory protection flags for a mapped view.
    ///
    /// Views are never writable, so only read access is defined.
    pub struct ProtFlags: c_int {
        /// Allow reading from the memory region.
        const PROT_READ = 1;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Memory mapping configuration flags.
    pub struct MapFlags: c_int {
        /// Share the mapping with the file instead of taking a private
        /// copy-on-write one.
        const MAP_SHARED = 1;
    }
}

/// A trait for establishing and tearing down read-only file mappings.
///
/// The owned handle types carry their own release logic: dropping a
/// [`Mmap::File`] closes the file and dropping a [`Mmap::Section`] closes any
/// extra mapping handle. This keeps every early return during establishment
/// leak free.
///
/// # Example
/// ```rust,ignore
/// struct MyMmap;
///
/// impl Mmap for MyMmap {
///     type File = MyFile;
///     type Section = ();
///
///     fn open(path: &str) -> Result<MyFile> {
///         // Platform-specific implementation
///         todo!()
///     }
///
///     // Implement other required methods...
/// }
/// ```
pub trait Mmap {
    /// An open, read-only file handle. Closes itself on drop.
    type File;

    /// Extra handles that must outlive the mapped view, released after the
    /// view is unmapped. POSIX backends use `()`.
    type Section;

    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    /// Returns [`Error::Open`](crate::Error::Open) if the path is missing,
    /// inaccessible or malformed.
    fn open(path: &str) -> Result<Self::File>;

    /// Returns the size of the open file in bytes.
    ///
    /// # Errors
    /// Returns [`Error::Metadata`](crate::Error::Metadata) if the size cannot
    /// be determined.
    fn file_size(file: &Self::File) -> Result<u64>;

    /// Maps the first `len` bytes of `file` read-only into the address space.
    ///
    /// The mapping must be shared (not copy-on-write) and start at file
    /// offset 0.
    ///
    /// # Safety
    /// `len` must be non-zero and not larger than the file.
    unsafe fn mmap(file: &Self::File, len: usize) -> Result<(NonNull<u8>, Self::Section)>;

    /// Unmaps a region returned by [`Mmap::mmap`].
    ///
    /// # Safety
    /// `addr` and `len` must match a live mapping. The region must not be
    /// accessed afterwards.
    unsafe fn munmap(addr: NonNull<u8>, len: usize) -> Result<()>;

    /// The minimum alignment of a mapped view's base address.
    fn page_size() -> usize;
}

/// Returns the system page size as seen by the default backend.
#[inline]
pub fn page_size() -> usize {
    DefaultMmap::page_size()
}
