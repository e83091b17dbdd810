use alloc::{borrow::Cow, string::String};
use core::fmt::Display;

/// Error types returned when establishing a mapping.
///
/// Every variant is a distinct failure kind so callers can tell a missing
/// file apart from an empty one or from the OS refusing the mapping.
/// Bounds queries and header decoding never produce these; they return
/// `Option` instead.
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened.
    ///
    /// This error typically indicates:
    /// * File not found
    /// * Permission denied
    /// * Invalid path (for example an interior nul byte)
    Open {
        /// A descriptive message about the open failure.
        msg: Cow<'static, str>,
    },

    /// The file was opened but its size could not be queried.
    Metadata {
        /// A descriptive message about the metadata failure.
        msg: Cow<'static, str>,
    },

    /// The file is zero bytes long. Empty files are never mapped.
    EmptyFile {
        /// The path that was opened.
        path: String,
    },

    /// The section object backing the mapping could not be created.
    ///
    /// Only the section/view backend reports this; POSIX backends map the
    /// file descriptor directly.
    Section {
        /// A descriptive message about the section failure.
        msg: Cow<'static, str>,
    },

    /// The platform mapping call failed for an open, non-empty file.
    ///
    /// This error typically indicates:
    /// * Address space or mapping count limits exceeded
    /// * The file type cannot be mapped (a directory or a pipe)
    /// * The file is larger than the address space
    Mmap {
        /// A descriptive message about the memory mapping error.
        msg: Cow<'static, str>,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Open { msg } => write!(f, "Open error: {msg}"),
            Error::Metadata { msg } => write!(f, "Metadata error: {msg}"),
            Error::EmptyFile { path } => write!(f, "Empty file: [{path}] has no bytes to map"),
            Error::Section { msg } => write!(f, "Section creation error: {msg}"),
            Error::Mmap { msg } => write!(f, "Memory mapping error: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

/// Creates an open error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn open_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Open { msg: msg.into() }
}

/// Creates a metadata error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn metadata_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Metadata { msg: msg.into() }
}

/// Creates a section creation error with the specified message.
#[cold]
#[inline(never)]
#[allow(unused)]
pub(crate) fn section_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Section { msg: msg.into() }
}

/// Creates a memory mapping error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn mmap_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Mmap { msg: msg.into() }
}

pub type Result<T> = core::result::Result<T, Error>;
