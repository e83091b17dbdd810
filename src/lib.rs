//! # gguf_mmap
//! Read-only, cross-platform memory-mapped files and a zero-copy GGUF header decoder.
//! ## Usage
//! [`MappedFile`] maps a whole file with the platform's native mechanism (`mmap` on
//! POSIX systems, section objects on Windows) and hands out bounds-checked `&[u8]`
//! views. [`GgufHeader`] decodes the fixed 24-byte header of a GGUF model file from
//! such a view without copying the file.
//! ## Example
//! ```no_run
//! use gguf_mmap::{GgufHeader, MappedFile};
//!
//! let file = MappedFile::open("model.gguf")?;
//! match GgufHeader::decode(&file) {
//!     Some(header) if header.is_valid() => println!("{header}"),
//!     _ => println!("not a GGUF file"),
//! }
//! # Ok::<(), gguf_mmap::Error>(())
//! ```
//! ## Features
//! - `log`: report mappings and teardown failures through the `log` crate.
//! - `use-syscall`: on 64-bit Linux, talk to the kernel with raw syscalls instead of libc.
#![no_std]
extern crate alloc;

mod error;
mod file;
pub mod gguf;
pub mod mmap;
mod os;

pub use error::{Error, Result};
pub use file::MappedFile;
pub use gguf::{GGUF_HEADER_SIZE, GGUF_MAGIC, GgufHeader};
pub use mmap::page_size;
