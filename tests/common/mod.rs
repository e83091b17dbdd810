#![allow(dead_code)]

use gguf_mmap::GgufHeader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fixture file that lives as long as its temporary directory.
pub struct Fixture {
    dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn path(&self) -> &str {
        self.path.to_str().unwrap()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

pub fn write_fixture(name: &str, bytes: &[u8]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    Fixture { dir, path }
}

/// Writes a file of `len` bytes where byte `i` is `i % 256`.
pub fn pattern_file(len: usize) -> Fixture {
    let bytes: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
    write_fixture("pattern.bin", &bytes)
}

/// Writes a GGUF header followed by `trailing` zero bytes.
pub fn header_file(header: &GgufHeader, trailing: usize) -> Fixture {
    let mut bytes = header.to_bytes().to_vec();
    bytes.resize(bytes.len() + trailing, 0);
    write_fixture("model.gguf", &bytes)
}
