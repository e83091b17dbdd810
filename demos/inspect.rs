//! Maps a file and prints what it can tell about it.
//!
//! ```text
//! cargo run --example inspect --features log -- model.gguf
//! ```
use gguf_mmap::{GgufHeader, MappedFile, page_size};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: inspect <file>");
        return ExitCode::FAILURE;
    };

    let file = match MappedFile::open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("file:      {}", file.path());
    println!("size:      {} bytes", file.len());
    println!("address:   {:p} (page size {})", file.as_ptr(), page_size());
    if let Some(prefix) = file.read_at(0, 16.min(file.len())) {
        println!("first bytes: {prefix:02x?}");
    }

    match GgufHeader::from_mapped(&file) {
        Some(header) => {
            println!("header:    {header}");
            println!("magic:     {:#010x} ({})", header.magic, header.magic_as_text());
            if !header.is_valid() {
                println!("warning:   unsupported GGUF version {}", header.version);
            }
        }
        None => println!("header:    not a GGUF file"),
    }

    file.release();
    ExitCode::SUCCESS
}
