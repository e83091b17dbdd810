use gguf_mmap::{Error, MappedFile, Result, mmap::Mmap};
use rstest::rstest;
use std::{cell::RefCell, ptr::NonNull};

thread_local! {
    static EVENTS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

fn record(event: &'static str) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

fn take_events() -> Vec<&'static str> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

/// A backend that serves in-memory files and records every acquisition and
/// release. The path selects the behaviour.
struct MockMmap;

struct MockFile {
    path: String,
}

impl Drop for MockFile {
    fn drop(&mut self) {
        record("close file");
    }
}

struct MockSection {
    bytes: Box<[u8]>,
}

impl Drop for MockSection {
    fn drop(&mut self) {
        record("close section");
    }
}

impl Mmap for MockMmap {
    type File = MockFile;
    type Section = MockSection;

    fn open(path: &str) -> Result<MockFile> {
        if path == "missing" {
            return Err(Error::Open {
                msg: "no such file".into(),
            });
        }
        record("open");
        Ok(MockFile {
            path: path.to_string(),
        })
    }

    fn file_size(file: &MockFile) -> Result<u64> {
        match file.path.as_str() {
            "no-metadata" => Err(Error::Metadata {
                msg: "stat failed".into(),
            }),
            "empty" => Ok(0),
            "huge" => Ok(u64::MAX),
            _ => Ok(64),
        }
    }

    unsafe fn mmap(file: &MockFile, len: usize) -> Result<(NonNull<u8>, MockSection)> {
        if file.path == "no-section" {
            return Err(Error::Section {
                msg: "section refused".into(),
            });
        }
        if len > 1 << 20 {
            return Err(Error::Mmap {
                msg: "out of address space".into(),
            });
        }
        let mut section = MockSection {
            bytes: (0..len).map(|i| i as u8).collect(),
        };
        record("create section");
        if file.path == "no-view" {
            return Err(Error::Mmap {
                msg: "view refused".into(),
            });
        }
        record("map view");
        let ptr = NonNull::new(section.bytes.as_mut_ptr()).unwrap();
        Ok((ptr, section))
    }

    unsafe fn munmap(_addr: NonNull<u8>, _len: usize) -> Result<()> {
        record("unmap view");
        Ok(())
    }

    fn page_size() -> usize {
        1
    }
}

#[rstest]
fn release_runs_in_reverse_acquisition_order() {
    take_events();
    let file = MappedFile::<MockMmap>::open_with("model.gguf").unwrap();
    assert_eq!(file.len(), 64);
    assert_eq!(file[63], 63);
    assert_eq!(take_events(), ["open", "create section", "map view"]);

    file.release();
    assert_eq!(take_events(), ["unmap view", "close section", "close file"]);
}

#[rstest]
fn drop_releases_like_release() {
    take_events();
    {
        let _file = MappedFile::<MockMmap>::open_with("model.gguf").unwrap();
    }
    assert_eq!(
        take_events(),
        ["open", "create section", "map view", "unmap view", "close section", "close file"]
    );
}

#[rstest]
fn open_failure_acquires_nothing() {
    take_events();
    let err = MappedFile::<MockMmap>::open_with("missing").unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
    assert!(take_events().is_empty());
}

#[rstest]
#[case("no-metadata", &["open", "close file"])]
#[case("empty", &["open", "close file"])]
#[case("huge", &["open", "close file"])]
#[case("no-section", &["open", "close file"])]
#[case("no-view", &["open", "create section", "close section", "close file"])]
fn partial_failures_release_what_was_acquired(
    #[case] path: &str,
    #[case] expected: &[&'static str],
) {
    take_events();
    let result = MappedFile::<MockMmap>::open_with(path);
    assert!(result.is_err());
    assert_eq!(take_events(), expected);
}

#[rstest]
fn failure_kinds_are_distinct() {
    let kind = |path: &str| match MappedFile::<MockMmap>::open_with(path).unwrap_err() {
        Error::Open { .. } => "open",
        Error::Metadata { .. } => "metadata",
        Error::EmptyFile { .. } => "empty",
        Error::Section { .. } => "section",
        Error::Mmap { .. } => "mmap",
    };
    assert_eq!(kind("missing"), "open");
    assert_eq!(kind("no-metadata"), "metadata");
    assert_eq!(kind("empty"), "empty");
    assert_eq!(kind("no-section"), "section");
    assert_eq!(kind("no-view"), "mmap");
    assert_eq!(kind("huge"), "mmap");
}
