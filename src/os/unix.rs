use crate::{
    Result,
    error::{metadata_error, mmap_error, open_error},
    mmap::{MapFlags, Mmap, ProtFlags},
};
use alloc::{ffi::CString, format};
use core::{
    ffi::c_int,
    mem::MaybeUninit,
    ptr::{NonNull, null_mut},
};
use libc::{MAP_FAILED, O_CLOEXEC, O_RDONLY};

/// An implementation of Mmap trait
pub struct DefaultMmap;

/// A read-only file descriptor, closed on drop.
pub struct RawFile {
    fd: c_int,
}

impl Drop for RawFile {
    fn drop(&mut self) {
        if unsafe { libc::close(self.fd) } != 0 {
            #[cfg(feature = "log")]
            log::warn!("close({}) failed with errno {}", self.fd, errno());
        }
    }
}

impl Mmap for DefaultMmap {
    type File = RawFile;
    type Section = ();

    fn open(path: &str) -> Result<RawFile> {
        let name = CString::new(path)
            .map_err(|_| open_error(format!("[{path}] contains an interior nul byte")))?;
        let fd = unsafe { libc::open(name.as_ptr(), O_RDONLY | O_CLOEXEC) };
        if fd == -1 {
            return Err(open_error(format!(
                "open [{path}] failed with errno {}",
                errno()
            )));
        }
        Ok(RawFile { fd })
    }

    fn file_size(file: &RawFile) -> Result<u64> {
        let mut stat = MaybeUninit::<libc::stat>::uninit();
        if unsafe { libc::fstat(file.fd, stat.as_mut_ptr()) } != 0 {
            return Err(metadata_error(format!(
                "fstat({}) failed with errno {}",
                file.fd,
                errno()
            )));
        }
        let size = unsafe { stat.assume_init() }.st_size;
        u64::try_from(size).map_err(|_| metadata_error(format!("negative file size {size}")))
    }

    unsafe fn mmap(file: &RawFile, len: usize) -> Result<(NonNull<u8>, ())> {
        let ptr = unsafe {
            libc::mmap(
                null_mut(),
                len,
                ProtFlags::PROT_READ.bits(),
                MapFlags::MAP_SHARED.bits(),
                file.fd,
                0,
            )
        };
        if core::ptr::eq(ptr, MAP_FAILED) {
            return Err(mmap_error(format!(
                "mmap of {len} bytes failed with errno {}",
                errno()
            )));
        }
        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or_else(|| mmap_error("mmap returned null"))?;
        Ok((ptr, ()))
    }

    unsafe fn munmap(addr: NonNull<u8>, len: usize) -> Result<()> {
        let res = unsafe { libc::munmap(addr.as_ptr().cast(), len) };
        if res != 0 {
            return Err(mmap_error(format!("munmap failed with errno {}", errno())));
        }
        Ok(())
    }

    fn page_size() -> usize {
        match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
            size if size > 0 => size as usize,
            _ => 4096,
        }
    }
}

fn errno() -> c_int {
    cfg_if::cfg_if! {
        if #[cfg(any(target_os = "linux", target_os = "emscripten"))] {
            unsafe { *libc::__errno_location() }
        } else if #[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))] {
            unsafe { *libc::__errno() }
        } else if #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))] {
            unsafe { *libc::__error() }
        } else {
            0
        }
    }
}
