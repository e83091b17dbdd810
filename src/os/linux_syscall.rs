use crate::{
    Error, Result,
    error::{metadata_error, mmap_error, open_error},
    mmap::{MapFlags, Mmap, ProtFlags},
};
use alloc::{ffi::CString, format};
use core::{ffi::c_int, ptr::NonNull};
use syscalls::Sysno;

const O_RDONLY: usize = 0;
const O_CLOEXEC: usize = 0o2000000;
const SEEK_END: usize = 2;
const PAGE_SIZE: usize = 0x1000;

/// An implementation of Mmap trait
pub struct DefaultMmap;

/// A read-only file descriptor, closed on drop.
pub struct RawFile {
    fd: c_int,
}

impl Drop for RawFile {
    fn drop(&mut self) {
        let ret = unsafe { syscalls::raw_syscall!(Sysno::close, self.fd) };
        if ret > -4096isize as usize {
            #[cfg(feature = "log")]
            log::warn!("close({}) failed with errno {}", self.fd, -(ret as isize));
        }
    }
}

impl Mmap for DefaultMmap {
    type File = RawFile;
    type Section = ();

    fn open(path: &str) -> Result<RawFile> {
        let name = CString::new(path)
            .map_err(|_| open_error(format!("[{path}] contains an interior nul byte")))?;
        #[cfg(not(any(
            target_arch = "aarch64",
            target_arch = "riscv64",
            target_arch = "loongarch64"
        )))]
        let ret = unsafe {
            syscalls::raw_syscall!(Sysno::open, name.as_ptr(), O_RDONLY | O_CLOEXEC, 0)
        };
        #[cfg(any(
            target_arch = "aarch64",
            target_arch = "riscv64",
            target_arch = "loongarch64"
        ))]
        let ret = unsafe {
            const AT_FDCWD: c_int = -100;
            syscalls::raw_syscall!(
                Sysno::openat,
                AT_FDCWD,
                name.as_ptr(),
                O_RDONLY | O_CLOEXEC,
                0
            )
        };
        let fd = from_ret(ret, |code| open_error(format!("open [{path}] failed with errno {code}")))?;
        Ok(RawFile { fd: fd as c_int })
    }

    fn file_size(file: &RawFile) -> Result<u64> {
        let size = unsafe {
            from_ret(
                syscalls::raw_syscall!(Sysno::lseek, file.fd, 0, SEEK_END),
                |code| metadata_error(format!("lseek({}) failed with errno {code}", file.fd)),
            )?
        };
        Ok(size as u64)
    }

    unsafe fn mmap(file: &RawFile, len: usize) -> Result<(NonNull<u8>, ())> {
        let ptr = unsafe {
            from_ret(
                syscalls::raw_syscall!(
                    Sysno::mmap,
                    0,
                    len,
                    ProtFlags::PROT_READ.bits(),
                    MapFlags::MAP_SHARED.bits(),
                    file.fd,
                    0
                ),
                |code| mmap_error(format!("mmap of {len} bytes failed with errno {code}")),
            )?
        };
        let ptr = NonNull::new(ptr as *mut u8).ok_or_else(|| mmap_error("mmap returned null"))?;
        Ok((ptr, ()))
    }

    unsafe fn munmap(addr: NonNull<u8>, len: usize) -> Result<()> {
        unsafe {
            from_ret(
                syscalls::raw_syscall!(Sysno::munmap, addr.as_ptr(), len),
                |code| mmap_error(format!("munmap failed with errno {code}")),
            )?;
        }
        Ok(())
    }

    #[inline]
    fn page_size() -> usize {
        PAGE_SIZE
    }
}

/// Converts a raw syscall return value to a result.
///
/// `err` receives the positive errno value.
#[inline(always)]
fn from_ret(value: usize, err: impl FnOnce(isize) -> Error) -> Result<usize> {
    if value > -4096isize as usize {
        // Truncation of the error value is guaranteed to never occur due to
        // the above check. This is the same check that musl uses:
        // https://git.musl-libc.org/cgit/musl/tree/src/internal/syscall_ret.c?h=v1.1.15
        return Err(err(-(value as isize)));
    }
    Ok(value)
}
