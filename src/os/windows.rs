use crate::{
    Result,
    error::{metadata_error, mmap_error, open_error, section_error},
    mmap::Mmap,
};
use alloc::{format, vec::Vec};
use core::{
    mem::MaybeUninit,
    ptr::{NonNull, null, null_mut},
};
use windows_sys::Win32::{
    Foundation::{CloseHandle, GENERIC_READ, GetLastError, HANDLE, INVALID_HANDLE_VALUE},
    Storage::FileSystem::{
        CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, GetFileSizeEx, OPEN_EXISTING,
    },
    System::{
        Memory::{
            CreateFileMappingW, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
            PAGE_READONLY, SEC_COMMIT, UnmapViewOfFile,
        },
        SystemInformation::GetSystemInfo,
    },
};

/// An implementation of Mmap trait
pub struct DefaultMmap;

/// A file handle opened for reading, closed on drop.
pub struct RawFile {
    handle: HANDLE,
}

/// The section object a view is mapped from, closed on drop.
pub struct RawSection {
    handle: HANDLE,
}

// Kernel handles are process-wide and may be used from any thread.
unsafe impl Send for RawFile {}
unsafe impl Sync for RawFile {}
unsafe impl Send for RawSection {}
unsafe impl Sync for RawSection {}

fn close_handle(handle: HANDLE, _what: &str) {
    if unsafe { CloseHandle(handle) } == 0 {
        #[cfg(feature = "log")]
        log::warn!(
            "CloseHandle on {} failed with error: {}",
            _what,
            unsafe { GetLastError() }
        );
    }
}

impl Drop for RawFile {
    fn drop(&mut self) {
        close_handle(self.handle, "file");
    }
}

impl Drop for RawSection {
    fn drop(&mut self) {
        close_handle(self.handle, "section");
    }
}

impl Mmap for DefaultMmap {
    type File = RawFile;
    type Section = RawSection;

    fn open(path: &str) -> Result<RawFile> {
        if path.contains('\0') {
            return Err(open_error(format!(
                "[{path}] contains an interior nul byte"
            )));
        }
        let mut wide_path = Vec::<u16>::with_capacity(path.len() + 1);
        wide_path.extend(path.encode_utf16());
        wide_path.push(0);

        let handle = unsafe {
            CreateFileW(
                wide_path.as_ptr(),
                GENERIC_READ,
                FILE_SHARE_READ,
                null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            let err_code = unsafe { GetLastError() };
            return Err(open_error(format!(
                "CreateFileW [{path}] failed with error: {err_code}"
            )));
        }
        Ok(RawFile { handle })
    }

    fn file_size(file: &RawFile) -> Result<u64> {
        let mut size = 0i64;
        if unsafe { GetFileSizeEx(file.handle, &mut size) } == 0 {
            let err_code = unsafe { GetLastError() };
            return Err(metadata_error(format!(
                "GetFileSizeEx failed with error: {err_code}"
            )));
        }
        u64::try_from(size).map_err(|_| metadata_error(format!("negative file size {size}")))
    }

    unsafe fn mmap(file: &RawFile, len: usize) -> Result<(NonNull<u8>, RawSection)> {
        // A maximum size of zero makes the section cover the whole file.
        let handle = unsafe {
            CreateFileMappingW(
                file.handle,
                null(),
                PAGE_READONLY | SEC_COMMIT,
                0,
                0,
                null(),
            )
        };
        if handle.is_null() {
            let err_code = unsafe { GetLastError() };
            return Err(section_error(format!(
                "CreateFileMappingW failed with error: {err_code}"
            )));
        }
        // Closed by drop if the view cannot be mapped.
        let section = RawSection { handle };

        let view = unsafe { MapViewOfFile(section.handle, FILE_MAP_READ, 0, 0, len) };
        let Some(ptr) = NonNull::new(view.Value.cast::<u8>()) else {
            let err_code = unsafe { GetLastError() };
            return Err(mmap_error(format!(
                "MapViewOfFile of {len} bytes failed with error: {err_code}"
            )));
        };

        Ok((ptr, section))
    }

    unsafe fn munmap(addr: NonNull<u8>, _len: usize) -> Result<()> {
        let view = MEMORY_MAPPED_VIEW_ADDRESS {
            Value: addr.as_ptr().cast(),
        };
        if unsafe { UnmapViewOfFile(view) } == 0 {
            let err_code = unsafe { GetLastError() };
            return Err(mmap_error(format!(
                "UnmapViewOfFile failed with error: {err_code}"
            )));
        }
        Ok(())
    }

    fn page_size() -> usize {
        let mut sys_info = MaybeUninit::uninit();
        unsafe {
            GetSystemInfo(sys_info.as_mut_ptr());
            sys_info.assume_init().dwPageSize as usize
        }
    }
}
