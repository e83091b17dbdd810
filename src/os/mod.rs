cfg_if::cfg_if! {
    if #[cfg(windows)]{
        pub(crate) mod windows;
        pub use windows::*;
    }else if #[cfg(all(feature = "use-syscall", target_os = "linux", target_pointer_width = "64"))]{
        pub(crate) mod linux_syscall;
        pub use linux_syscall::*;
    }else if #[cfg(unix)]{
        pub(crate) mod unix;
        pub use unix::*;
    }else {
        compile_error!("gguf_mmap supports unix and windows targets only");
    }
}
