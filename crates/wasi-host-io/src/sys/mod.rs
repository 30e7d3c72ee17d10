//! Host readiness backends.
//!
//! Exactly one backend is compiled in, chosen by target: `poll(2)` on Linux,
//! Android and Apple platforms, `WSAPoll`/named-pipe peeking on Windows, and
//! a stub answering [`Errno::Nosys`](crate::Errno::Nosys) everywhere else.
//! All of them expose the same `poll` function, so callers never special-case
//! a missing backend.

use crate::FileType;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Anything a backend can borrow a host descriptor from.
        pub trait AsDescriptor: std::os::fd::AsFd {}
        impl<T: std::os::fd::AsFd + ?Sized> AsDescriptor for T {}
    } else if #[cfg(windows)] {
        /// Anything a backend can borrow a host descriptor from.
        pub trait AsDescriptor: io_extras::os::windows::AsRawHandleOrSocket {}
        impl<T: io_extras::os::windows::AsRawHandleOrSocket + ?Sized> AsDescriptor for T {}
    } else {
        /// Anything a backend can borrow a host descriptor from.
        pub trait AsDescriptor {}
        impl<T: ?Sized> AsDescriptor for T {}
    }
}

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))] {
        mod unix;
        pub(crate) use unix::poll;
    } else if #[cfg(windows)] {
        mod windows;
        pub(crate) use windows::poll;
    } else {
        mod unsupported;
        pub(crate) use unsupported::poll;
    }
}

// The stub is also built for tests so its contract is checked on every host.
#[cfg(all(test, any(target_os = "linux", target_os = "android", target_vendor = "apple", windows)))]
mod unsupported;

/// The type of file behind a host descriptor, as far as the host can tell.
#[cfg(unix)]
pub(crate) fn filetype<T: AsDescriptor + ?Sized>(descriptor: &T) -> FileType {
    use rustix::fs::FileType as F;
    let stat = match rustix::fs::fstat(descriptor.as_fd()) {
        Ok(stat) => stat,
        Err(e) => {
            tracing::debug!("fstat failed, reporting unknown file type: {e}");
            return FileType::Unknown;
        }
    };
    match F::from_raw_mode(stat.st_mode) {
        F::RegularFile => FileType::RegularFile,
        F::Directory => FileType::Directory,
        F::Symlink => FileType::SymbolicLink,
        F::Fifo => FileType::Pipe,
        F::Socket => FileType::SocketStream,
        F::CharacterDevice => FileType::CharacterDevice,
        F::BlockDevice => FileType::BlockDevice,
        F::Unknown => FileType::Unknown,
    }
}

#[cfg(windows)]
pub(crate) fn filetype<T: AsDescriptor + ?Sized>(descriptor: &T) -> FileType {
    windows::filetype(descriptor)
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn filetype<T: AsDescriptor + ?Sized>(_descriptor: &T) -> FileType {
    FileType::Unknown
}
