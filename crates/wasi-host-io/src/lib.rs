//! Host-side WASI file descriptors and their readiness.
//!
//! A [`WasiCtx`] owns the descriptors a guest can see: stdin, stdout and
//! stderr at 0, 1 and 2, plus files opened from preopened directories. Every
//! descriptor answers the same readiness question used to implement
//! `poll_oneoff` for `fd_read` and `fd_write` subscriptions:
//!
//! ```text
//! poll(flag, timeout_millis) -> Result<bool, Errno>
//! ```
//!
//! How it is answered depends on what backs the descriptor:
//!
//! * a resource implementing [`Pollable`] is asked directly;
//! * a plain reader or writer gets a fixed answer for its role (see
//!   [`StdinFile`] and [`StdioWriterFile`]);
//! * a host descriptor goes through the platform's readiness facility:
//!   `poll(2)` on Linux, Android and Apple targets, `WSAPoll` and named-pipe
//!   peeking on Windows. Other targets have no backend and report
//!   [`Errno::Nosys`].
//!
//! ```
//! use wasi_host_io::{Errno, Pflag, WasiCtxBuilder};
//!
//! let ctx = WasiCtxBuilder::new().build();
//! assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(true));
//! assert_eq!(ctx.poll(0, Pflag::POLLOUT, 0), Err(Errno::Notsup));
//! assert_eq!(ctx.poll(1, Pflag::POLLOUT, 0), Ok(true));
//! ```

mod ctx;
pub mod dir;
mod errno;
mod file;
mod osfile;
mod poll;
pub mod stdio;
mod sys;
mod table;

pub use cap_std::ambient_authority;
pub use cap_std::fs::Dir;
pub use ctx::{WasiCtx, WasiCtxBuilder};
pub use dir::{OFlags, Preopen};
pub use errno::Errno;
pub use file::{FdFlags, File, FileEntry, FileKind, FileType, Filestat};
pub use osfile::OsFile;
pub use poll::{Pflag, Pollable};
pub use stdio::{OsStdin, OsStdout, StdinFile, StdioWriterFile};
pub use sys::AsDescriptor;
pub use table::FdTable;
