//! Files backing a guest's stdin, stdout and stderr.
//!
//! Standard streams come in two flavors:
//!
//! * Streams supplied by the embedder as plain Rust readers and writers
//!   ([`StdinFile`], [`StdioWriterFile`]). Most of these can't say whether a
//!   read or write would block, so unless they were attached with the
//!   [`Pollable`] capability they get a fixed answer per role: readers are
//!   always ready to read, writers are always ready to write, and asking a
//!   reader about writes (or a writer about reads) is [`Errno::Notsup`].
//! * Host descriptors such as the process's own stdio or a file redirected
//!   to it ([`OsStdin`], [`OsStdout`]), which are asked through the native
//!   readiness backend.

use crate::sys::{self, AsDescriptor};
use crate::{Errno, FdFlags, File, FileType, Filestat, Pflag, Pollable};
use std::io::{self, IsTerminal, Read, Write};

trait PollableRead: Read + Pollable + Send {}
impl<T: Read + Pollable + Send> PollableRead for T {}

trait PollableWrite: Write + Pollable + Send {}
impl<T: Write + Pollable + Send> PollableWrite for T {}

/// How a stream answers `poll`, decided once when it is attached.
enum Reader {
    Pollable(Box<dyn PollableRead>),
    Plain(Box<dyn Read + Send>),
}

enum Writer {
    Pollable(Box<dyn PollableWrite>),
    Plain(Box<dyn Write + Send>),
}

/// Readiness of a reader which can't tell. Input is reported ready and the
/// next read finds out whether there is any.
fn reader_default(flag: Pflag) -> Result<bool, Errno> {
    if flag == Pflag::POLLIN {
        Ok(true)
    } else {
        Err(Errno::Notsup)
    }
}

/// Readiness of a writer which can't tell. Writes to terminals, files and
/// sinks don't block in a way the host can observe.
fn writer_default(flag: Pflag) -> Result<bool, Errno> {
    if flag == Pflag::POLLOUT {
        Ok(true)
    } else {
        Err(Errno::Notsup)
    }
}

/// A guest's stdin backed by an embedder-supplied reader.
///
/// ```
/// use wasi_host_io::{File, Pflag, StdinFile};
///
/// let stdin = StdinFile::new(std::io::Cursor::new("hello from stdin!"));
/// assert_eq!(stdin.poll(Pflag::POLLIN, 0), Ok(true));
/// ```
pub struct StdinFile {
    reader: Reader,
}

impl StdinFile {
    /// A stdin which can't report readiness: polling for input always
    /// succeeds immediately.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        StdinFile {
            reader: Reader::Plain(Box::new(reader)),
        }
    }

    /// A stdin which answers readiness queries itself. Every `poll` is
    /// forwarded to `reader` and its result returned unchanged.
    pub fn pollable(reader: impl Read + Pollable + Send + 'static) -> Self {
        StdinFile {
            reader: Reader::Pollable(Box::new(reader)),
        }
    }

    /// A stdin with nothing to read. Reads return zero bytes, like reading
    /// at end-of-file.
    pub fn empty() -> Self {
        Self::new(io::empty())
    }
}

impl File for StdinFile {
    fn stat(&self) -> Result<Filestat, Errno> {
        Ok(Filestat::stream(FileType::CharacterDevice))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        let n = match &mut self.reader {
            Reader::Pollable(r) => r.read(buf)?,
            Reader::Plain(r) => r.read(buf)?,
        };
        Ok(n)
    }

    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        match &self.reader {
            Reader::Pollable(r) => r.poll(flag, timeout_millis),
            Reader::Plain(_) => reader_default(flag),
        }
    }

    fn close(&mut self) -> Result<(), Errno> {
        self.reader = Reader::Plain(Box::new(io::empty()));
        Ok(())
    }
}

/// A guest's stdout or stderr backed by an embedder-supplied writer.
pub struct StdioWriterFile {
    writer: Writer,
}

impl StdioWriterFile {
    /// A writer which can't report readiness: polling for output always
    /// succeeds immediately.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        StdioWriterFile {
            writer: Writer::Plain(Box::new(writer)),
        }
    }

    /// A writer which answers readiness queries itself. Every `poll` is
    /// forwarded to `writer` and its result returned unchanged.
    pub fn pollable(writer: impl Write + Pollable + Send + 'static) -> Self {
        StdioWriterFile {
            writer: Writer::Pollable(Box::new(writer)),
        }
    }

    /// A writer which accepts and discards everything. Writes report the
    /// full length as written so guests never loop retrying them.
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    fn flush(&mut self) -> Result<(), Errno> {
        match &mut self.writer {
            Writer::Pollable(w) => w.flush()?,
            Writer::Plain(w) => w.flush()?,
        }
        Ok(())
    }
}

impl File for StdioWriterFile {
    fn stat(&self) -> Result<Filestat, Errno> {
        Ok(Filestat::stream(FileType::CharacterDevice))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        let n = match &mut self.writer {
            Writer::Pollable(w) => w.write(buf)?,
            Writer::Plain(w) => w.write(buf)?,
        };
        Ok(n)
    }

    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        match &self.writer {
            Writer::Pollable(w) => w.poll(flag, timeout_millis),
            Writer::Plain(_) => writer_default(flag),
        }
    }

    fn fdflags(&self) -> FdFlags {
        FdFlags::APPEND
    }

    fn close(&mut self) -> Result<(), Errno> {
        let flushed = self.flush();
        self.writer = Writer::Plain(Box::new(io::sink()));
        flushed
    }
}

/// A guest's stdin backed by a host descriptor: the process's own stdin, or
/// a file or pipe opened to stand in for it.
pub struct OsStdin<R = io::Stdin> {
    handle: Option<R>,
    filetype: FileType,
    terminal: bool,
}

impl<R: Read + AsDescriptor + IsTerminal + Send> OsStdin<R> {
    pub fn new(handle: R) -> Self {
        OsStdin {
            filetype: sys::filetype(&handle),
            terminal: handle.is_terminal(),
            handle: Some(handle),
        }
    }
}

impl OsStdin {
    /// The host process's stdin.
    pub fn inherit() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read + AsDescriptor + IsTerminal + Send> File for OsStdin<R> {
    fn stat(&self) -> Result<Filestat, Errno> {
        Ok(Filestat::stream(self.filetype))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        Ok(self.handle.as_mut().ok_or(Errno::Badf)?.read(buf)?)
    }

    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        let handle = self.handle.as_ref().ok_or(Errno::Badf)?;
        sys::poll(handle, flag, timeout_millis)
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn close(&mut self) -> Result<(), Errno> {
        self.handle = None;
        Ok(())
    }
}

/// A guest's stdout or stderr backed by a host descriptor.
pub struct OsStdout<W = io::Stdout> {
    handle: Option<W>,
    filetype: FileType,
    terminal: bool,
}

impl<W: Write + AsDescriptor + IsTerminal + Send> OsStdout<W> {
    pub fn new(handle: W) -> Self {
        OsStdout {
            filetype: sys::filetype(&handle),
            terminal: handle.is_terminal(),
            handle: Some(handle),
        }
    }
}

impl OsStdout {
    /// The host process's stdout.
    pub fn inherit() -> Self {
        Self::new(io::stdout())
    }
}

impl OsStdout<io::Stderr> {
    /// The host process's stderr.
    pub fn inherit_stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + AsDescriptor + IsTerminal + Send> File for OsStdout<W> {
    fn stat(&self) -> Result<Filestat, Errno> {
        Ok(Filestat::stream(self.filetype))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        Ok(self.handle.as_mut().ok_or(Errno::Badf)?.write(buf)?)
    }

    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        let handle = self.handle.as_ref().ok_or(Errno::Badf)?;
        sys::poll(handle, flag, timeout_millis)
    }

    fn fdflags(&self) -> FdFlags {
        FdFlags::APPEND
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn close(&mut self) -> Result<(), Errno> {
        match self.handle.take() {
            Some(mut handle) => Ok(handle.flush()?),
            None => Ok(()),
        }
    }
}
