use crate::dir::OFlags;
use crate::stdio::{OsStdin, OsStdout, StdinFile, StdioWriterFile};
use crate::sys::AsDescriptor;
use crate::{Errno, FdFlags, FdTable, File, FileEntry, FileKind, Pflag, Pollable, Preopen};
use std::io::{IsTerminal, Read, Write};
use std::mem;
use std::path::Path;

/// The host side of a guest's file descriptors: stdio at 0, 1 and 2, files
/// opened since, and the directories files may be opened from.
#[derive(Debug)]
pub struct WasiCtx {
    table: FdTable,
    preopens: Vec<Preopen>,
}

impl WasiCtx {
    pub fn builder() -> WasiCtxBuilder {
        WasiCtxBuilder::new()
    }

    pub fn table(&self) -> &FdTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FdTable {
        &mut self.table
    }

    pub fn preopens(&self) -> &[Preopen] {
        &self.preopens
    }

    /// Opens `path` inside the preopened directory mounted at `guest_dir`
    /// and returns the new descriptor.
    pub fn open_file(
        &mut self,
        guest_dir: impl AsRef<Path>,
        path: &str,
        oflags: OFlags,
        read: bool,
        write: bool,
        fdflags: FdFlags,
    ) -> Result<u32, Errno> {
        let guest_dir = guest_dir.as_ref();
        let preopen = self
            .preopens
            .iter()
            .find(|p| p.guest_path() == guest_dir)
            .ok_or(Errno::Noent)?;
        let entry = preopen.open_file(path, oflags, read, write, fdflags)?;
        self.table.push(entry)
    }

    pub fn read(&mut self, fd: u32, buf: &mut [u8]) -> Result<usize, Errno> {
        self.table.get_mut(fd)?.read(buf)
    }

    pub fn write(&mut self, fd: u32, buf: &[u8]) -> Result<usize, Errno> {
        self.table.get_mut(fd)?.write(buf)
    }

    pub fn poll(&self, fd: u32, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        self.table.poll(fd, flag, timeout_millis)
    }

    pub fn close(&mut self, fd: u32) -> Result<(), Errno> {
        self.table.close(fd)
    }
}

/// Configures the stdio and preopened directories of a [`WasiCtx`].
///
/// Stdio which isn't configured gets a stand-in: stdin reads as empty and
/// anything written to stdout or stderr is discarded.
///
/// ```
/// use wasi_host_io::{Pflag, WasiCtxBuilder};
///
/// let ctx = WasiCtxBuilder::new()
///     .stdin(std::io::Cursor::new("input"))
///     .stdout(Vec::new())
///     .build();
/// assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(true));
/// ```
pub struct WasiCtxBuilder {
    stdin: Option<Box<dyn File>>,
    stdout: Option<Box<dyn File>>,
    stderr: Option<Box<dyn File>>,
    preopens: Vec<Preopen>,
    built: bool,
}

impl WasiCtxBuilder {
    pub fn new() -> Self {
        WasiCtxBuilder {
            stdin: None,
            stdout: None,
            stderr: None,
            preopens: Vec::new(),
            built: false,
        }
    }

    pub fn stdin(&mut self, reader: impl Read + Send + 'static) -> &mut Self {
        self.stdin = Some(Box::new(StdinFile::new(reader)));
        self
    }
    pub fn stdin_pollable(&mut self, reader: impl Read + Pollable + Send + 'static) -> &mut Self {
        self.stdin = Some(Box::new(StdinFile::pollable(reader)));
        self
    }
    pub fn stdin_os(
        &mut self,
        handle: impl Read + AsDescriptor + IsTerminal + Send + 'static,
    ) -> &mut Self {
        self.stdin = Some(Box::new(OsStdin::new(handle)));
        self
    }
    pub fn stdout(&mut self, writer: impl Write + Send + 'static) -> &mut Self {
        self.stdout = Some(Box::new(StdioWriterFile::new(writer)));
        self
    }
    pub fn stdout_pollable(&mut self, writer: impl Write + Pollable + Send + 'static) -> &mut Self {
        self.stdout = Some(Box::new(StdioWriterFile::pollable(writer)));
        self
    }
    pub fn stdout_os(
        &mut self,
        handle: impl Write + AsDescriptor + IsTerminal + Send + 'static,
    ) -> &mut Self {
        self.stdout = Some(Box::new(OsStdout::new(handle)));
        self
    }
    pub fn stderr(&mut self, writer: impl Write + Send + 'static) -> &mut Self {
        self.stderr = Some(Box::new(StdioWriterFile::new(writer)));
        self
    }
    pub fn stderr_pollable(&mut self, writer: impl Write + Pollable + Send + 'static) -> &mut Self {
        self.stderr = Some(Box::new(StdioWriterFile::pollable(writer)));
        self
    }
    pub fn stderr_os(
        &mut self,
        handle: impl Write + AsDescriptor + IsTerminal + Send + 'static,
    ) -> &mut Self {
        self.stderr = Some(Box::new(OsStdout::new(handle)));
        self
    }
    pub fn inherit_stdin(&mut self) -> &mut Self {
        self.stdin = Some(Box::new(OsStdin::inherit()));
        self
    }
    pub fn inherit_stdout(&mut self) -> &mut Self {
        self.stdout = Some(Box::new(OsStdout::inherit()));
        self
    }
    pub fn inherit_stderr(&mut self) -> &mut Self {
        self.stderr = Some(Box::new(OsStdout::inherit_stderr()));
        self
    }
    pub fn inherit_stdio(&mut self) -> &mut Self {
        self.inherit_stdin().inherit_stdout().inherit_stderr()
    }
    pub fn preopened_dir(
        &mut self,
        dir: cap_std::fs::Dir,
        guest_path: impl AsRef<Path>,
    ) -> &mut Self {
        self.preopens.push(Preopen::new(dir, guest_path));
        self
    }

    pub fn build(&mut self) -> WasiCtx {
        assert!(!self.built);
        let WasiCtxBuilder {
            stdin,
            stdout,
            stderr,
            preopens,
            ..
        } = mem::replace(self, Self::new());
        self.built = true;

        let mut table = FdTable::new();
        let stdin = stdin.unwrap_or_else(|| Box::new(StdinFile::empty()));
        let stdout = stdout.unwrap_or_else(|| Box::new(StdioWriterFile::discard()));
        let stderr = stderr.unwrap_or_else(|| Box::new(StdioWriterFile::discard()));
        for (fd, kind, file) in [
            (0, FileKind::Stdin, stdin),
            (1, FileKind::Stdout, stdout),
            (2, FileKind::Stderr, stderr),
        ] {
            table.insert_at(fd, FileEntry::new(kind.name(), kind, file));
        }
        WasiCtx { table, preopens }
    }
}

impl Default for WasiCtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::FileType;

    #[test_log::test]
    fn defaults_are_noop() {
        let mut ctx = WasiCtxBuilder::new().build();
        assert_eq!(ctx.read(0, &mut [0; 5]), Ok(0));
        assert_eq!(ctx.write(1, b"hello"), Ok(5));
        assert_eq!(ctx.write(2, b"hello"), Ok(5));
        assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(true));
        assert_eq!(ctx.poll(1, Pflag::POLLOUT, 0), Ok(true));
        assert_eq!(ctx.poll(2, Pflag::POLLIN, 0), Err(Errno::Notsup));
        assert_eq!(ctx.poll(3, Pflag::POLLIN, 0), Err(Errno::Badf));

        for (fd, name) in [(0, "stdin"), (1, "stdout"), (2, "stderr")] {
            let entry = ctx.table().get(fd).unwrap();
            assert_eq!(entry.name(), name);
            let stat = entry.stat().unwrap();
            assert_eq!(stat.filetype, FileType::CharacterDevice);
            assert_eq!(stat.nlink, 1);
        }
    }

    #[test]
    #[should_panic]
    fn build_twice_panics() {
        let mut builder = WasiCtxBuilder::new();
        builder.build();
        builder.build();
    }
}
