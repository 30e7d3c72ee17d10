use crate::{Errno, Pflag};
use bitflags::bitflags;

/// A host resource attached to a guest file descriptor.
///
/// Every method has a default which fails the way WASI expects for a
/// descriptor lacking that ability, so implementations only override what
/// they support. `poll` is the exception: each implementation decides how
/// readiness is answered for its resource.
pub trait File: Send {
    fn stat(&self) -> Result<Filestat, Errno>;

    /// Reports whether the events in `flag` are ready, waiting at most
    /// `timeout_millis` (zero returns immediately, negative waits forever).
    /// See [`Pollable`](crate::Pollable) for the meaning of the results.
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno>;

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Errno> {
        Err(Errno::Badf)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize, Errno> {
        Err(Errno::Badf)
    }

    fn fdflags(&self) -> FdFlags {
        FdFlags::empty()
    }

    fn is_terminal(&self) -> bool {
        false
    }

    /// Releases the resource. Reads and writes after a close fail with
    /// [`Errno::Badf`].
    fn close(&mut self) -> Result<(), Errno> {
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    BlockDevice,
    CharacterDevice,
    Directory,
    RegularFile,
    SocketDgram,
    SocketStream,
    SymbolicLink,
    Pipe,
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct FdFlags: u32 {
        const APPEND   = 0b1;
        const DSYNC    = 0b10;
        const NONBLOCK = 0b100;
        const RSYNC    = 0b1000;
        const SYNC     = 0b10000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filestat {
    pub device_id: u64,
    pub inode: u64,
    pub filetype: FileType,
    pub nlink: u64,
    pub size: u64,
    pub atim: Option<std::time::SystemTime>,
    pub mtim: Option<std::time::SystemTime>,
    pub ctim: Option<std::time::SystemTime>,
}

impl Filestat {
    /// Stat for a stream which isn't a real file: one link, no size, and
    /// zero timestamps. Guests such as wasi-testsuite's `fd_filestat_get`
    /// expect exactly this shape for stdio.
    pub fn stream(filetype: FileType) -> Filestat {
        Filestat {
            device_id: 0,
            inode: 0,
            filetype,
            nlink: 1,
            size: 0,
            atim: None,
            mtim: None,
            ctim: None,
        }
    }
}

/// Which slot of the guest's descriptor space an entry fills.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileKind {
    Stdin,
    Stdout,
    Stderr,
    Regular,
}

impl FileKind {
    pub fn name(self) -> &'static str {
        match self {
            FileKind::Stdin => "stdin",
            FileKind::Stdout => "stdout",
            FileKind::Stderr => "stderr",
            FileKind::Regular => "file",
        }
    }
}

/// A guest file descriptor: the host resource behind it plus what the table
/// knows about it.
///
/// The entry owns the resource. Closing the entry closes the resource, and an
/// entry dropped without an explicit close is closed on drop.
pub struct FileEntry {
    name: String,
    kind: FileKind,
    file: Box<dyn File>,
    closed: bool,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, kind: FileKind, file: Box<dyn File>) -> Self {
        FileEntry {
            name: name.into(),
            kind,
            file,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn file(&self) -> &dyn File {
        &*self.file
    }

    pub fn file_mut(&mut self) -> &mut dyn File {
        &mut *self.file
    }

    pub fn stat(&self) -> Result<Filestat, Errno> {
        if self.closed {
            return Err(Errno::Badf);
        }
        self.file.stat()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        if self.closed {
            return Err(Errno::Badf);
        }
        self.file.read(buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        if self.closed {
            return Err(Errno::Badf);
        }
        self.file.write(buf)
    }

    pub fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        if self.closed {
            return Err(Errno::Badf);
        }
        let result = self.file.poll(flag, timeout_millis);
        tracing::trace!(
            name = %self.name,
            flag = tracing::field::debug(flag),
            timeout_millis,
            result = tracing::field::debug(&result),
            "poll"
        );
        result
    }

    pub fn close(&mut self) -> Result<(), Errno> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.file.close()
    }
}

impl Drop for FileEntry {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::debug!(name = %self.name, "error closing file on drop: {e}");
        }
    }
}

impl std::fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
