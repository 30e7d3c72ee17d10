use thiserror::Error;

/// Error codes shared by every host I/O operation exposed to a guest.
///
/// Discriminants are the WASI preview1 `$errno` values, so a code can be
/// written to guest memory as-is with [`Errno::raw`]. Success is not a
/// variant: it is the `Ok` side of a `Result<_, Errno>` and is encoded on the
/// wire as [`Errno::SUCCESS`]. Use [`Errno::code_of`] to get the wire value of
/// any result.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Errno {
    /// Errno::Acces: Permission denied
    #[error("Acces: Permission denied")]
    Acces = 2,
    /// Errno::Again: Resource unavailable, or operation would block
    #[error("Again: Resource unavailable, or operation would block")]
    Again = 6,
    /// Errno::Badf: Bad file descriptor
    #[error("Badf: Bad file descriptor")]
    Badf = 8,
    /// Errno::Exist: File exists
    #[error("Exist: File exists")]
    Exist = 20,
    /// Errno::Fault: Bad address
    #[error("Fault: Bad address")]
    Fault = 21,
    /// Errno::Intr: Interrupted function
    #[error("Intr: Interrupted function")]
    Intr = 27,
    /// Errno::Inval: Invalid argument
    #[error("Inval: Invalid argument")]
    Inval = 28,
    /// Errno::Io: I/O error
    #[error("Io: I/O error")]
    Io = 29,
    /// Errno::Isdir: Is a directory
    #[error("Isdir: Is a directory")]
    Isdir = 31,
    /// Errno::Loop: Too many levels of symbolic links
    #[error("Loop: Too many levels of symbolic links")]
    Loop = 32,
    /// Errno::Nametoolong: Filename too long
    #[error("Nametoolong: Filename too long")]
    Nametoolong = 37,
    /// Errno::Noent: No such file or directory
    #[error("Noent: No such file or directory")]
    Noent = 44,
    /// Errno::Nosys: Function not supported
    #[error("Nosys: Function not supported")]
    Nosys = 52,
    /// Errno::Notdir: Not a directory
    #[error("Notdir: Not a directory")]
    Notdir = 54,
    /// Errno::Notempty: Directory not empty
    #[error("Notempty: Directory not empty")]
    Notempty = 55,
    /// Errno::Notsock: Not a socket
    #[error("Notsock: Not a socket")]
    Notsock = 57,
    /// Errno::Notsup: Not supported, or operation not supported on socket
    #[error("Notsup: Not supported, or operation not supported on socket")]
    Notsup = 58,
    /// Errno::Overflow: Value too large to be stored in data type
    #[error("Overflow: Value too large to be stored in data type")]
    Overflow = 61,
    /// Errno::Perm: Operation not permitted
    #[error("Perm: Operation not permitted")]
    Perm = 63,
    /// Errno::Pipe: Broken pipe
    #[error("Pipe: Broken pipe")]
    Pipe = 64,
    /// Errno::Range: Result too large
    #[error("Range: Result too large")]
    Range = 68,
    /// Errno::Rofs: Read-only file system
    #[error("Rofs: Read-only file system")]
    Rofs = 69,
    /// Errno::Spipe: Invalid seek
    #[error("Spipe: Invalid seek")]
    Spipe = 70,
    /// Errno::Timedout: Connection timed out
    #[error("Timedout: Connection timed out")]
    Timedout = 73,
}

impl Errno {
    /// The wire value of a successful operation.
    pub const SUCCESS: u16 = 0;

    const ALL: [Errno; 24] = [
        Errno::Acces,
        Errno::Again,
        Errno::Badf,
        Errno::Exist,
        Errno::Fault,
        Errno::Intr,
        Errno::Inval,
        Errno::Io,
        Errno::Isdir,
        Errno::Loop,
        Errno::Nametoolong,
        Errno::Noent,
        Errno::Nosys,
        Errno::Notdir,
        Errno::Notempty,
        Errno::Notsock,
        Errno::Notsup,
        Errno::Overflow,
        Errno::Perm,
        Errno::Pipe,
        Errno::Range,
        Errno::Rofs,
        Errno::Spipe,
        Errno::Timedout,
    ];

    /// The numeric code of this error, never zero.
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Looks up the error with the given numeric code. Returns `None` for
    /// [`Errno::SUCCESS`] and for codes outside this vocabulary.
    pub fn from_raw(raw: u16) -> Option<Errno> {
        Self::ALL.iter().copied().find(|e| e.raw() == raw)
    }

    /// The wire value of `result`: [`Errno::SUCCESS`] for `Ok`, otherwise the
    /// code of the error.
    pub fn code_of<T>(result: &Result<T, Errno>) -> u16 {
        match result {
            Ok(_) => Self::SUCCESS,
            Err(e) => e.raw(),
        }
    }
}

impl From<std::num::TryFromIntError> for Errno {
    fn from(_: std::num::TryFromIntError) -> Errno {
        Errno::Overflow
    }
}

impl From<std::io::Error> for Errno {
    fn from(err: std::io::Error) -> Errno {
        #[cfg(unix)]
        if let Some(raw) = err.raw_os_error() {
            return rustix::io::Errno::from_raw_os_error(raw).into();
        }

        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => Errno::Noent,
            ErrorKind::PermissionDenied => Errno::Perm,
            ErrorKind::AlreadyExists => Errno::Exist,
            ErrorKind::WouldBlock => Errno::Again,
            ErrorKind::InvalidInput => Errno::Inval,
            ErrorKind::Interrupted => Errno::Intr,
            ErrorKind::Unsupported => Errno::Notsup,
            ErrorKind::BrokenPipe => Errno::Pipe,
            ErrorKind::TimedOut => Errno::Timedout,
            ErrorKind::IsADirectory => Errno::Isdir,
            ErrorKind::NotADirectory => Errno::Notdir,
            ErrorKind::DirectoryNotEmpty => Errno::Notempty,
            ErrorKind::ReadOnlyFilesystem => Errno::Rofs,
            ErrorKind::InvalidFilename => Errno::Nametoolong,
            kind => {
                tracing::debug!("mapping io::Error of kind {kind:?} to Io");
                Errno::Io
            }
        }
    }
}

#[cfg(unix)]
impl From<rustix::io::Errno> for Errno {
    fn from(errno: rustix::io::Errno) -> Errno {
        use rustix::io::Errno as E;
        match errno {
            E::ACCESS => Errno::Acces,
            E::AGAIN => Errno::Again,
            E::BADF => Errno::Badf,
            E::EXIST => Errno::Exist,
            E::FAULT => Errno::Fault,
            E::INTR => Errno::Intr,
            E::INVAL => Errno::Inval,
            E::IO => Errno::Io,
            E::ISDIR => Errno::Isdir,
            E::LOOP => Errno::Loop,
            E::NAMETOOLONG => Errno::Nametoolong,
            E::NOENT => Errno::Noent,
            E::NOSYS => Errno::Nosys,
            E::NOTDIR => Errno::Notdir,
            E::NOTEMPTY => Errno::Notempty,
            E::NOTSOCK => Errno::Notsock,
            E::NOTSUP => Errno::Notsup,
            E::OVERFLOW => Errno::Overflow,
            E::PERM => Errno::Perm,
            E::PIPE => Errno::Pipe,
            E::RANGE => Errno::Range,
            E::ROFS => Errno::Rofs,
            E::SPIPE => Errno::Spipe,
            E::TIMEDOUT => Errno::Timedout,
            other => {
                tracing::warn!("Unknown errno from the host: {other}");
                Errno::Io
            }
        }
    }
}
