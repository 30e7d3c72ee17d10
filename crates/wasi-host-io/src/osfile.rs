use crate::{Errno, FdFlags, File, FileType, Filestat, Pflag};
use std::io::{Read, Write};

/// A host file opened for the guest, typically through a [`Preopen`].
///
/// Readiness is answered by the native backend, which reports regular files
/// as always ready.
///
/// [`Preopen`]: crate::Preopen
pub struct OsFile {
    file: Option<std::fs::File>,
    fdflags: FdFlags,
}

impl OsFile {
    pub fn new(file: std::fs::File) -> Self {
        OsFile {
            file: Some(file),
            fdflags: FdFlags::empty(),
        }
    }

    pub fn from_cap_std(file: cap_std::fs::File) -> Self {
        Self::new(file.into_std())
    }

    pub(crate) fn with_fdflags(mut self, fdflags: FdFlags) -> Self {
        self.fdflags = fdflags;
        self
    }

    fn file(&self) -> Result<&std::fs::File, Errno> {
        self.file.as_ref().ok_or(Errno::Badf)
    }
}

impl File for OsFile {
    fn stat(&self) -> Result<Filestat, Errno> {
        let meta = self.file()?.metadata()?;
        Ok(Filestat {
            device_id: device_id(&meta),
            inode: inode(&meta),
            filetype: filetype_from(&meta.file_type()),
            nlink: nlink(&meta),
            size: meta.len(),
            atim: meta.accessed().ok(),
            mtim: meta.modified().ok(),
            ctim: meta.created().ok(),
        })
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        let mut file = self.file()?;
        Ok(file.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Errno> {
        let mut file = self.file()?;
        Ok(file.write(buf)?)
    }

    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        crate::sys::poll(self.file()?, flag, timeout_millis)
    }

    fn fdflags(&self) -> FdFlags {
        self.fdflags
    }

    fn close(&mut self) -> Result<(), Errno> {
        self.file = None;
        Ok(())
    }
}

fn filetype_from(ft: &std::fs::FileType) -> FileType {
    if ft.is_dir() {
        return FileType::Directory;
    }
    if ft.is_symlink() {
        return FileType::SymbolicLink;
    }
    if ft.is_file() {
        return FileType::RegularFile;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if ft.is_block_device() {
            return FileType::BlockDevice;
        }
        if ft.is_char_device() {
            return FileType::CharacterDevice;
        }
        if ft.is_fifo() {
            return FileType::Pipe;
        }
        if ft.is_socket() {
            return FileType::SocketStream;
        }
    }
    FileType::Unknown
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        use std::os::unix::fs::MetadataExt;

        fn device_id(meta: &std::fs::Metadata) -> u64 {
            meta.dev()
        }
        fn inode(meta: &std::fs::Metadata) -> u64 {
            meta.ino()
        }
        fn nlink(meta: &std::fs::Metadata) -> u64 {
            meta.nlink()
        }
    } else {
        fn device_id(_meta: &std::fs::Metadata) -> u64 {
            0
        }
        fn inode(_meta: &std::fs::Metadata) -> u64 {
            0
        }
        fn nlink(_meta: &std::fs::Metadata) -> u64 {
            1
        }
    }
}
