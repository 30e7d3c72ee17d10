use crate::{Errno, FdFlags, FileEntry, FileKind, OsFile};
use bitflags::bitflags;
use std::path::{Path, PathBuf};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct OFlags: u32 {
        const CREATE    = 0b1;
        const DIRECTORY = 0b10;
        const EXCLUSIVE = 0b100;
        const TRUNCATE  = 0b1000;
    }
}

/// A host directory made available to the guest under `guest_path`.
///
/// Files are opened relative to the directory through `cap-std`, so paths
/// which escape it (`..`, absolute paths, symlinks pointing outside) fail
/// instead of reaching the rest of the host filesystem.
pub struct Preopen {
    dir: cap_std::fs::Dir,
    guest_path: PathBuf,
}

impl Preopen {
    pub fn new(dir: cap_std::fs::Dir, guest_path: impl AsRef<Path>) -> Self {
        Preopen {
            dir,
            guest_path: guest_path.as_ref().to_owned(),
        }
    }

    pub fn guest_path(&self) -> &Path {
        &self.guest_path
    }

    /// Opens `path` and wraps it for the guest. The returned entry is named
    /// after the path as the guest sees it.
    pub fn open_file(
        &self,
        path: &str,
        oflags: OFlags,
        read: bool,
        write: bool,
        fdflags: FdFlags,
    ) -> Result<FileEntry, Errno> {
        if oflags.contains(OFlags::DIRECTORY) {
            return Err(Errno::Notsup);
        }
        if fdflags.intersects(FdFlags::DSYNC | FdFlags::SYNC | FdFlags::RSYNC) {
            return Err(Errno::Notsup);
        }

        let mut opts = cap_std::fs::OpenOptions::new();
        if oflags.contains(OFlags::CREATE | OFlags::EXCLUSIVE) {
            opts.create_new(true);
            opts.write(true);
        } else if oflags.contains(OFlags::CREATE) {
            opts.create(true);
            opts.write(true);
        }
        if oflags.contains(OFlags::TRUNCATE) {
            opts.truncate(true);
        }
        if write {
            opts.write(true);
        }
        // Something has to be requested for the host to open the file.
        if read || !write {
            opts.read(true);
        }
        if fdflags.contains(FdFlags::APPEND) {
            opts.append(true);
        }

        let file = self.dir.open_with(path, &opts)?;
        tracing::debug!(guest_path = %self.guest_path.display(), path, "opened file");
        let file = OsFile::from_cap_std(file).with_fdflags(fdflags & FdFlags::APPEND);
        let name = format!("{}/{path}", self.guest_path.display());
        Ok(FileEntry::new(name, FileKind::Regular, Box::new(file)))
    }
}

impl std::fmt::Debug for Preopen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preopen")
            .field("guest_path", &self.guest_path)
            .finish_non_exhaustive()
    }
}
