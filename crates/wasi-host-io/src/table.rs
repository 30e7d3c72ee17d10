use crate::{Errno, FileEntry, Pflag};
use std::collections::HashMap;

/// Maps guest file descriptors to the entries behind them.
///
/// Descriptors 0, 1 and 2 are reserved for stdio; [`FdTable::push`] hands out
/// numbers starting at 3. Dropping the table closes every entry still in it.
#[derive(Debug)]
pub struct FdTable {
    map: HashMap<u32, FileEntry>,
    next_key: u32,
}

impl FdTable {
    /// Create an empty table. New insertions will begin at 3, above stdio.
    pub fn new() -> Self {
        FdTable {
            map: HashMap::new(),
            next_key: 3, // 0, 1 and 2 are reserved for stdio
        }
    }

    /// Insert an entry at a certain descriptor, closing any entry it replaces.
    pub fn insert_at(&mut self, fd: u32, entry: FileEntry) {
        if let Some(mut old) = self.map.insert(fd, entry) {
            if let Err(e) = old.close() {
                tracing::debug!(fd, name = old.name(), "error closing replaced file: {e}");
            }
        }
    }

    /// Insert an entry at the next available descriptor.
    pub fn push(&mut self, entry: FileEntry) -> Result<u32, Errno> {
        if self.map.len() >= usize::try_from(u32::MAX)? {
            return Err(Errno::Overflow);
        }
        loop {
            let fd = self.next_key;
            self.next_key = self.next_key.checked_add(1).unwrap_or(3);
            if self.map.contains_key(&fd) {
                continue;
            }
            self.map.insert(fd, entry);
            return Ok(fd);
        }
    }

    pub fn contains_key(&self, fd: u32) -> bool {
        self.map.contains_key(&fd)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, fd: u32) -> Result<&FileEntry, Errno> {
        self.map.get(&fd).ok_or(Errno::Badf)
    }

    pub fn get_mut(&mut self, fd: u32) -> Result<&mut FileEntry, Errno> {
        self.map.get_mut(&fd).ok_or(Errno::Badf)
    }

    /// Removes `fd` from the table and closes its entry.
    pub fn close(&mut self, fd: u32) -> Result<(), Errno> {
        let mut entry = self.map.remove(&fd).ok_or(Errno::Badf)?;
        entry.close()
    }

    /// Asks the entry behind `fd` whether the events in `flag` are ready.
    pub fn poll(&self, fd: u32, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        self.get(fd)?.poll(flag, timeout_millis)
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
