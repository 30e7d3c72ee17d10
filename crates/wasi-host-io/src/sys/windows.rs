use crate::poll::known_events;
use crate::{Errno, FileType, Pflag};
use io_extras::os::windows::{AsRawHandleOrSocket, RawHandleOrSocket};
use rustix::event::{PollFd, PollFlags, Timespec};
use std::os::windows::io::{BorrowedSocket, RawHandle};
use std::time::{Duration, Instant};
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::Storage::FileSystem::{
    FILE_TYPE_CHAR, FILE_TYPE_DISK, FILE_TYPE_PIPE, GetFileType,
};
use windows_sys::Win32::System::Pipes::PeekNamedPipe;

/// How often a named pipe is re-checked while waiting for input.
const PIPE_TICK: Duration = Duration::from_millis(100);

/// Waits up to `timeout_millis` for the events in `flag` on `descriptor`.
///
/// Sockets go through `WSAPoll`. Named pipes (how redirected stdio usually
/// arrives) are peeked for available input until data shows up or the
/// timeout passes; writes to them are reported ready. Disk files and
/// consoles never block in a way the host can observe, so they are always
/// ready.
pub(crate) fn poll<T: AsRawHandleOrSocket + ?Sized>(
    descriptor: &T,
    flag: Pflag,
    timeout_millis: i32,
) -> Result<bool, Errno> {
    let events = known_events(flag)?;
    let raw = descriptor.as_raw_handle_or_socket();
    if let Some(socket) = raw.as_raw_socket() {
        // SAFETY: `descriptor` owns the socket and outlives this call.
        let socket = unsafe { BorrowedSocket::borrow_raw(socket) };
        return poll_socket(socket, events, timeout_millis);
    }
    let handle = raw.as_raw_handle().ok_or(Errno::Badf)?;
    match file_type(handle) {
        FILE_TYPE_PIPE if events.contains(Pflag::POLLIN) => poll_pipe(handle, timeout_millis),
        FILE_TYPE_PIPE | FILE_TYPE_DISK | FILE_TYPE_CHAR => Ok(true),
        other => {
            tracing::debug!("poll on unrecognized handle type {other}");
            Err(Errno::Notsup)
        }
    }
}

fn poll_socket(
    socket: BorrowedSocket<'_>,
    events: Pflag,
    timeout_millis: i32,
) -> Result<bool, Errno> {
    let mut flags = PollFlags::empty();
    if events.contains(Pflag::POLLIN) {
        flags |= PollFlags::IN;
    }
    if events.contains(Pflag::POLLOUT) {
        flags |= PollFlags::OUT;
    }
    let mut pollfds = [PollFd::from_borrowed_fd(socket, flags)];
    let timeout = (timeout_millis >= 0).then(|| Timespec {
        tv_sec: (timeout_millis / 1000).into(),
        tv_nsec: ((timeout_millis % 1000) * 1_000_000).into(),
    });
    tracing::debug!(
        poll_timeout = tracing::field::debug(&timeout),
        poll_fds = tracing::field::debug(&pollfds),
        "WSAPoll"
    );
    match rustix::event::poll(&mut pollfds, timeout.as_ref()) {
        Ok(0) => return Ok(false),
        Ok(_) => {}
        Err(rustix::io::Errno::INTR) => return Err(Errno::Intr),
        Err(err) => return Err(std::io::Error::from(err).into()),
    }
    let revents = pollfds[0].revents();
    if revents.contains(PollFlags::NVAL) {
        Err(Errno::Badf)
    } else if revents.contains(PollFlags::ERR) {
        Err(Errno::Io)
    } else if revents.contains(PollFlags::HUP) {
        Ok(true)
    } else {
        Ok(revents.intersects(flags))
    }
}

/// Peeks `handle` until it has input or `timeout_millis` passes.
fn poll_pipe(handle: RawHandle, timeout_millis: i32) -> Result<bool, Errno> {
    let deadline = u64::try_from(timeout_millis)
        .ok()
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    loop {
        if peek_available(handle)? > 0 {
            return Ok(true);
        }
        let tick = match deadline {
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => left.min(PIPE_TICK),
                _ => return Ok(false),
            },
            None => PIPE_TICK,
        };
        std::thread::sleep(tick);
    }
}

fn peek_available(handle: RawHandle) -> Result<u32, Errno> {
    let mut available = 0u32;
    // SAFETY: a null buffer of size zero only queries the byte count.
    let ok = unsafe {
        PeekNamedPipe(
            handle as HANDLE,
            std::ptr::null_mut(),
            0,
            std::ptr::null_mut(),
            &mut available,
            std::ptr::null_mut(),
        )
    };
    if ok == 0 {
        let err = std::io::Error::last_os_error();
        // A closed write end reads as end-of-input, which doesn't block.
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            return Ok(1);
        }
        return Err(err.into());
    }
    Ok(available)
}

fn file_type(handle: RawHandle) -> u32 {
    // SAFETY: `GetFileType` only inspects the handle.
    unsafe { GetFileType(handle as HANDLE) }
}

pub(crate) fn filetype<T: AsRawHandleOrSocket + ?Sized>(descriptor: &T) -> FileType {
    let raw: RawHandleOrSocket = descriptor.as_raw_handle_or_socket();
    if raw.as_raw_socket().is_some() {
        return FileType::SocketStream;
    }
    match raw.as_raw_handle().map(file_type) {
        Some(FILE_TYPE_DISK) => FileType::RegularFile,
        Some(FILE_TYPE_CHAR) => FileType::CharacterDevice,
        Some(FILE_TYPE_PIPE) => FileType::Pipe,
        _ => FileType::Unknown,
    }
}
