use crate::Errno;
use bitflags::bitflags;
use std::sync::{Arc, Mutex};

bitflags! {
    /// Events a caller may wait for on a file descriptor.
    ///
    /// Values, including zero, should not be interpreted numerically. Only
    /// the named constants are meaningful; any other combination is a request
    /// which an implementation may reject with [`Errno::Notsup`].
    ///
    /// This is like `pollfd.events` in POSIX `poll`, restricted to the events
    /// needed by WASI `poll_oneoff` (`eventtype::fd_read` and
    /// `eventtype::fd_write`).
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Pflag: u32 {
        /// A read event.
        const POLLIN  = 0b1;
        /// A write event.
        const POLLOUT = 0b10;
    }
}

/// Implemented by host resources which can report their own readiness.
///
/// A reader or writer handed to
/// [`WasiCtxBuilder::stdin_pollable`](crate::WasiCtxBuilder::stdin_pollable)
/// (or the stdout/stderr equivalents) is asked directly when the guest polls
/// its descriptor, instead of being given an "always ready" answer. This is
/// how an embedder connects a socket, channel or other event source to a
/// guest without the host blocking on reads that will never complete.
///
/// # Parameters
///
/// `flag` selects which event to await: [`Pflag::POLLIN`],
/// [`Pflag::POLLOUT`], or both.
///
/// `timeout_millis` is how long to block for an event. Two values are
/// special:
///   - zero returns immediately
///   - any negative value blocks until an event happens or the wait is
///     interrupted
///
/// # Results
///
/// `Ok(true)` means the event is ready; `Ok(false)` means the wait finished
/// without one. The wrapper returns whatever the implementation returns, so
/// implementations are expected to honor the timeout themselves and to use
/// these errors:
///   - [`Errno::Nosys`]: polling isn't implemented at all.
///   - [`Errno::Notsup`]: the flag combination isn't supported.
///   - [`Errno::Intr`]: the wait was interrupted prior to an event.
pub trait Pollable {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno>;
}

impl<T: Pollable + ?Sized> Pollable for &T {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        (**self).poll(flag, timeout_millis)
    }
}

impl<T: Pollable + ?Sized> Pollable for Box<T> {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        (**self).poll(flag, timeout_millis)
    }
}

impl<T: Pollable + ?Sized> Pollable for Arc<T> {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        (**self).poll(flag, timeout_millis)
    }
}

impl<T: Pollable + ?Sized> Pollable for Mutex<T> {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        self.lock().map_err(|_| Errno::Io)?.poll(flag, timeout_millis)
    }
}

/// Returns the named events in `flag`, or [`Errno::Notsup`] if `flag` is
/// empty or carries bits outside of [`Pflag::all`].
pub(crate) fn known_events(flag: Pflag) -> Result<Pflag, Errno> {
    if flag.is_empty() || !Pflag::all().contains(flag) {
        return Err(Errno::Notsup);
    }
    Ok(flag)
}
