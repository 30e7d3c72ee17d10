use crate::poll::known_events;
use crate::{Errno, Pflag};
use rustix::event::{PollFd, PollFlags, Timespec};
use std::os::fd::AsFd;

/// Waits up to `timeout_millis` for the events in `flag` on `descriptor`
/// using `poll(2)`.
///
/// An interrupted wait is reported as [`Errno::Intr`] rather than retried.
pub(crate) fn poll<T: AsFd + ?Sized>(
    descriptor: &T,
    flag: Pflag,
    timeout_millis: i32,
) -> Result<bool, Errno> {
    let events = poll_flags(known_events(flag)?);
    let mut pollfds = [PollFd::from_borrowed_fd(descriptor.as_fd(), events)];
    let timeout = timespec(timeout_millis);
    tracing::debug!(
        poll_timeout = tracing::field::debug(&timeout),
        poll_fds = tracing::field::debug(&pollfds),
        "poll"
    );

    match rustix::event::poll(&mut pollfds, timeout.as_ref()) {
        Ok(0) => return Ok(false),
        Ok(_) => {}
        Err(rustix::io::Errno::INTR) => return Err(Errno::Intr),
        Err(err) => return Err(err.into()),
    }

    let revents = pollfds[0].revents();
    if revents.contains(PollFlags::NVAL) {
        Err(Errno::Badf)
    } else if revents.contains(PollFlags::ERR) {
        Err(Errno::Io)
    } else if revents.contains(PollFlags::HUP) {
        // The other end is gone: reads see end-of-input without blocking.
        Ok(true)
    } else {
        Ok(revents.intersects(events))
    }
}

fn poll_flags(flag: Pflag) -> PollFlags {
    let mut flags = PollFlags::empty();
    if flag.contains(Pflag::POLLIN) {
        flags |= PollFlags::IN;
    }
    if flag.contains(Pflag::POLLOUT) {
        flags |= PollFlags::OUT;
    }
    flags
}

/// `None` blocks forever, as `poll(2)` does for a negative timeout.
fn timespec(timeout_millis: i32) -> Option<Timespec> {
    if timeout_millis < 0 {
        return None;
    }
    Some(Timespec {
        tv_sec: (timeout_millis / 1000).into(),
        tv_nsec: ((timeout_millis % 1000) * 1_000_000).into(),
    })
}
