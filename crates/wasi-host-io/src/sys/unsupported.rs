#![cfg_attr(
    any(target_os = "linux", target_os = "android", target_vendor = "apple", windows),
    allow(dead_code, reason = "only exercised by tests on hosts with a native backend")
)]

use crate::{Errno, Pflag};

/// `poll` for targets without a native readiness facility.
///
/// Always fails with [`Errno::Nosys`], and does so without looking at the
/// timeout, so a guest asking to wait forever gets its answer immediately.
pub(crate) fn poll<T: ?Sized>(
    _descriptor: &T,
    _flag: Pflag,
    _timeout_millis: i32,
) -> Result<bool, Errno> {
    Err(Errno::Nosys)
}
