use anyhow::Result;
use std::io::{self, Read};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use wasi_host_io::{Errno, Pflag, Pollable, WasiCtxBuilder};

/// An in-memory stdin fed by another thread, which knows whether it has
/// input waiting.
#[derive(Clone, Default)]
struct Channel(Arc<(Mutex<Vec<u8>>, Condvar)>);

impl Channel {
    fn send(&self, data: &[u8]) {
        let (buf, cond) = &*self.0;
        buf.lock().unwrap().extend_from_slice(data);
        cond.notify_all();
    }
}

impl Read for Channel {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut buf = self.0.0.lock().unwrap();
        let n = out.len().min(buf.len());
        out[..n].copy_from_slice(&buf[..n]);
        buf.drain(..n);
        Ok(n)
    }
}

impl Pollable for Channel {
    fn poll(&self, flag: Pflag, timeout_millis: i32) -> Result<bool, Errno> {
        if flag != Pflag::POLLIN {
            return Err(Errno::Notsup);
        }
        let (buf, cond) = &*self.0;
        let buf = buf.lock().map_err(|_| Errno::Io)?;
        let buf = match u64::try_from(timeout_millis) {
            Ok(ms) => {
                let (buf, _) = cond
                    .wait_timeout_while(buf, Duration::from_millis(ms), |b| b.is_empty())
                    .map_err(|_| Errno::Io)?;
                buf
            }
            Err(_) => cond
                .wait_while(buf, |b| b.is_empty())
                .map_err(|_| Errno::Io)?,
        };
        Ok(!buf.is_empty())
    }
}

#[test_log::test]
fn pollable_stdin_reports_its_own_readiness() -> Result<()> {
    let channel = Channel::default();
    let mut ctx = WasiCtxBuilder::new()
        .stdin_pollable(channel.clone())
        .build();

    let start = Instant::now();
    assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(false));
    assert!(start.elapsed() < Duration::from_secs(1));

    // Unlike a plain stdin, the answer to a write query is the resource's.
    assert_eq!(ctx.poll(0, Pflag::POLLOUT, 0), Err(Errno::Notsup));

    let sender = channel.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        sender.send(b"hello");
    });
    assert_eq!(ctx.poll(0, Pflag::POLLIN, -1), Ok(true));
    handle.join().unwrap();

    let mut buf = [0; 16];
    assert_eq!(ctx.read(0, &mut buf), Ok(5));
    assert_eq!(&buf[..5], b"hello");
    assert_eq!(ctx.poll(0, Pflag::POLLIN, 10), Ok(false));
    Ok(())
}

/// A writer whose readiness is fixed by the test.
struct Fixed(Result<bool, Errno>);

impl io::Write for Fixed {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Pollable for Fixed {
    fn poll(&self, _flag: Pflag, _timeout_millis: i32) -> Result<bool, Errno> {
        self.0
    }
}

#[test_log::test]
fn pollable_writers_delegate() -> Result<()> {
    let ctx = WasiCtxBuilder::new()
        .stdout_pollable(Fixed(Ok(false)))
        .stderr_pollable(Fixed(Err(Errno::Intr)))
        .build();
    assert_eq!(ctx.poll(1, Pflag::POLLOUT, 0), Ok(false));
    assert_eq!(ctx.poll(1, Pflag::POLLIN, 0), Ok(false));
    let result = ctx.poll(2, Pflag::POLLOUT, -1);
    assert_eq!(result, Err(Errno::Intr));
    assert_eq!(Errno::code_of(&result), 27);
    Ok(())
}
