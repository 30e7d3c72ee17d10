use anyhow::Result;
use std::io::{Cursor, Seek, Write};
use std::time::{Duration, Instant};
use wasi_host_io::{Errno, FdTable, FileKind, FileType, Pflag, WasiCtxBuilder};

#[test_log::test]
fn plain_stdin_is_always_readable() -> Result<()> {
    let mut ctx = WasiCtxBuilder::new()
        .stdin(Cursor::new("data"))
        .build();
    assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(true));
    assert_eq!(ctx.poll(0, Pflag::POLLOUT, 0), Err(Errno::Notsup));

    let mut buf = [0; 8];
    assert_eq!(ctx.read(0, &mut buf), Ok(4));
    // Still "ready": the next read simply sees end-of-input.
    assert_eq!(ctx.poll(0, Pflag::POLLIN, -1), Ok(true));
    assert_eq!(ctx.read(0, &mut buf), Ok(0));
    Ok(())
}

#[test_log::test]
fn unconfigured_stdio_is_noop() -> Result<()> {
    let mut ctx = WasiCtxBuilder::new().build();
    assert_eq!(ctx.poll(1, Pflag::POLLOUT, 0), Ok(true));
    assert_eq!(ctx.read(0, &mut [0; 5]), Ok(0));
    assert_eq!(ctx.write(1, b"ignored"), Ok(7));
    assert_eq!(ctx.write(0, b"x"), Err(Errno::Badf));
    assert_eq!(ctx.read(1, &mut [0; 1]), Err(Errno::Badf));

    let table: &FdTable = ctx.table();
    assert_eq!(table.len(), 3);
    let kinds: Vec<_> = (0..3)
        .map(|fd| table.get(fd).map(|e| e.kind()))
        .collect::<Result<_, _>>()?;
    assert_eq!(kinds, [FileKind::Stdin, FileKind::Stdout, FileKind::Stderr]);
    Ok(())
}

#[test_log::test]
fn zero_timeout_never_blocks() -> Result<()> {
    let ctx = WasiCtxBuilder::new().stdin(Cursor::new("")).build();
    let start = Instant::now();
    for fd in 0..3 {
        for flag in [Pflag::POLLIN, Pflag::POLLOUT] {
            let _ = ctx.poll(fd, flag, 0);
        }
    }
    assert!(start.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[test_log::test]
fn closed_stdio_is_bad_descriptor() -> Result<()> {
    let mut ctx = WasiCtxBuilder::new().build();
    ctx.close(1)?;
    assert_eq!(ctx.poll(1, Pflag::POLLOUT, 0), Err(Errno::Badf));
    assert_eq!(ctx.write(1, b"x"), Err(Errno::Badf));
    assert_eq!(ctx.close(1), Err(Errno::Badf));
    Ok(())
}

#[cfg(any(unix, windows))]
#[test_log::test]
fn file_attached_as_stdio() -> Result<()> {
    let mut input = tempfile::tempfile()?;
    input.write_all(b"from a file")?;
    input.rewind()?;
    let output = tempfile::tempfile()?;

    let mut ctx = WasiCtxBuilder::new()
        .stdin_os(input)
        .stdout_os(output.try_clone()?)
        .build();

    for fd in [0, 1] {
        let stat = ctx.table().get(fd)?.stat()?;
        assert_eq!(stat.filetype, FileType::RegularFile);
        assert_eq!(stat.nlink, 1);
        assert_eq!(stat.atim, None);
        assert!(!ctx.table().get(fd)?.file().is_terminal());
    }

    let mut buf = [0; 32];
    assert_eq!(ctx.read(0, &mut buf), Ok(11));
    assert_eq!(ctx.write(1, b"out"), Ok(3));
    assert_eq!(output.metadata()?.len(), 3);
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
#[test_log::test]
fn pipe_attached_as_stdin() -> Result<()> {
    let (reader, writer) = rustix::pipe::pipe()?;
    let ctx = WasiCtxBuilder::new()
        .stdin_os(std::fs::File::from(reader))
        .build();

    let stat = ctx.table().get(0)?.stat()?;
    assert_eq!(stat.filetype, FileType::Pipe);

    assert_eq!(ctx.poll(0, Pflag::POLLIN, 0), Ok(false));
    let start = Instant::now();
    assert_eq!(ctx.poll(0, Pflag::POLLIN, 30), Ok(false));
    assert!(start.elapsed() >= Duration::from_millis(20));

    rustix::io::write(&writer, b"ready")?;
    assert_eq!(ctx.poll(0, Pflag::POLLIN, -1), Ok(true));
    Ok(())
}
