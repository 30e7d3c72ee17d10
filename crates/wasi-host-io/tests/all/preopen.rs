use crate::prepare_workspace;
use anyhow::Result;
use wasi_host_io::{Errno, FdFlags, FileType, OFlags, Pflag, WasiCtxBuilder};

#[test_log::test]
fn open_write_read() -> Result<()> {
    let (_tempdir, dir) = prepare_workspace("open_write_read")?;
    let mut ctx = WasiCtxBuilder::new().preopened_dir(dir, "/work").build();
    assert_eq!(ctx.preopens().len(), 1);

    let fd = ctx.open_file("/work", "notes.txt", OFlags::CREATE, false, true, FdFlags::empty())?;
    assert_eq!(fd, 3);
    assert_eq!(ctx.write(fd, b"hello"), Ok(5));
    ctx.close(fd)?;

    let fd = ctx.open_file("/work", "notes.txt", OFlags::empty(), true, false, FdFlags::empty())?;
    let entry = ctx.table().get(fd)?;
    assert_eq!(entry.name(), "/work/notes.txt");
    let stat = entry.stat()?;
    assert_eq!(stat.filetype, FileType::RegularFile);
    assert_eq!(stat.size, 5);

    let mut buf = [0; 8];
    assert_eq!(ctx.read(fd, &mut buf), Ok(5));
    assert_eq!(&buf[..5], b"hello");
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple", windows))]
#[test_log::test]
fn regular_files_are_always_ready() -> Result<()> {
    let (_tempdir, dir) = prepare_workspace("regular_files_are_always_ready")?;
    let mut ctx = WasiCtxBuilder::new().preopened_dir(dir, "/work").build();
    let fd = ctx.open_file("/work", "f", OFlags::CREATE, true, true, FdFlags::empty())?;
    assert_eq!(ctx.poll(fd, Pflag::POLLIN, 0), Ok(true));
    assert_eq!(ctx.poll(fd, Pflag::POLLOUT, -1), Ok(true));
    assert_eq!(ctx.poll(fd, Pflag::empty(), 0), Err(Errno::Notsup));
    Ok(())
}

#[test_log::test]
fn unknown_preopen_or_path() -> Result<()> {
    let (_tempdir, dir) = prepare_workspace("unknown_preopen_or_path")?;
    let mut ctx = WasiCtxBuilder::new().preopened_dir(dir, "/work").build();
    let err = ctx
        .open_file("/elsewhere", "f", OFlags::CREATE, false, true, FdFlags::empty())
        .unwrap_err();
    assert_eq!(err, Errno::Noent);
    let err = ctx
        .open_file("/work", "missing", OFlags::empty(), true, false, FdFlags::empty())
        .unwrap_err();
    assert_eq!(err, Errno::Noent);
    Ok(())
}

#[test_log::test]
fn append_flag_is_kept() -> Result<()> {
    let (_tempdir, dir) = prepare_workspace("append_flag_is_kept")?;
    let mut ctx = WasiCtxBuilder::new().preopened_dir(dir, "/work").build();
    let fd = ctx.open_file("/work", "log", OFlags::CREATE, false, true, FdFlags::APPEND)?;
    assert_eq!(ctx.table().get(fd)?.file().fdflags(), FdFlags::APPEND);
    Ok(())
}
