use anyhow::Result;
use tempfile::TempDir;
use wasi_host_io::{Dir, ambient_authority};

mod pollable;
mod preopen;
mod stdio;

fn prepare_workspace(name: &str) -> Result<(TempDir, Dir)> {
    let prefix = format!("wasi_host_io_{name}_");
    let tempdir = tempfile::Builder::new().prefix(&prefix).tempdir()?;
    let dir = Dir::open_ambient_dir(tempdir.path(), ambient_authority())?;
    Ok((tempdir, dir))
}
