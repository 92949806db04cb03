//! Output file writes for front ends.
//!
//! - **Atomic**: data goes to a randomly named temp file next to the target,
//!   then is renamed into place, so readers never see a half-written carrier.
//! - **Permission hardening**: on Unix, sensitive outputs (recovered
//!   messages) are created 0o600 from the start.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Write `data` to `path` atomically.
///
/// When `sensitive` is true the file is owner read/write only on Unix.
/// An existing file at `path` is replaced.
pub fn write_atomic(path: &Path, data: &[u8], sensitive: bool) -> Result<()> {
    let temp = temp_path(path)?;

    let mut file = create_new(&temp, sensitive)
        .with_context(|| format!("create temp file: {}", temp.display()))?;
    if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
        let _ = std::fs::remove_file(&temp);
        return Err(e).with_context(|| format!("write temp file: {}", temp.display()));
    }
    drop(file);

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e).with_context(|| {
            format!("atomic rename {} -> {}", temp.display(), path.display())
        });
    }
    Ok(())
}

/// `<path>.tmp.<16 hex chars>`; random so concurrent writers don't collide.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow!("getrandom for temp suffix: {e}"))?;
    let suffix: String = buf.iter().map(|b| format!("{b:02x}")).collect();

    let mut name = path
        .file_name()
        .ok_or_else(|| anyhow!("output path has no file name: {}", path.display()))?
        .to_os_string();
    name.push(format!(".tmp.{suffix}"));
    Ok(path.with_file_name(name))
}

fn create_new(path: &Path, sensitive: bool) -> std::io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    if sensitive {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = sensitive;
    opts.open(path)
}
