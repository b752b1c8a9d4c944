//! Single-instance lock file.
//!
//! Two daemons driving the same relay would fight over it, so startup takes
//! an exclusive `flock` on `$XDG_RUNTIME_DIR/pilight.lock`. The file records
//! the owner's PID and API port.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::constants::*;

/// Held for the lifetime of the daemon. Dropping it releases the lock and
/// removes the file.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Directory for the lock file.
pub fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Take the instance lock in `dir`.
///
/// A lock left behind by a process that no longer exists is removed and
/// taken over. A live owner is an error.
pub fn acquire(dir: &Path, port: u16) -> Result<InstanceLock> {
    let path = dir.join(LOCK_FILE_NAME);

    if let Some(lock) = try_acquire(&path, port)? {
        return Ok(lock);
    }

    match read_owner(&path) {
        Some(pid) if is_process_running(pid) => {
            anyhow::bail!("pilight is already running (PID: {pid})");
        }
        Some(pid) => log_warning!("Removing stale lock file (process {pid} no longer running)"),
        None => log_warning!("Lock file format invalid, removing"),
    }
    let _ = std::fs::remove_file(&path);

    try_acquire(&path, port)?
        .with_context(|| format!("Failed to acquire {} after cleanup", path.display()))
}

fn try_acquire(path: &Path, port: u16) -> Result<Option<InstanceLock>> {
    // No truncation: a held lock's contents must survive our attempt
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    writeln!(file, "{port}")?;
    file.flush()?;

    Ok(Some(InstanceLock {
        file,
        path: path.to_path_buf(),
    }))
}

fn read_owner(path: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(path).ok()?;
    content.lines().next()?.trim().parse().ok()
}

/// Whether a process with `pid` exists (sends signal 0).
pub fn is_process_running(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // Exists but belongs to someone else
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_records_pid_and_port() {
        let dir = tempdir().unwrap();
        let lock = acquire(dir.path(), 3000).unwrap();

        let content = std::fs::read_to_string(lock.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![std::process::id().to_string(), "3000".to_string()]);
    }

    #[test]
    fn test_second_instance_is_refused_while_held() {
        crate::logger::Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let lock = acquire(dir.path(), 3000).unwrap();

        let err = acquire(dir.path(), 3001).unwrap_err();
        assert!(err.to_string().contains("already running"));

        drop(lock);
        assert!(!dir.path().join(LOCK_FILE_NAME).exists());
        assert!(acquire(dir.path(), 3001).is_ok());
    }

    #[test]
    fn test_leftover_unlocked_file_is_reused() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(LOCK_FILE_NAME), "999999\n3000\n").unwrap();
        assert!(acquire(dir.path(), 3000).is_ok());
    }

    #[test]
    fn test_process_liveness() {
        assert!(is_process_running(std::process::id()));
        assert!(!is_process_running(u32::MAX));
    }
}
