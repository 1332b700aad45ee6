use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Create `path` empty, along with missing parent directories, unless it already exists.
pub fn ensure_file_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)?,
        _ => {}
    }
    File::create(path).map(drop)
}

/// Exclusive advisory lock on a sibling `<file>.lock`; removes the lock file on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the lock for `target` is held.
    pub fn acquire(target: &Path) -> io::Result<Self> {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| ".env".into());
        name.push(".lock");
        let path = target.with_file_name(name);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        file.lock_exclusive()?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_file_exists_creates_parents() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join("a").join("b").join(".env");
        ensure_file_exists(&p).unwrap();
        assert!(p.is_file());
    }

    #[test]
    fn lock_file_is_removed_on_drop() {
        let td = tempfile::tempdir().expect("tmpdir");
        let target = td.path().join(".env");
        let lock = FileLock::acquire(&target).unwrap();
        let lock_path = lock.path().to_path_buf();
        assert!(lock_path.ends_with(".env.lock"));
        assert!(lock_path.exists());
        drop(lock);
        assert!(!lock_path.exists());
    }
}
