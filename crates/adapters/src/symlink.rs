//! Command shortcut integration (§4.4): a symlink from a directory on
//! `PATH` to the instance's management file.

use crate::error::AdapterError;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

pub trait ShortcutAdapter: Clone + Send + Sync + 'static {
    /// Create (or replace, if present) `shortcut_dir/<name>` pointing at
    /// `target`, returning the shortcut's path.
    fn enable(&self, shortcut_dir: &Path, name: &str, target: &Path) -> Result<PathBuf, AdapterError>;

    /// Remove the shortcut. Tolerant of missing.
    fn disable(&self, shortcut_path: &Path) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, Default)]
pub struct RealShortcutAdapter;

impl ShortcutAdapter for RealShortcutAdapter {
    fn enable(&self, shortcut_dir: &Path, name: &str, target: &Path) -> Result<PathBuf, AdapterError> {
        std::fs::create_dir_all(shortcut_dir)?;
        let shortcut_path = shortcut_dir.join(name);

        // "If the target symlink exists it is replaced" (§4.4).
        match std::fs::symlink_metadata(&shortcut_path) {
            Ok(_) => std::fs::remove_file(&shortcut_path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AdapterError::Io(e)),
        }

        symlink(target, &shortcut_path)?;
        Ok(shortcut_path)
    }

    fn disable(&self, shortcut_path: &Path) -> Result<(), AdapterError> {
        match std::fs::remove_file(shortcut_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdapterError::Io(e)),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeShortcutAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeShortcutAdapter {
        pub shortcuts: Arc<Mutex<HashMap<PathBuf, PathBuf>>>,
    }

    impl ShortcutAdapter for FakeShortcutAdapter {
        fn enable(&self, shortcut_dir: &Path, name: &str, target: &Path) -> Result<PathBuf, AdapterError> {
            let shortcut_path = shortcut_dir.join(name);
            self.shortcuts.lock().insert(shortcut_path.clone(), target.to_path_buf());
            Ok(shortcut_path)
        }

        fn disable(&self, shortcut_path: &Path) -> Result<(), AdapterError> {
            self.shortcuts.lock().remove(shortcut_path);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "symlink_tests.rs"]
mod tests;
