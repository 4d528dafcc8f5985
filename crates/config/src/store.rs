//! The Config Store (§4.1): reads and atomically rewrites `key=value`
//! documents. All file I/O goes through the [`ConfigWriter`] trait so the
//! atomic-write guarantee (write-temp-then-rename) can be exercised and
//! fault-injected in tests without touching a real filesystem.

use crate::document::{ConfigDocument, Value};
use crate::error::ConfigError;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait ConfigWriter: Send + Sync + 'static {
    fn read_to_string(&self, path: &Path) -> Result<String, ConfigError>;
    /// Write `contents` to `path` atomically: write to a sibling temp file,
    /// fsync it, rename over the destination, fsync the parent directory.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Default)]
pub struct FsConfigWriter;

impl ConfigWriter for FsConfigWriter {
    fn read_to_string(&self, path: &Path) -> Result<String, ConfigError> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => {
                ConfigError::Permission(path.display().to_string())
            }
            _ => ConfigError::Io(e),
        })
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), ConfigError> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let tmp_path = parent.join(format!(
            ".{}.tmp-{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("config"),
            std::process::id()
        ));

        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(contents.as_bytes())?;
            tmp.sync_all()?;
        }

        std::fs::rename(&tmp_path, path)?;

        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct ConfigStore<W: ConfigWriter = FsConfigWriter> {
    writer: W,
}

impl Default for ConfigStore<FsConfigWriter> {
    fn default() -> Self {
        ConfigStore::new()
    }
}

impl ConfigStore<FsConfigWriter> {
    pub fn new() -> Self {
        ConfigStore {
            writer: FsConfigWriter,
        }
    }
}

impl<W: ConfigWriter> ConfigStore<W> {
    pub fn with_writer(writer: W) -> Self {
        ConfigStore { writer }
    }

    fn load(&self, path: &Path) -> Result<ConfigDocument, ConfigError> {
        let text = self.writer.read_to_string(path)?;
        Ok(ConfigDocument::parse(&text))
    }

    /// The parsed document itself, for callers that need more than one key
    /// at a time (e.g. `config validate`, §4.1).
    pub fn document(&self, path: &Path) -> Result<ConfigDocument, ConfigError> {
        self.load(path)
    }

    /// `get(doc, key) -> value | NotFound`. Absence is `Ok(None)`, not an
    /// error — only I/O failures reaching the document are errors.
    pub fn get(&self, path: &Path, key: &str) -> Result<Option<Value>, ConfigError> {
        let doc = self.load(path)?;
        Ok(doc.get(key))
    }

    pub fn list(&self, path: &Path) -> Result<Vec<(String, Value)>, ConfigError> {
        let doc = self.load(path)?;
        Ok(doc
            .keys()
            .map(|k| (k.to_string(), doc.get(k).expect("key just enumerated")))
            .collect())
    }

    pub fn set(
        &self,
        path: &Path,
        key: &str,
        value: Value,
        anchor: Option<&str>,
    ) -> Result<(), ConfigError> {
        let mut doc = self.load_or_empty(path)?;
        doc.set(key, value, anchor);
        self.writer.write_atomic(path, &doc.render())?;
        debug!(path = %path.display(), key, "config key set");
        Ok(())
    }

    pub fn remove(&self, path: &Path, key: &str) -> Result<(), ConfigError> {
        let mut doc = self.load(path)?;
        doc.remove(key);
        self.writer.write_atomic(path, &doc.render())?;
        debug!(path = %path.display(), key, "config key removed");
        Ok(())
    }

    fn load_or_empty(&self, path: &Path) -> Result<ConfigDocument, ConfigError> {
        match self.load(path) {
            Ok(doc) => Ok(doc),
            Err(ConfigError::FileNotFound(_)) => Ok(ConfigDocument::default()),
            Err(e) => Err(e),
        }
    }
}

/// Path helper: an instance's config file under `instances/<blueprint>/<instance>.ini`
/// (§6 persisted state layout).
pub fn instance_config_path(root: &Path, blueprint: &str, instance: &str) -> PathBuf {
    root.join("instances").join(blueprint).join(format!("{instance}.ini"))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
