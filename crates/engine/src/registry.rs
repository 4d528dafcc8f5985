//! The Instance Registry (§4.8): unique-name generation, storage of
//! instance documents grouped by blueprint, and status-aware `describe`.

use crate::context::Context;
use crate::error::EngineError;
use crate::instance_doc::{document_to_instance, instance_to_document};
use kgsm_adapters::{ProcessAdapter, SystemdAdapter};
use kgsm_core::clock::Clock;
use kgsm_core::id::generate_suffix;
use kgsm_core::instance::{Instance, LifecycleManager};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDescription {
    pub instance: Instance,
    pub status: InstanceStatus,
}

pub fn systemd_unit_name(instance_name: &str) -> String {
    format!("kgsm-{instance_name}.service")
}

#[derive(Clone)]
pub struct InstanceRegistry<P: ProcessAdapter, S: SystemdAdapter> {
    process: P,
    systemd: S,
}

impl<P: ProcessAdapter, S: SystemdAdapter> InstanceRegistry<P, S> {
    pub fn new(process: P, systemd: S) -> Self {
        InstanceRegistry { process, systemd }
    }

    /// `find(name) -> config_path`: scans every blueprint group directory
    /// under `instances/` for `<name>.ini`.
    pub fn find<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<PathBuf, EngineError> {
        let instances_dir = ctx.instances_dir();
        if !instances_dir.exists() {
            return Err(EngineError::InstanceNotFound(name.to_string()));
        }
        for entry in std::fs::read_dir(&instances_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let candidate = entry.path().join(format!("{name}.ini"));
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(EngineError::InstanceNotFound(name.to_string()))
    }

    fn exists<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<bool, EngineError> {
        match self.find(ctx, name) {
            Ok(_) => Ok(true),
            Err(EngineError::InstanceNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `generate_name(blueprint)` (§4.8): the blueprint's own name if no
    /// instance of it exists yet, else `<blueprint>-<digits>`, redrawing on
    /// collision (§8 invariant 8: never collides with an existing name).
    pub fn generate_name<C: Clock>(&self, ctx: &Context<C>, blueprint: &str) -> Result<String, EngineError> {
        if !self.exists(ctx, blueprint)? {
            return Ok(blueprint.to_string());
        }

        let suffix_len = ctx.instance_suffix_length();
        loop {
            let candidate = format!("{blueprint}-{}", generate_suffix(suffix_len));
            if !self.exists(ctx, &candidate)? {
                return Ok(candidate);
            }
        }
    }

    /// `list([blueprint])`: instance names, optionally restricted to one
    /// blueprint's group directory, sorted lexicographically.
    pub fn list<C: Clock>(&self, ctx: &Context<C>, blueprint: Option<&str>) -> Result<Vec<String>, EngineError> {
        let instances_dir = ctx.instances_dir();
        if !instances_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&instances_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(bp) = blueprint {
                if entry.file_name().to_str() != Some(bp) {
                    continue;
                }
            }
            for file in std::fs::read_dir(entry.path())? {
                let file = file?;
                if let Some(stem) = file.path().file_stem().and_then(|s| s.to_str()) {
                    if file.path().extension().and_then(|e| e.to_str()) == Some("ini") {
                        names.push(stem.to_string());
                    }
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<Instance, EngineError> {
        let path = self.find(ctx, name)?;
        let text = std::fs::read_to_string(&path)?;
        document_to_instance(&kgsm_config::document::ConfigDocument::parse(&text))
    }

    /// Writes the instance's own document at
    /// `instances/<blueprint>/<name>.ini`, atomically.
    pub fn save<C: Clock>(&self, ctx: &Context<C>, blueprint: &str, instance: &Instance) -> Result<(), EngineError> {
        use kgsm_config::ConfigWriter as _;
        let path = kgsm_config::instance_config_path(&ctx.root, blueprint, &instance.name);
        let doc = instance_to_document(instance);
        kgsm_config::FsConfigWriter.write_atomic(&path, &doc.render())?;
        Ok(())
    }

    /// `remove(name)`: deletes the config file and, if the blueprint's
    /// group directory is now empty, removes that directory too.
    pub fn remove<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<(), EngineError> {
        let path = self.find(ctx, name)?;
        std::fs::remove_file(&path)?;
        if let Some(parent) = path.parent() {
            let is_empty = std::fs::read_dir(parent)?.next().is_none();
            if is_empty {
                std::fs::remove_dir(parent)?;
            }
        }
        Ok(())
    }

    /// `describe(name)`: the instance document plus its derived liveness
    /// status (§4.8: "systemd active-query, or PID-file existence check for
    /// standalone").
    pub async fn describe<C: Clock>(&self, ctx: &Context<C>, name: &str) -> Result<InstanceDescription, EngineError> {
        let instance = self.load(ctx, name)?;
        let status = match instance.lifecycle_manager {
            LifecycleManager::Standalone => {
                if self.process.is_running(&instance.pid_file)? {
                    InstanceStatus::Running
                } else {
                    InstanceStatus::Stopped
                }
            }
            LifecycleManager::Systemd => {
                if self.systemd.is_active(&systemd_unit_name(&instance.name)).await? {
                    InstanceStatus::Running
                } else {
                    InstanceStatus::Stopped
                }
            }
        };
        Ok(InstanceDescription { instance, status })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
