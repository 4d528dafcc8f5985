//! The Backup Subsystem (§4.5): directory-copy or `tar.gz` backups named via
//! [`BackupName`], restore with a preemptive safety backup, and listing
//! newest-first.

use crate::context::Context;
use crate::error::EngineError;
use kgsm_adapters::subprocess::{self, ARCHIVE_TIMEOUT};
use kgsm_adapters::{ProcessAdapter, SystemdAdapter};
use kgsm_core::backup_name::BackupName;
use kgsm_core::clock::Clock;
use kgsm_core::instance::{Instance, LifecycleManager};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::warn;

pub struct BackupManager<P: ProcessAdapter, S: SystemdAdapter> {
    process: P,
    systemd: S,
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), EngineError> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

fn clear_dir(dir: &Path) -> Result<(), EngineError> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

impl<P: ProcessAdapter, S: SystemdAdapter> BackupManager<P, S> {
    pub fn new(process: P, systemd: S) -> Self {
        BackupManager { process, systemd }
    }

    async fn is_running(&self, instance: &Instance) -> Result<bool, EngineError> {
        match instance.lifecycle_manager {
            LifecycleManager::Standalone => Ok(self.process.is_running(&instance.pid_file)?),
            LifecycleManager::Systemd => Ok(self.systemd.is_active(&crate::registry::systemd_unit_name(&instance.name)).await?),
        }
    }

    /// `create(instance)` (§4.5): refuses while the instance is running.
    pub async fn create<C: Clock>(&self, ctx: &Context<C>, instance: &Instance) -> Result<BackupName, EngineError> {
        if self.is_running(instance).await? {
            return Err(EngineError::InstanceRunning(instance.name.clone()));
        }

        let install_dir = instance.install_dir();
        let is_empty = !install_dir.exists()
            || std::fs::read_dir(&install_dir)?.next().is_none();
        if is_empty {
            warn!(instance = %instance.name, "backing up an empty install directory");
        }

        let name = BackupName::new(
            &instance.name,
            &instance.installed_version,
            &ctx.clock.now_rfc3339(),
            instance.compress_backups,
        );
        let dest = instance.backups_dir().join(name.to_string());
        std::fs::create_dir_all(instance.backups_dir())?;

        if instance.compress_backups {
            let out = subprocess::run_with_timeout(
                tar_create_command(&dest, &instance.working_dir),
                ARCHIVE_TIMEOUT,
                "tar -czf backup",
            )
            .await?;
            subprocess::require_success("tar -czf backup", &out)?;
        } else {
            copy_dir_recursive(&install_dir, &dest.join("install"))?;
        }

        Ok(name)
    }

    /// `restore(source)` (§4.5): `source` may be a bare backup file name
    /// (resolved under `backups_dir`) or a full path. Takes a preemptive
    /// backup first if the install directory is non-empty.
    pub async fn restore<C: Clock>(
        &self,
        ctx: &Context<C>,
        instance: &mut Instance,
        source: &str,
    ) -> Result<(), EngineError> {
        if self.is_running(instance).await? {
            return Err(EngineError::InstanceRunning(instance.name.clone()));
        }

        let source_path = if source.contains('/') {
            PathBuf::from(source)
        } else {
            instance.backups_dir().join(source)
        };
        let file_name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EngineError::InvalidArg(format!("malformed backup path: {source}")))?;
        let backup_name = BackupName::parse(file_name)?;

        let install_dir = instance.install_dir();
        let has_existing_install = install_dir.exists() && std::fs::read_dir(&install_dir)?.next().is_some();
        if has_existing_install {
            self.create(ctx, instance).await?;
        }

        clear_dir(&install_dir)?;

        if backup_name.compressed {
            let out = subprocess::run_with_timeout(
                tar_extract_command(&source_path, &instance.working_dir),
                ARCHIVE_TIMEOUT,
                "tar -xzf backup",
            )
            .await?;
            subprocess::require_success("tar -xzf backup", &out)?;
        } else {
            copy_dir_recursive(&source_path.join("install"), &install_dir)?;
        }

        instance.installed_version = backup_name.version;
        Ok(())
    }

    /// `list()` (§4.5): every well-formed backup under `backups_dir`, newest
    /// first by the embedded datetime.
    pub fn list(&self, instance: &Instance) -> Result<Vec<BackupName>, EngineError> {
        let dir = instance.backups_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match BackupName::parse(&file_name) {
                Ok(name) => names.push(name),
                Err(e) => warn!(file = file_name, error = %e, "skipping malformed backup entry"),
            }
        }

        names.sort_by(|a, b| b.datetime.cmp(&a.datetime));
        Ok(names)
    }
}

fn tar_create_command(dest: &Path, working_dir: &Path) -> Command {
    let mut cmd = Command::new("tar");
    cmd.arg("-czf").arg(dest).arg("-C").arg(working_dir).arg("install");
    cmd
}

fn tar_extract_command(source: &Path, working_dir: &Path) -> Command {
    let mut cmd = Command::new("tar");
    cmd.arg("-xzf").arg(source).arg("-C").arg(working_dir);
    cmd
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
