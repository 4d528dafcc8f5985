//! The Blueprint Resolver (§4.2): `find`, `list`, `describe` across the
//! default and custom blueprint source directories.

use crate::compose;
use crate::error::BlueprintError;
use crate::parse::parse_bp_document;
use kgsm_config::ConfigDocument;
use kgsm_core::blueprint::{Blueprint, Runtime};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub struct BlueprintResolver {
    pub default_dir: PathBuf,
    pub custom_dir: PathBuf,
}

impl BlueprintResolver {
    pub fn new(default_dir: PathBuf, custom_dir: PathBuf) -> Self {
        BlueprintResolver {
            default_dir,
            custom_dir,
        }
    }

    /// `find(name) → path`: tries `custom/<name>.bp`, `default/<name>.bp`,
    /// `custom/<name>.docker-compose.yml`, `default/<name>.docker-compose.yml`
    /// in that order. Custom wins on collision (§3 invariant).
    pub fn find(&self, name: &str) -> Result<PathBuf, BlueprintError> {
        let candidates = [
            self.custom_dir.join(format!("{name}.bp")),
            self.default_dir.join(format!("{name}.bp")),
            self.custom_dir.join(format!("{name}.docker-compose.yml")),
            self.default_dir.join(format!("{name}.docker-compose.yml")),
        ];
        candidates
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| BlueprintError::NotFound(name.to_string()))
    }

    /// `list([scope])`: enumerates blueprint base names (extension
    /// stripped) from both source dirs, deduplicated and lexicographically
    /// sorted.
    pub fn list(&self) -> Result<Vec<String>, BlueprintError> {
        let mut names = BTreeSet::new();
        for dir in [&self.custom_dir, &self.default_dir] {
            if !dir.exists() {
                continue;
            }
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                if let Some(stem) = base_name(&entry.path()) {
                    names.insert(stem);
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    /// `describe(name)`: the fully parsed blueprint record. For container
    /// blueprints, ports are extracted from the compose descriptor (§6).
    pub fn describe(&self, name: &str) -> Result<Blueprint, BlueprintError> {
        let path = self.find(name)?;
        self.load(name, &path)
    }

    fn load(&self, name: &str, path: &Path) -> Result<Blueprint, BlueprintError> {
        let text = std::fs::read_to_string(path)?;

        if path.extension().and_then(|e| e.to_str()) == Some("yml") {
            let compose_ports = compose::parse_compose_ports(&text)?;
            let mut bp = Blueprint {
                name: name.to_string(),
                runtime: Runtime::Container,
                ports: String::new(),
                executable_file: String::new(),
                executable_subdirectory: String::new(),
                executable_arguments: String::new(),
                level_name: String::new(),
                stop_command: String::new(),
                save_command: String::new(),
                steam_app_id: None,
                is_steam_account_required: false,
                platform: "linux".to_string(),
                compose_ports,
            };
            bp.derive_ports_from_compose()?;
            return Ok(bp);
        }

        let doc = ConfigDocument::parse(&text);
        let mut bp = parse_bp_document(name, &doc)?;

        if bp.runtime == Runtime::Container {
            if let Some(compose_path) = self.companion_compose_path(path) {
                let compose_text = std::fs::read_to_string(&compose_path)?;
                bp.compose_ports = compose::parse_compose_ports(&compose_text)?;
                bp.derive_ports_from_compose()?;
            }
        }

        Ok(bp)
    }

    fn companion_compose_path(&self, bp_path: &Path) -> Option<PathBuf> {
        let stem = bp_path.file_stem()?.to_str()?;
        let parent = bp_path.parent()?;
        let candidate = parent.join(format!("{stem}.docker-compose.yml"));
        candidate.exists().then_some(candidate)
    }
}

fn base_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_suffix(".bp")
        .or_else(|| file_name.strip_suffix(".docker-compose.yml"))
        .map(str::to_string)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
