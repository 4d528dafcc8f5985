//! `kgsm config <get|set|list|reset|validate|edit>` (§4.1, §6, plus the
//! supplemented `validate` verb).

use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Subcommand;
use kgsm_config::document::{ConfigDocument, Value};
use kgsm_config::{settings, ConfigError};
use kgsm_engine::Context;

/// Config files don't exist until the first `set`/`reset` — every read-only
/// verb treats a missing file as an empty document rather than an error.
fn document_or_empty(ctx: &Context, path: &std::path::Path) -> Result<ConfigDocument, ConfigError> {
    match ctx.config_store.document(path) {
        Ok(doc) => Ok(doc),
        Err(ConfigError::FileNotFound(_)) => Ok(ConfigDocument::default()),
        Err(e) => Err(e),
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print one setting's value.
    Get { key: String },
    /// Write one setting's value.
    Set { key: String, value: String },
    /// Print every known setting, defaults included.
    List,
    /// Rewrite `config.ini` back to the documented defaults.
    Reset,
    /// Check `config.ini` against the known-key/type table without writing.
    Validate,
    /// Open `config.ini` in `$EDITOR`.
    Edit,
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Scalar(s) => s.clone(),
        Value::Array(items) => items.join(" "),
    }
}

pub async fn handle(cmd: ConfigCommand, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let path = ctx.config_path();

    match cmd {
        ConfigCommand::Get { key } => {
            settings::check_known(&key).map_err(ExitError::from)?;
            let rendered = ctx.setting_string(&key);
            render(format, &rendered, |v| v.clone())
        }
        ConfigCommand::Set { key, value } => {
            settings::check_known(&key).map_err(ExitError::from)?;
            ctx.config_store
                .set(&path, &key, Value::Scalar(value.clone()), None)
                .map_err(ExitError::from)?;
            render(format, &(key, value), |(k, v)| format!("{k}={v}"))
        }
        ConfigCommand::List => {
            let doc = document_or_empty(ctx, &path).map_err(ExitError::from)?;
            let defaults = settings::defaults_document();
            let rendered: Vec<(String, String)> = defaults
                .keys()
                .map(|key| {
                    let value = doc.get(key).or_else(|| defaults.get(key)).map(|v| render_value(&v)).unwrap_or_default();
                    (key.to_string(), value)
                })
                .collect();
            render(format, &rendered, |pairs| {
                pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("\n")
            })
        }
        ConfigCommand::Reset => {
            let defaults = settings::defaults_document();
            for key in defaults.keys() {
                if let Some(value) = defaults.get(key) {
                    ctx.config_store.set(&path, key, value, None).map_err(ExitError::from)?;
                }
            }
            render(format, &"reset".to_string(), |_| "config reset to defaults".to_string())
        }
        ConfigCommand::Validate => {
            let doc = document_or_empty(ctx, &path).map_err(ExitError::from)?;
            settings::validate(&doc).map_err(ExitError::from)?;
            render(format, &"ok".to_string(), |_| "config.ini is valid".to_string())
        }
        ConfigCommand::Edit => {
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let status = std::process::Command::new(editor).arg(&path).status()?;
            if !status.success() {
                anyhow::bail!("editor exited with {status}");
            }
            Ok(())
        }
    }
}
