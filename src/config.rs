use crate::error::{GovernanceError, Result};
use crate::types::config::GovConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "govmetrics.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".govmetrics/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/govmetrics/config.toml";

/// Loads and validates the configuration visible from `root`.
///
/// Layers are merged global < repository < local, table by table. Returns
/// `None` when no layer exists.
pub fn load_config(root: &Path) -> Result<Option<GovConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<GovConfig>> {
    let layers = [
        global_path.map(Path::to_path_buf),
        Some(root.join(DEFAULT_CONFIG_FILE)),
        Some(root.join(DEFAULT_LOCAL_FILE)),
    ];

    let mut merged = Value::Table(Map::new());
    let mut found = false;
    for path in layers.iter().flatten() {
        found |= merge_file_if_exists(&mut merged, path)?;
    }
    if !found {
        return Ok(None);
    }

    let cfg: GovConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| GovernanceError::Configuration(e.to_string()))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    debug!(path = %path.display(), "merging config layer");
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(true)
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| GovernanceError::Configuration(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scoring::Subsystem;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_config_returns_none_when_no_layer_exists() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = load_config_with_global(dir.path(), None).expect("load should not fail");
        assert!(cfg.is_none());
    }

    #[test]
    fn load_config_merges_global_repo_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[classifier]
epochs = 100
l2_penalty = 0.01

[batch]
threads = 8
"#,
        )
        .expect("global config should write");

        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[classifier]
epochs = 300

[vsm.weights]
operations = 0.20
coordination = 0.20
control = 0.20
intelligence = 0.20
policy = 0.20
"#,
        )
        .expect("repo config should write");

        fs::create_dir_all(root.path().join(".govmetrics")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[batch]
threads = 1
"#,
        )
        .expect("local override should write");

        let cfg = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("merged config should exist");

        let params = cfg.training_params();
        assert_eq!(params.epochs, 300);
        assert_eq!(params.l2_penalty, 0.01);
        assert_eq!(cfg.threads(), Some(1));
        assert_eq!(
            cfg.vsm_weights()
                .expect("weights should be valid")
                .get(Subsystem::Policy),
            0.20
        );
    }

    #[test]
    fn global_layer_alone_is_enough() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");
        fs::write(&global_path, "[classifier]\nfolds = 3\n").expect("global config should write");

        let cfg = load_config_with_global(root.path(), Some(&global_path))
            .expect("load should succeed")
            .expect("global config should be used");
        assert_eq!(cfg.folds(), 3);
    }

    #[test]
    fn invalid_layer_reports_configuration_error() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[vsm.weights]\npolicy = 2.0\n")
            .expect("repo config should write");

        let err = load_config_with_global(root.path(), None).expect_err("should be rejected");
        assert!(matches!(err, GovernanceError::Configuration(_)));
    }

    #[test]
    fn malformed_toml_names_the_file() {
        let root = TempDir::new().expect("root temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[classifier\n")
            .expect("repo config should write");

        let err = load_config_with_global(root.path(), None).expect_err("should be rejected");
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }
}
