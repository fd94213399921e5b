//! Configuration Loader
//!
//! Environment-aware configuration loading: discovers `rota.yaml` plus an
//! optional `rota.<environment>.yaml` overlay in a config directory and
//! deep-merges the two, overlay values winning. The merged document is
//! deserialized and validated before use.

use super::error::{ConfigResult, ConfigurationError};
use super::SchedulerConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::Path;
use tracing::debug;

const BASE_CONFIG_FILE: &str = "rota.yaml";

/// Detect the running environment from `ROTA_ENV`, falling back to
/// `APP_ENV`, then `development`.
pub fn detect_environment() -> String {
    env::var("ROTA_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Load configuration from a directory with environment auto-detection.
pub fn load_from_dir(config_dir: &Path) -> ConfigResult<SchedulerConfig> {
    load_from_dir_with_env(config_dir, &detect_environment())
}

/// Load configuration from a directory for an explicit environment. Useful
/// in tests, which should not mutate process-global environment variables.
pub fn load_from_dir_with_env(config_dir: &Path, environment: &str) -> ConfigResult<SchedulerConfig> {
    let base_path = config_dir.join(BASE_CONFIG_FILE);
    debug!(
        environment,
        path = %base_path.display(),
        "loading scheduler configuration"
    );

    let base = read_yaml(&base_path)?;

    let overlay_path = config_dir.join(format!("rota.{environment}.yaml"));
    let merged = if overlay_path.exists() {
        debug!(path = %overlay_path.display(), "applying environment overlay");
        merge_values(base, read_yaml(&overlay_path)?)
    } else {
        base
    };

    let config: SchedulerConfig =
        serde_yaml::from_value(merged).map_err(|source| ConfigurationError::Parse {
            path: base_path.display().to_string(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration from a YAML string. Partial documents are fine:
/// omitted fields take their defaults.
pub fn from_yaml_str(yaml: &str) -> ConfigResult<SchedulerConfig> {
    let config: SchedulerConfig =
        serde_yaml::from_str(yaml).map_err(|source| ConfigurationError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

fn read_yaml(path: &Path) -> ConfigResult<YamlValue> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigurationError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigurationError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Deep-merge two YAML values. Mappings merge key by key with the overlay
/// winning; any other value kind is replaced wholesale.
fn merge_values(base: YamlValue, overlay: YamlValue) -> YamlValue {
    match (base, overlay) {
        (YamlValue::Mapping(mut base_map), YamlValue::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            YamlValue::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}
