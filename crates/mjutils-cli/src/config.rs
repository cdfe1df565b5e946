//! User configuration – reads/writes `~/.mjutils/config.toml`.

use mjutils_mjcf::ExportOptions;
use mjutils_types::MjError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted defaults stored in `~/.mjutils/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Significant digits used when writing MJCF.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Magnitudes below this are written as `0`.
    #[serde(default = "default_zero_threshold")]
    pub zero_threshold: f64,

    /// Substrings of observable names enabled by `mjutils observables`.
    #[serde(default)]
    pub enabled_observables: Vec<String>,
}

fn default_precision() -> usize {
    ExportOptions::default().precision
}
fn default_zero_threshold() -> f64 {
    ExportOptions::default().zero_threshold
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            zero_threshold: default_zero_threshold(),
            enabled_observables: Vec::new(),
        }
    }
}

impl Config {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            precision: self.precision,
            zero_threshold: self.zero_threshold,
        }
    }
}

/// Return the path to `~/.mjutils/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mjutils").join("config.toml")
}

/// Load the config, falling back to defaults when the file does not exist.
/// Environment overrides apply either way.
pub fn load() -> Result<Config, MjError> {
    let mut cfg = load_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, MjError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| MjError::io(path, e))?;
    let cfg: Config = toml::from_str(&raw).map_err(|e| {
        MjError::Serialization(format!("config {}: {e}", path.display()))
    })?;
    Ok(Some(cfg))
}

/// Apply `MJUTILS_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MJUTILS_PRECISION` | `precision` |
/// | `MJUTILS_ZERO_THRESHOLD` | `zero_threshold` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

/// Unparsable values are ignored.
fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("MJUTILS_PRECISION")
        && let Ok(precision) = v.parse::<usize>()
    {
        cfg.precision = precision;
    }
    if let Some(v) = lookup("MJUTILS_ZERO_THRESHOLD")
        && let Ok(threshold) = v.parse::<f64>()
    {
        cfg.zero_threshold = threshold;
    }
}

/// Save the config to disk, creating `~/.mjutils/` if necessary.
pub fn save(cfg: &Config) -> Result<(), MjError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), MjError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MjError::io(parent, e))?;
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| MjError::Serialization(e.to_string()))?;
    fs::write(path, raw).map_err(|e| MjError::io(path, e))
}
