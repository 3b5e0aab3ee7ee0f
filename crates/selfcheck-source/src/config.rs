//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use selfcheck_core::{DatasetFormat, GradingPolicy};

/// Where the dataset lives and how it is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File path or `http(s)://` URL. May contain `${VAR}` references.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(flatten)]
    pub format: DatasetFormat,
}

fn default_source() -> String {
    "course-questions.tsv".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            format: DatasetFormat::default(),
        }
    }
}

/// Top-level selfcheck configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfcheckConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub grading: GradingPolicy,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `selfcheck.toml` in the current directory
/// 2. `~/.config/selfcheck/config.toml`
///
/// `SELFCHECK_DATASET` overrides the dataset source.
pub fn load_config() -> Result<SelfcheckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SelfcheckConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("selfcheck.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SelfcheckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SelfcheckConfig::default(),
    };

    if let Ok(source) = std::env::var("SELFCHECK_DATASET") {
        if !source.is_empty() {
            config.dataset.source = source;
        }
    }
    config.dataset.source = resolve_env_vars(&config.dataset.source);

    anyhow::ensure!(
        config.grading.default_tolerance >= 0.0,
        "grading.default_tolerance must not be negative"
    );
    anyhow::ensure!(
        config.grading.close_pct <= config.grading.directional_pct,
        "grading.close_pct must not exceed grading.directional_pct"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("selfcheck"))
}
