use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::{CategoryRuleConfig, CategoryRules, default_rule_configs};

/// File name looked up in the working directory when `--config` is absent.
pub const PROJECT_CONFIG_FILE: &str = "locktrim.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("category `{label}` has invalid regex `{pattern}`: {source}")]
    InvalidPattern {
        label: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// How records sharing a package name are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Key shared names as `"name version"`; unique names stay bare.
    #[default]
    Qualify,
    /// Keep the last record with a given name.
    LastWins,
    /// Keep the first record with a given name.
    FirstWins,
    /// Refuse to build the graph.
    Reject,
}

impl CollisionPolicy {
    pub const ALL: [Self; 4] = [Self::Qualify, Self::LastWins, Self::FirstWins, Self::Reject];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qualify => "qualify",
            Self::LastWins => "last-wins",
            Self::FirstWins => "first-wins",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!("unknown collision policy `{s}` (expected qualify, last-wins, first-wins or reject)")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Packages with strictly more dependents than this are critical.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: usize,
    /// Critical-path expansion follows dependencies with more dependents
    /// than this.
    #[serde(default = "default_expand_floor")]
    pub expand_floor: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            critical_threshold: default_critical_threshold(),
            expand_floor: default_expand_floor(),
        }
    }
}

/// A named removal experiment written by `locktrim variants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category labels whose members are removed.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Explicit package names to remove.
    #[serde(default)]
    pub names: Vec<String>,
    /// Also remove dependencies left without dependents.
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Default root set for `closure` and `prune`.
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub collision: CollisionPolicy,
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Ordered category rules; empty means the built-in list.
    #[serde(default)]
    pub categories: Vec<CategoryRuleConfig>,
    /// Removal variants; empty means the built-in list.
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

impl ProjectConfig {
    /// Compile the configured category rules, or the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for a bad regex.
    pub fn category_rules(&self) -> Result<CategoryRules, ConfigError> {
        if self.categories.is_empty() {
            CategoryRules::compile(&default_rule_configs())
        } else {
            CategoryRules::compile(&self.categories)
        }
    }

    /// Configured variants, or the built-in ones.
    #[must_use]
    pub fn effective_variants(&self) -> Vec<VariantConfig> {
        if self.variants.is_empty() {
            default_variants()
        } else {
            self.variants.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Preferred output mode (`pretty`, `text`, `json`).
    #[serde(default)]
    pub output: Option<String>,
}

/// Load project configuration.
///
/// An explicit `path` must exist. Without one, `<dir>/locktrim.toml` is used
/// when present and defaults otherwise.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_project_config(path: Option<&Path>, dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let candidate = dir.join(PROJECT_CONFIG_FILE);
            if !candidate.exists() {
                debug!("no project config, using defaults");
                return Ok(ProjectConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_project_config(&content, &path)?;
    debug!(path = %path.display(), roots = config.roots.len(), "project config loaded");
    Ok(config)
}

fn parse_project_config(content: &str, path: &Path) -> Result<ProjectConfig, ConfigError> {
    toml::from_str::<ProjectConfig>(content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load `~/.config/locktrim/config.toml`, or defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<UserConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("locktrim/config.toml"))
}

const fn default_critical_threshold() -> usize {
    5
}

const fn default_expand_floor() -> usize {
    2
}

fn default_variants() -> Vec<VariantConfig> {
    let variant = |label: &str, description: &str, categories: &[&str]| VariantConfig {
        label: label.to_string(),
        description: Some(description.to_string()),
        categories: categories.iter().map(|c| (*c).to_string()).collect(),
        names: Vec::new(),
        cascade: false,
    };
    vec![
        variant(
            "no_database",
            "Remove all database-related packages",
            &["database"],
        ),
        variant(
            "no_proc_macro",
            "Remove proc-macro and derive packages",
            &["proc_macro"],
        ),
        variant(
            "no_misc",
            "Remove misc utility packages",
            &["crypto", "encoding", "string_utils", "misc_utils"],
        ),
    ]
}
