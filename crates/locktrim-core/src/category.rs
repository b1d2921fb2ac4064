//! Category rules for report bucketing.
//!
//! A [`CategoryRules`] value is an ordered, immutable list of
//! `(predicate, label)` pairs. [`CategoryRules::classify`] returns the label
//! of the first rule whose predicate matches; names no rule matches land in
//! [`OTHER_LABEL`]. Rules are built once from configuration and passed to
//! whatever renders the report; nothing here feeds back into graph state.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Label for names no rule matched.
pub const OTHER_LABEL: &str = "other";

/// Serialized form of a rule, as written in `locktrim.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRuleConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exact: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regex: Vec<String>,
    /// Names containing any of these never match this rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_contains: Vec<String>,
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    label: String,
    exact: Vec<String>,
    prefix: Vec<String>,
    suffix: Vec<String>,
    contains: Vec<String>,
    regex: Vec<Regex>,
    exclude_contains: Vec<String>,
}

impl CategoryRule {
    /// Compile a configured rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a `regex` entry does not
    /// compile.
    pub fn compile(config: &CategoryRuleConfig) -> Result<Self, ConfigError> {
        let regex = config
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    label: config.label.clone(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label: config.label.clone(),
            exact: config.exact.clone(),
            prefix: config.prefix.clone(),
            suffix: config.suffix.clone(),
            contains: config.contains.clone(),
            regex,
            exclude_contains: config.exclude_contains.clone(),
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether `name` belongs to this rule's category.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.exclude_contains.iter().any(|s| name.contains(s.as_str())) {
            return false;
        }
        self.exact.iter().any(|s| s == name)
            || self.prefix.iter().any(|s| name.starts_with(s.as_str()))
            || self.suffix.iter().any(|s| name.ends_with(s.as_str()))
            || self.contains.iter().any(|s| name.contains(s.as_str()))
            || self.regex.iter().any(|r| r.is_match(name))
    }
}

/// Names assigned to one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    /// Sorted, deduplicated.
    pub names: Vec<String>,
}

impl Bucket {
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Ordered first-match-wins rule list.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Compile rules in the given order.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compilation failure.
    pub fn compile(configs: &[CategoryRuleConfig]) -> Result<Self, ConfigError> {
        let rules = configs
            .iter()
            .map(CategoryRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Label of the first matching rule, or [`OTHER_LABEL`].
    #[must_use]
    pub fn classify(&self, name: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map_or(OTHER_LABEL, CategoryRule::label)
    }

    /// `true` if `label` names a rule or the fallback bucket.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        label == OTHER_LABEL || self.rules.iter().any(|r| r.label == label)
    }

    /// Group `names` into one bucket per rule (in rule order, empty buckets
    /// included) followed by the fallback bucket.
    #[must_use]
    pub fn bucket<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<Bucket> {
        let mut buckets: Vec<Bucket> = self
            .rules
            .iter()
            .map(|r| Bucket {
                label: r.label.clone(),
                names: Vec::new(),
            })
            .collect();
        let mut other = Vec::new();

        for name in names {
            match self.rules.iter().position(|rule| rule.matches(name)) {
                Some(idx) => buckets[idx].names.push(name.to_string()),
                None => other.push(name.to_string()),
            }
        }

        buckets.push(Bucket {
            label: OTHER_LABEL.to_string(),
            names: other,
        });
        for bucket in &mut buckets {
            bucket.names.sort();
            bucket.names.dedup();
        }
        buckets
    }

    /// Every name in `names` classified under one of `labels`.
    #[must_use]
    pub fn members_of<'a>(
        &self,
        labels: &[String],
        names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut out: Vec<String> = names
            .into_iter()
            .filter(|name| labels.iter().any(|l| l == self.classify(name)))
            .map(str::to_string)
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

fn rule(label: &str) -> CategoryRuleConfig {
    CategoryRuleConfig {
        label: label.to_string(),
        ..CategoryRuleConfig::default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// The built-in rule list in evaluation order.
#[must_use]
pub fn default_rule_configs() -> Vec<CategoryRuleConfig> {
    vec![
        CategoryRuleConfig {
            prefix: strings(&["tokio"]),
            exact: strings(&["mio", "parking_lot", "parking_lot_core", "signal-hook-registry"]),
            ..rule("async_runtime")
        },
        CategoryRuleConfig {
            prefix: strings(&["serde"]),
            exact: strings(&["itoa", "ryu"]),
            ..rule("serde_family")
        },
        CategoryRuleConfig {
            prefix: strings(&["futures"]),
            ..rule("futures_family")
        },
        CategoryRuleConfig {
            exact: strings(&["proc-macro2", "quote", "syn"]),
            contains: strings(&["derive", "proc-macro", "darling"]),
            suffix: strings(&["-macros", "_macros"]),
            ..rule("proc_macro")
        },
        CategoryRuleConfig {
            contains: strings(&["sea-", "sqlx", "postgres", "mysql", "sqlite"]),
            ..rule("database")
        },
        CategoryRuleConfig {
            contains: strings(&["sha", "md5", "hmac", "digest"]),
            ..rule("crypto")
        },
        CategoryRuleConfig {
            contains: strings(&["base64", "hex", "percent", "url"]),
            ..rule("encoding")
        },
        CategoryRuleConfig {
            contains: strings(&["toml", "json"]),
            ..rule("serialization")
        },
        CategoryRuleConfig {
            prefix: strings(&["unicode", "stringprep", "idna", "punycode"]),
            ..rule("string_utils")
        },
        CategoryRuleConfig {
            prefix: strings(&["crossbeam", "thread"]),
            ..rule("concurrency")
        },
        CategoryRuleConfig {
            prefix: strings(&["humantime", "num-", "ordered-", "either", "itertools", "indexmap"]),
            ..rule("misc_utils")
        },
        CategoryRuleConfig {
            exact: strings(&[
                "bytes",
                "pin-project-lite",
                "once_cell",
                "cfg-if",
                "log",
                "memchr",
                "libc",
            ]),
            ..rule("utilities")
        },
    ]
}
