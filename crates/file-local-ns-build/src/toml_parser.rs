//! TOML configuration parser for namespace descriptions.

use std::collections::HashSet;
use std::path::Path;

use file_local_ns::{is_identifier, GeneratorConfig, Layout, BIT_WIDTH};
use serde::Deserialize;
use thiserror::Error;

/// Parsed namespace description.
#[derive(Debug, Clone)]
pub struct NamespacesConfig {
    /// Prefix, shorthand and layout for the unit
    pub generator: GeneratorConfig,
    /// Keep including probe namespaces until the counter crosses the cutoff
    pub force_overflow: bool,
    entries: Vec<NamespaceEntry>,
}

/// One `[[namespace]]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Extra alias bound to this namespace
    pub alias: Option<String>,
    /// Paths re-exported from the namespace (`std::time::*`, `a::B as C`)
    pub reexports: Vec<String>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    prefix: Option<String>,
    shorthand: Option<String>,
    #[serde(default)]
    suppress_shorthand: bool,
    bit_width: Option<u32>,
    /// Must equal 2^bit_width when given
    cutoff: Option<u64>,
    retry_bound: Option<u32>,
    #[serde(default)]
    force_overflow: bool,
    #[serde(default, rename = "namespace")]
    namespaces: Vec<RawNamespace>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNamespace {
    alias: Option<String>,
    #[serde(default)]
    reexports: Vec<String>,
}

impl NamespacesConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let bit_width = raw.bit_width.unwrap_or(BIT_WIDTH);
        let mut layout = match raw.cutoff {
            Some(cutoff) => Layout::with_cutoff(bit_width, cutoff),
            None => Layout::new(bit_width),
        }
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
        // The library accepts a mismatched cutoff; generated code never should.
        layout
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        if let Some(retry_bound) = raw.retry_bound {
            layout = layout.retry_bound(retry_bound);
        }

        let defaults = GeneratorConfig::default();
        let generator = GeneratorConfig {
            prefix: raw.prefix.unwrap_or(defaults.prefix),
            shorthand: raw.shorthand.unwrap_or(defaults.shorthand),
            suppress_shorthand: raw.suppress_shorthand,
            layout,
        };
        generator
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        let entries = Self::validate_namespaces(raw.namespaces, &generator)?;

        Ok(Self {
            generator,
            force_overflow: raw.force_overflow,
            entries,
        })
    }

    /// Get all namespace entries, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &NamespaceEntry> {
        self.entries.iter()
    }

    /// Get entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn validate_namespaces(
        raw: Vec<RawNamespace>,
        generator: &GeneratorConfig,
    ) -> Result<Vec<NamespaceEntry>, ConfigError> {
        let mut aliases: HashSet<String> = HashSet::new();
        if !generator.suppress_shorthand {
            aliases.insert(generator.shorthand.clone());
        }

        let mut entries = Vec::with_capacity(raw.len());
        for (position, ns) in raw.into_iter().enumerate() {
            if let Some(alias) = &ns.alias {
                if !is_identifier(alias) {
                    return Err(ConfigError::Validation(format!(
                        "Invalid alias '{}' in namespace #{}: not a Rust identifier",
                        alias, position
                    )));
                }
                if !aliases.insert(alias.clone()) {
                    return Err(ConfigError::Validation(format!(
                        "Alias '{}' in namespace #{} is already in use",
                        alias, position
                    )));
                }
            }
            for path in &ns.reexports {
                validate_reexport(path)?;
            }
            entries.push(NamespaceEntry {
                alias: ns.alias,
                reexports: ns.reexports,
            });
        }
        Ok(entries)
    }
}

/// Check a re-export: `a::b::c`, `a::b::*`, `::a::b`, or `a::b as c`.
fn validate_reexport(path: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| {
        ConfigError::Validation(format!("Invalid re-export '{}': {}", path, reason))
    };

    let (target, rename) = match path.split_once(" as ") {
        Some((target, rename)) => (target.trim(), Some(rename.trim())),
        None => (path.trim(), None),
    };

    if let Some(rename) = rename
        && !is_identifier(rename)
    {
        return Err(invalid("alias after `as` is not an identifier"));
    }

    let body = target.strip_prefix("::").unwrap_or(target);
    if body.is_empty() {
        return Err(invalid("empty path"));
    }

    let segments: Vec<&str> = body.split("::").collect();
    let last = segments.len() - 1;
    for (i, seg) in segments.iter().enumerate() {
        if *seg == "*" {
            if i != last {
                return Err(invalid("`*` must be the last segment"));
            }
            if rename.is_some() {
                return Err(invalid("a glob cannot be renamed"));
            }
            if i == 0 {
                return Err(invalid("a glob needs a parent path"));
            }
            continue;
        }
        if !is_identifier(seg) {
            return Err(invalid(&format!("segment '{}' is not an identifier", seg)));
        }
    }
    Ok(())
}

/// Errors during config parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}
