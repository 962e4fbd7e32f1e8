//! Server configuration loaded from TOML.

use anyhow::Result;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5001";

/// Top-level server configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen configuration.
    pub server: ListenConfig,
    /// Version metadata reported by the `version` command.
    pub build: BuildConfig,
}

/// Listen configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Bind address. When `None`, defaults to [`DEFAULT_BIND`].
    pub bind: Option<String>,
}

/// Version metadata for the `version` command. Values support `${ENV_VAR}`
/// expansion, so a build pipeline can stamp them through the environment.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source revision the server was built from.
    pub commit: CompactString,
    /// On-disk repository format version.
    pub repo: CompactString,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            commit: "unknown".into(),
            repo: "1".into(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML string, expanding `${ENV_VAR}` patterns first.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        let config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The address to bind, falling back to [`DEFAULT_BIND`].
    pub fn bind_address(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// Expand `${VAR}` patterns with environment variable values.
///
/// Unknown variables expand to the empty string; an unterminated pattern
/// is left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                if let Ok(value) = std::env::var(&after[..end]) {
                    out.push_str(&value);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
