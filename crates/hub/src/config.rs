//! Hub configuration via `pact.toml`
//!
//! Supplies the per-namespace contract lists that resolution consumes: the
//! namespace's default contracts and each module's opt-in list. Namespaces
//! and modules that are not configured simply have empty lists.

use pact_core::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file name conventionally used for a hub.
pub const CONFIG_FILE_NAME: &str = "pact.toml";

/// Per-module settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Contracts this module opts into. A list or a `"a,b"` string.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub contracts: Vec<String>,
}

/// Per-namespace settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Contracts applied to every module of the namespace, in order.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub default_contracts: Vec<String>,
    /// Check implementations against contract-declared signatures at build time.
    #[serde(default)]
    pub verify_signatures: bool,
    /// Module settings keyed by module name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, ModuleConfig>,
}

/// Hub configuration loaded from `pact.toml`.
///
/// # Example
///
/// ```toml
/// [namespaces.mods]
/// default_contracts = ["auth", "audit"]
/// verify_signatures = true
///
/// [namespaces.mods.modules.test]
/// contracts = "extra,metrics"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HubConfig {
    /// Namespace settings keyed by dotted namespace name.
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceConfig>,
}

impl HubConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Pact hub configuration
#
# Each namespace may name default contracts, applied to every module in the
# namespace after the module's own contract and the namespace's "init".
# Every name listed here must exist, or building the hub fails.
#
# [namespaces.mods]
# default_contracts = ["auth", "audit"]
# verify_signatures = false      # check contract-declared signatures at build
#
# Modules may opt into further contracts, as a list or a "a,b" string.
# Unknown names are ignored.
#
# [namespaces.mods.modules.test]
# contracts = ["extra"]
"#
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the string is not valid config TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("Failed to write config file '{}': {}", path.display(), e),
        })
    }

    /// Settings for `namespace`, created empty if absent.
    pub fn namespace_mut(&mut self, namespace: &str) -> &mut NamespaceConfig {
        self.namespaces.entry(namespace.to_string()).or_default()
    }

    /// Default contracts of `namespace`
    pub fn default_contracts(&self, namespace: &str) -> &[String] {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.default_contracts.as_slice())
            .unwrap_or(&[])
    }

    /// Contracts `module` of `namespace` opts into
    pub fn opt_in(&self, namespace: &str, module: &str) -> &[String] {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.modules.get(module))
            .map(|m| m.contracts.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `namespace` verifies contract-declared signatures
    pub fn verify_signatures(&self, namespace: &str) -> bool {
        self.namespaces
            .get(namespace)
            .map(|ns| ns.verify_signatures)
            .unwrap_or(false)
    }
}

fn list_or_csv<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Names {
        List(Vec<String>),
        Csv(String),
    }

    let names = match Names::deserialize(deserializer)? {
        Names::List(names) => names,
        Names::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}
