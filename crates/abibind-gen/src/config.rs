//! Generator configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::GenError;

/// Options controlling the emitted source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Path of the runtime crate as seen from the generated code
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,
    /// Extra derives added to generated structs and event records
    #[serde(default)]
    pub derives: Vec<String>,
    /// Emit doc comments (signatures, selectors) on generated items
    #[serde(default = "default_docs")]
    pub docs: bool,
}

fn default_runtime_crate() -> String {
    "abibind_runtime".to_string()
}

fn default_docs() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: default_runtime_crate(),
            derives: Vec::new(),
            docs: default_docs(),
        }
    }
}

impl GeneratorConfig {
    pub(crate) fn runtime_path(&self) -> Result<syn::Path, GenError> {
        syn::parse_str(&self.runtime_crate)
            .map_err(|e| GenError::Config(format!("runtime_crate `{}`: {}", self.runtime_crate, e)))
    }

    pub(crate) fn derive_paths(&self) -> Result<Vec<syn::Path>, GenError> {
        self.derives
            .iter()
            .map(|d| {
                syn::parse_str(d).map_err(|e| GenError::Config(format!("derive `{}`: {}", d, e)))
            })
            .collect()
    }
}

/// One contract to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Contract name, used for the generated type names
    pub name: String,
    /// ABI file, relative to the config file
    pub abi: PathBuf,
    /// Module name override (defaults to the snake_case contract name)
    #[serde(default)]
    pub module: Option<String>,
}

/// `abibind.toml`: a set of contracts sharing one generator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Generator options
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Contracts, generated in this order
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
}

impl BuildConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, GenError> {
        let config: BuildConfig =
            toml::from_str(content).map_err(|e| GenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), GenError> {
        let mut seen = std::collections::HashSet::new();
        for contract in &self.contracts {
            if contract.name.trim().is_empty() {
                return Err(GenError::Config("contract with empty name".to_string()));
            }
            if !seen.insert(contract.name.as_str()) {
                return Err(GenError::Config(format!(
                    "contract `{}` listed twice",
                    contract.name
                )));
            }
        }
        Ok(())
    }
}
