//! # abibind-gen
//!
//! Generates typed Rust bindings from contract ABI JSON.
//!
//! - **plan**: resolves the ABI into names, Rust types and tuple structs
//! - **emit**: renders the plan with `quote` and formats it with `prettyplease`
//! - **config**: generator options and `abibind.toml` build lists
//!
//! # Example
//!
//! ```rust,no_run
//! use abibind_gen::Abigen;
//!
//! # fn example() -> Result<(), abibind_gen::GenError> {
//! let bindings = Abigen::from_file("ENSRegistry", "abi/ENSRegistry.json")?.generate()?;
//! bindings.write_to_file("src/ens_registry.rs")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod emit;
mod error;
pub mod naming;
pub mod plan;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use config::{BuildConfig, ContractConfig, GeneratorConfig};
pub use emit::HEADER;
pub use error::GenError;
pub use plan::BindingPlan;
pub use types::TypeBinding;

/// Binding generator for one contract
#[derive(Debug, Clone)]
pub struct Abigen {
    name: String,
    abi: String,
    module: Option<String>,
    config: GeneratorConfig,
}

impl Abigen {
    /// Generator for contract `name` from ABI JSON (or an artifact with an `abi` field)
    pub fn new(name: impl Into<String>, abi: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abi: abi.into(),
            module: None,
            config: GeneratorConfig::default(),
        }
    }

    /// Generator reading its ABI from a file
    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let abi = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Ok(Self::new(name, abi))
    }

    /// Override the module name
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Replace the generator options
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve the ABI without emitting anything
    pub fn plan(&self) -> Result<BindingPlan, GenError> {
        BindingPlan::from_json(&self.name, &self.abi, self.module.as_deref())
    }

    /// Generate the bindings
    pub fn generate(&self) -> Result<Bindings, GenError> {
        let plan = self.plan()?;
        let source = emit::render(&plan, &self.config)?;
        info!(
            contract = %self.name,
            module = %plan.module,
            functions = plan.functions.len(),
            events = plan.events.len(),
            structs = plan.structs.len(),
            "generated bindings"
        );
        Ok(Bindings {
            module_name: plan.module,
            source,
        })
    }
}

/// Generated source for one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    /// Name of the generated `pub mod`
    pub module_name: String,
    /// Formatted Rust source
    pub source: String,
}

impl Bindings {
    /// Write the source to `path`, creating parent directories
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), GenError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
        }
        std::fs::write(path, &self.source).map_err(|e| GenError::io(path, e))?;
        debug!(path = %path.display(), module = %self.module_name, "wrote bindings");
        Ok(())
    }

    /// Whether `path` already holds exactly this source
    pub fn is_up_to_date(&self, path: impl AsRef<Path>) -> bool {
        std::fs::read_to_string(path)
            .map(|existing| existing == self.source)
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Generates several contracts sharing one configuration
#[derive(Debug, Clone, Default)]
pub struct MultiAbigen {
    generators: Vec<Abigen>,
}

impl MultiAbigen {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a generator
    pub fn push(mut self, generator: Abigen) -> Self {
        self.generators.push(generator);
        self
    }

    /// Load every contract of a build config. ABI paths are relative to `base_dir`.
    pub fn from_config(config: &BuildConfig, base_dir: impl AsRef<Path>) -> Result<Self, GenError> {
        let base_dir = base_dir.as_ref();
        let mut multi = Self::new();
        for contract in &config.contracts {
            let mut generator = Abigen::from_file(&contract.name, base_dir.join(&contract.abi))?
                .with_config(config.generator.clone());
            if let Some(module) = &contract.module {
                generator = generator.module(module);
            }
            multi = multi.push(generator);
        }
        Ok(multi)
    }

    /// Load `abibind.toml` and the ABIs it lists
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, GenError> {
        let path = path.as_ref();
        let config = BuildConfig::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_config(&config, base_dir)
    }

    /// Number of contracts
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether no contract is configured
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Generate every contract, failing on the first error
    pub fn generate(&self) -> Result<Vec<Bindings>, GenError> {
        self.generators.iter().map(Abigen::generate).collect()
    }

    /// Generate everything and write `<module>.rs` files into `dir`.
    /// Nothing is written unless every contract generates.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, GenError> {
        let dir = dir.as_ref();
        let bindings = self.generate()?;
        let mut seen = std::collections::HashSet::new();
        for b in &bindings {
            if !seen.insert(b.module_name.as_str()) {
                return Err(GenError::Config(format!(
                    "two contracts generate module `{}`",
                    b.module_name
                )));
            }
        }

        let mut written = Vec::with_capacity(bindings.len());
        for b in &bindings {
            let path = dir.join(format!("{}.rs", b.module_name));
            b.write_to_file(&path)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Modules in `dir` whose content differs from a fresh generation
    pub fn stale_files(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, GenError> {
        let dir = dir.as_ref();
        Ok(self
            .generate()?
            .into_iter()
            .map(|b| (dir.join(format!("{}.rs", b.module_name)), b))
            .filter(|(path, b)| !b.is_up_to_date(path))
            .map(|(path, _)| path)
            .collect())
    }
}
