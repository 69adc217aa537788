use std::path::PathBuf;

use abibind_gen::MultiAbigen;
use anyhow::{Context, Result};

fn main() -> Result<()> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR not set")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").context("OUT_DIR not set")?);

    let config = manifest_dir.join("abibind.toml");
    println!("cargo:rerun-if-changed={}", config.display());
    println!("cargo:rerun-if-changed={}", manifest_dir.join("abi").display());

    let contracts = MultiAbigen::from_config_file(&config)
        .with_context(|| format!("failed to load {}", config.display()))?;
    contracts
        .write_to_dir(&out_dir)
        .context("failed to generate ENS bindings")?;
    Ok(())
}
