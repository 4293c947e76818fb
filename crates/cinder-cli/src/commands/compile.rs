//! Schema compilation command

use super::load_schemas;
use anyhow::{Context, Result};
use cinder_codegen::CompilerConfig;

pub fn run(config: &CompilerConfig) -> Result<()> {
    let set = load_schemas(&config.schemas)?;
    let artifacts = cinder_codegen::compile(&set).context("Schema compilation failed")?;

    let report = artifacts
        .write(
            &config.out_dir,
            &config.definitions_file,
            &config.bindings_file,
        )
        .with_context(|| format!("Failed to write artifacts to {}", config.out_dir.display()))?;

    println!(
        "Compiled {} types (schema {})",
        set.len(),
        artifacts.hash.to_prefixed_hex()
    );
    for path in &report.written {
        println!("  wrote     {}", path.display());
    }
    for path in &report.unchanged {
        println!("  unchanged {}", path.display());
    }

    Ok(())
}
