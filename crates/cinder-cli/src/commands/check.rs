//! Schema validation command

use super::load_schemas;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(schemas: &[PathBuf]) -> Result<()> {
    let set = load_schemas(schemas)?;
    let resolved = cinder_schema::resolve(&set).context("Schema check failed")?;
    cinder_codegen::Program::lower(&resolved).context("Schema check failed")?;

    for ty in resolved.types() {
        let origin = set.origin_of(&ty.name).unwrap_or("?");
        let kind = if ty.internal { "internal" } else { "component" };
        println!(
            "  {:<24} {:<9} size {:>4}  align {:>2}  ({})",
            ty.name, kind, ty.size, ty.align, origin
        );
    }

    println!();
    println!(
        "OK: {} types, {} components",
        resolved.len(),
        resolved.components().count()
    );
    Ok(())
}
