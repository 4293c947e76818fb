//! CLI command implementations

pub mod check;
pub mod compile;
pub mod inspect;

use anyhow::{Context, Result};
use cinder_schema::SchemaSet;
use std::path::PathBuf;

/// Load every schema directory, failing early on missing ones
pub(crate) fn load_schemas(dirs: &[PathBuf]) -> Result<SchemaSet> {
    for dir in dirs {
        if !dir.exists() {
            anyhow::bail!("Schemas directory not found: {}", dir.display());
        }
    }
    SchemaSet::load_from_directories(dirs).context("Failed to load schemas")
}
