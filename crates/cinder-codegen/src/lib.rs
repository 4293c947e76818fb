//! Cinder code generator
//!
//! Compiles a [`SchemaSet`] into two Rust sources: the definitions artifact
//! (records, defaults, reflection tables) and the bindings artifact (script
//! marshalling and entity-bound operations). Both refer to the runtime only
//! through `::cinder` paths.
//!
//! A build script typically calls [`build`]:
//!
//! ```ignore
//! fn main() {
//!     cinder_codegen::build("schemas").expect("component schemas must compile");
//! }
//! ```
//!
//! and the crate includes the results:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/components.rs"));
//! include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
//! ```

mod assembly;
mod bindings;
pub mod config;
pub mod ir;
mod structs;

pub use assembly::{banner_hash, write_if_changed, Artifacts, WriteReport};
pub use config::CompilerConfig;
pub use ir::Program;

use cinder_core::{CinderError, Result};
use cinder_schema::{resolve, schema_files, SchemaSet};
use std::path::{Path, PathBuf};

/// Compile a loaded schema set into artifacts. Schema errors are fatal and
/// produce no output.
pub fn compile(set: &SchemaSet) -> Result<Artifacts> {
    let schema = resolve(set)?;
    let program = Program::lower(&schema)?;
    log::debug!("lowered {} types", program.len());
    Ok(Artifacts::assemble(&program))
}

/// Load every schema file of `dirs`, in order, and compile them
pub fn compile_dirs(dirs: &[impl AsRef<Path>]) -> Result<Artifacts> {
    let set = SchemaSet::load_from_directories(dirs)?;
    compile(&set)
}

/// Compile and write artifacts as configured
pub fn compile_with_config(config: &CompilerConfig) -> Result<WriteReport> {
    let artifacts = compile_dirs(config.schemas.as_slice())?;
    artifacts.write(
        &config.out_dir,
        &config.definitions_file,
        &config.bindings_file,
    )
}

/// Build-script entry point: compile `schema_dir` into `$OUT_DIR` and ask
/// cargo to rerun when any schema changes
pub fn build(schema_dir: impl AsRef<Path>) -> Result<WriteReport> {
    let schema_dir = schema_dir.as_ref();
    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| CinderError::ConfigError("OUT_DIR is not set".to_string()))?;

    println!("cargo:rerun-if-changed={}", schema_dir.display());
    for file in schema_files(schema_dir)? {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let config = CompilerConfig {
        schemas: vec![schema_dir.to_path_buf()],
        out_dir,
        ..CompilerConfig::default()
    };
    compile_with_config(&config)
}
