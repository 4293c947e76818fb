//! Assembles the two artifacts and writes them to disk

use crate::ir::Program;
use crate::{bindings, structs};
use cinder_core::{ContentHash, Result};
use proc_macro2::TokenStream;
use std::fs;
use std::path::{Path, PathBuf};

/// The generated definitions and bindings sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub definitions: String,
    pub bindings: String,
    /// Hash of the schema set the artifacts were generated from
    pub hash: ContentHash,
}

/// Which artifact files changed on the last write
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl Artifacts {
    pub fn assemble(program: &Program) -> Self {
        let banner = banner(&program.hash);
        Artifacts {
            definitions: render(&banner, &structs::generate(program)),
            bindings: render(&banner, &bindings::generate(program)),
            hash: program.hash,
        }
    }

    /// Write both artifacts into `out_dir`, skipping files whose bytes match
    pub fn write(
        &self,
        out_dir: &Path,
        definitions_file: &str,
        bindings_file: &str,
    ) -> Result<WriteReport> {
        fs::create_dir_all(out_dir)?;

        let mut report = WriteReport::default();
        for (file, contents) in [
            (definitions_file, &self.definitions),
            (bindings_file, &self.bindings),
        ] {
            let path = out_dir.join(file);
            if write_if_changed(&path, contents)? {
                log::info!("wrote {}", path.display());
                report.written.push(path);
            } else {
                log::debug!("{} is up to date", path.display());
                report.unchanged.push(path);
            }
        }
        Ok(report)
    }
}

/// Banner followed by one top-level item per line
fn render(banner: &str, items: &[TokenStream]) -> String {
    let mut out = banner.to_string();
    for item in items {
        out.push_str(&item.to_string());
        out.push('\n');
    }
    out
}

fn banner(hash: &ContentHash) -> String {
    format!(
        "// @generated by cinder-codegen from schema {}. Do not edit.\n",
        hash.to_prefixed_hex()
    )
}

/// Read back the schema hash recorded in an artifact's banner
pub fn banner_hash(artifact: &str) -> Option<ContentHash> {
    let first = artifact.lines().next()?;
    let rest = first.strip_prefix("// @generated by cinder-codegen from schema ")?;
    let hex = rest.strip_suffix(". Do not edit.")?;
    ContentHash::from_prefixed_hex(hex)
}

/// Write `contents` unless the file already holds exactly these bytes.
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::write(path, contents)?;
    Ok(true)
}
