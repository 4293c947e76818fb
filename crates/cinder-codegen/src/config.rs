//! Layered compiler configuration
//!
//! Settings are resolved with three layers of precedence (highest wins):
//! 1. Command-line overrides, via [`CompilerConfig::apply_overrides`]
//! 2. Environment variables: `CINDER_SCHEMAS` (a path list) and `CINDER_OUT_DIR`
//! 3. The config file: `cinder.toml`, or the file named on the command line

use cinder_core::{CinderError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "cinder.toml";
pub const DEFAULT_DEFINITIONS_FILE: &str = "components.rs";
pub const DEFAULT_BINDINGS_FILE: &str = "bindings.rs";

/// On-disk shape of `cinder.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfigFile {
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub definitions_file: Option<String>,
    #[serde(default)]
    pub bindings_file: Option<String>,
}

/// Resolved compiler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub schemas: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub definitions_file: String,
    pub bindings_file: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            schemas: vec![PathBuf::from("schemas")],
            out_dir: PathBuf::from("generated"),
            definitions_file: DEFAULT_DEFINITIONS_FILE.to_string(),
            bindings_file: DEFAULT_BINDINGS_FILE.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Load with layered precedence: config file < env vars.
    ///
    /// With `path` the file must exist; without it `./cinder.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = CompilerConfig::default();

        match path {
            Some(path) => {
                let file = Self::load_file(path)?;
                config.merge(file, path.parent());
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() {
                    let file = Self::load_file(&local)?;
                    config.merge(file, None);
                }
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific file only, without env overrides (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = CompilerConfig::default();
        config.merge(Self::load_file(path)?, path.parent());
        Ok(config)
    }

    /// Apply command-line flags; empty or absent values leave settings alone
    pub fn apply_overrides(&mut self, schemas: &[PathBuf], out_dir: Option<&Path>) {
        if !schemas.is_empty() {
            self.schemas = schemas.to_vec();
        }
        if let Some(out_dir) = out_dir {
            self.out_dir = out_dir.to_path_buf();
        }
    }

    pub fn definitions_path(&self) -> PathBuf {
        self.out_dir.join(&self.definitions_file)
    }

    pub fn bindings_path(&self) -> PathBuf {
        self.out_dir.join(&self.bindings_file)
    }

    fn load_file(path: &Path) -> Result<CompilerConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CinderError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// Relative paths in a config file are relative to the file itself
    fn merge(&mut self, file: CompilerConfigFile, base: Option<&Path>) {
        let rebase = |p: PathBuf| match base {
            Some(base) if p.is_relative() && !base.as_os_str().is_empty() => base.join(p),
            _ => p,
        };

        if !file.schemas.is_empty() {
            self.schemas = file.schemas.into_iter().map(rebase).collect();
        }
        if let Some(out_dir) = file.out_dir {
            self.out_dir = rebase(out_dir);
        }
        if let Some(name) = file.definitions_file {
            self.definitions_file = name;
        }
        if let Some(name) = file.bindings_file {
            self.bindings_file = name;
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(paths) = std::env::var_os("CINDER_SCHEMAS") {
            let schemas: Vec<PathBuf> = std::env::split_paths(&paths).collect();
            if !schemas.is_empty() {
                log::debug!("schema directories taken from CINDER_SCHEMAS");
                self.schemas = schemas;
            }
        }
        if let Some(out_dir) = std::env::var_os("CINDER_OUT_DIR") {
            log::debug!("output directory taken from CINDER_OUT_DIR");
            self.out_dir = PathBuf::from(out_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("cinder_config_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.definitions_path(), PathBuf::from("generated/components.rs"));
        assert_eq!(config.bindings_file, "bindings.rs");
    }

    #[test]
    fn test_file_paths_are_relative_to_the_file() {
        let (dir, path) = write_config(
            "relative",
            r#"
            schemas = ["schemas", "/abs/more"]
            out_dir = "gen"
            bindings_file = "glue.rs"
            "#,
        );

        let config = CompilerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.schemas, vec![dir.join("schemas"), PathBuf::from("/abs/more")]);
        assert_eq!(config.out_dir, dir.join("gen"));
        assert_eq!(config.definitions_file, DEFAULT_DEFINITIONS_FILE);
        assert_eq!(config.bindings_path(), dir.join("gen").join("glue.rs"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_overrides_win() {
        let (dir, path) = write_config("overrides", "out_dir = \"gen\"");
        let mut config = CompilerConfig::load_from_file(&path).unwrap();
        config.apply_overrides(&[PathBuf::from("other")], Some(Path::new("out")));
        assert_eq!(config.schemas, vec![PathBuf::from("other")]);
        assert_eq!(config.out_dir, PathBuf::from("out"));

        config.apply_overrides(&[], None);
        assert_eq!(config.out_dir, PathBuf::from("out"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let (dir, path) = write_config("bad", "schemas = 3");
        let err = CompilerConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, CinderError::ConfigError(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
