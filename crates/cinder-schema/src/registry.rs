//! Schema set for loading and merging schema sources

use crate::model::{SchemaSource, TypeDecl};
use cinder_core::{CinderError, ContentHash, FieldTag, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Every declared type, concatenated in load order.
///
/// Type names are unique across all sources; references between types are
/// resolved later, so a type may refer to one declared in a later file.
#[derive(Debug, Default, Clone)]
pub struct SchemaSet {
    types: Vec<TypeDecl>,
    origins: Vec<String>,
    index: HashMap<String, usize>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from sources in order
    pub fn from_sources(sources: impl IntoIterator<Item = SchemaSource>) -> Result<Self> {
        let mut set = Self::new();
        for source in sources {
            set.add_source(source)?;
        }
        Ok(set)
    }

    /// Load every schema file of each directory, directories in the given order
    pub fn load_from_directories(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut set = Self::new();
        for path in paths {
            set.load_directory(path)?;
        }
        Ok(set)
    }

    /// Load `*.toml` and `*.json` files of a directory in file-name order
    pub fn load_directory<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        for file_path in schema_files(path.as_ref())? {
            self.load_file(&file_path)?;
        }
        Ok(())
    }

    /// Load a single TOML or JSON schema file
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let origin = path.display().to_string();
        let source = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SchemaSource::from_json_str(origin, &content)?,
            _ => SchemaSource::from_toml_str(origin, &content)?,
        };
        log::debug!(
            "loaded {} type(s) from {}",
            source.types.len(),
            source.origin
        );
        self.add_source(source)
    }

    /// Load a TOML schema from a string
    pub fn load_toml_string(&mut self, origin: &str, content: &str) -> Result<()> {
        self.add_source(SchemaSource::from_toml_str(origin, content)?)
    }

    /// Append a source, rejecting duplicate or malformed names
    pub fn add_source(&mut self, source: SchemaSource) -> Result<()> {
        let SchemaSource { origin, types } = source;
        for decl in types {
            self.add_type(&origin, decl)?;
        }
        Ok(())
    }

    fn add_type(&mut self, origin: &str, decl: TypeDecl) -> Result<()> {
        if let Some(&existing) = self.index.get(&decl.name) {
            return Err(CinderError::DuplicateType {
                name: decl.name,
                first: self.origins[existing].clone(),
                second: origin.to_string(),
            });
        }

        validate_identifier(&decl.name)?;
        if FieldTag::from_schema_name(&decl.name).is_some()
            || RUST_PRIMITIVES.contains(&decl.name.as_str())
        {
            return Err(CinderError::InvalidIdentifier(decl.name));
        }

        let mut seen = HashSet::new();
        for field in &decl.fields {
            validate_identifier(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(CinderError::DuplicateField {
                    type_name: decl.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        self.index.insert(decl.name.clone(), self.types.len());
        self.types.push(decl);
        self.origins.push(origin.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn origin_of(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&i| self.origins[i].as_str())
    }

    /// Declared types in load order
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Hash over the canonical form of every declaration, in order
    pub fn content_hash(&self) -> Result<ContentHash> {
        let chunks = self
            .types
            .iter()
            .map(serde_json::to_vec)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ContentHash::from_chunks(chunks.iter().map(Vec::as_slice)))
    }
}

/// Schema files of a directory, sorted by file name
pub fn schema_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let file_path = entry?.path();
        let is_schema = file_path
            .extension()
            .map(|e| e == "toml" || e == "json")
            .unwrap_or(false);
        if is_schema && file_path.is_file() {
            files.push(file_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Type names that would shadow a built-in type in generated code
const RUST_PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

fn validate_identifier(name: &str) -> Result<()> {
    syn::parse_str::<syn::Ident>(name)
        .map(|_| ())
        .map_err(|_| CinderError::InvalidIdentifier(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDecl;
    use cinder_core::ErrorKind;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cinder-schema-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_toml_string() {
        let toml = r#"
[[component]]
name = "Door"
fields = [
    { name = "locked", type = "bool", default = false },
    { name = "hinge", type = "Hinge" },
]
"#;
        let mut set = SchemaSet::new();
        set.load_toml_string("door.toml", toml).unwrap();

        let door = set.get("Door").unwrap();
        assert_eq!(door.field_names(), vec!["locked", "hinge"]);
        assert_eq!(set.origin_of("Door"), Some("door.toml"));
    }

    #[test]
    fn test_duplicate_type_names_both_origins() {
        let a = SchemaSource::new("a.toml", vec![TypeDecl::new("Health")]);
        let b = SchemaSource::new("b.json", vec![TypeDecl::new("Health")]);
        let err = SchemaSet::from_sources([a, b]).unwrap_err();
        match err {
            CinderError::DuplicateType { name, first, second } => {
                assert_eq!(name, "Health");
                assert_eq!(first, "a.toml");
                assert_eq!(second, "b.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_field() {
        let decl = TypeDecl::new("Pair")
            .field(FieldDecl::new("a", "int"))
            .field(FieldDecl::new("a", "float"));
        let err = SchemaSet::from_sources([SchemaSource::new("x", vec![decl])]).unwrap_err();
        assert!(matches!(err, CinderError::DuplicateField { .. }));
    }

    #[test]
    fn test_invalid_identifiers() {
        for bad in ["type", "3d", "has space", "vec3"] {
            let decl = TypeDecl::new(bad);
            let err = SchemaSet::from_sources([SchemaSource::new("x", vec![decl])]).unwrap_err();
            assert!(matches!(err, CinderError::InvalidIdentifier(_)), "{bad}");
        }

        let decl = TypeDecl::new("Ok").field(FieldDecl::new("match", "int"));
        let err = SchemaSet::from_sources([SchemaSource::new("x", vec![decl])]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_primitive_type_names_rejected() {
        for bad in ["f32", "i32", "str", "bool", "u8"] {
            let decl = TypeDecl::new(bad).field(FieldDecl::new("v", "int"));
            let err = SchemaSet::from_sources([SchemaSource::new("x", vec![decl])]).unwrap_err();
            assert!(matches!(err, CinderError::InvalidIdentifier(ref n) if n == bad), "{bad}");
        }

        // Field names may still use them
        let decl = TypeDecl::new("Sample").field(FieldDecl::new("f32", "float"));
        let set = SchemaSet::from_sources([SchemaSource::new("x", vec![decl])]).unwrap();
        assert!(set.get("Sample").is_some());
    }

    #[test]
    fn test_directory_loads_in_file_name_order() {
        let dir = scratch_dir("order");
        fs::write(
            dir.join("b_body.toml"),
            "[[component]]\nname = \"Body\"\nfields = [{ name = \"t\", type = \"Transform\" }]\n",
        )
        .unwrap();
        fs::write(
            dir.join("a_transform.json"),
            r#"[{ "name": "Transform", "fields": [{ "name": "position", "type": "vec3" }] }]"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let set = SchemaSet::load_from_directories(&[&dir]).unwrap();
        assert_eq!(set.type_names(), vec!["Transform", "Body"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_content_hash_tracks_declarations() {
        let one = SchemaSet::from_sources([SchemaSource::new(
            "x",
            vec![TypeDecl::new("A").field(FieldDecl::new("v", "int"))],
        )])
        .unwrap();
        let same = SchemaSet::from_sources([SchemaSource::new(
            "y",
            vec![TypeDecl::new("A").field(FieldDecl::new("v", "int"))],
        )])
        .unwrap();
        let other = SchemaSet::from_sources([SchemaSource::new(
            "x",
            vec![TypeDecl::new("A").field(FieldDecl::new("v", "float"))],
        )])
        .unwrap();

        assert_eq!(one.content_hash().unwrap(), same.content_hash().unwrap());
        assert_ne!(one.content_hash().unwrap(), other.content_hash().unwrap());
    }
}
