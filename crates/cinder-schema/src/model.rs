//! Schema declarations as they appear in source files

use cinder_core::{FieldFlags, FieldTag};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// What a field's `type` spelling refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(FieldTag),
    Named(String),
}

/// A single field of a declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// The field holds a collection of `type`
    #[serde(default, skip_serializing_if = "is_false")]
    pub vec: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<toml::Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub serialize: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            vec: false,
            default: None,
            hide: false,
            serialize: true,
        }
    }

    pub fn collection(mut self) -> Self {
        self.vec = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<toml::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    pub fn not_serialized(mut self) -> Self {
        self.serialize = false;
        self
    }

    pub fn type_ref(&self) -> TypeRef {
        match FieldTag::from_schema_name(&self.type_name) {
            Some(tag) => TypeRef::Primitive(tag),
            None => TypeRef::Named(self.type_name.clone()),
        }
    }

    pub fn flags(&self) -> FieldFlags {
        let mut flags = FieldFlags::empty();
        flags.set(FieldFlags::HIDDEN, self.hide);
        flags.set(FieldFlags::IS_COLLECTION, self.vec);
        flags.set(FieldFlags::NOT_SERIALIZED, !self.serialize);
        flags
    }
}

/// A declared record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub serialize: bool,
    /// Usable only as a subcomponent; gets no entity-bound script operations
    #[serde(default, skip_serializing_if = "is_false")]
    pub internal: bool,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            hide: false,
            serialize: true,
            internal: false,
        }
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn flags(&self) -> FieldFlags {
        let mut flags = FieldFlags::empty();
        flags.set(FieldFlags::HIDDEN, self.hide);
        flags.set(FieldFlags::NOT_SERIALIZED, !self.serialize);
        flags
    }
}

/// TOML file format for component schemas
#[derive(Debug, Deserialize)]
pub struct ComponentSchemaFile {
    #[serde(default)]
    pub component: Vec<TypeDecl>,
}

/// One loaded schema source: where it came from and what it declares
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSource {
    pub origin: String,
    pub types: Vec<TypeDecl>,
}

impl SchemaSource {
    pub fn new(origin: impl Into<String>, types: Vec<TypeDecl>) -> Self {
        Self {
            origin: origin.into(),
            types,
        }
    }

    /// Parse `[[component]]` tables
    pub fn from_toml_str(origin: impl Into<String>, content: &str) -> cinder_core::Result<Self> {
        let file: ComponentSchemaFile = toml::from_str(content)?;
        Ok(Self::new(origin, file.component))
    }

    /// Parse a top-level JSON array of type objects
    pub fn from_json_str(origin: impl Into<String>, content: &str) -> cinder_core::Result<Self> {
        let types: Vec<TypeDecl> = serde_json::from_str(content)?;
        Ok(Self::new(origin, types))
    }
}
