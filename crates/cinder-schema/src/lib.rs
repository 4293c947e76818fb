//! Cinder Schema - Component schema model and type resolution
//!
//! This crate loads component schemas from TOML or JSON sources, resolves
//! type references between them, synthesizes default values and computes
//! the native record layout that generated code must reproduce.

mod layout;
mod literal;
mod model;
mod registry;
mod resolve;

pub use layout::{collection_layout, primitive_layout, RecordLayout};
pub use literal::DefaultValue;
pub use model::{ComponentSchemaFile, FieldDecl, SchemaSource, TypeDecl, TypeRef};
pub use registry::{schema_files, SchemaSet};
pub use resolve::{resolve, ResolvedField, ResolvedSchema, ResolvedType};
