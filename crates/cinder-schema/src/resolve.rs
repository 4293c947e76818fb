//! Type resolution, default synthesis and layout
//!
//! Resolution runs once over the whole [`SchemaSet`]:
//!
//! 1. every field's type spelling becomes a tag, or a reference to a
//!    declared type (`UnknownFieldType` otherwise);
//! 2. every type's default record is synthesized, memoized per type, with
//!    explicit defaults checked against their field types;
//! 3. every record is laid out in declaration order.

use crate::layout::{collection_layout, primitive_layout, RecordLayout};
use crate::literal::{primitive_from_toml, DefaultValue};
use crate::registry::SchemaSet;
use cinder_core::{CinderError, ContentHash, FieldFlags, FieldTag, Result};
use std::collections::HashMap;

/// A field with its tag, flags and byte offset settled
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub tag: FieldTag,
    pub flags: FieldFlags,
    /// Referenced type for `Subcomponent` fields
    pub sub_type: Option<String>,
    pub offset: usize,
    pub default: DefaultValue,
}

impl ResolvedField {
    pub fn is_collection(&self) -> bool {
        self.flags.contains(FieldFlags::IS_COLLECTION)
    }
}

/// A fully resolved record type
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub flags: FieldFlags,
    pub internal: bool,
    /// Always a [`DefaultValue::Record`]
    pub default: DefaultValue,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedType {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Every resolved type, in declared order
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    types: Vec<ResolvedType>,
    index: HashMap<String, usize>,
    hash: ContentHash,
}

impl ResolvedSchema {
    pub fn types(&self) -> &[ResolvedType] {
        &self.types
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Types that can be attached to entities
    pub fn components(&self) -> impl Iterator<Item = &ResolvedType> {
        self.types.iter().filter(|t| !t.internal)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Hash of the schema set this was resolved from
    pub fn content_hash(&self) -> ContentHash {
        self.hash
    }
}

/// Resolve a schema set
pub fn resolve(set: &SchemaSet) -> Result<ResolvedSchema> {
    let mut resolver = Resolver::new(set)?;
    for idx in 0..set.len() {
        resolver.type_default(idx)?;
    }
    for idx in 0..set.len() {
        resolver.type_layout(idx)?;
    }
    resolver.finish()
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Primitive(FieldTag),
    Record(usize),
}

enum Visit<T> {
    Pending,
    Active,
    Done(T),
}

struct Resolver<'a> {
    set: &'a SchemaSet,
    shapes: Vec<Vec<Shape>>,
    defaults: Vec<Visit<DefaultValue>>,
    layouts: Vec<Visit<RecordLayout>>,
    /// Explicit field defaults currently being expanded
    active_fields: Vec<(usize, usize)>,
    stack: Vec<usize>,
}

impl<'a> Resolver<'a> {
    fn new(set: &'a SchemaSet) -> Result<Self> {
        let mut shapes = Vec::with_capacity(set.len());
        for decl in set.types() {
            let mut fields = Vec::with_capacity(decl.fields.len());
            for field in &decl.fields {
                let shape = match FieldTag::from_schema_name(&field.type_name) {
                    Some(tag) => Shape::Primitive(tag),
                    None => match set.position(&field.type_name) {
                        Some(idx) => Shape::Record(idx),
                        None => {
                            return Err(CinderError::UnknownFieldType {
                                path: format!("{}.{}", decl.name, field.name),
                                type_name: field.type_name.clone(),
                            })
                        }
                    },
                };
                fields.push(shape);
            }
            shapes.push(fields);
        }

        Ok(Self {
            set,
            shapes,
            defaults: (0..set.len()).map(|_| Visit::Pending).collect(),
            layouts: (0..set.len()).map(|_| Visit::Pending).collect(),
            active_fields: Vec::new(),
            stack: Vec::new(),
        })
    }

    fn name(&self, idx: usize) -> &'a str {
        let set = self.set;
        set.types()[idx].name.as_str()
    }

    /// Names from the first visit of `idx` on the stack, closed back to `idx`
    fn cycle_path(&self, idx: usize) -> Vec<String> {
        let start = self.stack.iter().position(|&i| i == idx).unwrap_or(0);
        let mut path: Vec<String> = self.stack[start..]
            .iter()
            .map(|&i| self.name(i).to_string())
            .collect();
        if self.stack.last() != Some(&idx) {
            path.push(self.name(idx).to_string());
        }
        path
    }

    fn type_default(&mut self, idx: usize) -> Result<DefaultValue> {
        match &self.defaults[idx] {
            Visit::Done(value) => return Ok(value.clone()),
            Visit::Active => {
                return Err(CinderError::RecursiveDefaultCycle {
                    path: self.cycle_path(idx),
                })
            }
            Visit::Pending => {}
        }

        self.defaults[idx] = Visit::Active;
        self.stack.push(idx);

        let set = self.set;
        let decl = &set.types()[idx];
        let mut fields = Vec::with_capacity(decl.fields.len());
        for (field_idx, field) in decl.fields.iter().enumerate() {
            fields.push((field.name.clone(), self.field_default(idx, field_idx)?));
        }

        self.stack.pop();
        let value = DefaultValue::Record {
            type_name: decl.name.clone(),
            fields,
        };
        self.defaults[idx] = Visit::Done(value.clone());
        Ok(value)
    }

    /// The declared default of one field: explicit if given, else synthesized
    fn field_default(&mut self, type_idx: usize, field_idx: usize) -> Result<DefaultValue> {
        let set = self.set;
        let decl = &set.types()[type_idx];
        let field = &decl.fields[field_idx];
        let path = format!("{}.{}", decl.name, field.name);

        if let Some(explicit) = &field.default {
            if self.active_fields.contains(&(type_idx, field_idx)) {
                return Err(CinderError::RecursiveDefaultCycle {
                    path: self.cycle_path(type_idx),
                });
            }
            self.active_fields.push((type_idx, field_idx));
            let value = self.explicit(type_idx, field_idx, &path, explicit)?;
            self.active_fields.pop();
            return Ok(value);
        }

        if field.vec {
            return Ok(DefaultValue::EmptyCollection);
        }

        match self.shapes[type_idx][field_idx] {
            Shape::Primitive(tag) => {
                DefaultValue::primitive(tag).ok_or_else(|| CinderError::InvalidDefault {
                    path,
                    reason: format!("'{}' has no zero value", tag),
                })
            }
            Shape::Record(sub) => self.type_default(sub),
        }
    }

    fn explicit(
        &mut self,
        type_idx: usize,
        field_idx: usize,
        path: &str,
        value: &toml::Value,
    ) -> Result<DefaultValue> {
        let set = self.set;
        if set.types()[type_idx].fields[field_idx].vec {
            return Err(CinderError::InvalidDefault {
                path: path.to_string(),
                reason: "collections always default to empty".to_string(),
            });
        }
        match self.shapes[type_idx][field_idx] {
            Shape::Primitive(tag) => primitive_from_toml(tag, path, value),
            Shape::Record(sub) => self.explicit_record(sub, path, value),
        }
    }

    /// A table default for a subcomponent: listed keys override, the rest
    /// come from the referenced type's own field defaults
    fn explicit_record(
        &mut self,
        sub: usize,
        path: &str,
        value: &toml::Value,
    ) -> Result<DefaultValue> {
        let set = self.set;
        let decl = &set.types()[sub];
        let toml::Value::Table(table) = value else {
            return Err(CinderError::InvalidDefault {
                path: path.to_string(),
                reason: format!("expected a table for {}", decl.name),
            });
        };
        if let Some(unknown) = table.keys().find(|k| decl.get_field(k).is_none()) {
            return Err(CinderError::InvalidDefault {
                path: path.to_string(),
                reason: format!("{} has no field '{}'", decl.name, unknown),
            });
        }

        self.stack.push(sub);
        let mut fields = Vec::with_capacity(decl.fields.len());
        for (field_idx, field) in decl.fields.iter().enumerate() {
            let value = match table.get(&field.name) {
                Some(given) => {
                    let field_path = format!("{}.{}", path, field.name);
                    self.explicit(sub, field_idx, &field_path, given)?
                }
                None => self.field_default(sub, field_idx)?,
            };
            fields.push((field.name.clone(), value));
        }
        self.stack.pop();

        Ok(DefaultValue::Record {
            type_name: decl.name.clone(),
            fields,
        })
    }

    fn type_layout(&mut self, idx: usize) -> Result<RecordLayout> {
        match &self.layouts[idx] {
            Visit::Done(layout) => return Ok(layout.clone()),
            Visit::Active => {
                return Err(CinderError::RecursiveLayout {
                    path: self.cycle_path(idx),
                })
            }
            Visit::Pending => {}
        }

        self.layouts[idx] = Visit::Active;
        self.stack.push(idx);

        let set = self.set;
        let decl = &set.types()[idx];
        let too_large = |_| CinderError::RecordTooLarge(decl.name.clone());
        let mut field_layouts = Vec::with_capacity(decl.fields.len());
        for (field_idx, field) in decl.fields.iter().enumerate() {
            let layout = if field.vec {
                collection_layout()
            } else {
                match self.shapes[idx][field_idx] {
                    Shape::Primitive(tag) => primitive_layout(tag)
                        .ok_or_else(|| CinderError::RecordTooLarge(decl.name.clone()))?,
                    Shape::Record(sub) => self.type_layout(sub)?.as_layout().map_err(too_large)?,
                }
            };
            field_layouts.push(layout);
        }
        let layout = RecordLayout::compute(field_layouts).map_err(too_large)?;

        self.stack.pop();
        self.layouts[idx] = Visit::Done(layout.clone());
        Ok(layout)
    }

    fn finish(self) -> Result<ResolvedSchema> {
        let set = self.set;
        let mut types = Vec::with_capacity(set.len());
        let mut index = HashMap::new();

        for (idx, (decl, (default, layout))) in set
            .types()
            .iter()
            .zip(self.defaults.into_iter().zip(self.layouts))
            .enumerate()
        {
            let (Visit::Done(default), Visit::Done(layout)) = (default, layout) else {
                return Err(CinderError::RecursiveLayout {
                    path: vec![decl.name.clone()],
                });
            };

            let field_defaults = match &default {
                DefaultValue::Record { fields, .. } => fields.clone(),
                _ => Vec::new(),
            };
            let fields = decl
                .fields
                .iter()
                .zip(&self.shapes[idx])
                .zip(layout.offsets.iter().zip(field_defaults))
                .map(|((field, shape), (&offset, (_, field_default)))| {
                    let (tag, sub_type) = match *shape {
                        Shape::Primitive(tag) => (tag, None),
                        Shape::Record(sub) => {
                            (FieldTag::Subcomponent, Some(set.types()[sub].name.clone()))
                        }
                    };
                    ResolvedField {
                        name: field.name.clone(),
                        tag,
                        flags: field.flags(),
                        sub_type,
                        offset,
                        default: field_default,
                    }
                })
                .collect::<Vec<_>>();

            log::debug!(
                "resolved type {} ({} bytes, align {}, {} fields)",
                decl.name,
                layout.size,
                layout.align,
                fields.len()
            );

            index.insert(decl.name.clone(), types.len());
            types.push(ResolvedType {
                name: decl.name.clone(),
                size: layout.size,
                align: layout.align,
                flags: decl.flags(),
                internal: decl.internal,
                default,
                fields,
            });
        }

        Ok(ResolvedSchema {
            types,
            index,
            hash: set.content_hash()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDecl, SchemaSource, TypeDecl};
    use cinder_core::math::{Quat, Vec3};
    use cinder_core::{Collection, EntityRef, Text};
    use std::mem::{offset_of, size_of};

    fn schema(types: Vec<TypeDecl>) -> SchemaSet {
        SchemaSet::from_sources([SchemaSource::new("test", types)]).unwrap()
    }

    fn resolve_toml(src: &str) -> Result<ResolvedSchema> {
        let mut set = SchemaSet::new();
        set.load_toml_string("test.toml", src)?;
        resolve(&set)
    }

    fn transform() -> TypeDecl {
        TypeDecl::new("Transform")
            .field(FieldDecl::new("position", "vec3"))
            .field(FieldDecl::new("rotation", "quat"))
            .field(FieldDecl::new("scale", "vec3").with_default(toml::Value::Array(vec![
                1.0.into(),
                1.0.into(),
                1.0.into(),
            ])))
    }

    #[repr(C)]
    struct NativeBody {
        transform: NativeTransform,
        name: Text,
        tags: Collection<Text>,
        owner: EntityRef,
        mass: f32,
    }

    #[repr(C)]
    struct NativeTransform {
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    }

    #[test]
    fn test_transform_defaults() {
        let resolved = resolve(&schema(vec![transform()])).unwrap();
        let t = resolved.get("Transform").unwrap();

        assert_eq!(t.default.field("position"), Some(&DefaultValue::Vec3([0.0; 3])));
        assert_eq!(
            t.default.field("rotation"),
            Some(&DefaultValue::Quat([0.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(t.default.field("scale"), Some(&DefaultValue::Vec3([1.0; 3])));
        assert_eq!(t.size, 40);
        let offsets: Vec<_> = t.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 12, 28]);
    }

    #[test]
    fn test_offsets_match_native_layout() {
        let body = TypeDecl::new("Body")
            .field(FieldDecl::new("transform", "Transform"))
            .field(FieldDecl::new("name", "string"))
            .field(FieldDecl::new("tags", "string").collection())
            .field(FieldDecl::new("owner", "entity"))
            .field(FieldDecl::new("mass", "float"));
        // Body is declared before Transform: references bind late
        let resolved = resolve(&schema(vec![body, transform()])).unwrap();
        let b = resolved.get("Body").unwrap();

        let offsets: Vec<_> = b.fields.iter().map(|f| f.offset).collect();
        assert_eq!(
            offsets,
            vec![
                offset_of!(NativeBody, transform),
                offset_of!(NativeBody, name),
                offset_of!(NativeBody, tags),
                offset_of!(NativeBody, owner),
                offset_of!(NativeBody, mass),
            ]
        );
        assert_eq!(b.size, size_of::<NativeBody>());
        assert_eq!(b.field("transform").unwrap().sub_type.as_deref(), Some("Transform"));
        assert_eq!(b.field("transform").unwrap().tag, FieldTag::Subcomponent);
        assert!(b.field("tags").unwrap().is_collection());

        // The nested default is the full Transform default
        let nested = b.default.field("transform").unwrap();
        assert_eq!(nested, &resolved.get("Transform").unwrap().default);
    }

    #[test]
    fn test_unknown_field_type() {
        let decl = TypeDecl::new("Thing").field(FieldDecl::new("part", "Widget"));
        match resolve(&schema(vec![decl])).unwrap_err() {
            CinderError::UnknownFieldType { path, type_name } => {
                assert_eq!(path, "Thing.part");
                assert_eq!(type_name, "Widget");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mutual_recursion_is_a_cycle() {
        let a = TypeDecl::new("A").field(FieldDecl::new("b", "B"));
        let b = TypeDecl::new("B").field(FieldDecl::new("a", "A"));
        let err = resolve(&schema(vec![a, b])).unwrap_err();
        assert_eq!(err.to_string(), "Recursive default cycle: A -> B -> A");
    }

    #[test]
    fn test_self_reference_through_collection_is_fine() {
        let node = TypeDecl::new("Node")
            .field(FieldDecl::new("value", "int"))
            .field(FieldDecl::new("children", "Node").collection());
        let resolved = resolve(&schema(vec![node])).unwrap();
        let n = resolved.get("Node").unwrap();
        assert_eq!(n.default.field("children"), Some(&DefaultValue::EmptyCollection));
    }

    #[test]
    fn test_explicit_subcomponent_default_merges_with_synthesized() {
        let resolved = resolve_toml(
            r#"
[[component]]
name = "Camera"
fields = [
    { name = "fov", type = "float", default = 60 },
    { name = "rig", type = "Transform", default = { position = [0, 2, -5] } },
]

[[component]]
name = "Transform"
fields = [
    { name = "position", type = "vec3" },
    { name = "rotation", type = "quat" },
    { name = "scale", type = "vec3", default = { x = 1, y = 1, z = 1 } },
]
"#,
        )
        .unwrap();
        let rig = resolved.get("Camera").unwrap().default.field("rig").unwrap().clone();
        assert_eq!(rig.field("position"), Some(&DefaultValue::Vec3([0.0, 2.0, -5.0])));
        assert_eq!(rig.field("scale"), Some(&DefaultValue::Vec3([1.0; 3])));
        assert_eq!(
            rig.field("rotation"),
            Some(&DefaultValue::Quat([0.0, 0.0, 0.0, 1.0]))
        );
    }

    #[test]
    fn test_explicit_default_errors() {
        let unknown_key = resolve_toml(
            r#"
[[component]]
name = "A"
fields = [{ name = "t", type = "B", default = { nope = 1 } }]

[[component]]
name = "B"
fields = [{ name = "x", type = "int" }]
"#,
        )
        .unwrap_err();
        assert!(unknown_key.to_string().contains("B has no field 'nope'"));

        let on_collection = resolve_toml(
            r#"
[[component]]
name = "A"
fields = [{ name = "xs", type = "int", vec = true, default = [1, 2] }]
"#,
        )
        .unwrap_err();
        assert!(matches!(on_collection, CinderError::InvalidDefault { .. }));

        let nested_path = resolve_toml(
            r#"
[[component]]
name = "A"
fields = [{ name = "t", type = "B", default = { x = "one" } }]

[[component]]
name = "B"
fields = [{ name = "x", type = "int" }]
"#,
        )
        .unwrap_err();
        match nested_path {
            CinderError::InvalidDefault { path, .. } => assert_eq!(path, "A.t.x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_defaults_cannot_hide_a_cycle() {
        let err = resolve_toml(
            r#"
[[component]]
name = "A"
fields = [{ name = "b", type = "B", default = { a = {} } }]

[[component]]
name = "B"
fields = [{ name = "a", type = "A" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, CinderError::RecursiveDefaultCycle { .. }));
    }

    #[test]
    fn test_layout_cycle_detected_directly() {
        let a = TypeDecl::new("A").field(FieldDecl::new("b", "B"));
        let b = TypeDecl::new("B").field(FieldDecl::new("a", "A"));
        let set = schema(vec![a, b]);
        let mut resolver = Resolver::new(&set).unwrap();
        let err = resolver.type_layout(0).unwrap_err();
        assert_eq!(err.to_string(), "Recursive record layout: A -> B -> A");
    }

    #[test]
    fn test_internal_types_are_not_components() {
        let bounds = TypeDecl::new("Bounds")
            .field(FieldDecl::new("min", "vec3"))
            .field(FieldDecl::new("max", "vec3"))
            .internal();
        let resolved = resolve(&schema(vec![transform(), bounds])).unwrap();
        let names: Vec<_> = resolved.components().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Transform"]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_declared_order_preserved() {
        let resolved = resolve(&schema(vec![
            TypeDecl::new("Zed"),
            TypeDecl::new("Alpha"),
            transform(),
        ]))
        .unwrap();
        let names: Vec<_> = resolved.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Alpha", "Transform"]);
    }
}
