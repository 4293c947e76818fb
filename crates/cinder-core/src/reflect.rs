//! Runtime reflection tables emitted for every component type
//!
//! Each generated record gets a static [`ComponentInfo`] describing its
//! size, default value and the tag, flags and byte offset of every field.
//! The table drives [`generic_destruct`], the one release routine shared by
//! all component types.

use crate::handle::{Collection, Text};
use crate::id::EntityId;
use crate::math::{Mat4, Quat, Vec2, Vec3, Vec4};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// The closed set of field kinds a component field can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTag {
    Int,
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Quaternion,
    Mat4,
    EntityRef,
    String,
    Subcomponent,
}

impl FieldTag {
    /// Every primitive tag, in declaration order
    pub const PRIMITIVES: [FieldTag; 10] = [
        FieldTag::Int,
        FieldTag::Float,
        FieldTag::Bool,
        FieldTag::Vec2,
        FieldTag::Vec3,
        FieldTag::Vec4,
        FieldTag::Quaternion,
        FieldTag::Mat4,
        FieldTag::EntityRef,
        FieldTag::String,
    ];

    /// Parse a schema type spelling into a primitive tag
    pub fn from_schema_name(name: &str) -> Option<FieldTag> {
        match name {
            "int" => Some(FieldTag::Int),
            "float" => Some(FieldTag::Float),
            "bool" => Some(FieldTag::Bool),
            "vec2" => Some(FieldTag::Vec2),
            "vec3" => Some(FieldTag::Vec3),
            "vec4" => Some(FieldTag::Vec4),
            "quat" | "versor" => Some(FieldTag::Quaternion),
            "mat4" | "mat4x4" => Some(FieldTag::Mat4),
            "entity" | "Entity" => Some(FieldTag::EntityRef),
            "string" => Some(FieldTag::String),
            _ => None,
        }
    }

    /// Canonical schema spelling
    pub fn schema_name(&self) -> &'static str {
        match self {
            FieldTag::Int => "int",
            FieldTag::Float => "float",
            FieldTag::Bool => "bool",
            FieldTag::Vec2 => "vec2",
            FieldTag::Vec3 => "vec3",
            FieldTag::Vec4 => "vec4",
            FieldTag::Quaternion => "quat",
            FieldTag::Mat4 => "mat4",
            FieldTag::EntityRef => "entity",
            FieldTag::String => "string",
            FieldTag::Subcomponent => "subcomponent",
        }
    }

    pub fn is_primitive(&self) -> bool {
        *self != FieldTag::Subcomponent
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}

bitflags! {
    /// Per-field and per-type flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        /// Not shown by inspectors
        const HIDDEN = 1 << 0;
        /// Field is a `Collection` of its tag's type
        const IS_COLLECTION = 1 << 1;
        /// Skipped by the persistence projection
        const NOT_SERIALIZED = 1 << 2;
    }
}

/// Reflection entry for one field of a record
#[derive(Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub tag: FieldTag,
    pub flags: FieldFlags,
    /// Reflection table of the referenced type for `Subcomponent` fields
    pub sub_type: Option<&'static ComponentInfo>,
    /// Byte offset of the field inside its record
    pub offset: usize,
}

impl FieldInfo {
    pub fn sub_type_name(&self) -> Option<&'static str> {
        self.sub_type.map(|info| info.name)
    }

    pub fn is_collection(&self) -> bool {
        self.flags.contains(FieldFlags::IS_COLLECTION)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("flags", &self.flags)
            .field("sub_type", &self.sub_type_name())
            .field("offset", &self.offset)
            .finish()
    }
}

/// Reflection table for a component record type
pub struct ComponentInfo {
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
    /// The type's default record
    pub default: &'static (dyn Any + Send + Sync),
    /// Releases a record of this type (see [`generic_destruct`])
    pub destruct: unsafe fn(*mut u8),
    /// Releases a `Collection` of this type
    pub release_collection: unsafe fn(*mut u8),
    pub flags: FieldFlags,
    pub fields: &'static [FieldInfo],
}

impl ComponentInfo {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(FieldFlags::HIDDEN)
    }

    /// Fields an inspector should show
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields
            .iter()
            .filter(|f| !f.flags.contains(FieldFlags::HIDDEN))
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("flags", &self.flags)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Look up a reflection table by type name
pub fn find_info(
    infos: &[&'static ComponentInfo],
    name: &str,
) -> Option<&'static ComponentInfo> {
    infos.iter().copied().find(|info| info.name == name)
}

/// Release every owned field of a record, driven by its reflection table.
///
/// `string` fields are reset to empty text, subcomponents are released
/// recursively and collections drop their elements and free their storage.
/// The record stays valid afterwards.
///
/// # Safety
///
/// `component` must point to a live, aligned, exclusively borrowed record
/// whose layout is described by `info`.
pub unsafe fn generic_destruct(info: &ComponentInfo, component: *mut u8) {
    for field in info.fields {
        let ptr = component.add(field.offset);

        if field.is_collection() {
            release_collection(field, ptr);
            continue;
        }

        match field.tag {
            FieldTag::String => (*ptr.cast::<Text>()).release(),
            FieldTag::Subcomponent => {
                if let Some(sub) = field.sub_type {
                    generic_destruct(sub, ptr);
                }
            }
            _ => {}
        }
    }
}

unsafe fn release_collection(field: &FieldInfo, ptr: *mut u8) {
    match field.tag {
        FieldTag::Int => (*ptr.cast::<Collection<i32>>()).release(),
        FieldTag::Float => (*ptr.cast::<Collection<f32>>()).release(),
        FieldTag::Bool => (*ptr.cast::<Collection<bool>>()).release(),
        FieldTag::Vec2 => (*ptr.cast::<Collection<Vec2>>()).release(),
        FieldTag::Vec3 => (*ptr.cast::<Collection<Vec3>>()).release(),
        FieldTag::Vec4 => (*ptr.cast::<Collection<Vec4>>()).release(),
        FieldTag::Quaternion => (*ptr.cast::<Collection<Quat>>()).release(),
        FieldTag::Mat4 => (*ptr.cast::<Collection<Mat4>>()).release(),
        FieldTag::EntityRef => (*ptr.cast::<Collection<EntityId>>()).release(),
        FieldTag::String => (*ptr.cast::<Collection<Text>>()).release(),
        FieldTag::Subcomponent => {
            if let Some(sub) = field.sub_type {
                (sub.release_collection)(ptr);
            }
        }
    }
}

/// A record type with a generated reflection table.
///
/// # Safety
///
/// `info()` must describe `Self` exactly: size, alignment and every field's
/// tag and offset. Generated code checks this at compile time.
pub unsafe trait Reflect: Any + Clone + Default + Send + Sync {
    fn info() -> &'static ComponentInfo;

    /// The type's default record, as stored in its reflection table
    fn default_ref() -> Option<&'static Self> {
        Self::info().default.downcast_ref::<Self>()
    }

    /// Release owned storage, leaving a valid record behind
    fn release(&mut self) {
        // SAFETY: `info()` describes `Self` by the trait contract and `self`
        // is exclusively borrowed.
        unsafe { (Self::info().destruct)((self as *mut Self).cast::<u8>()) }
    }
}

/// A record that can be attached to entities
pub trait Component: Reflect {
    fn type_name() -> &'static str {
        Self::info().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[repr(C)]
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Label {
        text: Text,
        size: f32,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sign {
        title: Label,
        lines: Collection<Text>,
        labels: Collection<Label>,
        owner: EntityId,
    }

    static LABEL_DEFAULT: Label = Label {
        text: Text::EMPTY,
        size: 1.0,
    };
    static LABEL_FIELDS: [FieldInfo; 2] = [
        FieldInfo {
            name: "text",
            tag: FieldTag::String,
            flags: FieldFlags::empty(),
            sub_type: None,
            offset: offset_of!(Label, text),
        },
        FieldInfo {
            name: "size",
            tag: FieldTag::Float,
            flags: FieldFlags::HIDDEN,
            sub_type: None,
            offset: offset_of!(Label, size),
        },
    ];
    static LABEL_INFO: ComponentInfo = ComponentInfo {
        name: "Label",
        size: std::mem::size_of::<Label>(),
        align: std::mem::align_of::<Label>(),
        default: &LABEL_DEFAULT,
        destruct: label_destruct,
        release_collection: label_release_collection,
        flags: FieldFlags::empty(),
        fields: &LABEL_FIELDS,
    };
    unsafe fn label_destruct(component: *mut u8) {
        generic_destruct(&LABEL_INFO, component)
    }
    unsafe fn label_release_collection(collection: *mut u8) {
        (*collection.cast::<Collection<Label>>()).release()
    }
    unsafe impl Reflect for Label {
        fn info() -> &'static ComponentInfo {
            &LABEL_INFO
        }
    }

    static SIGN_DEFAULT: Sign = Sign {
        title: Label {
            text: Text::EMPTY,
            size: 1.0,
        },
        lines: Collection::new(),
        labels: Collection::new(),
        owner: EntityId::NULL,
    };
    static SIGN_FIELDS: [FieldInfo; 4] = [
        FieldInfo {
            name: "title",
            tag: FieldTag::Subcomponent,
            flags: FieldFlags::empty(),
            sub_type: Some(&LABEL_INFO),
            offset: offset_of!(Sign, title),
        },
        FieldInfo {
            name: "lines",
            tag: FieldTag::String,
            flags: FieldFlags::IS_COLLECTION,
            sub_type: None,
            offset: offset_of!(Sign, lines),
        },
        FieldInfo {
            name: "labels",
            tag: FieldTag::Subcomponent,
            flags: FieldFlags::IS_COLLECTION,
            sub_type: Some(&LABEL_INFO),
            offset: offset_of!(Sign, labels),
        },
        FieldInfo {
            name: "owner",
            tag: FieldTag::EntityRef,
            flags: FieldFlags::empty(),
            sub_type: None,
            offset: offset_of!(Sign, owner),
        },
    ];
    static SIGN_INFO: ComponentInfo = ComponentInfo {
        name: "Sign",
        size: std::mem::size_of::<Sign>(),
        align: std::mem::align_of::<Sign>(),
        default: &SIGN_DEFAULT,
        destruct: sign_destruct,
        release_collection: sign_release_collection,
        flags: FieldFlags::empty(),
        fields: &SIGN_FIELDS,
    };
    unsafe fn sign_destruct(component: *mut u8) {
        generic_destruct(&SIGN_INFO, component)
    }
    unsafe fn sign_release_collection(collection: *mut u8) {
        (*collection.cast::<Collection<Sign>>()).release()
    }
    unsafe impl Reflect for Sign {
        fn info() -> &'static ComponentInfo {
            &SIGN_INFO
        }
    }

    #[test]
    fn test_schema_names_roundtrip() {
        for tag in FieldTag::PRIMITIVES {
            assert_eq!(FieldTag::from_schema_name(tag.schema_name()), Some(tag));
        }
        assert_eq!(FieldTag::from_schema_name("versor"), Some(FieldTag::Quaternion));
        assert_eq!(FieldTag::from_schema_name("Transform"), None);
    }

    #[test]
    fn test_default_ref() {
        let d = Label::default_ref().unwrap();
        assert_eq!(d.size, 1.0);
    }

    #[test]
    fn test_generic_destruct_releases_nested_fields() {
        let mut sign = Sign {
            title: Label {
                text: Text::from("Welcome"),
                size: 2.0,
            },
            lines: vec![Text::from("a"), Text::from("b")].into(),
            labels: vec![Label {
                text: Text::from("x"),
                size: 3.0,
            }]
            .into(),
            owner: EntityId::from_raw(7),
        };

        sign.release();

        assert!(sign.title.text.is_empty());
        assert_eq!(sign.title.size, 2.0);
        assert_eq!(sign.lines.capacity(), 0);
        assert_eq!(sign.labels.capacity(), 0);
        assert_eq!(sign.owner, EntityId::from_raw(7));
    }

    #[test]
    fn test_visible_fields_skip_hidden() {
        let names: Vec<_> = LABEL_INFO.visible_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["text"]);
    }

    #[test]
    fn test_find_info() {
        let infos: [&'static ComponentInfo; 2] = [&LABEL_INFO, &SIGN_INFO];
        assert_eq!(find_info(&infos, "Sign").map(|i| i.field_count()), Some(4));
        assert!(find_info(&infos, "Missing").is_none());
        assert_eq!(SIGN_INFO.field("title").and_then(|f| f.sub_type_name()), Some("Label"));
    }
}
