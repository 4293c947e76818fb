//! `repr(C)` record layout over the native field types

use cinder_core::math::{Mat4, Quat, Vec2, Vec3, Vec4};
use cinder_core::{Collection, EntityRef, FieldTag, Text};
use std::alloc::{Layout, LayoutError};

/// Native layout of a primitive tag
pub fn primitive_layout(tag: FieldTag) -> Option<Layout> {
    let layout = match tag {
        FieldTag::Int => Layout::new::<i32>(),
        FieldTag::Float => Layout::new::<f32>(),
        FieldTag::Bool => Layout::new::<bool>(),
        FieldTag::Vec2 => Layout::new::<Vec2>(),
        FieldTag::Vec3 => Layout::new::<Vec3>(),
        FieldTag::Vec4 => Layout::new::<Vec4>(),
        FieldTag::Quaternion => Layout::new::<Quat>(),
        FieldTag::Mat4 => Layout::new::<Mat4>(),
        FieldTag::EntityRef => Layout::new::<EntityRef>(),
        FieldTag::String => Layout::new::<Text>(),
        FieldTag::Subcomponent => return None,
    };
    Some(layout)
}

/// Every `Collection<T>` has the same layout regardless of `T`
pub fn collection_layout() -> Layout {
    Layout::new::<Collection<u8>>()
}

/// Size, alignment and field offsets of a laid-out record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub size: usize,
    pub align: usize,
    pub offsets: Vec<usize>,
}

impl RecordLayout {
    /// Lay fields out in declaration order, as `#[repr(C)]` does
    pub fn compute(fields: impl IntoIterator<Item = Layout>) -> Result<Self, LayoutError> {
        let mut layout = Layout::from_size_align(0, 1)?;
        let mut offsets = Vec::new();
        for field in fields {
            let (extended, offset) = layout.extend(field)?;
            layout = extended;
            offsets.push(offset);
        }
        let layout = layout.pad_to_align();
        Ok(Self {
            size: layout.size(),
            align: layout.align(),
            offsets,
        })
    }

    pub fn as_layout(&self) -> Result<Layout, LayoutError> {
        Layout::from_size_align(self.size, self.align)
    }
}
