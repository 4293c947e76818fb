//! The intermediate tree emitted code is built from
//!
//! Lowering turns each [`ResolvedType`] into a [`RecordDef`] (the native
//! struct and its default), an [`InfoDef`] (the reflection table) and a
//! [`BindingDef`] (the script glue). [`Program::check`] verifies the three
//! agree before anything is serialized.

use cinder_core::{CinderError, ContentHash, FieldFlags, FieldTag, Result};
use cinder_schema::{DefaultValue, ResolvedSchema, ResolvedType};
use std::collections::HashSet;

/// Element type of a record field
#[derive(Debug, Clone, PartialEq)]
pub enum ElemType {
    Primitive(FieldTag),
    Record(String),
}

/// Native type of a record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub elem: ElemType,
    pub collection: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: FieldType,
    pub offset: usize,
    pub default: DefaultValue,
}

/// The `#[repr(C)]` struct of one type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDef {
    pub name: String,
    pub size: usize,
    pub align: usize,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoField {
    pub name: String,
    pub tag: FieldTag,
    pub flags: FieldFlags,
    pub sub_type: Option<String>,
    pub offset: usize,
}

/// The reflection table of one type
#[derive(Debug, Clone, PartialEq)]
pub struct InfoDef {
    pub name: String,
    pub flags: FieldFlags,
    pub fields: Vec<InfoField>,
}

/// Script glue of one type
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDef {
    pub name: String,
    /// Attachable to entities; internal types only get marshalling
    pub component: bool,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefs {
    pub record: RecordDef,
    pub info: InfoDef,
    pub binding: BindingDef,
}

/// Everything one compilation emits, in declared order
#[derive(Debug, Clone)]
pub struct Program {
    pub types: Vec<TypeDefs>,
    pub hash: ContentHash,
}

impl Program {
    /// Lower a resolved schema and check the result
    pub fn lower(schema: &ResolvedSchema) -> Result<Self> {
        let program = Program {
            types: schema.types().iter().map(lower_type).collect(),
            hash: schema.content_hash(),
        };
        program.check()?;
        Ok(program)
    }

    /// Verify reflection tables agree with their records and that every
    /// sub-type reference names a type of this program
    pub fn check(&self) -> Result<()> {
        let mut names = HashSet::new();
        for defs in &self.types {
            if !names.insert(defs.record.name.as_str()) {
                return Err(CinderError::DuplicateRecord(defs.record.name.clone()));
            }
        }

        for TypeDefs {
            record,
            info,
            binding,
        } in &self.types
        {
            if info.fields.len() != record.fields.len() || binding.fields.len() != record.fields.len()
            {
                return Err(CinderError::LayoutMismatch {
                    path: format!("{}[fields]", record.name),
                    record: record.fields.len(),
                    reflected: info.fields.len(),
                });
            }

            for ((field, reflected), bound) in
                record.fields.iter().zip(&info.fields).zip(&binding.fields)
            {
                let path = format!("{}.{}", record.name, field.name);
                if field.name != reflected.name
                    || &field.name != bound
                    || field.offset != reflected.offset
                    || field.offset > record.size
                {
                    return Err(CinderError::LayoutMismatch {
                        path,
                        record: field.offset,
                        reflected: reflected.offset,
                    });
                }
                if field.ty.elem == ElemType::Primitive(FieldTag::Subcomponent) {
                    return Err(CinderError::UnknownFieldType {
                        path,
                        type_name: FieldTag::Subcomponent.to_string(),
                    });
                }
                if let Some(sub) = &reflected.sub_type {
                    if !names.contains(sub.as_str()) {
                        return Err(CinderError::UnknownFieldType {
                            path,
                            type_name: sub.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Definitions of types that can be attached to entities
    pub fn components(&self) -> impl Iterator<Item = &TypeDefs> {
        self.types.iter().filter(|t| t.binding.component)
    }
}

fn lower_type(ty: &ResolvedType) -> TypeDefs {
    let record = RecordDef {
        name: ty.name.clone(),
        size: ty.size,
        align: ty.align,
        fields: ty
            .fields
            .iter()
            .map(|f| RecordField {
                name: f.name.clone(),
                ty: FieldType {
                    elem: match &f.sub_type {
                        Some(sub) => ElemType::Record(sub.clone()),
                        None => ElemType::Primitive(f.tag),
                    },
                    collection: f.is_collection(),
                },
                offset: f.offset,
                default: f.default.clone(),
            })
            .collect(),
    };

    // Offsets come from the laid-out record, not from the resolver again
    let info = InfoDef {
        name: ty.name.clone(),
        flags: ty.flags,
        fields: ty
            .fields
            .iter()
            .zip(&record.fields)
            .map(|(f, laid_out)| InfoField {
                name: f.name.clone(),
                tag: f.tag,
                flags: f.flags,
                sub_type: f.sub_type.clone(),
                offset: laid_out.offset,
            })
            .collect(),
    };

    let binding = BindingDef {
        name: ty.name.clone(),
        component: !ty.internal,
        fields: ty.fields.iter().map(|f| f.name.clone()).collect(),
    };

    TypeDefs {
        record,
        info,
        binding,
    }
}
