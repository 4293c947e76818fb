//! Schema introspection command

use super::load_schemas;
use anyhow::{Context, Result};
use cinder_core::FieldFlags;
use cinder_schema::{DefaultValue, ResolvedField};
use std::path::PathBuf;

pub fn run(name: &str, schemas: &[PathBuf]) -> Result<()> {
    let set = load_schemas(schemas)?;
    let resolved = cinder_schema::resolve(&set).context("Failed to resolve schemas")?;

    let Some(ty) = resolved.get(name) else {
        println!("Type '{}' not found.", name);
        println!();
        if !resolved.is_empty() {
            println!("Available types:");
            for ty in resolved.types() {
                println!("  - {}", ty.name);
            }
        }
        return Ok(());
    };

    println!("Type: {}", ty.name);
    if let Some(origin) = set.origin_of(&ty.name) {
        println!("Origin: {}", origin);
    }
    println!("Layout: size {}, align {}", ty.size, ty.align);
    if ty.internal {
        println!("Internal: usable only as a subcomponent");
    }
    if !ty.flags.is_empty() {
        println!("Flags: {}", format_flags(ty.flags));
    }
    println!();
    println!("Fields:");

    for field in &ty.fields {
        print!(
            "  @{:<4} {} : {} = {}",
            field.offset,
            field.name,
            format_field_type(field),
            format_default(&field.default)
        );
        if !field.flags.is_empty() {
            print!("  [{}]", format_flags(field.flags));
        }
        println!();
    }

    Ok(())
}

fn format_field_type(field: &ResolvedField) -> String {
    let elem = match &field.sub_type {
        Some(sub) => sub.clone(),
        None => field.tag.to_string(),
    };
    if field.is_collection() {
        format!("[{}]", elem)
    } else {
        elem
    }
}

fn format_flags(flags: FieldFlags) -> String {
    let mut names = Vec::new();
    if flags.contains(FieldFlags::HIDDEN) {
        names.push("hidden");
    }
    if flags.contains(FieldFlags::IS_COLLECTION) {
        names.push("collection");
    }
    if flags.contains(FieldFlags::NOT_SERIALIZED) {
        names.push("not serialized");
    }
    names.join(", ")
}

fn format_floats(values: &[f32]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn format_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(b) => b.to_string(),
        DefaultValue::Vec2(v) => format_floats(v),
        DefaultValue::Vec3(v) => format_floats(v),
        DefaultValue::Vec4(v) | DefaultValue::Quat(v) => format_floats(v),
        DefaultValue::Mat4(m) => format_floats(m),
        DefaultValue::Entity(e) => format!("#{}", e),
        DefaultValue::Text(s) => format!("{:?}", s),
        DefaultValue::EmptyCollection => "[]".to_string(),
        DefaultValue::Record { fields, .. } => {
            let items: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{} = {}", k, format_default(v)))
                .collect();
            format!("{{ {} }}", items.join(", "))
        }
    }
}
