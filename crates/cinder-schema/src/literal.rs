//! Default-value literals and checking of explicit defaults

use cinder_core::{CinderError, FieldTag, Result};

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A resolved default value, one node per field
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// x, y, z, w
    Quat([f32; 4]),
    /// Column-major
    Mat4([f32; 16]),
    Entity(u64),
    Text(String),
    EmptyCollection,
    Record {
        type_name: String,
        fields: Vec<(String, DefaultValue)>,
    },
}

impl DefaultValue {
    /// The zero value of a primitive tag
    pub fn primitive(tag: FieldTag) -> Option<DefaultValue> {
        let value = match tag {
            FieldTag::Int => DefaultValue::Int(0),
            FieldTag::Float => DefaultValue::Float(0.0),
            FieldTag::Bool => DefaultValue::Bool(false),
            FieldTag::Vec2 => DefaultValue::Vec2([0.0; 2]),
            FieldTag::Vec3 => DefaultValue::Vec3([0.0; 3]),
            FieldTag::Vec4 => DefaultValue::Vec4([0.0; 4]),
            FieldTag::Quaternion => DefaultValue::Quat([0.0, 0.0, 0.0, 1.0]),
            FieldTag::Mat4 => DefaultValue::Mat4(IDENTITY),
            FieldTag::EntityRef => DefaultValue::Entity(0),
            FieldTag::String => DefaultValue::Text(String::new()),
            FieldTag::Subcomponent => return None,
        };
        Some(value)
    }

    /// Look up a field of a record default
    pub fn field(&self, name: &str) -> Option<&DefaultValue> {
        match self {
            DefaultValue::Record { fields, .. } => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> CinderError {
    CinderError::InvalidDefault {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn kind_of(value: &toml::Value) -> &'static str {
    match value {
        toml::Value::String(_) => "string",
        toml::Value::Integer(_) => "integer",
        toml::Value::Float(_) => "float",
        toml::Value::Boolean(_) => "boolean",
        toml::Value::Datetime(_) => "datetime",
        toml::Value::Array(_) => "array",
        toml::Value::Table(_) => "table",
    }
}

fn expected(path: &str, what: &str, value: &toml::Value) -> CinderError {
    invalid(path, format!("expected {}, got {}", what, kind_of(value)))
}

fn number(path: &str, value: &toml::Value) -> Result<f32> {
    let n = match value {
        toml::Value::Float(f) => *f,
        // Allow integers where floats are expected
        toml::Value::Integer(i) => *i as f64,
        other => return Err(expected(path, "a number", other)),
    };
    let narrowed = n as f32;
    if !n.is_finite() || !narrowed.is_finite() {
        return Err(invalid(path, format!("{} is not a finite float", n)));
    }
    Ok(narrowed)
}

/// `[x, y, ...]` or `{ x = .., y = .., ... }` with exactly N components
fn components<const N: usize>(path: &str, value: &toml::Value) -> Result<[f32; N]> {
    const KEYS: [&str; 4] = ["x", "y", "z", "w"];
    let mut out = [0.0f32; N];
    match value {
        toml::Value::Array(items) => {
            if items.len() != N {
                return Err(invalid(
                    path,
                    format!("expected {} components, got {}", N, items.len()),
                ));
            }
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = number(path, item)?;
            }
        }
        toml::Value::Table(table) => {
            let keys = &KEYS[..N];
            if let Some(extra) = table.keys().find(|k| !keys.contains(&k.as_str())) {
                return Err(invalid(path, format!("unknown component '{}'", extra)));
            }
            for (slot, key) in out.iter_mut().zip(keys) {
                let item = table
                    .get(*key)
                    .ok_or_else(|| invalid(path, format!("missing component '{}'", key)))?;
                *slot = number(path, item)?;
            }
        }
        other => return Err(expected(path, "an array or table", other)),
    }
    Ok(out)
}

fn matrix(path: &str, value: &toml::Value) -> Result<[f32; 16]> {
    let toml::Value::Array(items) = value else {
        return Err(expected(path, "an array", value));
    };
    let mut out = [0.0f32; 16];
    match items.len() {
        16 => {
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = number(path, item)?;
            }
        }
        4 => {
            for (col, item) in items.iter().enumerate() {
                let column: [f32; 4] = match item {
                    toml::Value::Array(_) => components(path, item)?,
                    other => return Err(expected(path, "a column array", other)),
                };
                out[col * 4..col * 4 + 4].copy_from_slice(&column);
            }
        }
        n => {
            return Err(invalid(
                path,
                format!("expected 16 numbers or 4 columns, got {} items", n),
            ))
        }
    }
    Ok(out)
}

/// Check an explicit default against a primitive tag
pub fn primitive_from_toml(tag: FieldTag, path: &str, value: &toml::Value) -> Result<DefaultValue> {
    match (tag, value) {
        (FieldTag::Int, toml::Value::Integer(n)) => i32::try_from(*n)
            .map(DefaultValue::Int)
            .map_err(|_| invalid(path, format!("{} does not fit in a 32-bit int", n))),
        (FieldTag::Int, other) => Err(expected(path, "an integer", other)),
        (FieldTag::Float, v) => number(path, v).map(DefaultValue::Float),
        (FieldTag::Bool, toml::Value::Boolean(b)) => Ok(DefaultValue::Bool(*b)),
        (FieldTag::Bool, other) => Err(expected(path, "a boolean", other)),
        (FieldTag::Vec2, v) => components::<2>(path, v).map(DefaultValue::Vec2),
        (FieldTag::Vec3, v) => components::<3>(path, v).map(DefaultValue::Vec3),
        (FieldTag::Vec4, v) => components::<4>(path, v).map(DefaultValue::Vec4),
        (FieldTag::Quaternion, v) => components::<4>(path, v).map(DefaultValue::Quat),
        (FieldTag::Mat4, v) => matrix(path, v).map(DefaultValue::Mat4),
        (FieldTag::EntityRef, toml::Value::Integer(n)) => u64::try_from(*n)
            .map(DefaultValue::Entity)
            .map_err(|_| invalid(path, format!("entity id {} is negative", n))),
        (FieldTag::EntityRef, other) => Err(expected(path, "an entity id", other)),
        (FieldTag::String, toml::Value::String(s)) => Ok(DefaultValue::Text(s.clone())),
        (FieldTag::String, other) => Err(expected(path, "a string", other)),
        (FieldTag::Subcomponent, _) => Err(invalid(path, "subcomponent defaults are tables")),
    }
}
