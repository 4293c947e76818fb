//! Push (record to Value) and pop (Value to record) for every field type
//!
//! Generated records implement [`ScriptValue`] field by field; the impls
//! here cover the native representation of every primitive tag and of
//! collections.

use crate::value::{Table, Value};
use cinder_core::math::{Mat4, Quat, Vec2, Vec3, Vec4};
use cinder_core::{CinderError, Collection, EntityId, Result, Text};

/// Conversion between a native field value and the dynamic [`Value`] model
pub trait ScriptValue: Sized {
    fn push(&self) -> Value;

    /// Rebuild a native value. `path` is the dotted field path used in
    /// type-check errors.
    fn pop(value: &Value, path: &str) -> Result<Self>;

    /// Fill fields missing from a partial value with defaults, recursively
    fn complete(_value: &mut Value) {}
}

pub(crate) fn wrong_kind(path: &str, expected: &str, found: &Value) -> CinderError {
    CinderError::WrongKind {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

/// The value as a table, or `NotATable`
pub fn expect_table<'a>(value: &'a Value, path: &str) -> Result<&'a Table> {
    value.as_table().ok_or_else(|| CinderError::NotATable {
        path: path.to_string(),
    })
}

/// Pop one named field of a table; absent is `MissingField`
pub fn pop_field<T: ScriptValue>(table: &Table, path: &str, name: &str) -> Result<T> {
    let field_path = format!("{}.{}", path, name);
    match table.get(name) {
        Some(value) => T::pop(value, &field_path),
        None => Err(CinderError::MissingField { path: field_path }),
    }
}

/// Complete one named field of a partial table from `default`
pub fn complete_field<T: ScriptValue>(table: &mut Table, name: &str, default: &T) {
    match table.get_mut(name) {
        Some(value) => T::complete(value),
        None => {
            table.insert(name.to_string(), default.push());
        }
    }
}

impl ScriptValue for i32 {
    fn push(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::Int(n) => i32::try_from(*n).map_err(|_| CinderError::OutOfRange {
                path: path.to_string(),
                value: n.to_string(),
            }),
            other => Err(wrong_kind(path, "int", other)),
        }
    }
}

impl ScriptValue for f32 {
    fn push(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        let wide = match value {
            Value::Float(f) => *f,
            Value::Int(n) => *n as f64,
            other => return Err(wrong_kind(path, "float", other)),
        };
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(CinderError::OutOfRange {
                path: path.to_string(),
                value: wide.to_string(),
            });
        }
        Ok(narrow)
    }
}

impl ScriptValue for bool {
    fn push(&self) -> Value {
        Value::Bool(*self)
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(wrong_kind(path, "bool", other)),
        }
    }
}

impl ScriptValue for Text {
    fn push(&self) -> Value {
        Value::String(self.as_str().to_string())
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Text::from(s.clone())),
            other => Err(wrong_kind(path, "string", other)),
        }
    }
}

impl ScriptValue for EntityId {
    fn push(&self) -> Value {
        Value::EntityRef(self.raw())
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::EntityRef(raw) => Ok(EntityId::from_raw(*raw)),
            Value::Int(n) => u64::try_from(*n)
                .map(EntityId::from_raw)
                .map_err(|_| CinderError::OutOfRange {
                    path: path.to_string(),
                    value: n.to_string(),
                }),
            other => Err(wrong_kind(path, "entity", other)),
        }
    }
}

fn push_components(names: &[&str], values: &[f32]) -> Value {
    let table = names
        .iter()
        .zip(values)
        .map(|(name, v)| (name.to_string(), v.push()))
        .collect();
    Value::Table(table)
}

macro_rules! impl_vector {
    ($ty:ty, $ctor:expr, [$($field:ident),+]) => {
        impl ScriptValue for $ty {
            fn push(&self) -> Value {
                push_components(&[$(stringify!($field)),+], &[$(self.$field),+])
            }

            fn pop(value: &Value, path: &str) -> Result<Self> {
                let table = expect_table(value, path)?;
                Ok($ctor($(pop_field::<f32>(table, path, stringify!($field))?),+))
            }
        }
    };
}

impl_vector!(Vec2, Vec2::new, [x, y]);
impl_vector!(Vec3, Vec3::new, [x, y, z]);
impl_vector!(Vec4, Vec4::new, [x, y, z, w]);
impl_vector!(Quat, Quat::from_xyzw, [x, y, z, w]);

/// Matrices travel as four column vectors of four floats
impl ScriptValue for Mat4 {
    fn push(&self) -> Value {
        Value::Vector(
            self.cols
                .iter()
                .map(|col| Value::Vector(col.iter().map(ScriptValue::push).collect()))
                .collect(),
        )
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        let columns = four(value, path)?;
        let mut cols = [[0.0f32; 4]; 4];
        for (c, column) in columns.iter().enumerate() {
            let column_path = format!("{}[{}]", path, c);
            for (r, cell) in four(column, &column_path)?.iter().enumerate() {
                cols[c][r] = f32::pop(cell, &format!("{}[{}]", column_path, r))?;
            }
        }
        Ok(Mat4::from_cols(cols))
    }
}

fn four<'a>(value: &'a Value, path: &str) -> Result<&'a [Value]> {
    match value {
        Value::Vector(items) if items.len() == 4 => Ok(items),
        Value::Vector(items) => Err(CinderError::WrongKind {
            path: path.to_string(),
            expected: "vector of 4".to_string(),
            found: format!("vector of {}", items.len()),
        }),
        other => Err(wrong_kind(path, "vector of 4", other)),
    }
}

impl<T: ScriptValue> ScriptValue for Collection<T> {
    fn push(&self) -> Value {
        Value::Vector(self.iter().map(ScriptValue::push).collect())
    }

    fn pop(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::Vector(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::pop(item, &format!("{}[{}]", path, i)))
                .collect(),
            other => Err(wrong_kind(path, "vector", other)),
        }
    }

    fn complete(value: &mut Value) {
        if let Value::Vector(items) = value {
            items.iter_mut().for_each(T::complete);
        }
    }
}
