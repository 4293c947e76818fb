//! Persistence projection of component records
//!
//! Records are saved as TOML tables through their script representation,
//! with fields (and whole types) flagged `NOT_SERIALIZED` left out. Loading
//! completes a saved table from the type's defaults, so fields that were
//! left out come back with their default values.

use crate::marshal::ScriptValue;
use crate::value::{self, Value};
use cinder_core::{ComponentInfo, FieldFlags, Reflect, Result};

/// Project a record to TOML. `None` if the type itself is not serialized.
pub fn to_toml<T: Reflect + ScriptValue>(record: &T) -> Option<toml::Value> {
    let info = T::info();
    if info.flags.contains(FieldFlags::NOT_SERIALIZED) {
        return None;
    }
    Some(value::to_toml_value(&strip(record.push(), info)))
}

/// Rebuild a record from a saved table
pub fn from_toml<T: Reflect + ScriptValue>(saved: &toml::Value) -> Result<T> {
    let mut value = value::from_toml_value(saved);
    T::complete(&mut value);
    T::pop(&value, T::info().name)
}

fn strip(value: Value, info: &ComponentInfo) -> Value {
    let Value::Table(mut table) = value else {
        return value;
    };

    for field in info.fields {
        let skipped = field.flags.contains(FieldFlags::NOT_SERIALIZED)
            || field
                .sub_type
                .map(|sub| sub.flags.contains(FieldFlags::NOT_SERIALIZED))
                .unwrap_or(false);
        if skipped {
            table.remove(field.name);
            continue;
        }

        let Some(sub) = field.sub_type else {
            continue;
        };
        if let Some(nested) = table.remove(field.name) {
            let nested = match nested {
                Value::Vector(items) if field.is_collection() => {
                    Value::Vector(items.into_iter().map(|item| strip(item, sub)).collect())
                }
                other => strip(other, sub),
            };
            table.insert(field.name.to_string(), nested);
        }
    }

    Value::Table(table)
}
