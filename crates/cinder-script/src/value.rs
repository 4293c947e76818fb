//! The tagged value model records are marshalled through

use cinder_core::{CinderError, Result};
use rhai::{Array, Dynamic, Map};
use std::collections::BTreeMap;
use std::fmt;

/// Field name -> value, ordered by name
pub type Table = BTreeMap<String, Value>;

/// A dynamic value as seen by scripts
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    EntityRef(u64),
    Vector(Vec<Value>),
    Table(Table),
}

impl Value {
    /// Short kind name used in type-check errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::EntityRef(_) => "entity",
            Value::Vector(_) => "vector",
            Value::Table(_) => "table",
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_table().and_then(|t| t.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::EntityRef(e) => write!(f, "#{}", e),
            Value::Vector(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Table(table) => {
                f.write_str("#{")?;
                for (i, (k, v)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Convert a Value into a rhai::Dynamic. Entity refs become script ints.
pub fn to_dynamic(val: &Value) -> Dynamic {
    match val {
        Value::Bool(b) => Dynamic::from(*b),
        Value::Int(i) => Dynamic::from(*i),
        Value::Float(f) => Dynamic::from(*f),
        Value::String(s) => Dynamic::from(s.clone()),
        Value::EntityRef(e) => Dynamic::from(i64::try_from(*e).unwrap_or(i64::MAX)),
        Value::Vector(items) => {
            let items: Array = items.iter().map(to_dynamic).collect();
            Dynamic::from(items)
        }
        Value::Table(table) => {
            let mut map = Map::new();
            for (k, v) in table {
                map.insert(k.as_str().into(), to_dynamic(v));
            }
            Dynamic::from(map)
        }
    }
}

/// Convert a rhai::Dynamic into a Value; `path` names it in errors
pub fn from_dynamic(val: &Dynamic, path: &str) -> Result<Value> {
    if let Ok(b) = val.as_bool() {
        return Ok(Value::Bool(b));
    }
    if let Ok(i) = val.as_int() {
        return Ok(Value::Int(i));
    }
    if let Ok(f) = val.as_float() {
        return Ok(Value::Float(f));
    }
    if val.is_string() {
        if let Ok(s) = val.clone().into_string() {
            return Ok(Value::String(s));
        }
    }
    if val.is_array() {
        if let Ok(items) = val.clone().into_array() {
            return items
                .iter()
                .enumerate()
                .map(|(i, item)| from_dynamic(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Vector);
        }
    }
    if let Some(map) = val.clone().try_cast::<Map>() {
        let mut table = Table::new();
        for (k, v) in &map {
            let value = from_dynamic(v, &format!("{}.{}", path, k))?;
            table.insert(k.to_string(), value);
        }
        return Ok(Value::Table(table));
    }
    Err(CinderError::WrongKind {
        path: path.to_string(),
        expected: "a script value".to_string(),
        found: val.type_name().to_string(),
    })
}

/// Convert a Value into a toml::Value
pub fn to_toml_value(val: &Value) -> toml::Value {
    match val {
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Int(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::EntityRef(e) => toml::Value::Integer(i64::try_from(*e).unwrap_or(i64::MAX)),
        Value::Vector(items) => toml::Value::Array(items.iter().map(to_toml_value).collect()),
        Value::Table(table) => {
            let mut out = toml::map::Map::new();
            for (k, v) in table {
                out.insert(k.clone(), to_toml_value(v));
            }
            toml::Value::Table(out)
        }
    }
}

/// Convert a toml::Value into a Value
pub fn from_toml_value(val: &toml::Value) -> Value {
    match val {
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Vector(items.iter().map(from_toml_value).collect()),
        toml::Value::Table(table) => Value::Table(
            table
                .iter()
                .map(|(k, v)| (k.clone(), from_toml_value(v)))
                .collect(),
        ),
    }
}
