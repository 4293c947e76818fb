//! Cinder Script - Rhai bindings for generated component records
//!
//! - `Value` - the tagged value model records are marshalled through
//! - `ScriptValue` - push/pop between native fields and `Value`
//! - `StoreHandle` - the entity store a set of bindings operates on
//! - `bind_component` / `register_entity_api` - entity-bound script globals
//! - `persist` - TOML projection honoring `NOT_SERIALIZED`

mod bind;
mod marshal;
pub mod persist;
mod store;
mod value;

#[cfg(test)]
mod fixtures;

pub use bind::{bind_component, register_entity_api, script_error};
pub use marshal::{complete_field, expect_table, pop_field, ScriptValue};
pub use store::StoreHandle;
pub use value::{from_dynamic, from_toml_value, to_dynamic, to_toml_value, Table, Value};
