//! Cinder - runtime for generated component code
//!
//! Generated definitions and bindings only name paths under `::cinder`, so a
//! crate that includes them depends on this crate alone.

pub use cinder_core::{
    math, reflect, CinderError, Collection, Component, ComponentInfo, EntityId, EntityRef,
    ErrorKind, FieldFlags, FieldInfo, FieldTag, Reflect, Result, Text,
};

/// The entity-component store
pub mod ecs {
    pub use cinder_ecs::EntityStore;
}

/// Script marshalling and bindings
pub mod script {
    pub use cinder_script::*;
}

pub use rhai;
