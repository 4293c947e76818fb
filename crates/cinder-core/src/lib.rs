//! Cinder Core - Foundational types shared by the compiler and generated code
//!
//! - `EntityId` - entity identifiers (also the `entity` field type)
//! - `Vec2`..`Mat4`, `Text`, `Collection` - native field representations
//! - `reflect` - reflection tables and the generic destructor
//! - `ContentHash` - SHA-256 stamps for generated artifacts
//! - Error types and Result alias

mod error;
mod handle;
mod hash;
mod id;
pub mod math;
pub mod reflect;

pub use error::{CinderError, ErrorKind, Result};
pub use handle::{Collection, Text};
pub use hash::ContentHash;
pub use id::{EntityId, EntityRef};
pub use reflect::{Component, ComponentInfo, FieldFlags, FieldInfo, FieldTag, Reflect};
