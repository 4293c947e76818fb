//! Cinder ECS - Entity store with stable IDs
//!
//! This crate wraps hecs with stable entity identifiers and typed access to
//! generated component records, keyed by their reflection names.

mod store;

pub use store::EntityStore;
