//! Stock component types
//!
//! Records, reflection tables and script bindings are generated at build
//! time from the schema files under `schemas/`.

include!(concat!(env!("OUT_DIR"), "/components.rs"));
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

/// A script engine with every stock component bound to `store`
pub fn scripting_engine(store: &cinder::script::StoreHandle) -> cinder::rhai::Engine {
    let mut engine = cinder::rhai::Engine::new();
    register_components(&mut engine, store);
    engine
}
