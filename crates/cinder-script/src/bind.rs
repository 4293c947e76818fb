//! Entity-bound component operations registered into a Rhai engine
//!
//! For a component type `T` named `Name`, [`bind_component`] registers:
//!
//! - `get_component_Name(id)` - the component as a table; an entity
//!   without one is a script error
//! - `get_or_add_component_Name(id)` - attaches the default first if needed
//! - `set_component_Name(id, table)` - replaces the existing component; the
//!   table is checked before the store is touched
//! - `add_component_Name(id)` - attaches the default unless present and
//!   returns the component as a table
//!
//! [`register_entity_api`] adds the type-independent `create_entity` and
//! `destroy_entity`. Entities are plain script ints.

use crate::marshal::ScriptValue;
use crate::store::StoreHandle;
use crate::value::{from_dynamic, to_dynamic};
use cinder_core::{CinderError, Component, EntityId, Result};
use rhai::{Dynamic, Engine, EvalAltResult, Position};

type ScriptResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// Surface a Cinder error as a runtime error of the current script call
pub fn script_error(err: CinderError) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(err.to_string().into(), Position::NONE).into()
}

fn entity_arg(id: i64) -> Result<EntityId> {
    u64::try_from(id)
        .map(EntityId::from_raw)
        .map_err(|_| CinderError::EntityNotFound(id.to_string()))
}

fn get<T: Component + ScriptValue>(store: &StoreHandle, id: i64) -> Result<Dynamic> {
    let store = store.lock();
    let component = store.get_component::<T>(entity_arg(id)?)?;
    Ok(to_dynamic(&component.push()))
}

fn get_or_add<T: Component + ScriptValue>(store: &StoreHandle, id: i64) -> Result<Dynamic> {
    let mut store = store.lock();
    let component = store.add_component_with_default::<T>(entity_arg(id)?)?;
    Ok(to_dynamic(&component.push()))
}

fn set<T: Component + ScriptValue>(store: &StoreHandle, id: i64, table: &Dynamic) -> Result<()> {
    let name = T::type_name();
    let value = T::pop(&from_dynamic(table, name)?, name)?;

    let store = store.lock();
    let mut component = store.get_component_mut::<T>(entity_arg(id)?)?;
    *component = value;
    Ok(())
}

/// Register the four entity-bound operations of `T`
pub fn bind_component<T: Component + ScriptValue>(engine: &mut Engine, store: &StoreHandle) {
    let name = T::type_name();

    {
        let store = store.clone();
        let fn_name = format!("get_component_{}", name);
        engine.register_fn(fn_name.as_str(), move |id: i64| -> ScriptResult<Dynamic> {
            get::<T>(&store, id).map_err(script_error)
        });
    }

    {
        let store = store.clone();
        let fn_name = format!("get_or_add_component_{}", name);
        engine.register_fn(fn_name.as_str(), move |id: i64| -> ScriptResult<Dynamic> {
            get_or_add::<T>(&store, id).map_err(script_error)
        });
    }

    {
        let store = store.clone();
        let fn_name = format!("set_component_{}", name);
        engine.register_fn(
            fn_name.as_str(),
            move |id: i64, table: Dynamic| -> ScriptResult<()> {
                set::<T>(&store, id, &table).map_err(script_error)
            },
        );
    }

    {
        let store = store.clone();
        let fn_name = format!("add_component_{}", name);
        engine.register_fn(fn_name.as_str(), move |id: i64| -> ScriptResult<Dynamic> {
            get_or_add::<T>(&store, id).map_err(script_error)
        });
    }

    log::debug!("bound script operations for {}", name);
}

/// Register `create_entity`, `destroy_entity` and `entity_exists`
pub fn register_entity_api(engine: &mut Engine, store: &StoreHandle) {
    // create_entity() -> i64
    {
        let store = store.clone();
        engine.register_fn("create_entity", move || -> ScriptResult<i64> {
            let id = store.with(|s| s.create_entity());
            i64::try_from(id.raw())
                .map_err(|_| script_error(CinderError::EntityNotFound(id.to_string())))
        });
    }

    // destroy_entity(id: i64)
    {
        let store = store.clone();
        engine.register_fn("destroy_entity", move |id: i64| -> ScriptResult<()> {
            entity_arg(id)
                .and_then(|id| store.with(|s| s.destroy_entity(id)))
                .map_err(script_error)
        });
    }

    // entity_exists(id: i64) -> bool
    {
        let store = store.clone();
        engine.register_fn("entity_exists", move |id: i64| -> bool {
            match entity_arg(id) {
                Ok(id) => store.lock().contains(id),
                Err(_) => false,
            }
        });
    }
}
