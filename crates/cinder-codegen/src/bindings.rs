//! Bindings artifact: marshalling and entity-bound script operations
//!
//! Every type gets a `ScriptValue` impl; component types also get a
//! `register_<Name>` function. `register_components` registers the entity
//! API and every component, in declared order.

use crate::ir::{BindingDef, Program};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// One top-level item per entry
pub fn generate(program: &Program) -> Vec<TokenStream> {
    let mut items = Vec::new();
    for defs in &program.types {
        items.push(script_value(&defs.binding));
        if defs.binding.component {
            items.push(register_fn(&defs.binding));
        }
    }
    items.push(register_components(program));
    items
}

fn script_value(binding: &BindingDef) -> TokenStream {
    let ident = format_ident!("{}", binding.name);
    let default_ident = format_ident!("{}_DEFAULT", binding.name);
    let names: Vec<&str> = binding.fields.iter().map(String::as_str).collect();
    let idents: Vec<_> = names.iter().map(|n| format_ident!("{}", n)).collect();

    let push = if names.is_empty() {
        quote! {
            ::cinder::script::Value::Table(::cinder::script::Table::new())
        }
    } else {
        quote! {
            let mut table = ::cinder::script::Table::new();
            #(
                table.insert(
                    ::std::string::String::from(#names),
                    ::cinder::script::ScriptValue::push(&self.#idents),
                );
            )*
            ::cinder::script::Value::Table(table)
        }
    };

    let pop = if names.is_empty() {
        quote! {
            ::cinder::script::expect_table(value, path)?;
            ::core::result::Result::Ok(Self {})
        }
    } else {
        quote! {
            let table = ::cinder::script::expect_table(value, path)?;
            ::core::result::Result::Ok(Self {
                #(#idents: ::cinder::script::pop_field(table, path, #names)?,)*
            })
        }
    };

    let complete = if names.is_empty() {
        quote! {
            let _ = value;
        }
    } else {
        quote! {
            if let ::cinder::script::Value::Table(table) = value {
                let default = &#default_ident;
                #(::cinder::script::complete_field(table, #names, &default.#idents);)*
            }
        }
    };

    quote! {
        impl ::cinder::script::ScriptValue for #ident {
            fn push(&self) -> ::cinder::script::Value {
                #push
            }

            fn pop(
                value: &::cinder::script::Value,
                path: &::core::primitive::str,
            ) -> ::cinder::Result<Self> {
                #pop
            }

            fn complete(value: &mut ::cinder::script::Value) {
                #complete
            }
        }
    }
}

fn register_fn(binding: &BindingDef) -> TokenStream {
    let ident = format_ident!("{}", binding.name);
    let register_ident = format_ident!("register_{}", binding.name);

    quote! {
        #[allow(non_snake_case)]
        pub fn #register_ident(
            engine: &mut ::cinder::rhai::Engine,
            store: &::cinder::script::StoreHandle,
        ) {
            ::cinder::script::bind_component::<#ident>(engine, store);
        }
    }
}

fn register_components(program: &Program) -> TokenStream {
    let calls = program.components().map(|defs| {
        let register_ident = format_ident!("register_{}", defs.binding.name);
        quote!(#register_ident(engine, store);)
    });

    quote! {
        /// Register the entity API and every component's script operations
        pub fn register_components(
            engine: &mut ::cinder::rhai::Engine,
            store: &::cinder::script::StoreHandle,
        ) {
            ::cinder::script::register_entity_api(engine, store);
            #(#calls)*
        }
    }
}
