//! Definitions artifact: records, defaults and reflection tables

use crate::ir::{ElemType, FieldType, InfoDef, Program, RecordDef, TypeDefs};
use cinder_core::{FieldFlags, FieldTag};
use cinder_schema::DefaultValue;
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

/// Emit every record of `program` followed by the info registry, one
/// top-level item per entry
pub fn generate(program: &Program) -> Vec<TokenStream> {
    let mut items = Vec::new();
    for defs in &program.types {
        items.push(record(&defs.record));
        items.push(default_static(&defs.record));
        items.extend(info(&defs.record, &defs.info));
        items.push(layout_assertions(&defs.record));
        items.extend(traits(defs));
    }
    items.extend(registry(program));
    items
}

fn record(record: &RecordDef) -> TokenStream {
    let ident = format_ident!("{}", record.name);
    let fields = record.fields.iter().map(|f| {
        let name = format_ident!("{}", f.name);
        let ty = field_type(&f.ty);
        quote!(pub #name: #ty)
    });

    quote! {
        #[repr(C)]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ident {
            #(#fields,)*
        }
    }
}

fn default_static(record: &RecordDef) -> TokenStream {
    let ident = format_ident!("{}", record.name);
    let default_ident = format_ident!("{}_DEFAULT", record.name);
    let fields = record.fields.iter().map(|f| {
        let name = format_ident!("{}", f.name);
        let value = default_literal(&f.default);
        quote!(#name: #value)
    });

    quote! {
        #[allow(non_upper_case_globals)]
        pub static #default_ident: #ident = #ident {
            #(#fields,)*
        };
    }
}

fn info(record: &RecordDef, info: &InfoDef) -> Vec<TokenStream> {
    let ident = format_ident!("{}", record.name);
    let default_ident = format_ident!("{}_DEFAULT", record.name);
    let fields_ident = format_ident!("{}_FIELDS", record.name);
    let info_ident = format_ident!("{}_INFO", record.name);
    let destruct_ident = format_ident!("{}_destruct", record.name);
    let release_ident = format_ident!("{}_release_collection", record.name);

    let name = record.name.as_str();
    let size = record.size;
    let align = record.align;
    let count = info.fields.len();
    let flags = flags_literal(info.flags);

    let entries = info.fields.iter().map(|f| {
        let field_name = f.name.as_str();
        let tag = tag_path(f.tag);
        let field_flags = flags_literal(f.flags);
        let offset = f.offset;
        let sub_type = match &f.sub_type {
            Some(sub) => {
                let sub_info = format_ident!("{}_INFO", sub);
                quote!(::core::option::Option::Some(&#sub_info))
            }
            None => quote!(::core::option::Option::None),
        };
        quote! {
            ::cinder::FieldInfo {
                name: #field_name,
                tag: #tag,
                flags: #field_flags,
                sub_type: #sub_type,
                offset: #offset,
            }
        }
    });

    vec![
        quote! {
            #[allow(non_upper_case_globals)]
            static #fields_ident: [::cinder::FieldInfo; #count] = [#(#entries),*];
        },
        quote! {
            #[allow(non_upper_case_globals)]
            pub static #info_ident: ::cinder::ComponentInfo = ::cinder::ComponentInfo {
                name: #name,
                size: #size,
                align: #align,
                default: &#default_ident,
                destruct: #destruct_ident,
                release_collection: #release_ident,
                flags: #flags,
                fields: &#fields_ident,
            };
        },
        quote! {
            #[allow(non_snake_case)]
            unsafe fn #destruct_ident(component: *mut ::core::primitive::u8) {
                ::cinder::reflect::generic_destruct(&#info_ident, component)
            }
        },
        quote! {
            #[allow(non_snake_case)]
            unsafe fn #release_ident(collection: *mut ::core::primitive::u8) {
                (*collection.cast::<::cinder::Collection<#ident>>()).release()
            }
        },
    ]
}

/// Compile-time check that the native layout matches the reflection table
fn layout_assertions(record: &RecordDef) -> TokenStream {
    let ident = format_ident!("{}", record.name);
    let size = record.size;
    let align = record.align;
    let offsets = record.fields.iter().map(|f| {
        let name = format_ident!("{}", f.name);
        let offset = f.offset;
        quote!(assert!(::core::mem::offset_of!(#ident, #name) == #offset);)
    });

    quote! {
        const _: () = {
            assert!(::core::mem::size_of::<#ident>() == #size);
            assert!(::core::mem::align_of::<#ident>() == #align);
            #(#offsets)*
        };
    }
}

fn traits(defs: &TypeDefs) -> Vec<TokenStream> {
    let ident = format_ident!("{}", defs.record.name);
    let default_ident = format_ident!("{}_DEFAULT", defs.record.name);
    let info_ident = format_ident!("{}_INFO", defs.record.name);

    let mut items = vec![
        quote! {
            impl ::core::default::Default for #ident {
                fn default() -> Self {
                    ::core::clone::Clone::clone(&#default_ident)
                }
            }
        },
        quote! {
            unsafe impl ::cinder::Reflect for #ident {
                fn info() -> &'static ::cinder::ComponentInfo {
                    &#info_ident
                }
            }
        },
    ];
    if defs.binding.component {
        items.push(quote!(impl ::cinder::Component for #ident {}));
    }
    items
}

/// `COMPONENTS_ALL_INFOS` and `find_info`, once per artifact
fn registry(program: &Program) -> Vec<TokenStream> {
    let count = program.len();
    let infos = program.types.iter().map(|defs| {
        let info_ident = format_ident!("{}_INFO", defs.record.name);
        quote!(&#info_ident)
    });

    vec![
        quote! {
            pub static COMPONENTS_ALL_INFOS: [&::cinder::ComponentInfo; #count] = [#(#infos),*];
        },
        quote! {
            pub fn find_info(
                name: &::core::primitive::str,
            ) -> ::core::option::Option<&'static ::cinder::ComponentInfo> {
                ::cinder::reflect::find_info(&COMPONENTS_ALL_INFOS, name)
            }
        },
    ]
}

fn field_type(ty: &FieldType) -> TokenStream {
    let elem = match &ty.elem {
        ElemType::Primitive(tag) => primitive_type(*tag),
        ElemType::Record(name) => {
            let ident = format_ident!("{}", name);
            quote!(#ident)
        }
    };
    if ty.collection {
        quote!(::cinder::Collection<#elem>)
    } else {
        elem
    }
}

pub(crate) fn primitive_type(tag: FieldTag) -> TokenStream {
    match tag {
        FieldTag::Int => quote!(::core::primitive::i32),
        FieldTag::Float => quote!(::core::primitive::f32),
        FieldTag::Bool => quote!(::core::primitive::bool),
        FieldTag::Vec2 => quote!(::cinder::math::Vec2),
        FieldTag::Vec3 => quote!(::cinder::math::Vec3),
        FieldTag::Vec4 => quote!(::cinder::math::Vec4),
        FieldTag::Quaternion => quote!(::cinder::math::Quat),
        FieldTag::Mat4 => quote!(::cinder::math::Mat4),
        FieldTag::EntityRef => quote!(::cinder::EntityRef),
        FieldTag::String => quote!(::cinder::Text),
        // Lowering never produces a primitive subcomponent
        FieldTag::Subcomponent => quote!(()),
    }
}

fn tag_path(tag: FieldTag) -> TokenStream {
    let variant = match tag {
        FieldTag::Int => "Int",
        FieldTag::Float => "Float",
        FieldTag::Bool => "Bool",
        FieldTag::Vec2 => "Vec2",
        FieldTag::Vec3 => "Vec3",
        FieldTag::Vec4 => "Vec4",
        FieldTag::Quaternion => "Quaternion",
        FieldTag::Mat4 => "Mat4",
        FieldTag::EntityRef => "EntityRef",
        FieldTag::String => "String",
        FieldTag::Subcomponent => "Subcomponent",
    };
    let variant = format_ident!("{}", variant);
    quote!(::cinder::FieldTag::#variant)
}

fn flags_literal(flags: FieldFlags) -> TokenStream {
    let bits = Literal::u32_suffixed(flags.bits());
    quote!(::cinder::FieldFlags::from_bits_retain(#bits))
}

fn float_literal(value: f32) -> TokenStream {
    if value.is_sign_negative() {
        let lit = Literal::f32_suffixed(-value);
        quote!(-#lit)
    } else {
        let lit = Literal::f32_suffixed(value);
        quote!(#lit)
    }
}

fn floats(values: &[f32]) -> Vec<TokenStream> {
    values.iter().copied().map(float_literal).collect()
}

/// Constant expression for a default value
pub(crate) fn default_literal(value: &DefaultValue) -> TokenStream {
    match value {
        DefaultValue::Int(v) => {
            let lit = Literal::i64_unsuffixed(i64::from(*v).abs());
            if *v < 0 {
                quote!(-#lit)
            } else {
                quote!(#lit)
            }
        }
        DefaultValue::Float(v) => float_literal(*v),
        DefaultValue::Bool(b) => quote!(#b),
        DefaultValue::Vec2(v) => {
            let c = floats(v);
            quote!(::cinder::math::Vec2::new(#(#c),*))
        }
        DefaultValue::Vec3(v) => {
            let c = floats(v);
            quote!(::cinder::math::Vec3::new(#(#c),*))
        }
        DefaultValue::Vec4(v) => {
            let c = floats(v);
            quote!(::cinder::math::Vec4::new(#(#c),*))
        }
        DefaultValue::Quat(v) => {
            let c = floats(v);
            quote!(::cinder::math::Quat::from_xyzw(#(#c),*))
        }
        DefaultValue::Mat4(m) => {
            let c = floats(m);
            quote!(::cinder::math::Mat4::from_cols_array(&[#(#c),*]))
        }
        DefaultValue::Entity(raw) => {
            let lit = Literal::u64_suffixed(*raw);
            quote!(::cinder::EntityRef::from_raw(#lit))
        }
        DefaultValue::Text(s) if s.is_empty() => quote!(::cinder::Text::EMPTY),
        DefaultValue::Text(s) => quote!(::cinder::Text::from_static(#s)),
        DefaultValue::EmptyCollection => quote!(::cinder::Collection::new()),
        DefaultValue::Record { type_name, fields } => {
            let ident = format_ident!("{}", type_name);
            let fields = fields.iter().map(|(name, value)| {
                let name = format_ident!("{}", name);
                let value = default_literal(value);
                quote!(#name: #value)
            });
            quote!(#ident { #(#fields,)* })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_schema::{resolve, SchemaSet};

    fn generate_from(schema: &str) -> String {
        let mut set = SchemaSet::new();
        set.load_toml_string("test.toml", schema).unwrap();
        let program = Program::lower(&resolve(&set).unwrap()).unwrap();
        let items: Vec<String> = generate(&program).iter().map(|item| item.to_string()).collect();
        items.join("\n")
    }

    const TRANSFORM: &str = r#"
        [[component]]
        name = "Transform"
        fields = [
            { name = "position", type = "vec3" },
            { name = "rotation", type = "quat" },
            { name = "scale", type = "vec3", default = [1.0, 1.0, 1.0] },
        ]
    "#;

    #[test]
    fn test_record_and_statics() {
        let code = generate_from(TRANSFORM);
        assert!(code.contains("pub struct Transform"));
        assert!(code.contains("pub position : :: cinder :: math :: Vec3"));
        assert!(code.contains("pub static Transform_DEFAULT : Transform"));
        assert!(code.contains("static Transform_FIELDS : [:: cinder :: FieldInfo ; 3usize]"));
        assert!(code.contains("pub static Transform_INFO : :: cinder :: ComponentInfo"));
        assert!(code.contains("size : 40usize"));
        assert!(code.contains("offset : 28usize"));
        assert!(code.contains("impl :: cinder :: Component for Transform"));
    }

    #[test]
    fn test_defaults_are_constant_expressions() {
        let code = generate_from(TRANSFORM);
        assert!(code.contains("rotation : :: cinder :: math :: Quat :: from_xyzw (0f32 , 0f32 , 0f32 , 1f32)"));
        assert!(code.contains("scale : :: cinder :: math :: Vec3 :: new (1f32 , 1f32 , 1f32)"));
    }

    #[test]
    fn test_layout_assertions() {
        let code = generate_from(TRANSFORM);
        assert!(code.contains("assert ! (:: core :: mem :: size_of :: < Transform > () == 40usize)"));
        assert!(code.contains("offset_of ! (Transform , scale) == 28usize"));
    }

    #[test]
    fn test_internal_types_are_not_components() {
        let code = generate_from(
            r#"
            [[component]]
            name = "Bounds"
            internal = true
            fields = [{ name = "min", type = "vec2" }]
            "#,
        );
        assert!(code.contains("unsafe impl :: cinder :: Reflect for Bounds"));
        assert!(!code.contains("Component for Bounds"));
    }

    #[test]
    fn test_sub_type_and_collection_fields() {
        let code = generate_from(
            r#"
            [[component]]
            name = "Inventory"
            fields = [
                { name = "label", type = "string", default = "bag" },
                { name = "items", type = "Item", vec = true },
                { name = "best", type = "Item" },
            ]

            [[component]]
            name = "Item"
            fields = [{ name = "count", type = "int", default = -3 }]
            "#,
        );
        assert!(code.contains("pub items : :: cinder :: Collection < Item >"));
        assert!(code.contains("sub_type : :: core :: option :: Option :: Some (& Item_INFO)"));
        assert!(code.contains("items : :: cinder :: Collection :: new ()"));
        assert!(code.contains("best : Item { count : - 3 , }"));
        assert!(code.contains("label : :: cinder :: Text :: from_static (\"bag\")"));
        assert!(code.contains("from_bits_retain (2u32)"));
    }

    #[test]
    fn test_registry_once() {
        let code = generate_from(TRANSFORM);
        assert_eq!(code.matches("pub static COMPONENTS_ALL_INFOS").count(), 1);
        assert!(code.contains("[& Transform_INFO]"));
        assert!(code.contains("pub fn find_info"));
    }

    #[test]
    fn test_primitive_types_are_fully_qualified() {
        let code = generate_from(
            r#"
            [[component]]
            name = "Stats"
            fields = [
                { name = "level", type = "int" },
                { name = "speed", type = "float" },
                { name = "alive", type = "bool" },
            ]
            "#,
        );
        assert!(code.contains("pub level : :: core :: primitive :: i32"));
        assert!(code.contains("pub speed : :: core :: primitive :: f32"));
        assert!(code.contains("pub alive : :: core :: primitive :: bool"));
        assert!(code.contains("name : & :: core :: primitive :: str"));
        assert!(!code.contains(": i32"));
    }

    #[test]
    fn test_negative_float_literal() {
        assert_eq!(float_literal(-2.5).to_string(), "- 2.5f32");
        assert_eq!(float_literal(0.25).to_string(), "0.25f32");
        assert_eq!(
            default_literal(&DefaultValue::Int(i32::MIN)).to_string(),
            "- 2147483648"
        );
    }
}
