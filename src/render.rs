/*
Copyright 2020 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::declarations::MapKeyValue;
use crate::planner::{DeclNode, EmissionPlan, Expression, GeneratedType};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Renders an emission plan into Rust tokens.
///
/// The plan itself is language neutral; this renderer exists for tests and
/// demonstrations and mirrors the component-impl shape the plan describes.
pub fn render_plan(plan: &EmissionPlan) -> TokenStream {
    let types = plan.generated_types.iter().map(render_type);
    quote! {
        #(#types)*
    }
}

fn render_type(generated: &GeneratedType) -> TokenStream {
    let name = format_ident!("{}", sanitize(&generated.name));
    let mut fields = TokenStream::new();
    let mut methods = TokenStream::new();
    for node in &generated.body {
        match node {
            DeclNode::Field(field) => {
                let field_name = format_ident!("{}", sanitize(&field.name));
                let field_type: syn::Type = syn::parse_str(&field.type_)
                    .unwrap_or_else(|_| syn::parse_quote!(()));
                fields = quote! {
                    #fields
                    #field_name: #field_type,
                };
            }
            DeclNode::Method(method) => {
                let method_name = format_ident!("{}", sanitize(&method.name));
                let body = render_expression(&method.expression, &quote! {self});
                let signature = match method.return_type {
                    Some(ref return_type) => {
                        let return_syn = return_type.syn_type();
                        quote! { fn #method_name(&self) -> #return_syn }
                    }
                    None => quote! { fn #method_name(&self) },
                };
                methods = quote! {
                    #methods
                    #signature {
                        #body
                    }
                };
            }
        }
    }
    quote! {
        #[allow(non_snake_case)]
        #[allow(non_camel_case_types)]
        struct #name {
            #fields
        }
        #[allow(non_snake_case)]
        impl #name {
            #methods
        }
    }
}

fn render_expression(expression: &Expression, receiver: &TokenStream) -> TokenStream {
    match expression {
        Expression::ProviderMethod { method } => {
            let method = format_ident!("{}", sanitize(method));
            quote! { #receiver.#method() }
        }
        Expression::ParentAccess { levels, inner } => {
            let mut parent_receiver = receiver.clone();
            for _ in 0..*levels {
                parent_receiver = quote! { #parent_receiver.parent };
            }
            render_expression(inner, &parent_receiver)
        }
        Expression::FieldAccess { field } => {
            let field = format_ident!("{}", sanitize(field));
            quote! { #receiver.#field.clone() }
        }
        Expression::NewInstance { type_, ctor, args } => {
            let type_path = type_.syn_type();
            let ctor = format_ident!("{}", sanitize(ctor));
            let args = args.iter().map(|arg| render_expression(arg, receiver));
            quote! { <#type_path>::#ctor(#(#args),*) }
        }
        Expression::ModuleMethod {
            module,
            module_field,
            method,
            args,
        } => {
            let method = format_ident!("{}", sanitize(method));
            let args = args
                .iter()
                .map(|arg| render_expression(arg, receiver))
                .collect::<Vec<TokenStream>>();
            match module_field {
                Some(field) => {
                    let field = format_ident!("{}", sanitize(field));
                    quote! { #receiver.#field.#method(#(#args),*) }
                }
                None => {
                    let module_path = module.syn_type();
                    quote! { <#module_path>::#method(#(#args),*) }
                }
            }
        }
        Expression::DependencyComponentMethod {
            component_field,
            method,
        } => {
            let field = format_ident!("{}", sanitize(component_field));
            let method = format_ident!("{}", sanitize(method));
            quote! { #receiver.#field.#method() }
        }
        Expression::ProviderOf { method } => {
            let method = format_ident!("{}", sanitize(method));
            quote! { solder::Provider::new(|| #receiver.#method()) }
        }
        Expression::ProducerOf { method } => {
            let method = format_ident!("{}", sanitize(method));
            quote! { solder::Producer::new(|| #receiver.#method()) }
        }
        Expression::DoubleCheck { field, inner } => {
            let field = format_ident!("{}", sanitize(field));
            let inner = render_expression(inner, receiver);
            quote! { #receiver.#field.get(|| #inner) }
        }
        Expression::SingleCheck { field, inner } => {
            let field = format_ident!("{}", sanitize(field));
            let inner = render_expression(inner, receiver);
            quote! { #receiver.#field.get_local(|| #inner) }
        }
        Expression::LazyWrap { inner } => {
            let inner = render_expression(inner, receiver);
            quote! { solder::Lazy::new(#inner) }
        }
        Expression::ProviderOfLazy { method } => {
            let method = format_ident!("{}", sanitize(method));
            quote! {
                solder::Provider::new(|| solder::Lazy::new(solder::Provider::new(|| #receiver.#method())))
            }
        }
        Expression::FutureOf { inner } => {
            let inner = render_expression(inner, receiver);
            quote! { solder::Future::from(#inner) }
        }
        Expression::VecOf { elements } => {
            let elements = elements.iter().map(|e| render_expression(e, receiver));
            quote! { vec![#(#elements),*] }
        }
        Expression::EmptyVec => quote! { ::std::vec::Vec::new() },
        Expression::MapOf { entries } => {
            let mut into_maps = quote! {};
            for (map_key, value) in entries {
                let key = render_map_key(map_key);
                let value = render_expression(value, receiver);
                into_maps = quote! {
                    #into_maps
                    result.insert(#key, #value);
                }
            }
            quote! {
                {
                    #[allow(unused_mut)]
                    let mut result = ::std::collections::HashMap::new();
                    #into_maps
                    result
                }
            }
        }
        Expression::OptionalPresent { inner } => {
            let inner = render_expression(inner, receiver);
            quote! { Some(#inner) }
        }
        Expression::OptionalAbsent => quote! { None },
        Expression::SubcomponentBuilder { child } => {
            let builder = format_ident!("{}BuilderImpl", sanitize(&child.local_name()));
            quote! { Box::new(#builder { parent: #receiver }) }
        }
        Expression::MembersInject { sites } => {
            let mut statements = quote! {};
            for (site, args) in sites {
                let name = format_ident!("{}", sanitize(&site.name));
                let args = args
                    .iter()
                    .map(|arg| render_expression(arg, receiver))
                    .collect::<Vec<TokenStream>>();
                statements = match site.kind {
                    crate::binding::InjectionSiteKind::Field => {
                        let arg = &args[0];
                        quote! {
                            #statements
                            instance.#name = #arg;
                        }
                    }
                    crate::binding::InjectionSiteKind::Method => quote! {
                        #statements
                        instance.#name(#(#args),*);
                    },
                };
            }
            quote! {
                |instance| {
                    #statements
                }
            }
        }
        Expression::AssistedFactoryImpl { target_method } => {
            let method = format_ident!("{}", sanitize(target_method));
            quote! { #receiver.parent_component().#method() }
        }
    }
}

fn render_map_key(map_key: &MapKeyValue) -> TokenStream {
    match map_key {
        MapKeyValue::Str(key) => quote! { #key.to_owned() },
        MapKeyValue::I32(key) => quote! { #key },
        MapKeyValue::Enum(enum_type, variant) => {
            let enum_path = enum_type.syn_type();
            let variant = format_ident!("{}", variant);
            quote! { #enum_path::#variant }
        }
        MapKeyValue::Class(type_) => {
            let path = type_.canonical_string_path();
            quote! { #path.to_owned() }
        }
    }
}

/// Identifier-safe rendering of generated names. Path separators collapse
/// the same way type identifiers do.
fn sanitize(name: &str) -> String {
    name.replace("::", "ⵆ").replace(['<', '>', ' ', '&'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{FieldNode, MethodNode};
    use solder_common::type_data;

    #[test]
    fn renders_component_impl_shape() {
        let plan = EmissionPlan {
            generated_types: vec![GeneratedType {
                name: "MyComponentImpl".to_owned(),
                originating_elements: vec!["::test::MyComponent".to_owned()],
                body: vec![
                    DeclNode::Field(FieldNode {
                        name: "module".to_owned(),
                        type_: "::std::string::String".to_owned(),
                    }),
                    DeclNode::Method(MethodNode {
                        name: "value".to_owned(),
                        return_type: Some(type_data::from_str("i32", "test").unwrap()),
                        expression: Expression::ProviderMethod {
                            method: "provide_value".to_owned(),
                        },
                        is_trait_impl: true,
                    }),
                ],
            }],
            planned_bindings: Vec::new(),
            records: Vec::new(),
        };
        let rendered = render_plan(&plan).to_string();
        assert!(rendered.contains("struct MyComponentImpl"));
        assert!(rendered.contains("fn value"));
        assert!(rendered.contains("provide_value"));
    }
}
