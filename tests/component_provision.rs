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

mod common;

use common::*;
use solder::planner::{DeclNode, Expression};

#[test]
fn module_provision_satisfies_entry_point() {
    let out = compile_types(vec![
        module("::test::MyModule", vec![provides("provide_int", "i32")]),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("value", "i32")],
        ),
    ]);
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().expect("emission proceeds without errors");
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .expect("component impl planned");
    let trait_method = impl_
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) if method.name == "value" => Some(method),
            _ => None,
        })
        .expect("entry point method planned");
    assert!(trait_method.is_trait_impl);
    assert!(matches!(
        trait_method.expression,
        Expression::ProviderMethod { .. }
    ));

    assert!(plan
        .planned_bindings
        .iter()
        .any(|p| p.key.type_.readable() == "i32"));
}

#[test]
fn static_provides_invokes_module_without_instance() {
    let out = compile_types(vec![
        module("::test::MyModule", vec![provides("provide_int", "i32")]),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("value", "i32")],
        ),
    ]);
    let plan = out.plan.as_ref().unwrap();
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .unwrap();
    let provider = impl_
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) => match method.expression {
                Expression::ModuleMethod {
                    ref module_field, ..
                } => Some(module_field.clone()),
                _ => None,
            },
            _ => None,
        })
        .expect("provider method planned");
    assert_eq!(provider, None);
}

#[test]
fn records_cover_modules_and_entry_points() {
    let out = compile_types(vec![
        module("::test::MyModule", vec![provides("provide_int", "i32")]),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("value", "i32")],
        ),
    ]);
    let plan = out.plan.as_ref().unwrap();
    assert!(plan
        .records
        .iter()
        .any(|r| r.module_name.as_deref() == Some("test::MyModule")));
    assert!(plan
        .records
        .iter()
        .any(|r| r.entry_point_name.as_deref() == Some("value")));
}
