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
use solder::manifest::{ElementKind, TypeElement};

fn qualifier_type() -> TypeElement {
    TypeElement {
        type_data: t("::test::Q"),
        kind: ElementKind::Struct,
        annotations: vec![ann("solder::Qualifier")],
        ..Default::default()
    }
}

#[test]
fn qualified_and_unqualified_keys_are_distinct() {
    let mut qualified_entry = entry("q_string", "String");
    qualified_entry.annotations.push(ann("test::Q"));
    let out = compile_types(vec![
        qualifier_type(),
        module(
            "::test::MyModule",
            vec![
                provides("provide_string", "String"),
                provides_annotated("provide_q_string", "String", vec![ann("test::Q")]),
            ],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("string", "String"), qualified_entry],
        ),
    ]);
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    let string_bindings = plan
        .planned_bindings
        .iter()
        .filter(|p| p.key.type_.readable() == "std::string::String")
        .collect::<Vec<_>>();
    assert_eq!(string_bindings.len(), 2);
    assert!(string_bindings.iter().any(|p| p.key.qualifier.is_some()));
    assert!(string_bindings.iter().any(|p| p.key.qualifier.is_none()));
}

#[test]
fn duplicate_unqualified_bindings_are_an_error() {
    let out = compile_types(vec![
        module(
            "::test::MyModule",
            vec![
                provides("provide_a", "String"),
                provides("provide_b", "String"),
            ],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("string", "String")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "found duplicated bindings for std::string::String");
    assert_error_containing(&out, "test::MyModule.provide_a (module provides)");
    assert_error_containing(&out, "test::MyModule.provide_b (module provides)");
}

#[test]
fn two_qualifiers_on_one_method_are_an_error() {
    let second_qualifier = TypeElement {
        type_data: t("::test::R"),
        kind: ElementKind::Struct,
        annotations: vec![ann("solder::Qualifier")],
        ..Default::default()
    };
    let out = compile_types(vec![
        qualifier_type(),
        second_qualifier,
        module(
            "::test::MyModule",
            vec![provides_annotated(
                "provide_string",
                "String",
                vec![ann("test::Q"), ann("test::R")],
            )],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("string", "String")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "only one qualifier annotation allowed");
}
