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

fn logger_trait() -> TypeElement {
    TypeElement {
        type_data: t("::test::Logger"),
        kind: ElementKind::Trait,
        ..Default::default()
    }
}

fn stdout_logger() -> TypeElement {
    let mut element = injectable("::test::StdoutLogger", vec![]);
    element.supertypes.push(t("dyn ::test::Logger"));
    element
}

#[test]
fn binds_delegates_to_assignable_impl() {
    let out = compile_types(vec![
        logger_trait(),
        stdout_logger(),
        module(
            "::test::MyModule",
            vec![binds("bind_logger", "::test::StdoutLogger", "dyn ::test::Logger")],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("logger", "dyn ::test::Logger")],
        ),
    ]);
    assert_no_diagnostics(&out);
    let plan = out.plan.as_ref().unwrap();
    // Both the delegate and its target resolve.
    assert!(plan
        .planned_bindings
        .iter()
        .any(|p| p.key.type_.readable() == "dyn test::Logger"));
    assert!(plan
        .planned_bindings
        .iter()
        .any(|p| p.key.type_.readable() == "test::StdoutLogger"));
}

#[test]
fn binds_to_unrelated_type_is_an_error() {
    let out = compile_types(vec![
        logger_trait(),
        injectable("::test::NotALogger", vec![]),
        module(
            "::test::MyModule",
            vec![binds("bind_logger", "::test::NotALogger", "dyn ::test::Logger")],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("logger", "dyn ::test::Logger")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "is not assignable to the bound type");
}

#[test]
fn binds_method_with_body_is_rejected() {
    let mut ill_formed = binds("bind_logger", "::test::StdoutLogger", "dyn ::test::Logger");
    ill_formed.is_abstract = false;
    let out = compile_types(vec![
        logger_trait(),
        stdout_logger(),
        module("::test::MyModule", vec![ill_formed]),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("logger", "dyn ::test::Logger")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "binds methods must be abstract");
}
