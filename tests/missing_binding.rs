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

#[test]
fn missing_binding_reports_trace_from_entry_point() {
    let out = compile_types(vec![component(
        "::test::MyComponent",
        &[],
        vec![entry("value", "String")],
    )]);
    assert!(out.has_errors());
    assert!(out.plan.is_none(), "emission must be skipped on errors");
    assert_error_containing(&out, "missing bindings for std::string::String");
    assert_error_containing(&out, "requested by: test::MyComponent.value");
}

#[test]
fn transitive_missing_binding_lists_the_full_chain() {
    let out = compile_types(vec![
        injectable("::test::Foo", vec![param("name", "String")]),
        component("::test::MyComponent", &[], vec![entry("foo", "::test::Foo")]),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "missing bindings for std::string::String");
    assert_error_containing(&out, "requested by: test::Foo (injectable)");
    assert_error_containing(&out, "requested by: test::MyComponent.foo");
}

#[test]
fn other_components_still_compile_after_an_error() {
    // A failing root must not stop a healthy sibling root from resolving.
    let out = compile_types(vec![
        component("::test::Broken", &[], vec![entry("value", "String")]),
        module("::test::MyModule", vec![provides("provide_int", "i32")]),
        component(
            "::test::Healthy",
            &["::test::MyModule"],
            vec![entry("value", "i32")],
        ),
    ]);
    assert!(out.has_errors());
    // Only the one missing binding is reported.
    assert_eq!(out.errors().len(), 1, "{:#?}", rendered_messages(&out));
}
