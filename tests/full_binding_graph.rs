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
use solder::manifest::TypeElement;
use solder::options::CompilerOptions;

fn fixture() -> Vec<TypeElement> {
    vec![module(
        "::test::UninstalledModule",
        vec![provides_with(
            "make_service",
            "::test::Service",
            vec![param("dep", "::test::Missing")],
        )],
    )]
}

#[test]
fn uninstalled_modules_are_silent_by_default() {
    let out = compile_types(fixture());
    assert_no_diagnostics(&out);
}

#[test]
fn full_binding_graph_validation_checks_uninstalled_modules() {
    let (options, _) = CompilerOptions::from_pairs([("full_binding_graph_validation", "true")]);
    let out = compile_with(fixture(), &options);
    assert!(out.has_errors());
    assert_error_containing(&out, "missing bindings for test::Missing");
}

#[test]
fn installed_modules_are_not_revalidated_as_full_graphs() {
    let (options, _) = CompilerOptions::from_pairs([("full_binding_graph_validation", "true")]);
    let mut types = fixture();
    types.push(module(
        "::test::InstalledModule",
        vec![provides("provide_int", "i32")],
    ));
    types.push(component(
        "::test::MyComponent",
        &["::test::InstalledModule"],
        vec![entry("value", "i32")],
    ));
    let out = compile_with(types, &options);
    // Only the uninstalled module's graph reports.
    assert_eq!(out.errors().len(), 1, "{:#?}", rendered_messages(&out));
}
