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
use solder::options::CompilerOptions;

#[test]
fn module_referencing_a_pending_type_is_deferred_without_diagnostics() {
    let module_element = module_annotated(
        "::test::MyModule",
        ann("solder::Module").with_member("includes", type_list(&["::gen::GeneratedModule"])),
        vec![provides("provide_int", "i32")],
    );
    let component_element = component(
        "::test::MyComponent",
        &["::test::MyModule"],
        vec![entry("value", "i32")],
    );
    let model = model_of(vec![module_element, component_element])
        .with_pending(&["gen::GeneratedModule"]);
    let out = solder::compile(&model, &CompilerOptions::new());

    assert!(out.diagnostics.is_empty(), "{:#?}", rendered_messages(&out));
    assert!(out.deferred.contains(&"test::MyModule".to_owned()));
    // The component installing the deferred module defers too.
    assert!(out.deferred.contains(&"test::MyComponent".to_owned()));
}

#[test]
fn deferred_element_compiles_cleanly_once_the_type_arrives() {
    let generated = module("::gen::GeneratedModule", vec![provides("provide_int", "i32")]);
    let module_element = module_annotated(
        "::test::MyModule",
        ann("solder::Module").with_member("includes", type_list(&["::gen::GeneratedModule"])),
        vec![],
    );
    let component_element = component(
        "::test::MyComponent",
        &["::test::MyModule"],
        vec![entry("value", "i32")],
    );
    let out = compile_types(vec![generated, module_element, component_element]);
    assert_no_diagnostics(&out);
    assert!(out.deferred.is_empty());
    assert!(out.plan.is_some());
}
