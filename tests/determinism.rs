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
use solder::render::render_plan;

fn fixture() -> Vec<TypeElement> {
    vec![
        injectable("::test::Repo", vec![param("db", "::test::Db")]),
        injectable("::test::Db", vec![]),
        module(
            "::test::MyModule",
            vec![
                provides("provide_int", "i32"),
                provides_annotated("provide_a", "String", vec![ann("solder::IntoVec")]),
                provides_annotated("provide_b", "String", vec![ann("solder::IntoVec")]),
            ],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![
                entry("value", "i32"),
                entry("strings", "Vec<String>"),
                entry("repo", "::test::Repo"),
            ],
        ),
    ]
}

#[test]
fn identical_runs_produce_identical_output() {
    let first = compile_types(fixture());
    let second = compile_types(fixture());
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.deferred, second.deferred);
    assert_eq!(first.plan, second.plan);
}

#[test]
fn rendered_plans_are_byte_identical() {
    let first = compile_types(fixture());
    let second = compile_types(fixture());
    let rendered_first = render_plan(first.plan.as_ref().unwrap()).to_string();
    let rendered_second = render_plan(second.plan.as_ref().unwrap()).to_string();
    assert_eq!(rendered_first, rendered_second);
    assert!(!rendered_first.is_empty());
}

#[test]
fn diagnostic_order_is_stable_across_runs() {
    let broken = vec![
        component("::test::Broken", &[], vec![entry("a", "String"), entry("b", "i32")]),
    ];
    let first = compile_with(broken.clone(), &CompilerOptions::new());
    let second = compile_with(broken, &CompilerOptions::new());
    assert_eq!(
        rendered_messages(&first),
        rendered_messages(&second)
    );
    assert_eq!(first.errors().len(), 2);
}
