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
use solder::diagnostics::DiagnosticKind;
use solder::options::CompilerOptions;
use solder::planner::{DeclNode, Expression};

fn cyclic_fixture() -> Vec<solder::manifest::TypeElement> {
    vec![
        injectable("::test::A", vec![param("b", "Lazy<::test::B>")]),
        injectable("::test::B", vec![param("a", "::test::A")]),
        component("::test::MyComponent", &[], vec![entry("a", "::test::A")]),
    ]
}

#[test]
fn lazy_edge_breaks_instance_cycle() {
    let out = compile_types(cyclic_fixture());
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .unwrap();
    let a_args = impl_
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) => match method.expression {
                Expression::NewInstance { ref type_, ref args, .. }
                    if type_.readable() == "test::A" =>
                {
                    Some(args.clone())
                }
                _ => None,
            },
            _ => None,
        })
        .expect("A constructed");
    assert!(
        matches!(a_args[0], Expression::LazyWrap { .. }),
        "the lazy edge is a provider indirection: {:?}",
        a_args[0]
    );
}

#[test]
fn broken_cycle_noted_when_warning_option_enabled() {
    let (options, _) =
        CompilerOptions::from_pairs([("warn_if_injection_factory_generation_fails", "true")]);
    let out = compile_with(cyclic_fixture(), &options);
    assert!(out.errors().is_empty(), "{:#?}", rendered_messages(&out));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Note && d.message.contains("framework-typed edge")));
    assert!(out.plan.is_some(), "notes never suppress emission");
}

#[test]
fn instance_only_cycle_is_fatal() {
    let out = compile_types(vec![
        injectable("::test::A", vec![param("b", "::test::B")]),
        injectable("::test::B", vec![param("a", "::test::A")]),
        component("::test::MyComponent", &[], vec![entry("a", "::test::A")]),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "Cyclic dependency detected");
}
