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

fn optional_expression(out: &solder::CompileOutput) -> Expression {
    let plan = out.plan.as_ref().unwrap();
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .unwrap();
    impl_
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) => match method.expression {
                Expression::OptionalPresent { .. } | Expression::OptionalAbsent => {
                    Some(method.expression.clone())
                }
                _ => None,
            },
            _ => None,
        })
        .expect("optional binding planned")
}

#[test]
fn optional_present_when_underlying_bound() {
    let out = compile_types(vec![
        module(
            "::test::MyModule",
            vec![
                binds_option_of("opt_string", "String"),
                provides("provide_string", "String"),
            ],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("opt", "Option<String>")],
        ),
    ]);
    assert_no_diagnostics(&out);
    assert!(matches!(
        optional_expression(&out),
        Expression::OptionalPresent { .. }
    ));
}

#[test]
fn optional_absent_when_underlying_unbound() {
    let out = compile_types(vec![
        module(
            "::test::MyModule",
            vec![binds_option_of("opt_string", "String")],
        ),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("opt", "Option<String>")],
        ),
    ]);
    // Absence is not a missing binding.
    assert_no_diagnostics(&out);
    assert!(matches!(optional_expression(&out), Expression::OptionalAbsent));
}
