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
fn zero_modules_one_factory_per_injectable() {
    let out = compile_types(vec![
        injectable("::test::Bar", vec![]),
        injectable("::test::Foo", vec![param("bar", "::test::Bar")]),
        component("::test::MyComponent", &[], vec![entry("foo", "::test::Foo")]),
    ]);
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    assert!(plan
        .generated_types
        .iter()
        .any(|t| t.name == "MyComponentImpl"));
    let factories = plan
        .planned_bindings
        .iter()
        .map(|p| p.generated_name.clone())
        .collect::<Vec<String>>();
    assert!(factories.contains(&"Foo_Factory".to_owned()), "{:?}", factories);
    assert!(factories.contains(&"Bar_Factory".to_owned()), "{:?}", factories);
}

#[test]
fn injectable_constructed_from_dependencies() {
    let out = compile_types(vec![
        injectable("::test::Bar", vec![]),
        injectable("::test::Foo", vec![param("bar", "::test::Bar")]),
        component("::test::MyComponent", &[], vec![entry("foo", "::test::Foo")]),
    ]);
    let plan = out.plan.as_ref().unwrap();
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .unwrap();
    let ctor_args = impl_
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) => match method.expression {
                Expression::NewInstance { ref type_, ref args, .. }
                    if type_.readable() == "test::Foo" =>
                {
                    Some(args.clone())
                }
                _ => None,
            },
            _ => None,
        })
        .expect("injectable constructor planned");
    assert_eq!(ctor_args.len(), 1);
    assert!(matches!(ctor_args[0], Expression::ProviderMethod { .. }));
}
