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
use solder::manifest::{ElementKind, MethodElement, TypeElement};
use solder::planner::{DeclNode, Expression};

fn other_component() -> TypeElement {
    TypeElement {
        type_data: t("::test::OtherComponent"),
        kind: ElementKind::Trait,
        methods: vec![MethodElement {
            name: "logger".to_owned(),
            return_type: Some(t("::test::Logger")),
            is_abstract: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn dependent_component() -> TypeElement {
    TypeElement {
        type_data: t("::test::MyComponent"),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::Component")
            .with_member("modules", type_list(&[]))
            .with_member("dependencies", type_list(&["::test::OtherComponent"]))],
        methods: vec![MethodElement {
            name: "logger".to_owned(),
            return_type: Some(t("::test::Logger")),
            is_abstract: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn dependency_component_provision_is_inherited() {
    let out = compile_types(vec![other_component(), dependent_component()]);
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    let impl_ = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MyComponentImpl")
        .unwrap();
    assert!(impl_.body.iter().any(|node| matches!(
        node,
        DeclNode::Method(method)
            if matches!(method.expression, Expression::DependencyComponentMethod { .. })
    )));
    // The dependency instance is held as a component field.
    assert!(impl_.body.iter().any(|node| matches!(
        node,
        DeclNode::Field(field) if field.type_ == "test::OtherComponent"
    )));
}

#[test]
fn pending_dependency_defers_the_component() {
    let model = model_of(vec![dependent_component()]).with_pending(&["test::OtherComponent"]);
    let out = solder::compile(&model, &solder::options::CompilerOptions::new());
    assert!(out.diagnostics.is_empty(), "{:#?}", rendered_messages(&out));
    assert!(out.deferred.contains(&"test::MyComponent".to_owned()));
}
