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
use solder::type_data::TypeData;

fn builder_trait(path: &str, component_path: &str) -> TypeElement {
    TypeElement {
        type_data: t(path),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::ComponentBuilder")],
        methods: vec![MethodElement {
            name: "build".to_owned(),
            return_type: Some(t(component_path)),
            is_abstract: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn hoist_fixture() -> Vec<TypeElement> {
    let root_module = module_annotated(
        "::test::RootModule",
        ann("solder::Module").with_member("subcomponents", type_list(&["::test::MySub"])),
        vec![provides("provide_logger", "::test::Logger")],
    );
    let mut sub = subcomponent(
        "::test::MySub",
        &[],
        vec![entry("logger", "::test::Logger")],
    );
    sub.nested.push(TypeData::from_global("test::MySubBuilder"));
    vec![
        root_module,
        sub,
        builder_trait("::test::MySubBuilder", "::test::MySub"),
        component(
            "::test::MyComponent",
            &["::test::RootModule"],
            vec![entry("sub", "::test::MySubBuilder")],
        ),
    ]
}

#[test]
fn parent_binding_owned_by_root_not_duplicated_in_child() {
    let out = compile_types(hoist_fixture());
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    let logger_bindings = plan
        .planned_bindings
        .iter()
        .filter(|p| p.key.type_.readable() == "test::Logger")
        .collect::<Vec<_>>();
    assert_eq!(logger_bindings.len(), 1);
    assert!(
        logger_bindings[0].component_path.at_root(),
        "the binding is owned by the root component"
    );
}

#[test]
fn child_reaches_parent_binding_through_parent_reference() {
    let out = compile_types(hoist_fixture());
    let plan = out.plan.as_ref().unwrap();
    let sub_impl = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MySubImpl")
        .expect("subcomponent impl planned");
    let logger_entry = sub_impl
        .body
        .iter()
        .find_map(|node| match node {
            DeclNode::Method(method) if method.name == "logger" => Some(method),
            _ => None,
        })
        .expect("child entry point planned");
    assert!(
        matches!(
            logger_entry.expression,
            Expression::ParentAccess { levels: 1, .. }
        ),
        "child accesses the root-owned binding via its parent: {:?}",
        logger_entry.expression
    );
}

#[test]
fn subcomponent_impl_carries_parent_field() {
    let out = compile_types(hoist_fixture());
    let plan = out.plan.as_ref().unwrap();
    let sub_impl = plan
        .generated_types
        .iter()
        .find(|t| t.name == "MySubImpl")
        .unwrap();
    assert!(sub_impl.body.iter().any(|node| matches!(
        node,
        DeclNode::Field(field) if field.name == "parent"
    )));
}
