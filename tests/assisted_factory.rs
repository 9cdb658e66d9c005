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

fn car() -> TypeElement {
    TypeElement {
        type_data: t("::test::Car"),
        kind: ElementKind::Struct,
        methods: vec![MethodElement {
            name: "new".to_owned(),
            annotations: vec![ann("solder::AssistedInject")],
            parameters: vec![
                param("engine", "::test::Engine"),
                annotated_param("color", "String", vec![ann("solder::Assisted")]),
            ],
            return_type: Some(t("::test::Car")),
            is_static: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn car_factory() -> TypeElement {
    TypeElement {
        type_data: t("::test::CarFactory"),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::AssistedFactory")],
        methods: vec![MethodElement {
            name: "create".to_owned(),
            parameters: vec![param("color", "String")],
            return_type: Some(t("::test::Car")),
            is_abstract: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn assisted_type_reachable_through_its_factory() {
    let out = compile_types(vec![
        injectable("::test::Engine", vec![]),
        car(),
        car_factory(),
        component(
            "::test::MyComponent",
            &[],
            vec![entry("factory", "::test::CarFactory")],
        ),
    ]);
    assert_no_diagnostics(&out);

    let plan = out.plan.as_ref().unwrap();
    assert!(plan
        .planned_bindings
        .iter()
        .any(|p| p.key.type_.readable() == "test::CarFactory"));
    assert!(plan
        .planned_bindings
        .iter()
        .any(|p| p.key.type_.readable() == "test::Car"));
    assert!(plan
        .generated_types
        .iter()
        .any(|t| t.name == "CarFactoryImpl"));
}

#[test]
fn mismatched_factory_parameters_are_an_error() {
    let mut factory = car_factory();
    factory.methods[0].parameters = vec![param("count", "i32")];
    let out = compile_types(vec![
        injectable("::test::Engine", vec![]),
        car(),
        factory,
        component(
            "::test::MyComponent",
            &[],
            vec![entry("factory", "::test::CarFactory")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "do not match the assisted parameters of test::Car.new");
    assert_error_containing(&out, "count: i32");
    assert_error_containing(&out, "color: std::string::String");
}

#[test]
fn factory_must_target_an_assisted_inject_constructor() {
    let mut factory = car_factory();
    factory.methods[0].return_type = Some(t("::test::Engine"));
    let out = compile_types(vec![
        injectable("::test::Engine", vec![]),
        car(),
        factory,
        component(
            "::test::MyComponent",
            &[],
            vec![entry("factory", "::test::CarFactory")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(
        &out,
        "assisted factories must return a type with an assisted_inject constructor",
    );
}

#[test]
fn assisted_type_cannot_be_scoped() {
    let mut scoped_car = car();
    scoped_car.annotations.push(ann("solder::Singleton"));
    let out = compile_types(vec![
        injectable("::test::Engine", vec![]),
        scoped_car,
        car_factory(),
        component(
            "::test::MyComponent",
            &[],
            vec![entry("factory", "::test::CarFactory")],
        ),
    ]);
    assert!(out.has_errors());
    assert_error_containing(&out, "assisted injection types cannot be scoped");
}
