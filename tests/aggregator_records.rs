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
use solder::manifest::{ElementKind, TypeElement};
use solder::records::ComponentDependencies;

#[test]
fn emitted_records_read_back_without_rescanning() {
    let out = compile_types(vec![
        module("::test::MyModule", vec![provides("provide_int", "i32")]),
        component(
            "::test::MyComponent",
            &["::test::MyModule"],
            vec![entry("value", "i32")],
        ),
    ]);
    let records = out.plan.as_ref().unwrap().records.clone();
    assert!(!records.is_empty());

    // A later round sees the records as annotated marker types in the
    // aggregated package.
    let marker_types = records
        .iter()
        .enumerate()
        .map(|(index, record)| TypeElement {
            type_data: t(&format!("::solder::aggregated::record_{}", index)),
            kind: ElementKind::Struct,
            annotations: vec![record.to_annotation()],
            ..Default::default()
        })
        .collect::<Vec<TypeElement>>();
    let next_round = model_of(marker_types);
    let read_back = ComponentDependencies::from_model(&next_round);
    assert_eq!(read_back, records);
}

#[test]
fn records_name_the_full_component_path() {
    let root_module = module_annotated(
        "::test::RootModule",
        ann("solder::Module").with_member("subcomponents", type_list(&["::test::MySub"])),
        vec![provides("provide_int", "i32")],
    );
    let mut sub = subcomponent("::test::MySub", &[], vec![entry("value", "i32")]);
    sub.nested.push(t("::test::MySubBuilder"));
    let builder = TypeElement {
        type_data: t("::test::MySubBuilder"),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::ComponentBuilder")],
        methods: vec![solder::manifest::MethodElement {
            name: "build".to_owned(),
            return_type: Some(t("::test::MySub")),
            is_abstract: true,
            ..Default::default()
        }],
        ..Default::default()
    };
    let out = compile_types(vec![
        root_module,
        sub,
        builder,
        component(
            "::test::MyComponent",
            &["::test::RootModule"],
            vec![entry("sub", "::test::MySubBuilder")],
        ),
    ]);
    assert_no_diagnostics(&out);
    let records = &out.plan.as_ref().unwrap().records;
    assert!(records.iter().any(|r| {
        r.component_names == vec!["test::MyComponent".to_owned(), "test::MySub".to_owned()]
            && r.entry_point_name.as_deref() == Some("value")
    }));
}
