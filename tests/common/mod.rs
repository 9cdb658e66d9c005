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

#![allow(dead_code)]

use solder::annotation::{AnnotationData, AnnotationValue};
use solder::manifest::{
    ElementKind, FieldElement, MethodElement, ParameterElement, ProgramManifest, TypeElement,
};
use solder::model::ManifestModel;
use solder::options::CompilerOptions;
use solder::type_data::{self, TypeData};
use solder::{compile, CompileOutput};

pub fn t(path: &str) -> TypeData {
    type_data::from_str(path, "test").unwrap()
}

pub fn ann(path: &str) -> AnnotationData {
    AnnotationData::from_path(path)
}

pub fn type_list(paths: &[&str]) -> AnnotationValue {
    AnnotationValue::TypeList(paths.iter().map(|p| t(p)).collect())
}

pub fn param(name: &str, type_: &str) -> ParameterElement {
    ParameterElement {
        name: name.to_owned(),
        type_data: t(type_),
        annotations: Vec::new(),
    }
}

pub fn annotated_param(name: &str, type_: &str, annotations: Vec<AnnotationData>) -> ParameterElement {
    ParameterElement {
        name: name.to_owned(),
        type_data: t(type_),
        annotations,
    }
}

/// A static `#[provides]` method.
pub fn provides(name: &str, return_type: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: vec![ann("solder::Provides")],
        parameters: Vec::new(),
        return_type: Some(t(return_type)),
        is_abstract: false,
        is_static: true,
        type_variables: Vec::new(),
    }
}

pub fn provides_with(
    name: &str,
    return_type: &str,
    parameters: Vec<ParameterElement>,
) -> MethodElement {
    MethodElement {
        parameters,
        ..provides(name, return_type)
    }
}

/// A `#[provides]` method with extra annotations (scope, qualifier,
/// multibinding contributions).
pub fn provides_annotated(
    name: &str,
    return_type: &str,
    mut annotations: Vec<AnnotationData>,
) -> MethodElement {
    let mut method = provides(name, return_type);
    method.annotations.append(&mut annotations);
    method
}

/// An abstract `#[binds]` method.
pub fn binds(name: &str, impl_type: &str, bound_type: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: vec![ann("solder::Binds")],
        parameters: vec![param("impl_", impl_type)],
        return_type: Some(t(bound_type)),
        is_abstract: true,
        is_static: false,
        type_variables: Vec::new(),
    }
}

pub fn multibinds(name: &str, return_type: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: vec![ann("solder::Multibinds")],
        parameters: Vec::new(),
        return_type: Some(t(return_type)),
        is_abstract: true,
        is_static: false,
        type_variables: Vec::new(),
    }
}

pub fn binds_option_of(name: &str, underlying: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: vec![ann("solder::BindsOptionOf")],
        parameters: Vec::new(),
        return_type: Some(t(underlying)),
        is_abstract: true,
        is_static: false,
        type_variables: Vec::new(),
    }
}

/// An abstract component method (entry point).
pub fn entry(name: &str, return_type: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: Vec::new(),
        parameters: Vec::new(),
        return_type: Some(t(return_type)),
        is_abstract: true,
        is_static: false,
        type_variables: Vec::new(),
    }
}

pub fn members_injection_entry(name: &str, target: &str) -> MethodElement {
    MethodElement {
        name: name.to_owned(),
        annotations: Vec::new(),
        parameters: vec![param("instance", target)],
        return_type: None,
        is_abstract: true,
        is_static: false,
        type_variables: Vec::new(),
    }
}

pub fn module(path: &str, methods: Vec<MethodElement>) -> TypeElement {
    module_annotated(path, ann("solder::Module"), methods)
}

pub fn module_annotated(
    path: &str,
    annotation: AnnotationData,
    methods: Vec<MethodElement>,
) -> TypeElement {
    TypeElement {
        type_data: t(path),
        kind: ElementKind::Struct,
        annotations: vec![annotation],
        methods,
        ..Default::default()
    }
}

pub fn component(path: &str, modules: &[&str], methods: Vec<MethodElement>) -> TypeElement {
    TypeElement {
        type_data: t(path),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::Component").with_member("modules", type_list(modules))],
        methods,
        ..Default::default()
    }
}

pub fn subcomponent(path: &str, modules: &[&str], methods: Vec<MethodElement>) -> TypeElement {
    TypeElement {
        type_data: t(path),
        kind: ElementKind::Trait,
        annotations: vec![ann("solder::Subcomponent").with_member("modules", type_list(modules))],
        methods,
        ..Default::default()
    }
}

/// A struct with an `#[inject]` constructor whose parameters are the
/// dependencies.
pub fn injectable(path: &str, dependencies: Vec<ParameterElement>) -> TypeElement {
    TypeElement {
        type_data: t(path),
        kind: ElementKind::Struct,
        methods: vec![MethodElement {
            name: "new".to_owned(),
            annotations: vec![ann("solder::Inject")],
            parameters: dependencies,
            return_type: Some(t(path)),
            is_abstract: false,
            is_static: true,
            type_variables: Vec::new(),
        }],
        ..Default::default()
    }
}

pub fn field(name: &str, type_: &str, annotations: Vec<AnnotationData>) -> FieldElement {
    FieldElement {
        name: name.to_owned(),
        type_data: t(type_),
        annotations,
        is_private: false,
        is_static: false,
    }
}

pub fn model_of(types: Vec<TypeElement>) -> ManifestModel {
    let manifest = ProgramManifest {
        crate_name: "test".to_owned(),
        types,
        merged_crates: Vec::new(),
    };
    ManifestModel::new(manifest)
}

pub fn compile_types(types: Vec<TypeElement>) -> CompileOutput {
    compile(&model_of(types), &CompilerOptions::new())
}

pub fn compile_with(types: Vec<TypeElement>, options: &CompilerOptions) -> CompileOutput {
    compile(&model_of(types), options)
}

pub fn rendered_messages(output: &CompileOutput) -> Vec<String> {
    output.diagnostics.iter().map(|d| d.rendered()).collect()
}

pub fn assert_no_diagnostics(output: &CompileOutput) {
    assert!(
        output.diagnostics.is_empty(),
        "expected no diagnostics, got: {:#?}",
        rendered_messages(output)
    );
}

pub fn assert_error_containing(output: &CompileOutput, needle: &str) {
    assert!(
        output
            .errors()
            .iter()
            .any(|d| d.rendered().contains(needle)),
        "expected an error containing '{}', got: {:#?}",
        needle,
        rendered_messages(output)
    );
}
