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

use crate::annotation::AnnotationData;
use crate::type_data::TypeData;
use serde::{Deserialize, Serialize};

/// The declarations of the program under compilation, as supplied by a host.
///
/// Element order within every list is declaration order; the compiler relies
/// on it for deterministic output.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct ProgramManifest {
    pub crate_name: String,
    pub types: Vec<TypeElement>,
    pub merged_crates: Vec<String>,
}

impl ProgramManifest {
    pub fn new() -> ProgramManifest {
        Default::default()
    }

    pub fn merge_from(&mut self, other: &ProgramManifest) {
        self.types.extend_from_slice(other.types.as_slice());
        self.merged_crates
            .extend_from_slice(other.merged_crates.as_slice());
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
pub enum ElementKind {
    Struct,
    Trait,
    Enum,
}

impl Default for ElementKind {
    fn default() -> Self {
        ElementKind::Struct
    }
}

/// One type declaration: a struct, trait or enum with its annotations and
/// member elements.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct TypeElement {
    pub type_data: TypeData,
    pub kind: ElementKind,
    pub annotations: Vec<AnnotationData>,
    pub methods: Vec<MethodElement>,
    pub fields: Vec<FieldElement>,
    pub supertypes: Vec<TypeData>,
    pub nested: Vec<TypeData>,
}

impl TypeElement {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn annotation(&self, path: &str) -> Option<&AnnotationData> {
        self.annotations.iter().find(|a| a.is(path))
    }

    pub fn has_annotation(&self, path: &str) -> bool {
        self.annotation(path).is_some()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct MethodElement {
    pub name: String,
    pub annotations: Vec<AnnotationData>,
    pub parameters: Vec<ParameterElement>,
    pub return_type: Option<TypeData>,
    pub is_abstract: bool,
    pub is_static: bool,
    pub type_variables: Vec<String>,
}

impl MethodElement {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn annotation(&self, path: &str) -> Option<&AnnotationData> {
        self.annotations.iter().find(|a| a.is(path))
    }

    pub fn has_annotation(&self, path: &str) -> bool {
        self.annotation(path).is_some()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct ParameterElement {
    pub name: String,
    pub type_data: TypeData,
    pub annotations: Vec<AnnotationData>,
}

impl ParameterElement {
    pub fn annotation(&self, path: &str) -> Option<&AnnotationData> {
        self.annotations.iter().find(|a| a.is(path))
    }

    pub fn has_annotation(&self, path: &str) -> bool {
        self.annotation(path).is_some()
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct FieldElement {
    pub name: String,
    pub type_data: TypeData,
    pub annotations: Vec<AnnotationData>,
    pub is_private: bool,
    pub is_static: bool,
}

impl FieldElement {
    pub fn has_annotation(&self, path: &str) -> bool {
        self.annotations.iter().any(|a| a.is(path))
    }
}
