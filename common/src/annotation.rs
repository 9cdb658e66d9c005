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

use crate::type_data::TypeData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single annotation member value.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone)]
pub enum AnnotationValue {
    Bool(bool),
    I32(i32),
    Str(String),
    Type(TypeData),
    EnumValue(TypeData, String),
    TypeList(Vec<TypeData>),
    StrList(Vec<String>),
}

impl AnnotationValue {
    pub fn as_type(&self) -> Option<&TypeData> {
        match self {
            AnnotationValue::Type(type_) => Some(type_),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type_list(&self) -> Option<&Vec<TypeData>> {
        match self {
            AnnotationValue::TypeList(list) => Some(list),
            _ => None,
        }
    }
}

/// A canonicalized annotation instance.
///
/// Equality is by annotation type and member values, never by how the
/// annotation was written in source. Member order is normalized by name.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Default)]
pub struct AnnotationData {
    pub type_: TypeData,
    pub members: BTreeMap<String, AnnotationValue>,
}

impl AnnotationData {
    pub fn new(type_: TypeData) -> Self {
        AnnotationData {
            type_,
            members: BTreeMap::new(),
        }
    }

    pub fn from_path(path: &str) -> Self {
        AnnotationData::new(TypeData::from_global(path))
    }

    pub fn with_member(mut self, name: &str, value: AnnotationValue) -> Self {
        self.members.insert(name.to_owned(), value);
        self
    }

    pub fn member(&self, name: &str) -> Option<&AnnotationValue> {
        self.members.get(name)
    }

    /// True if the annotation is the type at `path`, member values aside.
    pub fn is(&self, path: &str) -> bool {
        self.type_.canonical_string_path_without_args() == format!("::{}", path)
    }

    /// Human readable form.
    pub fn readable(&self) -> String {
        if self.members.is_empty() {
            return self.type_.readable();
        }
        let members = self
            .members
            .iter()
            .map(|(name, value)| format!("{}: {}", name, readable_value(value)))
            .collect::<Vec<String>>()
            .join(", ");
        format!("{}({})", self.type_.readable(), members)
    }

    /// Identifier-safe form, for generated names.
    pub fn identifier_string(&self) -> String {
        let mut result = self.type_.identifier_string();
        for (name, value) in &self.members {
            result.push('_');
            result.push_str(name);
            result.push('_');
            result.push_str(&identifier_value(value));
        }
        result
    }
}

fn readable_value(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Bool(b) => b.to_string(),
        AnnotationValue::I32(i) => i.to_string(),
        AnnotationValue::Str(s) => format!("\"{}\"", s),
        AnnotationValue::Type(t) => t.readable(),
        AnnotationValue::EnumValue(t, variant) => format!("{}::{}", t.readable(), variant),
        AnnotationValue::TypeList(list) => format!(
            "[{}]",
            list.iter()
                .map(|t| t.readable())
                .collect::<Vec<String>>()
                .join(", ")
        ),
        AnnotationValue::StrList(list) => format!("[{}]", list.join(", ")),
    }
}

fn identifier_value(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Bool(b) => b.to_string(),
        AnnotationValue::I32(i) => i.to_string().replace("-", "n"),
        AnnotationValue::Str(s) => s.replace(|c: char| !c.is_alphanumeric(), "_"),
        AnnotationValue::Type(t) => t.identifier_string(),
        AnnotationValue::EnumValue(t, variant) => {
            format!("{}ⵆ{}", t.identifier_string(), variant)
        }
        AnnotationValue::TypeList(list) => list
            .iter()
            .map(|t| t.identifier_string())
            .collect::<Vec<String>>()
            .join("ᒧ"),
        AnnotationValue::StrList(list) => list.join("ᒧ"),
    }
}
