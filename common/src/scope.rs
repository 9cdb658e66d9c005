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
use serde::{Deserialize, Serialize};

pub const SINGLETON_PATH: &str = "solder::Singleton";
pub const REUSABLE_PATH: &str = "solder::Reusable";
pub const PRODUCTION_PATH: &str = "solder::ProductionScope";

/// A scope marker annotation. Scopes compare by canonicalized annotation
/// identity, never by the annotation's declaration source.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone)]
pub struct Scope {
    pub annotation: AnnotationData,
}

impl Scope {
    pub fn new(annotation: AnnotationData) -> Self {
        Scope { annotation }
    }

    pub fn singleton() -> Self {
        Scope::new(AnnotationData::from_path(SINGLETON_PATH))
    }

    pub fn reusable() -> Self {
        Scope::new(AnnotationData::from_path(REUSABLE_PATH))
    }

    pub fn production() -> Self {
        Scope::new(AnnotationData::from_path(PRODUCTION_PATH))
    }

    pub fn is_singleton(&self) -> bool {
        self.annotation.is(SINGLETON_PATH)
    }

    pub fn is_reusable(&self) -> bool {
        self.annotation.is(REUSABLE_PATH)
    }

    pub fn is_production(&self) -> bool {
        self.annotation.is(PRODUCTION_PATH)
    }

    pub fn readable(&self) -> String {
        self.annotation.readable()
    }
}
