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
use crate::manifest::{ProgramManifest, TypeElement};
use crate::scope::{Scope, PRODUCTION_PATH, REUSABLE_PATH, SINGLETON_PATH};
use crate::type_data::TypeData;
use anyhow::bail;
use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;

pub const SCOPE_META_PATH: &str = "solder::Scope";
pub const QUALIFIER_META_PATH: &str = "solder::Qualifier";
pub const MAP_KEY_META_PATH: &str = "solder::MapKey";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The referenced type is not present in the current compilation round.
    /// The element that referenced it must be deferred, not diagnosed.
    #[error("type not found: {path}")]
    TypeNotFound { path: String },
}

/// Read-only facade over the host language's view of the program.
///
/// The compiler core consumes only this trait; it never sees source text.
pub trait ProgramModel {
    /// Looks up a type declaration. `dyn`/`&`/generic-argument decorations on
    /// the reference are ignored for the lookup.
    fn type_element(&self, type_: &TypeData) -> Result<&TypeElement, ModelError>;

    /// All type declarations, in declaration order.
    fn all_elements(&self) -> Vec<&TypeElement>;

    /// Type declarations carrying the given annotation, in declaration order.
    fn annotated_with(&self, annotation_path: &str) -> Vec<&TypeElement>;

    fn is_same(&self, a: &TypeData, b: &TypeData) -> bool;

    /// Nominal assignability: a value of `sub` can stand in for `sup`.
    fn is_assignable(&self, sub: &TypeData, sup: &TypeData) -> bool;
}

/// True iff the annotation marks a scope: one of the framework scopes, or an
/// annotation type itself annotated as a scope marker.
pub fn is_scope(annotation: &AnnotationData, model: &dyn ProgramModel) -> bool {
    if annotation.is(SINGLETON_PATH)
        || annotation.is(REUSABLE_PATH)
        || annotation.is(PRODUCTION_PATH)
    {
        return true;
    }
    match model.type_element(&annotation.type_) {
        Ok(element) => element.has_annotation(SCOPE_META_PATH),
        Err(_) => false,
    }
}

/// True iff the annotation marks a qualifier.
pub fn is_qualifier(annotation: &AnnotationData, model: &dyn ProgramModel) -> bool {
    match model.type_element(&annotation.type_) {
        Ok(element) => element.has_annotation(QUALIFIER_META_PATH),
        Err(_) => false,
    }
}

/// Extracts the scope of an element. At most one scope annotation is allowed.
pub fn scope_of(
    annotations: &[AnnotationData],
    model: &dyn ProgramModel,
) -> anyhow::Result<Option<Scope>> {
    let scopes = annotations
        .iter()
        .filter(|a| is_scope(a, model))
        .collect::<Vec<_>>();
    match scopes.len() {
        0 => Ok(None),
        1 => Ok(Some(Scope::new(scopes[0].clone()))),
        _ => bail!(
            "only one scope annotation allowed, found: {}",
            scopes
                .iter()
                .map(|s| s.readable())
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

/// Extracts the qualifier of an element. At most one qualifier is allowed.
pub fn qualifier_of(
    annotations: &[AnnotationData],
    model: &dyn ProgramModel,
) -> anyhow::Result<Option<AnnotationData>> {
    let qualifiers = annotations
        .iter()
        .filter(|a| is_qualifier(a, model))
        .collect::<Vec<_>>();
    match qualifiers.len() {
        0 => Ok(None),
        1 => Ok(Some(qualifiers[0].clone())),
        _ => bail!(
            "only one qualifier annotation allowed, found: {}",
            qualifiers
                .iter()
                .map(|q| q.readable())
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

/// [ProgramModel] backed by a [ProgramManifest].
///
/// Hosts pre-extract their program into the manifest; the test suite builds
/// manifests directly. Types listed as pending simulate declarations that a
/// later compilation round will supply.
pub struct ManifestModel {
    manifest: ProgramManifest,
    by_path: IndexMap<String, usize>,
    pending: HashSet<String>,
}

fn lookup_path(type_: &TypeData) -> String {
    type_.canonical_string_path_without_args()
}

impl ManifestModel {
    pub fn new(manifest: ProgramManifest) -> Self {
        let mut by_path = IndexMap::new();
        for (index, element) in manifest.types.iter().enumerate() {
            by_path.insert(lookup_path(&element.type_data), index);
        }
        ManifestModel {
            manifest,
            by_path,
            pending: HashSet::new(),
        }
    }

    /// Marks types as present in the program but not yet supplied to this
    /// round; looking them up yields [ModelError::TypeNotFound].
    pub fn with_pending(mut self, paths: &[&str]) -> Self {
        for path in paths {
            self.pending.insert(format!("::{}", path));
        }
        self
    }

    pub fn manifest(&self) -> &ProgramManifest {
        &self.manifest
    }

    fn supertypes_of<'a>(&'a self, type_: &TypeData, into: &mut Vec<&'a TypeData>) {
        if let Ok(element) = self.type_element(type_) {
            for supertype in &element.supertypes {
                into.push(supertype);
                self.supertypes_of(supertype, into);
            }
        }
    }
}

/// Compares nominal identity, ignoring `dyn`/`&` decorations.
fn same_nominal(a: &TypeData, b: &TypeData) -> bool {
    if lookup_path(a) != lookup_path(b) || a.args.len() != b.args.len() {
        return false;
    }
    a.args
        .iter()
        .zip(b.args.iter())
        .all(|(x, y)| same_nominal(x, y))
}

impl ProgramModel for ManifestModel {
    fn type_element(&self, type_: &TypeData) -> Result<&TypeElement, ModelError> {
        let path = lookup_path(type_);
        if self.pending.contains(&path) {
            return Err(ModelError::TypeNotFound { path });
        }
        self.by_path
            .get(&path)
            .map(|index| &self.manifest.types[*index])
            .ok_or(ModelError::TypeNotFound { path })
    }

    fn all_elements(&self) -> Vec<&TypeElement> {
        self.manifest.types.iter().collect()
    }

    fn annotated_with(&self, annotation_path: &str) -> Vec<&TypeElement> {
        self.manifest
            .types
            .iter()
            .filter(|element| element.has_annotation(annotation_path))
            .collect()
    }

    fn is_same(&self, a: &TypeData, b: &TypeData) -> bool {
        a == b
    }

    fn is_assignable(&self, sub: &TypeData, sup: &TypeData) -> bool {
        if same_nominal(sub, sup) {
            return true;
        }
        let mut supertypes = Vec::new();
        self.supertypes_of(sub, &mut supertypes);
        supertypes.iter().any(|s| same_nominal(s, sup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ElementKind;
    use crate::type_data;

    fn type_(path: &str) -> TypeData {
        type_data::from_str(path, "test").unwrap()
    }

    fn model_with_trait_impl() -> ManifestModel {
        let mut manifest = ProgramManifest::new();
        manifest.crate_name = "test".to_owned();
        manifest.types.push(TypeElement {
            type_data: type_("::test::Logger"),
            kind: ElementKind::Trait,
            ..Default::default()
        });
        manifest.types.push(TypeElement {
            type_data: type_("::test::StdoutLogger"),
            kind: ElementKind::Struct,
            supertypes: vec![type_("dyn ::test::Logger")],
            ..Default::default()
        });
        ManifestModel::new(manifest)
    }

    #[test]
    fn assignability_follows_supertypes() {
        let model = model_with_trait_impl();
        assert!(model.is_assignable(&type_("::test::StdoutLogger"), &type_("dyn ::test::Logger")));
        assert!(!model.is_assignable(&type_("dyn ::test::Logger"), &type_("::test::StdoutLogger")));
    }

    #[test]
    fn pending_types_are_not_found() {
        let model = model_with_trait_impl().with_pending(&["gen::Generated"]);
        let err = model.type_element(&type_("::gen::Generated")).unwrap_err();
        assert_eq!(
            err,
            ModelError::TypeNotFound {
                path: "::gen::Generated".to_owned()
            }
        );
    }

    #[test]
    fn lookup_ignores_decorations() {
        let model = model_with_trait_impl();
        assert!(model.type_element(&type_("dyn ::test::Logger")).is_ok());
        assert!(model.type_element(&type_("& ::test::Logger")).is_ok());
    }
}
