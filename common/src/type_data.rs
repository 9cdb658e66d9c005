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

use anyhow::{bail, Context};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use syn::punctuated::Punctuated;
use syn::{TraitBound, TypeParamBound};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Eq, Hash, Copy)]
pub enum TypeRoot {
    UNSPECIFIED = 0,
    GLOBAL = 1,
    CRATE = 2,
    PRIMITIVE = 3,
}

impl Default for TypeRoot {
    fn default() -> Self {
        TypeRoot::UNSPECIFIED
    }
}

/// A nominal type reference in the program under compilation.
///
/// Equality and hashing are structural over the canonical form, so two
/// references that denote the same type compare equal no matter how they were
/// spelled at the use site.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Eq)]
pub struct TypeData {
    pub root: TypeRoot,
    pub path: String,
    pub field_crate: String,
    pub args: Vec<TypeData>,
    pub trait_object: bool,
    pub field_ref: bool,
}

impl PartialEq for TypeData {
    fn eq(&self, other: &Self) -> bool {
        self.identifier_string().eq(&other.identifier_string())
    }
}

impl Hash for TypeData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier_string().hash(state)
    }
}

impl TypeData {
    pub fn new() -> Self {
        Default::default()
    }

    /// A type rooted at the global path, e.g. `std::string::String`.
    pub fn from_global(path: &str) -> Self {
        TypeData {
            root: TypeRoot::GLOBAL,
            path: path.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, arg: TypeData) -> Self {
        self.args.push(arg);
        self
    }

    /// Full path of the type in universal form.
    ///
    /// Modifiers like & are included as prefixes.
    pub fn canonical_string_path(&self) -> String {
        let prefix = self.get_prefix();
        match self.root {
            TypeRoot::GLOBAL => format!("{}::{}", prefix, self.path_with_args()),
            TypeRoot::CRATE => {
                format!("{}::{}::{}", prefix, self.field_crate, self.path_with_args())
            }
            TypeRoot::PRIMITIVE => format!("{}{}", prefix, self.path),
            TypeRoot::UNSPECIFIED => panic!("canonical_string_path: root unspecified"),
        }
    }

    /// Path without generic arguments, for name derivation.
    pub fn canonical_string_path_without_args(&self) -> String {
        match self.root {
            TypeRoot::GLOBAL => format!("::{}", self.path),
            TypeRoot::CRATE => format!("::{}::{}", self.field_crate, self.path),
            TypeRoot::PRIMITIVE => self.path.clone(),
            TypeRoot::UNSPECIFIED => panic!("canonical_string_path: root unspecified"),
        }
    }

    /// Last segment of the path, e.g. `String` for `std::string::String`.
    pub fn local_name(&self) -> String {
        self.path
            .rsplit("::")
            .next()
            .expect("empty type path")
            .to_owned()
    }

    fn get_prefix(&self) -> String {
        let mut prefix = String::new();
        if self.field_ref {
            prefix.push_str("& ");
        }
        if self.trait_object {
            prefix.push_str("dyn ");
        }
        prefix
    }

    /// Unique identifier token representing the type.
    ///
    /// Modifiers like & are included.
    pub fn identifier_string(&self) -> String {
        self.canonical_string_path()
            .replace("::", "ⵆ")
            .replace("<", "ᐸ")
            .replace(">", "ᐳ")
            .replace("-", "_")
            .replace(" ", "_")
            .replace("\'", "ᐠ")
            .replace("&", "ε")
            .replace(",", "ᒧ")
    }

    /// Human readable form.
    pub fn readable(&self) -> String {
        let mut prefix = String::new();
        if self.field_ref {
            prefix.push_str("ref ");
        }
        if self.trait_object {
            prefix.push_str("dyn ");
        }
        format!("{}{}", prefix, self.canonical_string_path_readable())
    }

    fn canonical_string_path_readable(&self) -> String {
        let base = match self.root {
            TypeRoot::GLOBAL => self.path.clone(),
            TypeRoot::CRATE => format!("{}::{}", self.field_crate, self.path),
            TypeRoot::PRIMITIVE => self.path.clone(),
            TypeRoot::UNSPECIFIED => panic!("readable: root unspecified"),
        };
        if self.args.is_empty() {
            return base;
        }
        let args = self
            .args
            .iter()
            .map(|t| t.readable())
            .collect::<Vec<String>>()
            .join(", ");
        format!("{}<{}>", base, args)
    }

    fn path_with_args(&self) -> String {
        if self.args.is_empty() {
            return self.path.clone();
        }
        let args = self
            .args
            .iter()
            .map(|t| t.canonical_string_path())
            .collect::<Vec<String>>()
            .join(",");
        format!("{}<{}>", self.path, args)
    }

    /// The type converted back to a parsed `syn::Type`, for rendering.
    pub fn syn_type(&self) -> syn::Type {
        syn::parse_str(&self.canonical_string_path()).unwrap_or_else(|_| {
            panic!("cannot parse type path {}", self.canonical_string_path())
        })
    }
}

lazy_static! {
    /// auto used types that does not need fully qualified paths.
    static ref PRELUDE_V1: HashMap<String, String> = {
        let mut m = HashMap::<String, String>::new();
        m.insert("Box".into(), "std::boxed::Box".into());
        m.insert("Option".into(), "std::option::Option".into());
        m.insert("Result".into(), "std::result::Result".into());
        m.insert("String".into(), "std::string::String".into());
        m.insert("Vec".into(), "std::vec::Vec".into());
        m.insert("HashMap".into(), "std::collections::HashMap".into());
        m.insert("Provider".into(), "solder::Provider".into());
        m.insert("Lazy".into(), "solder::Lazy".into());
        m.insert("Producer".into(), "solder::Producer".into());
        m.insert("Produced".into(), "solder::Produced".into());
        m.insert("Future".into(), "solder::Future".into());
        m.insert("MembersInjector".into(), "solder::MembersInjector".into());
        m
    };
}

lazy_static! {
    /// primitive data types with no path
    static ref PRIMITIVES: HashSet<String> = {
        let mut m = HashSet::<String>::new();
        m.insert("i8".to_owned());
        m.insert("u8".to_owned());
        m.insert("i16".to_owned());
        m.insert("u16".to_owned());
        m.insert("i32".to_owned());
        m.insert("u32".to_owned());
        m.insert("i64".to_owned());
        m.insert("u64".to_owned());
        m.insert("i128".to_owned());
        m.insert("u128".to_owned());
        m.insert("isize".to_owned());
        m.insert("usize".to_owned());
        m.insert("f32".to_owned());
        m.insert("f64".to_owned());
        m.insert("bool".to_owned());
        m.insert("char".to_owned());
        m
    };
}

/// Parses a textual type reference into [TypeData].
///
/// `current_crate` resolves `crate::` paths the way the declaring crate sees
/// them, so aliased imports and fully qualified spellings of the same type
/// produce equal values.
pub fn from_str(text: &str, current_crate: &str) -> anyhow::Result<TypeData> {
    let syn_type: syn::Type = syn::parse_str(text)
        .with_context(|| format!("unable to parse type '{}'", text))?;
    from_syn_type(&syn_type, current_crate)
}

pub fn from_syn_type(syn_type: &syn::Type, current_crate: &str) -> anyhow::Result<TypeData> {
    match syn_type {
        syn::Type::Path(ref type_path) => from_path(&type_path.path, current_crate),
        syn::Type::TraitObject(ref trait_object) => {
            let mut t = from_type_param_bound(&trait_object.bounds, current_crate)?;
            t.trait_object = true;
            Ok(t)
        }
        syn::Type::ImplTrait(ref impl_trait) => {
            let mut t = from_type_param_bound(&impl_trait.bounds, current_crate)?;
            t.trait_object = true;
            Ok(t)
        }
        syn::Type::Reference(ref reference) => {
            let mut t = from_syn_type(reference.elem.deref(), current_crate)?;
            t.field_ref = true;
            Ok(t)
        }
        _ => bail!("unable to handle type {:?}", syn_type),
    }
}

fn from_type_param_bound(
    bounds: &Punctuated<TypeParamBound, syn::Token![+]>,
    current_crate: &str,
) -> anyhow::Result<TypeData> {
    let traits = bounds
        .iter()
        .filter_map(|bound| {
            if let syn::TypeParamBound::Trait(ref trait_) = bound {
                return Some(trait_);
            }
            None
        })
        .collect::<Vec<&TraitBound>>();
    if traits.len() != 1 {
        bail!("one and only one trait expected");
    }
    from_path(&traits[0].path, current_crate)
}

pub fn from_path(syn_path: &syn::Path, current_crate: &str) -> anyhow::Result<TypeData> {
    let mut result = TypeData::new();
    let mut segment_iter = syn_path.segments.iter().peekable();
    if syn_path.leading_colon.is_some() {
        result.root = TypeRoot::GLOBAL;
    } else {
        let first = segment_iter.peek().with_context(|| "empty segments")?;
        let first_ident = first.ident.to_string();
        if first_ident.eq("crate") {
            segment_iter.next();
            result.root = TypeRoot::CRATE;
            result.field_crate = current_crate.to_owned();
        } else if segment_iter.len() == 1 {
            if let Some(prelude) = PRELUDE_V1.get(&first_ident) {
                let segment = segment_iter.next().unwrap();
                result.path = prelude.clone();
                result.root = TypeRoot::GLOBAL;
                result.args.extend(get_args(segment, current_crate)?);
                return Ok(result);
            }
            if PRIMITIVES.contains(&first_ident) {
                let segment = segment_iter.next().unwrap();
                result.path = first_ident;
                result.root = TypeRoot::PRIMITIVE;
                result.args.extend(get_args(segment, current_crate)?);
                return Ok(result);
            }
            bail!(
                "unable to resolve the type '{}', use a fully qualified path (start with \"::\" or \"crate::\")",
                first_ident
            );
        } else {
            result.root = TypeRoot::GLOBAL;
        }
    }
    while let Some(segment) = segment_iter.next() {
        result.path.push_str(&segment.ident.to_string());
        if segment_iter.peek().is_some() {
            result.path.push_str("::");
            if !segment.arguments.is_empty() {
                bail!("arguments only supported in the last segment of the path");
            }
        } else {
            result.args.extend(get_args(segment, current_crate)?);
        }
    }
    Ok(result)
}

fn get_args(segment: &syn::PathSegment, current_crate: &str) -> anyhow::Result<Vec<TypeData>> {
    let mut result = Vec::<TypeData>::new();
    if let syn::PathArguments::AngleBracketed(ref angle) = segment.arguments {
        for generic_arg in &angle.args {
            match generic_arg {
                syn::GenericArgument::Type(ref type_) => {
                    result.push(from_syn_type(type_, current_crate)?)
                }
                syn::GenericArgument::Lifetime(ref _lifetime) => {
                    // Do nothing
                }
                _ => {
                    bail!("unable to handle generic argument")
                }
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality_ignores_spelling() {
        let aliased = from_str("String", "test").unwrap();
        let qualified = from_str("::std::string::String", "test").unwrap();
        assert_eq!(aliased, qualified);
    }

    #[test]
    fn crate_paths_resolve_to_declaring_crate() {
        let local = from_str("crate::foo::Bar", "my_crate").unwrap();
        let global = from_str("::my_crate::foo::Bar", "other").unwrap();
        assert_eq!(local, global);
    }

    #[test]
    fn generic_args_compare_structurally() {
        let a = from_str("Vec<String>", "test").unwrap();
        let b = from_str("::std::vec::Vec<::std::string::String>", "test").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.readable(), "std::vec::Vec<std::string::String>");
    }

    #[test]
    fn trait_objects_are_distinct_from_structs() {
        let concrete = from_str("::test::Logger", "test").unwrap();
        let dyn_ = from_str("dyn ::test::Logger", "test").unwrap();
        assert_ne!(concrete, dyn_);
        assert!(dyn_.trait_object);
    }
}
