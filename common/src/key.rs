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
use crate::type_data::{TypeData, TypeRoot};
use serde::{Deserialize, Serialize};

pub const PROVIDER_PATH: &str = "solder::Provider";
pub const LAZY_PATH: &str = "solder::Lazy";
pub const PRODUCER_PATH: &str = "solder::Producer";
pub const PRODUCED_PATH: &str = "solder::Produced";
pub const FUTURE_PATH: &str = "solder::Future";
pub const MEMBERS_INJECTOR_PATH: &str = "solder::MembersInjector";

/// How a dependency is requested at an injection site.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy, PartialOrd, Ord)]
pub enum RequestKind {
    Instance,
    Provider,
    Lazy,
    ProviderOfLazy,
    MembersInjection,
    Producer,
    Produced,
    Future,
}

impl RequestKind {
    /// Recognizes the request kind from the declared type at a request site,
    /// e.g. `Lazy<T>` requests `T` with [RequestKind::Lazy].
    pub fn from_wrapped_type(type_: &TypeData) -> RequestKind {
        match type_.canonical_string_path_without_args().as_str() {
            path if path == format!("::{}", PROVIDER_PATH) => {
                if let Some(inner) = type_.args.first() {
                    if inner.canonical_string_path_without_args() == format!("::{}", LAZY_PATH) {
                        return RequestKind::ProviderOfLazy;
                    }
                }
                RequestKind::Provider
            }
            path if path == format!("::{}", LAZY_PATH) => RequestKind::Lazy,
            path if path == format!("::{}", PRODUCER_PATH) => RequestKind::Producer,
            path if path == format!("::{}", PRODUCED_PATH) => RequestKind::Produced,
            path if path == format!("::{}", FUTURE_PATH) => RequestKind::Future,
            path if path == format!("::{}", MEMBERS_INJECTOR_PATH) => {
                RequestKind::MembersInjection
            }
            _ => RequestKind::Instance,
        }
    }
}

/// Identity of one multibinding contribution, kept on the key only while the
/// resolver tells contributions apart. Downstream consumers see the key with
/// the contribution stripped.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Default)]
pub struct ContributionId {
    pub module: String,
    pub binding_name: String,
}

/// Canonical identity of a bindable thing: a type plus an optional qualifier.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Default)]
pub struct Key {
    pub type_: TypeData,
    pub qualifier: Option<AnnotationData>,
    pub multibinding_contribution: Option<ContributionId>,
}

impl Key {
    pub fn from_type(type_: TypeData) -> Self {
        Key {
            type_,
            qualifier: None,
            multibinding_contribution: None,
        }
    }

    pub fn qualified(type_: TypeData, qualifier: AnnotationData) -> Self {
        Key {
            type_,
            qualifier: Some(qualifier),
            multibinding_contribution: None,
        }
    }

    pub fn with_contribution(mut self, contribution: ContributionId) -> Self {
        self.multibinding_contribution = Some(contribution);
        self
    }

    /// The effective key: contribution identity stripped.
    pub fn without_contribution(&self) -> Key {
        Key {
            type_: self.type_.clone(),
            qualifier: self.qualifier.clone(),
            multibinding_contribution: None,
        }
    }

    /// Peels one framework wrapper off the key type according to the request
    /// kind, producing the key actually looked up in the binding map.
    pub fn unwrapped(&self, kind: RequestKind) -> Key {
        let inner = |depth: usize| -> TypeData {
            let mut type_ = &self.type_;
            for _ in 0..depth {
                type_ = type_.args.first().unwrap_or(type_);
            }
            type_.clone()
        };
        let type_ = match kind {
            RequestKind::Instance => self.type_.clone(),
            RequestKind::Provider
            | RequestKind::Lazy
            | RequestKind::Producer
            | RequestKind::Produced
            | RequestKind::Future
            | RequestKind::MembersInjection => inner(1),
            RequestKind::ProviderOfLazy => inner(2),
        };
        Key {
            type_,
            qualifier: self.qualifier.clone(),
            multibinding_contribution: self.multibinding_contribution.clone(),
        }
    }

    /// Wraps the key type into the framework type for the request kind.
    pub fn wrapped(&self, kind: RequestKind) -> Key {
        let type_ = match kind {
            RequestKind::Instance => self.type_.clone(),
            RequestKind::Provider => wrapper_type(PROVIDER_PATH, &self.type_),
            RequestKind::Lazy => wrapper_type(LAZY_PATH, &self.type_),
            RequestKind::ProviderOfLazy => {
                wrapper_type(PROVIDER_PATH, &wrapper_type(LAZY_PATH, &self.type_))
            }
            RequestKind::Producer => wrapper_type(PRODUCER_PATH, &self.type_),
            RequestKind::Produced => wrapper_type(PRODUCED_PATH, &self.type_),
            RequestKind::Future => wrapper_type(FUTURE_PATH, &self.type_),
            RequestKind::MembersInjection => wrapper_type(MEMBERS_INJECTOR_PATH, &self.type_),
        };
        Key {
            type_,
            qualifier: self.qualifier.clone(),
            multibinding_contribution: self.multibinding_contribution.clone(),
        }
    }

    /// Human readable form, qualifier included.
    pub fn readable(&self) -> String {
        let mut prefix = String::new();
        if let Some(ref qualifier) = self.qualifier {
            prefix.push_str(&format!("#[qualified({})] ", qualifier.readable()));
        }
        format!("{}{}", prefix, self.type_.readable())
    }

    /// Unique identifier token representing the key.
    pub fn identifier_string(&self) -> String {
        let prefix = self
            .qualifier
            .as_ref()
            .map(|qualifier| format!("ᑕ{}ᑐ_", qualifier.identifier_string()))
            .unwrap_or_default();
        let suffix = self
            .multibinding_contribution
            .as_ref()
            .map(|c| format!("_{}_{}", c.module, c.binding_name))
            .unwrap_or_default();
        format!(
            "{}{}{}",
            prefix,
            self.type_.identifier_string(),
            suffix.replace("::", "ⵆ")
        )
    }
}

fn wrapper_type(path: &str, inner: &TypeData) -> TypeData {
    let mut wrapper = TypeData::new();
    wrapper.root = TypeRoot::GLOBAL;
    wrapper.path = path.to_owned();
    wrapper.args.push(inner.clone());
    wrapper
}
