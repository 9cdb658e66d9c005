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

use crate::binding::Binding;
use solder_common::key::RequestKind;

/// The runtime carrier of a not-yet-instantiated binding.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum FrameworkType {
    Provider,
    ProducerNode,
}

/// Whether a binding produces synchronously or through the producer runtime.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BindingStyle {
    Provision,
    Production,
}

impl BindingStyle {
    pub fn of(binding: &Binding) -> BindingStyle {
        if binding.is_production {
            BindingStyle::Production
        } else {
            BindingStyle::Provision
        }
    }
}

/// Maps a request kind onto the framework type that carries it, per the
/// style of the binding that contains the request.
///
/// A provision binding requesting producer machinery has no mapping; the
/// error is recorded and reported by validation, never thrown.
pub fn framework_type(
    style: BindingStyle,
    request: RequestKind,
) -> Result<FrameworkType, String> {
    match style {
        BindingStyle::Provision => match request {
            RequestKind::Instance
            | RequestKind::Provider
            | RequestKind::Lazy
            | RequestKind::ProviderOfLazy
            | RequestKind::MembersInjection => Ok(FrameworkType::Provider),
            RequestKind::Producer | RequestKind::Produced | RequestKind::Future => Err(format!(
                "{:?} requests cannot appear in a provision binding",
                request
            )),
        },
        BindingStyle::Production => match request {
            RequestKind::Provider | RequestKind::Lazy | RequestKind::ProviderOfLazy => {
                Ok(FrameworkType::Provider)
            }
            RequestKind::Instance
            | RequestKind::Producer
            | RequestKind::Produced
            | RequestKind::Future
            | RequestKind::MembersInjection => Ok(FrameworkType::ProducerNode),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provision_table() {
        assert_eq!(
            framework_type(BindingStyle::Provision, RequestKind::Instance),
            Ok(FrameworkType::Provider)
        );
        assert_eq!(
            framework_type(BindingStyle::Provision, RequestKind::Lazy),
            Ok(FrameworkType::Provider)
        );
        assert!(framework_type(BindingStyle::Provision, RequestKind::Producer).is_err());
        assert!(framework_type(BindingStyle::Provision, RequestKind::Future).is_err());
    }

    #[test]
    fn production_table() {
        assert_eq!(
            framework_type(BindingStyle::Production, RequestKind::Instance),
            Ok(FrameworkType::ProducerNode)
        );
        assert_eq!(
            framework_type(BindingStyle::Production, RequestKind::Provider),
            Ok(FrameworkType::Provider)
        );
        assert_eq!(
            framework_type(BindingStyle::Production, RequestKind::Future),
            Ok(FrameworkType::ProducerNode)
        );
    }
}
