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

use crate::declarations::{
    AssistedFactoryDeclaration, BindingDeclKind, BindingDeclaration, DeclarationDatabase,
    InjectableDeclaration, MapKeyValue, MultibindingType, INJECT,
};
use solder_common::key::{ContributionId, Key, RequestKind};
use solder_common::model::{ModelError, ProgramModel};
use solder_common::scope::Scope;
use solder_common::type_data::TypeData;

/// One dependency request at one site. Two requests with the same kind and
/// key from different sites stay distinct values; diagnostics point at the
/// site, not just the key.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DependencyRequest {
    pub kind: RequestKind,
    /// The effective key: the framework wrapper is already peeled off.
    pub key: Key,
    pub request_element: Option<String>,
    pub is_nullable: bool,
}

impl DependencyRequest {
    pub fn instance_of(key: Key) -> Self {
        DependencyRequest {
            kind: RequestKind::Instance,
            key,
            request_element: None,
            is_nullable: false,
        }
    }

    pub fn readable(&self) -> String {
        match self.request_element {
            Some(ref element) => format!("{} (requested by {})", self.key.readable(), element),
            None => self.key.readable(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum InjectionSiteKind {
    Field,
    Method,
}

/// One field or setter method on a members-injection target.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct InjectionSite {
    pub kind: InjectionSiteKind,
    pub name: String,
    pub requests: Vec<DependencyRequest>,
    pub is_private: bool,
    pub is_static: bool,
}

/// The discriminant of a [Binding], with variant-specific payload.
///
/// Validators and the emission planner match exhaustively on this; adding a
/// variant must visit every match.
#[derive(Debug, PartialEq, Clone)]
pub enum BindingKind {
    Injection,
    Provision,
    Production,
    Delegate {
        delegate_request: DependencyRequest,
    },
    ComponentProvision {
        dependency_component: TypeData,
    },
    ComponentProduction {
        dependency_component: TypeData,
    },
    BoundInstance,
    SubcomponentCreator {
        child: TypeData,
        declaring_modules: Vec<TypeData>,
    },
    MultiboundVec {
        contributions: Vec<Key>,
    },
    MultiboundMap {
        entries: Vec<(MapKeyValue, Key)>,
    },
    OptionalBinding {
        underlying: Option<DependencyRequest>,
    },
    MembersInjector {
        injection_sites: Vec<InjectionSite>,
    },
    AssistedInjection {
        assisted_params: Vec<(String, TypeData)>,
    },
    AssistedFactory {
        target: Key,
    },
}

/// An explanation of how to produce an instance for a key.
#[derive(Debug, PartialEq, Clone)]
pub struct Binding {
    pub key: Key,
    pub kind: BindingKind,
    pub scope: Option<Scope>,
    pub dependencies: Vec<DependencyRequest>,
    pub contributing_module: Option<TypeData>,
    pub element_name: Option<String>,
    /// For module bindings: the method needs no module instance.
    pub is_static: bool,
    pub is_nullable: bool,
    pub is_production: bool,
    pub contribution_type: MultibindingType,
    pub map_key: Option<MapKeyValue>,
}

impl Binding {
    /// Human readable name, used in every diagnostic that mentions the
    /// binding.
    pub fn readable_name(&self) -> String {
        let module_element = || {
            format!(
                "{}.{}",
                self.contributing_module
                    .as_ref()
                    .map(|m| m.readable())
                    .unwrap_or_default(),
                self.element_name.clone().unwrap_or_default()
            )
        };
        match self.kind {
            BindingKind::Injection => format!("{} (injectable)", self.key.readable()),
            BindingKind::Provision => format!("{} (module provides)", module_element()),
            BindingKind::Production => format!("{} (module produces)", module_element()),
            BindingKind::Delegate { .. } => format!("{} (module binds)", module_element()),
            BindingKind::ComponentProvision {
                ref dependency_component,
            }
            | BindingKind::ComponentProduction {
                ref dependency_component,
            } => format!(
                "{}.{} (component dependency)",
                dependency_component.readable(),
                self.element_name.clone().unwrap_or_default()
            ),
            BindingKind::BoundInstance => format!("{} (bound instance)", self.key.readable()),
            BindingKind::SubcomponentCreator { .. } => {
                format!("{} (subcomponent builder)", self.key.readable())
            }
            BindingKind::MultiboundVec { .. } | BindingKind::MultiboundMap { .. } => {
                format!("{} (multibinding)", self.key.readable())
            }
            BindingKind::OptionalBinding { .. } => {
                format!("{} (optional binding)", self.key.readable())
            }
            BindingKind::MembersInjector { .. } => {
                format!("{} (members injection)", self.key.readable())
            }
            BindingKind::AssistedInjection { .. } => {
                format!("{} (assisted injectable)", self.key.readable())
            }
            BindingKind::AssistedFactory { .. } => {
                format!("{} (assisted factory)", self.key.readable())
            }
        }
    }

    /// True for synthetic bindings the resolver creates without a user
    /// declaration.
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self.kind,
            BindingKind::MultiboundVec { .. }
                | BindingKind::MultiboundMap { .. }
                | BindingKind::OptionalBinding { .. }
                | BindingKind::MembersInjector { .. }
                | BindingKind::SubcomponentCreator { .. }
        )
    }
}

/// Pure construction of [Binding] values from declarations and synthesis
/// rules. No resolution state lives here.
pub struct BindingFactory<'a> {
    pub model: &'a dyn ProgramModel,
    pub db: &'a DeclarationDatabase,
}

impl<'a> BindingFactory<'a> {
    pub fn new(model: &'a dyn ProgramModel, db: &'a DeclarationDatabase) -> Self {
        BindingFactory { model, db }
    }

    /// A binding from a module method declaration. For multibinding
    /// contributions the key carries the contribution identity.
    pub fn from_declaration(&self, declaration: &BindingDeclaration) -> Binding {
        let key = if declaration.multibinding_type == MultibindingType::None {
            declaration.key.clone()
        } else {
            declaration.key.clone().with_contribution(ContributionId {
                module: declaration.module.canonical_string_path_without_args(),
                binding_name: declaration.name.clone(),
            })
        };
        let kind = match declaration.kind {
            BindingDeclKind::Provides => BindingKind::Provision,
            BindingDeclKind::Produces => BindingKind::Production,
            BindingDeclKind::Binds => BindingKind::Delegate {
                delegate_request: declaration.dependencies[0].clone(),
            },
            BindingDeclKind::BindsOptionOf | BindingDeclKind::Multibinds => {
                unreachable!("declaration bindings are only built for contribution methods")
            }
        };
        Binding {
            key,
            kind,
            scope: declaration.scope.clone(),
            dependencies: declaration.dependencies.clone(),
            contributing_module: Some(declaration.module.clone()),
            element_name: Some(declaration.name.clone()),
            is_static: declaration.is_static,
            is_nullable: declaration.is_nullable,
            is_production: declaration.is_production,
            contribution_type: declaration.multibinding_type,
            map_key: declaration.map_key.clone(),
        }
    }

    pub fn from_injectable(&self, injectable: &InjectableDeclaration) -> Binding {
        let kind = if injectable.is_assisted {
            BindingKind::AssistedInjection {
                assisted_params: injectable.assisted_params.clone(),
            }
        } else {
            BindingKind::Injection
        };
        Binding {
            key: Key::from_type(injectable.type_data.clone()),
            kind,
            scope: injectable.scope.clone(),
            dependencies: injectable.dependencies.clone(),
            contributing_module: None,
            element_name: Some(injectable.ctor_name.clone()),
            is_static: true,
            is_nullable: false,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    pub fn assisted_factory(&self, declaration: &AssistedFactoryDeclaration) -> Binding {
        let target_key = Key::from_type(declaration.target.clone());
        Binding {
            key: Key::from_type(declaration.type_data.clone()),
            kind: BindingKind::AssistedFactory {
                target: target_key.clone(),
            },
            scope: None,
            dependencies: vec![DependencyRequest {
                kind: RequestKind::Provider,
                key: target_key,
                request_element: Some(format!(
                    "{}.{}",
                    declaration.type_data.readable(),
                    declaration.method_name
                )),
                is_nullable: false,
            }],
            contributing_module: None,
            element_name: Some(declaration.method_name.clone()),
            is_static: true,
            is_nullable: false,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    pub fn bound_instance(&self, key: Key, setter: &str, is_nullable: bool) -> Binding {
        Binding {
            key,
            kind: BindingKind::BoundInstance,
            scope: None,
            dependencies: Vec::new(),
            contributing_module: None,
            element_name: Some(setter.to_owned()),
            is_static: true,
            is_nullable,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    pub fn component_provision(
        &self,
        key: Key,
        dependency_component: TypeData,
        method: &str,
        is_production: bool,
    ) -> Binding {
        Binding {
            key,
            kind: if is_production {
                BindingKind::ComponentProduction {
                    dependency_component,
                }
            } else {
                BindingKind::ComponentProvision {
                    dependency_component,
                }
            },
            scope: None,
            dependencies: Vec::new(),
            contributing_module: None,
            element_name: Some(method.to_owned()),
            is_static: true,
            is_nullable: false,
            is_production,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    pub fn subcomponent_creator(
        &self,
        key: Key,
        child: TypeData,
        declaring_modules: Vec<TypeData>,
    ) -> Binding {
        Binding {
            key,
            kind: BindingKind::SubcomponentCreator {
                child,
                declaring_modules,
            },
            scope: None,
            dependencies: Vec::new(),
            contributing_module: None,
            element_name: None,
            is_static: true,
            is_nullable: false,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    /// The synthetic aggregate for a vec multibinding: one dependency per
    /// contribution, producer-kinded in production graphs.
    pub fn multibound_vec(&self, key: Key, contributions: &[&Binding]) -> Binding {
        let dependencies = contributions
            .iter()
            .map(|contribution| DependencyRequest {
                kind: if contribution.is_production {
                    RequestKind::Producer
                } else {
                    RequestKind::Instance
                },
                key: contribution.key.clone(),
                request_element: None,
                is_nullable: false,
            })
            .collect::<Vec<DependencyRequest>>();
        let is_production = contributions.iter().any(|c| c.is_production);
        Binding {
            key,
            kind: BindingKind::MultiboundVec {
                contributions: contributions.iter().map(|c| c.key.clone()).collect(),
            },
            scope: None,
            dependencies,
            contributing_module: None,
            element_name: None,
            is_static: true,
            is_nullable: false,
            is_production,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    /// The synthetic aggregate for a map multibinding: one dependency per
    /// entry, keyed by map key. Duplicate keys survive here; validation
    /// reports them.
    pub fn multibound_map(&self, key: Key, contributions: &[&Binding]) -> Binding {
        let mut entries = Vec::new();
        let mut dependencies = Vec::new();
        for contribution in contributions {
            let map_key = contribution
                .map_key
                .clone()
                .expect("map contribution without map key");
            entries.push((map_key, contribution.key.clone()));
            dependencies.push(DependencyRequest {
                kind: if contribution.is_production {
                    RequestKind::Producer
                } else {
                    RequestKind::Instance
                },
                key: contribution.key.clone(),
                request_element: None,
                is_nullable: false,
            });
        }
        let is_production = contributions.iter().any(|c| c.is_production);
        Binding {
            key,
            kind: BindingKind::MultiboundMap { entries },
            scope: None,
            dependencies,
            contributing_module: None,
            element_name: None,
            is_static: true,
            is_nullable: false,
            is_production,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    /// The synthetic optional binding: depends on the underlying key iff it
    /// is present in the graph.
    pub fn optional(&self, key: Key, underlying: Option<DependencyRequest>) -> Binding {
        let dependencies = underlying.iter().cloned().collect();
        let is_nullable = underlying
            .as_ref()
            .map(|request| request.is_nullable)
            .unwrap_or(false);
        Binding {
            key,
            kind: BindingKind::OptionalBinding { underlying },
            scope: None,
            dependencies,
            contributing_module: None,
            element_name: None,
            is_static: true,
            is_nullable,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        }
    }

    /// Synthesizes the members injector for a type from its annotated fields
    /// and setter methods. A type without injection sites gets a no-op
    /// injector.
    pub fn members_injector(&self, target: &TypeData) -> Result<Binding, ModelError> {
        let element = self.model.type_element(target)?;
        let mut injection_sites = Vec::new();
        for field in &element.fields {
            if !field.has_annotation(INJECT) {
                continue;
            }
            let request_kind = RequestKind::from_wrapped_type(&field.type_data);
            injection_sites.push(InjectionSite {
                kind: InjectionSiteKind::Field,
                name: field.name.clone(),
                requests: vec![DependencyRequest {
                    kind: request_kind,
                    key: Key::from_type(field.type_data.clone()).unwrapped(request_kind),
                    request_element: Some(format!("{}.{}", target.readable(), field.name)),
                    is_nullable: field.has_annotation(crate::declarations::NULLABLE),
                }],
                is_private: field.is_private,
                is_static: field.is_static,
            });
        }
        for method in &element.methods {
            if method.is_static || !method.has_annotation(INJECT) {
                continue;
            }
            let requests = method
                .parameters
                .iter()
                .map(|parameter| {
                    let request_kind = RequestKind::from_wrapped_type(&parameter.type_data);
                    DependencyRequest {
                        kind: request_kind,
                        key: Key::from_type(parameter.type_data.clone()).unwrapped(request_kind),
                        request_element: Some(format!(
                            "{}.{}({})",
                            target.readable(),
                            method.name,
                            parameter.name
                        )),
                        is_nullable: parameter.has_annotation(crate::declarations::NULLABLE),
                    }
                })
                .collect::<Vec<DependencyRequest>>();
            injection_sites.push(InjectionSite {
                kind: InjectionSiteKind::Method,
                name: method.name.clone(),
                requests,
                is_private: false,
                is_static: false,
            });
        }
        let dependencies = injection_sites
            .iter()
            .flat_map(|site| site.requests.iter().cloned())
            .collect::<Vec<DependencyRequest>>();
        Ok(Binding {
            key: Key::from_type(target.clone()).wrapped(RequestKind::MembersInjection),
            kind: BindingKind::MembersInjector { injection_sites },
            scope: None,
            dependencies,
            contributing_module: None,
            element_name: None,
            is_static: true,
            is_nullable: false,
            is_production: false,
            contribution_type: MultibindingType::None,
            map_key: None,
        })
    }
}
