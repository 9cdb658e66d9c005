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

use crate::binding::{Binding, BindingKind, DependencyRequest, InjectionSite};
use crate::component::EntryPointKind;
use crate::declarations::{DeclarationDatabase, MapKeyValue};
use crate::graph::{BindingGraph, ComponentPath};
use crate::options::CompilerOptions;
use crate::records::AggregatorRecord;
use crate::resolver::storage_key;
use indexmap::{IndexMap, IndexSet};
use solder_common::key::{Key, RequestKind};
use solder_common::type_data::TypeData;

/// How the factory for a binding is created.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum FactoryCreationStrategy {
    /// A stateless factory shared as a single instance.
    SingletonInstance,
    /// A factory class constructed with its dependencies.
    ClassConstructor,
    /// No factory; requests delegate to another binding's method.
    Delegate,
}

/// Abstract expression of how to obtain a framework handle or instance in
/// the context of one component. Language neutral; the renderer turns it
/// into source.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// Invoke another provider method on the same component impl.
    ProviderMethod { method: String },
    /// Reach `levels` parents up before evaluating the inner expression.
    ParentAccess { levels: usize, inner: Box<Expression> },
    /// Read a field of the component impl.
    FieldAccess { field: String },
    /// Construct the injectable directly.
    NewInstance {
        type_: TypeData,
        ctor: String,
        args: Vec<Expression>,
    },
    /// Invoke a module binding method.
    ModuleMethod {
        module: TypeData,
        module_field: Option<String>,
        method: String,
        args: Vec<Expression>,
    },
    /// Invoke a provision method on a component dependency instance.
    DependencyComponentMethod {
        component_field: String,
        method: String,
    },
    /// A provider handle over a provider method.
    ProviderOf { method: String },
    /// A producer node handle over a provider method.
    ProducerOf { method: String },
    /// Double-checked memoization into a component field.
    DoubleCheck { field: String, inner: Box<Expression> },
    /// Single-checked memoization into a component field.
    SingleCheck { field: String, inner: Box<Expression> },
    /// Lazy wrapper over a provider.
    LazyWrap { inner: Box<Expression> },
    /// A provider handing out lazy wrappers.
    ProviderOfLazy { method: String },
    /// Expose a produced value as a future.
    FutureOf { inner: Box<Expression> },
    VecOf { elements: Vec<Expression> },
    EmptyVec,
    MapOf { entries: Vec<(MapKeyValue, Expression)> },
    OptionalPresent { inner: Box<Expression> },
    OptionalAbsent,
    /// Hand out a builder for the child component.
    SubcomponentBuilder { child: TypeData },
    /// Run the injection sites against an existing instance.
    MembersInject { sites: Vec<(InjectionSite, Vec<Expression>)> },
    /// Construct the assisted factory impl for a target binding method.
    AssistedFactoryImpl { target_method: String },
}

#[derive(Debug, PartialEq, Clone)]
pub struct FieldNode {
    pub name: String,
    pub type_: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodNode {
    pub name: String,
    pub return_type: Option<TypeData>,
    pub expression: Expression,
    /// True for methods implementing the component trait surface.
    pub is_trait_impl: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub enum DeclNode {
    Field(FieldNode),
    Method(MethodNode),
}

/// One generated type in the emission plan.
#[derive(Debug, PartialEq, Clone)]
pub struct GeneratedType {
    pub name: String,
    pub originating_elements: Vec<String>,
    pub body: Vec<DeclNode>,
}

/// Per-binding planning facts, exposed for inspection and tests.
#[derive(Debug, PartialEq, Clone)]
pub struct PlannedBinding {
    pub key: Key,
    pub component_path: ComponentPath,
    pub strategy: FactoryCreationStrategy,
    pub generated_name: String,
    pub provider_method: String,
}

/// The language-neutral output of the compiler: what to emit, in order.
#[derive(Debug, PartialEq, Default)]
pub struct EmissionPlan {
    pub generated_types: Vec<GeneratedType>,
    pub planned_bindings: Vec<PlannedBinding>,
    pub records: Vec<AggregatorRecord>,
}

const RESERVED_NAMES: &[&str] = &["self", "super", "crate", "parent", "new", "build"];

/// Allocates framework field names, disambiguated against reserved names and
/// one another.
struct FieldNames {
    taken: IndexSet<String>,
}

impl FieldNames {
    fn new() -> Self {
        let mut taken = IndexSet::new();
        for reserved in RESERVED_NAMES {
            taken.insert((*reserved).to_owned());
        }
        FieldNames { taken }
    }

    fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_owned()) {
            return base.to_owned();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

pub fn provider_method_name(key: &Key) -> String {
    key.identifier_string()
}

/// Derives the generated factory name from the binding's enclosing element.
fn generated_name(binding: &Binding) -> String {
    match (&binding.contributing_module, &binding.element_name) {
        (Some(module), Some(element)) => {
            format!("{}_{}_Factory", module.local_name(), element)
        }
        (None, _) => format!("{}_Factory", binding.key.type_.local_name()),
        (Some(module), None) => format!("{}_Factory", module.local_name()),
    }
}

fn strategy_of(binding: &Binding, options: &CompilerOptions) -> FactoryCreationStrategy {
    match binding.kind {
        BindingKind::Delegate { .. } => FactoryCreationStrategy::Delegate,
        BindingKind::MultiboundVec { ref contributions } if contributions.is_empty() => {
            FactoryCreationStrategy::SingletonInstance
        }
        BindingKind::MultiboundMap { ref entries } if entries.is_empty() => {
            FactoryCreationStrategy::SingletonInstance
        }
        BindingKind::BoundInstance => FactoryCreationStrategy::SingletonInstance,
        _ => {
            if options.fast_init && binding.scope.is_none() {
                // fast_init shares one switching provider, created up front.
                FactoryCreationStrategy::Delegate
            } else if binding.dependencies.is_empty()
                && binding.scope.is_none()
                && binding.contributing_module.is_none()
            {
                FactoryCreationStrategy::SingletonInstance
            } else {
                FactoryCreationStrategy::ClassConstructor
            }
        }
    }
}

/// Plans emission for a validated graph. Deterministic: the same graph
/// produces an identical plan, node for node.
pub fn plan(
    graph: &BindingGraph,
    db: &DeclarationDatabase,
    options: &CompilerOptions,
) -> EmissionPlan {
    let mut plan = EmissionPlan::default();

    // Group binding nodes by owning component, preserving discovery order.
    let mut by_component = IndexMap::<String, Vec<usize>>::new();
    let binding_nodes = graph
        .binding_nodes()
        .map(|(_, node)| node.clone())
        .collect::<Vec<_>>();
    for (position, node) in binding_nodes.iter().enumerate() {
        by_component
            .entry(node.component_path.readable())
            .or_default()
            .push(position);
    }

    for (_, component) in graph.component_nodes() {
        let path = &component.component_path;
        let impl_name = format!(
            "{}Impl",
            path.current().local_name()
        );
        let mut fields = Vec::<FieldNode>::new();
        let mut methods = Vec::<MethodNode>::new();
        let mut field_names = FieldNames::new();

        if !path.at_root() {
            fields.push(FieldNode {
                name: "parent".to_owned(),
                type_: format!("&{}Impl", path.parent().unwrap().current().local_name()),
            });
        }

        let descriptor = graph.descriptor(path);
        if let Some(descriptor) = descriptor {
            for module in &descriptor.modules {
                // Modules whose bindings are all static need no instance
                // and get no field.
                let needs_field = db
                    .module(module)
                    .map(|m| m.needs_instance || m.requires_construction)
                    .unwrap_or(false);
                if !needs_field {
                    continue;
                }
                fields.push(FieldNode {
                    name: field_names.allocate(&module.identifier_string()),
                    type_: module.readable(),
                });
            }
            if let Some(creator) = descriptor.creator() {
                for (setter, key, _) in &creator.bound_instances {
                    fields.push(FieldNode {
                        name: field_names.allocate(setter),
                        type_: key.type_.readable(),
                    });
                }
            }
            for dependency in &descriptor.dependencies {
                fields.push(FieldNode {
                    name: field_names.allocate(&dependency.identifier_string()),
                    type_: dependency.readable(),
                });
            }
        }

        for &position in by_component.get(&path.readable()).unwrap_or(&Vec::new()) {
            let node = &binding_nodes[position];
            let binding = &node.binding;
            let method_name = provider_method_name(&binding.key);
            let mut expression = binding_expression(graph, path, binding);
            if let Some(ref scope) = binding.scope {
                let memo_field = field_names.allocate(&format!("once_{}", method_name));
                fields.push(FieldNode {
                    name: memo_field.clone(),
                    type_: format!("Once<{}>", binding.key.type_.readable()),
                });
                expression = if scope.is_reusable() {
                    Expression::SingleCheck {
                        field: memo_field,
                        inner: Box::new(expression),
                    }
                } else {
                    Expression::DoubleCheck {
                        field: memo_field,
                        inner: Box::new(expression),
                    }
                };
            }
            methods.push(MethodNode {
                name: method_name.clone(),
                return_type: Some(binding.key.type_.clone()),
                expression,
                is_trait_impl: false,
            });
            plan.planned_bindings.push(PlannedBinding {
                key: binding.key.clone(),
                component_path: node.component_path.clone(),
                strategy: strategy_of(binding, options),
                generated_name: generated_name(binding),
                provider_method: method_name,
            });

            if let BindingKind::AssistedFactory { ref target } = binding.kind {
                plan.generated_types.push(GeneratedType {
                    name: format!("{}Impl", binding.key.type_.local_name()),
                    originating_elements: vec![binding.key.type_.readable()],
                    body: vec![DeclNode::Method(MethodNode {
                        name: binding
                            .element_name
                            .clone()
                            .unwrap_or_else(|| "create".to_owned()),
                        return_type: Some(target.type_.clone()),
                        expression: Expression::AssistedFactoryImpl {
                            target_method: provider_method_name(target),
                        },
                        is_trait_impl: true,
                    })],
                });
            }
        }

        for entry_point in &component.entry_points {
            let expression = request_expression(graph, path, &entry_point.request);
            methods.push(MethodNode {
                name: entry_point.method_name.clone(),
                return_type: match entry_point.kind {
                    EntryPointKind::Provision => Some(entry_point.request.key.type_.clone()),
                    EntryPointKind::MembersInjection => None,
                },
                expression,
                is_trait_impl: true,
            });
        }

        let mut originating = vec![path.current().readable()];
        if let Some(descriptor) = descriptor {
            originating.extend(descriptor.modules.iter().map(|m| m.readable()));
        }
        let mut body = fields.into_iter().map(DeclNode::Field).collect::<Vec<DeclNode>>();
        body.extend(methods.into_iter().map(DeclNode::Method));
        plan.generated_types.push(GeneratedType {
            name: impl_name,
            originating_elements: originating,
            body,
        });

        if let Some(descriptor) = descriptor {
            if let Some(creator) = descriptor.creator() {
                plan.generated_types.push(GeneratedType {
                    name: format!("{}Impl", creator.type_data.local_name()),
                    originating_elements: vec![creator.type_data.readable()],
                    body: vec![DeclNode::Method(MethodNode {
                        name: creator
                            .build_method
                            .clone()
                            .unwrap_or_else(|| "build".to_owned()),
                        return_type: Some(descriptor.type_data.clone()),
                        expression: Expression::SubcomponentBuilder {
                            child: descriptor.type_data.clone(),
                        },
                        is_trait_impl: true,
                    })],
                });
            }
        }
    }

    plan
}

/// The expression producing a binding's instance in its owning component.
fn binding_expression(graph: &BindingGraph, path: &ComponentPath, binding: &Binding) -> Expression {
    match binding.kind {
        BindingKind::Injection => Expression::NewInstance {
            type_: binding.key.type_.clone(),
            ctor: binding.element_name.clone().unwrap_or_else(|| "new".to_owned()),
            args: binding
                .dependencies
                .iter()
                .map(|dependency| request_expression(graph, path, dependency))
                .collect(),
        },
        BindingKind::AssistedInjection { .. } => Expression::NewInstance {
            type_: binding.key.type_.clone(),
            ctor: binding.element_name.clone().unwrap_or_else(|| "new".to_owned()),
            args: binding
                .dependencies
                .iter()
                .map(|dependency| request_expression(graph, path, dependency))
                .collect(),
        },
        BindingKind::Provision | BindingKind::Production => Expression::ModuleMethod {
            module: binding
                .contributing_module
                .clone()
                .expect("module binding without module"),
            module_field: if binding.is_static {
                None
            } else {
                binding
                    .contributing_module
                    .as_ref()
                    .map(|m| m.identifier_string())
            },
            method: binding
                .element_name
                .clone()
                .expect("module binding without method"),
            args: binding
                .dependencies
                .iter()
                .map(|dependency| request_expression(graph, path, dependency))
                .collect(),
        },
        BindingKind::Delegate {
            ref delegate_request,
        } => request_expression(graph, path, delegate_request),
        BindingKind::ComponentProvision {
            ref dependency_component,
        }
        | BindingKind::ComponentProduction {
            ref dependency_component,
        } => Expression::DependencyComponentMethod {
            component_field: dependency_component.identifier_string(),
            method: binding
                .element_name
                .clone()
                .expect("component provision without method"),
        },
        BindingKind::BoundInstance => Expression::FieldAccess {
            field: binding
                .element_name
                .clone()
                .expect("bound instance without setter"),
        },
        BindingKind::SubcomponentCreator { ref child, .. } => Expression::SubcomponentBuilder {
            child: child.clone(),
        },
        BindingKind::MultiboundVec { ref contributions } => {
            if contributions.is_empty() {
                Expression::EmptyVec
            } else {
                Expression::VecOf {
                    elements: binding
                        .dependencies
                        .iter()
                        .map(|dependency| request_expression(graph, path, dependency))
                        .collect(),
                }
            }
        }
        BindingKind::MultiboundMap { ref entries } => Expression::MapOf {
            entries: entries
                .iter()
                .zip(binding.dependencies.iter())
                .map(|((map_key, _), dependency)| {
                    (map_key.clone(), request_expression(graph, path, dependency))
                })
                .collect(),
        },
        BindingKind::OptionalBinding { ref underlying } => match underlying {
            Some(request) => Expression::OptionalPresent {
                inner: Box::new(request_expression(graph, path, request)),
            },
            None => Expression::OptionalAbsent,
        },
        BindingKind::MembersInjector {
            ref injection_sites,
        } => Expression::MembersInject {
            sites: injection_sites
                .iter()
                .map(|site| {
                    let args = site
                        .requests
                        .iter()
                        .map(|request| request_expression(graph, path, request))
                        .collect();
                    (site.clone(), args)
                })
                .collect(),
        },
        BindingKind::AssistedFactory { ref target } => Expression::AssistedFactoryImpl {
            target_method: provider_method_name(target),
        },
    }
}

/// The expression satisfying one request in the context of one component,
/// reaching through parents when the target binding is owned above.
fn request_expression(
    graph: &BindingGraph,
    path: &ComponentPath,
    request: &DependencyRequest,
) -> Expression {
    let key = storage_key(request);
    let method = provider_method_name(&key);
    let levels = levels_to_owner(graph, path, &key);
    let local: Expression = match request.kind {
        RequestKind::Instance | RequestKind::MembersInjection => {
            Expression::ProviderMethod { method }
        }
        RequestKind::Provider => Expression::ProviderOf { method },
        RequestKind::Lazy => Expression::LazyWrap {
            inner: Box::new(Expression::ProviderOf { method }),
        },
        RequestKind::ProviderOfLazy => Expression::ProviderOfLazy { method },
        RequestKind::Producer | RequestKind::Produced => Expression::ProducerOf { method },
        RequestKind::Future => Expression::FutureOf {
            inner: Box::new(Expression::ProducerOf { method }),
        },
    };
    if levels == 0 {
        local
    } else {
        Expression::ParentAccess {
            levels,
            inner: Box::new(local),
        }
    }
}

/// How many components up the owner of a key lives, seen from `path`.
fn levels_to_owner(graph: &BindingGraph, path: &ComponentPath, key: &Key) -> usize {
    let mut prefix = path.components().to_vec();
    let mut levels = 0;
    loop {
        let prefix_path = ComponentPath::new(prefix.clone());
        let owned_here = graph
            .binding_nodes_for_key(key)
            .any(|(_, node)| node.component_path == prefix_path);
        if owned_here || prefix.len() == 1 {
            return levels;
        }
        prefix.pop();
        levels += 1;
    }
}
