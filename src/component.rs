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

use crate::binding::DependencyRequest;
use crate::declarations::{
    self, db_key, DeclarationDatabase, BOUND_INSTANCE, CANCELLATION_POLICY, COMPONENT,
    COMPONENT_BUILDER, COMPONENT_FACTORY, NULLABLE, PRODUCTION_COMPONENT,
    PRODUCTION_SUBCOMPONENT, SUBCOMPONENT,
};
use crate::diagnostics::Diagnostic;
use solder_common::annotation::{AnnotationData, AnnotationValue};
use solder_common::key::{Key, RequestKind};
use solder_common::manifest::{ElementKind, MethodElement, TypeElement};
use solder_common::model::{is_scope, qualifier_of, ModelError, ProgramModel};
use solder_common::scope::Scope;
use solder_common::type_data::TypeData;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ComponentKind {
    Component,
    Subcomponent,
    ProductionComponent,
    ProductionSubcomponent,
    /// Pseudo component rooting a module-level graph, for full binding graph
    /// validation of modules not installed anywhere.
    ModuleComponent,
}

impl ComponentKind {
    pub fn is_production(&self) -> bool {
        matches!(
            self,
            ComponentKind::ProductionComponent | ComponentKind::ProductionSubcomponent
        )
    }

    pub fn is_root(&self) -> bool {
        matches!(
            self,
            ComponentKind::Component | ComponentKind::ProductionComponent
        )
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum EntryPointKind {
    Provision,
    MembersInjection,
}

/// A request on the component surface: one abstract zero- or one-argument
/// method whose return type names a key.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct EntryPoint {
    pub method_name: String,
    pub kind: EntryPointKind,
    pub request: DependencyRequest,
}

/// A method on the component returning a child subcomponent directly.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct FactoryMethod {
    pub name: String,
    pub child: TypeData,
    pub module_params: Vec<TypeData>,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum CreatorKind {
    Builder,
    Factory,
}

/// A builder or factory declared for a component.
#[derive(Debug, Clone)]
pub struct CreatorDescriptor {
    pub type_data: TypeData,
    pub kind: CreatorKind,
    pub bound_instances: Vec<(String, Key, bool)>,
    pub module_setters: Vec<(String, TypeData)>,
    /// Setters that neither bind an instance nor supply a module; creator
    /// validation rejects them.
    pub unknown_setters: Vec<(String, TypeData)>,
    pub build_method: Option<String>,
}

/// Static description of one component: its modules, entry points, creator
/// and children. Built bottom-up before any resolution happens.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub type_data: TypeData,
    pub kind: ComponentKind,
    pub is_abstract: bool,
    pub scopes: Vec<Scope>,
    /// Transitive closure of installed modules, insertion ordered.
    pub modules: Vec<TypeData>,
    pub dependencies: Vec<TypeData>,
    pub entry_points: Vec<EntryPoint>,
    pub creators: Vec<CreatorDescriptor>,
    pub factory_methods: Vec<FactoryMethod>,
    pub cancellation_policy: Option<AnnotationData>,
    pub children: Vec<ComponentDescriptor>,
}

impl ComponentDescriptor {
    pub fn creator(&self) -> Option<&CreatorDescriptor> {
        self.creators.first()
    }

    pub fn readable(&self) -> String {
        self.type_data.readable()
    }
}

#[derive(Debug, Default)]
pub struct DescriptorSet {
    pub roots: Vec<ComponentDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    pub deferred: Vec<String>,
}

/// Builds descriptors for every root component in the program.
pub fn build_descriptors(model: &dyn ProgramModel, db: &DeclarationDatabase) -> DescriptorSet {
    let mut set = DescriptorSet::default();
    let mut roots = model.annotated_with(COMPONENT);
    roots.extend(model.annotated_with(PRODUCTION_COMPONENT));
    for element in roots {
        let kind = if element.has_annotation(PRODUCTION_COMPONENT) {
            ComponentKind::ProductionComponent
        } else {
            ComponentKind::Component
        };
        let mut in_progress = Vec::new();
        match build_component(model, db, element, kind, &mut in_progress, &mut set) {
            Ok(descriptor) => set.roots.push(descriptor),
            Err(ModelError::TypeNotFound { .. }) => {
                set.deferred.push(element.type_data.readable())
            }
        }
    }
    set
}

fn component_annotation_path(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Component => COMPONENT,
        ComponentKind::Subcomponent => SUBCOMPONENT,
        ComponentKind::ProductionComponent => PRODUCTION_COMPONENT,
        ComponentKind::ProductionSubcomponent => PRODUCTION_SUBCOMPONENT,
        ComponentKind::ModuleComponent => unreachable!("module components have no annotation"),
    }
}

fn build_component(
    model: &dyn ProgramModel,
    db: &DeclarationDatabase,
    element: &TypeElement,
    kind: ComponentKind,
    in_progress: &mut Vec<String>,
    set: &mut DescriptorSet,
) -> Result<ComponentDescriptor, ModelError> {
    let path = db_key(&element.type_data);
    if in_progress.contains(&path) {
        // A component hierarchy that contains itself would recurse forever;
        // report and cut the loop here.
        set.diagnostics.push(
            Diagnostic::error("subcomponent hierarchy contains a cycle".to_owned())
                .on(element.type_data.readable()),
        );
        return Ok(empty_descriptor(element, kind));
    }
    in_progress.push(path);
    let result = build_component_inner(model, db, element, kind, in_progress, set);
    in_progress.pop();
    result
}

fn empty_descriptor(element: &TypeElement, kind: ComponentKind) -> ComponentDescriptor {
    ComponentDescriptor {
        type_data: element.type_data.clone(),
        kind,
        is_abstract: element.kind == ElementKind::Trait,
        scopes: Vec::new(),
        modules: Vec::new(),
        dependencies: Vec::new(),
        entry_points: Vec::new(),
        creators: Vec::new(),
        factory_methods: Vec::new(),
        cancellation_policy: None,
        children: Vec::new(),
    }
}

fn build_component_inner(
    model: &dyn ProgramModel,
    db: &DeclarationDatabase,
    element: &TypeElement,
    kind: ComponentKind,
    in_progress: &mut Vec<String>,
    set: &mut DescriptorSet,
) -> Result<ComponentDescriptor, ModelError> {
    let annotation = element
        .annotation(component_annotation_path(kind))
        .expect("component annotation vanished");
    let installed = annotation
        .member("modules")
        .and_then(AnnotationValue::as_type_list)
        .cloned()
        .unwrap_or_default();
    let dependencies = annotation
        .member("dependencies")
        .and_then(AnnotationValue::as_type_list)
        .cloned()
        .unwrap_or_default();
    // Installed modules and component dependencies must be present in this
    // round for the descriptor to be complete.
    for module in &installed {
        model.type_element(module)?;
    }
    for dependency in &dependencies {
        model.type_element(dependency)?;
    }
    let modules = declarations::module_closure(db, &installed);
    // An installed module whose collection was deferred defers the whole
    // component; resolving against a partial module set would misreport
    // missing bindings.
    for module in &modules {
        if db.module(module).is_none() {
            if let Ok(module_element) = model.type_element(module) {
                if module_element.has_annotation(crate::declarations::MODULE)
                    || module_element.has_annotation(crate::declarations::PRODUCER_MODULE)
                {
                    return Err(ModelError::TypeNotFound {
                        path: module.canonical_string_path_without_args(),
                    });
                }
            }
        }
    }

    let mut scopes = element
        .annotations
        .iter()
        .filter(|a| is_scope(a, model))
        .map(|a| Scope::new(a.clone()))
        .collect::<Vec<Scope>>();
    if kind.is_production() && !scopes.iter().any(|s| s.is_production()) {
        scopes.push(Scope::production());
    }

    let mut descriptor = empty_descriptor(element, kind);
    descriptor.scopes = scopes;
    descriptor.modules = modules;
    descriptor.dependencies = dependencies;
    descriptor.cancellation_policy = element.annotation(CANCELLATION_POLICY).cloned();

    // Children declared by installed modules.
    let mut child_types = Vec::new();
    for module in &descriptor.modules {
        if let Some(declaration) = db.module(module) {
            for subcomponent in &declaration.subcomponents {
                child_types.push(subcomponent.clone());
            }
        }
    }

    for method in &element.methods {
        if !method.is_abstract {
            continue;
        }
        classify_component_method(model, element, method, &mut descriptor, &mut child_types);
    }

    for nested in &element.nested {
        if let Ok(nested_element) = model.type_element(nested) {
            if nested_element.has_annotation(COMPONENT_BUILDER) {
                descriptor
                    .creators
                    .push(build_creator(model, db, nested_element, CreatorKind::Builder, set));
            } else if nested_element.has_annotation(COMPONENT_FACTORY) {
                descriptor
                    .creators
                    .push(build_creator(model, db, nested_element, CreatorKind::Factory, set));
            }
        }
    }

    for child_type in child_types {
        let child_element = model.type_element(&child_type)?;
        let child_kind = if child_element.has_annotation(PRODUCTION_SUBCOMPONENT) {
            ComponentKind::ProductionSubcomponent
        } else if child_element.has_annotation(SUBCOMPONENT) {
            ComponentKind::Subcomponent
        } else {
            set.diagnostics.push(
                Diagnostic::error(format!(
                    "{} is declared as a subcomponent of {} but is not annotated as one",
                    child_type.readable(),
                    element.type_data.readable()
                ))
                .on(element.type_data.readable()),
            );
            continue;
        };
        if descriptor
            .children
            .iter()
            .any(|c| c.type_data == child_type)
        {
            continue;
        }
        let child = build_component(model, db, child_element, child_kind, in_progress, set)?;
        descriptor.children.push(child);
    }

    Ok(descriptor)
}

fn classify_component_method(
    model: &dyn ProgramModel,
    component: &TypeElement,
    method: &MethodElement,
    descriptor: &mut ComponentDescriptor,
    child_types: &mut Vec<TypeData>,
) {
    let printable = format!("{}.{}", component.type_data.readable(), method.name);

    if let Some(ref return_type) = method.return_type {
        if let Ok(return_element) = model.type_element(return_type) {
            // A method returning a subcomponent is a child factory method.
            if return_element.has_annotation(SUBCOMPONENT)
                || return_element.has_annotation(PRODUCTION_SUBCOMPONENT)
            {
                descriptor.factory_methods.push(FactoryMethod {
                    name: method.name.clone(),
                    child: return_type.clone(),
                    module_params: method
                        .parameters
                        .iter()
                        .map(|p| p.type_data.clone())
                        .collect(),
                });
                child_types.push(return_type.clone());
                return;
            }
            // A method returning a subcomponent creator requests the
            // creator key; the subcomponent becomes a child.
            if return_element.has_annotation(COMPONENT_BUILDER)
                || return_element.has_annotation(COMPONENT_FACTORY)
            {
                if let Some(owner) = enclosing_component_of(model, return_type) {
                    child_types.push(owner);
                }
            }
        }
    }

    match method.parameters.len() {
        0 => {
            let return_type = match method.return_type {
                Some(ref return_type) => return_type.clone(),
                None => {
                    // Shape errors are reported by entry point validation;
                    // nothing to resolve here.
                    return;
                }
            };
            let qualifier = qualifier_of(&method.annotations, model).ok().flatten();
            let request_kind = RequestKind::from_wrapped_type(&return_type);
            let raw_key = match qualifier {
                Some(q) => Key::qualified(return_type, q),
                None => Key::from_type(return_type),
            };
            descriptor.entry_points.push(EntryPoint {
                method_name: method.name.clone(),
                kind: EntryPointKind::Provision,
                request: DependencyRequest {
                    kind: request_kind,
                    key: raw_key.unwrapped(request_kind),
                    request_element: Some(printable),
                    is_nullable: method.has_annotation(NULLABLE),
                },
            });
        }
        1 => {
            let target = method.parameters[0].type_data.clone();
            descriptor.entry_points.push(EntryPoint {
                method_name: method.name.clone(),
                kind: EntryPointKind::MembersInjection,
                request: DependencyRequest {
                    kind: RequestKind::MembersInjection,
                    key: Key::from_type(target),
                    request_element: Some(printable),
                    is_nullable: false,
                },
            });
        }
        _ => {
            // More than one parameter: entry point validation reports it.
        }
    }
}

/// Finds the component a creator type belongs to, by scanning nested
/// declarations.
pub fn enclosing_component_of(model: &dyn ProgramModel, creator: &TypeData) -> Option<TypeData> {
    for element in model.all_elements() {
        if element
            .nested
            .iter()
            .any(|nested| db_key(nested) == db_key(creator))
        {
            return Some(element.type_data.clone());
        }
    }
    None
}

fn build_creator(
    model: &dyn ProgramModel,
    db: &DeclarationDatabase,
    element: &TypeElement,
    kind: CreatorKind,
    set: &mut DescriptorSet,
) -> CreatorDescriptor {
    let mut creator = CreatorDescriptor {
        type_data: element.type_data.clone(),
        kind,
        bound_instances: Vec::new(),
        module_setters: Vec::new(),
        unknown_setters: Vec::new(),
        build_method: None,
    };
    for method in &element.methods {
        if !method.is_abstract {
            continue;
        }
        let printable = format!("{}.{}", element.type_data.readable(), method.name);
        match kind {
            CreatorKind::Builder => {
                if method.parameters.is_empty() {
                    creator.build_method = Some(method.name.clone());
                    continue;
                }
                if method.parameters.len() != 1 {
                    set.diagnostics.push(
                        Diagnostic::error(
                            "builder setters must take exactly one argument".to_owned(),
                        )
                        .on(printable),
                    );
                    continue;
                }
                let parameter = &method.parameters[0];
                record_creator_parameter(model, db, method, &method.name, parameter.name.as_str(), &parameter.type_data, parameter.has_annotation(NULLABLE) || method.has_annotation(NULLABLE), method.has_annotation(BOUND_INSTANCE) || parameter.has_annotation(BOUND_INSTANCE), &mut creator);
            }
            CreatorKind::Factory => {
                creator.build_method = Some(method.name.clone());
                for parameter in &method.parameters {
                    record_creator_parameter(model, db, method, &parameter.name, parameter.name.as_str(), &parameter.type_data, parameter.has_annotation(NULLABLE), parameter.has_annotation(BOUND_INSTANCE), &mut creator);
                }
            }
        }
    }
    creator
}

fn record_creator_parameter(
    model: &dyn ProgramModel,
    db: &DeclarationDatabase,
    method: &MethodElement,
    setter_name: &str,
    _parameter_name: &str,
    type_: &TypeData,
    is_nullable: bool,
    is_bound_instance: bool,
    creator: &mut CreatorDescriptor,
) {
    if is_bound_instance {
        let qualifier = qualifier_of(&method.annotations, model).ok().flatten();
        let key = match qualifier {
            Some(q) => Key::qualified(type_.clone(), q),
            None => Key::from_type(type_.clone()),
        };
        creator
            .bound_instances
            .push((setter_name.to_owned(), key, is_nullable));
    } else if db.module(type_).is_some() {
        creator
            .module_setters
            .push((setter_name.to_owned(), type_.clone()));
    } else {
        // Neither a module nor a bound instance: creator validation reports.
        creator
            .unknown_setters
            .push((setter_name.to_owned(), type_.clone()));
    }
}

/// Pseudo descriptor rooting a module-level graph for a module that is not
/// installed in any component.
pub fn module_component(db: &DeclarationDatabase, module: &TypeData) -> ComponentDescriptor {
    let modules = declarations::module_closure(db, std::slice::from_ref(module));
    ComponentDescriptor {
        type_data: module.clone(),
        kind: ComponentKind::ModuleComponent,
        is_abstract: true,
        scopes: Vec::new(),
        modules,
        dependencies: Vec::new(),
        entry_points: Vec::new(),
        creators: Vec::new(),
        factory_methods: Vec::new(),
        cancellation_policy: None,
        children: Vec::new(),
    }
}
