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
use crate::diagnostics::Diagnostic;
use indexmap::{IndexMap, IndexSet};
use solder_common::annotation::AnnotationValue;
use solder_common::key::{Key, RequestKind};
use solder_common::manifest::{MethodElement, TypeElement};
use solder_common::model::{qualifier_of, scope_of, ModelError, ProgramModel};
use solder_common::scope::Scope;
use solder_common::type_data::{TypeData, TypeRoot};

pub const COMPONENT: &str = "solder::Component";
pub const SUBCOMPONENT: &str = "solder::Subcomponent";
pub const PRODUCTION_COMPONENT: &str = "solder::ProductionComponent";
pub const PRODUCTION_SUBCOMPONENT: &str = "solder::ProductionSubcomponent";
pub const MODULE: &str = "solder::Module";
pub const PRODUCER_MODULE: &str = "solder::ProducerModule";
pub const PROVIDES: &str = "solder::Provides";
pub const PRODUCES: &str = "solder::Produces";
pub const BINDS: &str = "solder::Binds";
pub const BINDS_OPTION_OF: &str = "solder::BindsOptionOf";
pub const MULTIBINDS: &str = "solder::Multibinds";
pub const INTO_VEC: &str = "solder::IntoVec";
pub const ELEMENTS_INTO_VEC: &str = "solder::ElementsIntoVec";
pub const INTO_MAP: &str = "solder::IntoMap";
pub const INJECT: &str = "solder::Inject";
pub const ASSISTED_INJECT: &str = "solder::AssistedInject";
pub const ASSISTED: &str = "solder::Assisted";
pub const ASSISTED_FACTORY: &str = "solder::AssistedFactory";
pub const NULLABLE: &str = "solder::Nullable";
pub const COMPONENT_BUILDER: &str = "solder::ComponentBuilder";
pub const COMPONENT_FACTORY: &str = "solder::ComponentFactory";
pub const BOUND_INSTANCE: &str = "solder::BoundInstance";
pub const CANCELLATION_POLICY: &str = "solder::CancellationPolicy";

pub const VEC_PATH: &str = "::std::vec::Vec";
pub const MAP_PATH: &str = "::std::collections::HashMap";
pub const OPTION_PATH: &str = "::std::option::Option";

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MultibindingType {
    None,
    IntoVec,
    ElementsIntoVec,
    IntoMap,
}

impl Default for MultibindingType {
    fn default() -> Self {
        MultibindingType::None
    }
}

/// Which strategy a map key uses. Class-valued keys are normalized to their
/// canonical string form before comparison, so both strategies produce
/// identical effective keys; mixing them for one key is rejected by
/// validation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MapKeyStrategy {
    Str,
    I32,
    Enum,
    Class,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum MapKeyValue {
    Str(String),
    I32(i32),
    Enum(TypeData, String),
    Class(TypeData),
}

impl MapKeyValue {
    pub fn strategy(&self) -> MapKeyStrategy {
        match self {
            MapKeyValue::Str(_) => MapKeyStrategy::Str,
            MapKeyValue::I32(_) => MapKeyStrategy::I32,
            MapKeyValue::Enum(_, _) => MapKeyStrategy::Enum,
            MapKeyValue::Class(_) => MapKeyStrategy::Class,
        }
    }

    /// The key type of the aggregated map.
    pub fn key_type(&self) -> TypeData {
        match self {
            MapKeyValue::Str(_) | MapKeyValue::Class(_) => {
                TypeData::from_global("std::string::String")
            }
            MapKeyValue::I32(_) => {
                let mut t = TypeData::new();
                t.root = TypeRoot::PRIMITIVE;
                t.path = "i32".to_owned();
                t
            }
            MapKeyValue::Enum(enum_type, _) => enum_type.clone(),
        }
    }

    /// Canonical form used for duplicate detection: class-valued keys
    /// normalize to their canonical string path.
    pub fn normalized(&self) -> String {
        match self {
            MapKeyValue::Str(s) => s.clone(),
            MapKeyValue::I32(i) => i.to_string(),
            MapKeyValue::Enum(enum_type, variant) => {
                format!("{}::{}", enum_type.canonical_string_path(), variant)
            }
            MapKeyValue::Class(type_) => type_.canonical_string_path(),
        }
    }

    pub fn readable(&self) -> String {
        match self {
            MapKeyValue::Str(s) => format!("\"{}\"", s),
            MapKeyValue::I32(i) => i.to_string(),
            MapKeyValue::Enum(enum_type, variant) => {
                format!("{}::{}", enum_type.readable(), variant)
            }
            MapKeyValue::Class(type_) => type_.readable(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BindingDeclKind {
    Provides,
    Produces,
    Binds,
    BindsOptionOf,
    Multibinds,
}

/// One binding method recognized on a module.
#[derive(Debug, Clone)]
pub struct BindingDeclaration {
    pub module: TypeData,
    pub name: String,
    pub kind: BindingDeclKind,
    /// The declared key: the bound type plus qualifier. For multibinding
    /// contributions this is the contributed value, not the aggregate.
    pub key: Key,
    pub dependencies: Vec<DependencyRequest>,
    pub multibinding_type: MultibindingType,
    pub map_key: Option<MapKeyValue>,
    pub scope: Option<Scope>,
    pub is_static: bool,
    pub is_nullable: bool,
    pub is_production: bool,
}

impl BindingDeclaration {
    /// Printable form for diagnostics, e.g. `test::MyModule.provide_string`.
    pub fn readable(&self) -> String {
        format!("{}.{}", self.module.readable(), self.name)
    }
}

/// A module type after declaration collection.
#[derive(Debug, Clone)]
pub struct ModuleDeclaration {
    pub type_data: TypeData,
    pub includes: Vec<TypeData>,
    pub install_in: Vec<TypeData>,
    pub subcomponents: Vec<TypeData>,
    pub bindings: Vec<BindingDeclaration>,
    pub is_production: bool,
    /// The module has non-static binding methods and so needs an instance.
    pub needs_instance: bool,
    /// The module type has fields: an instance cannot be defaulted and must
    /// be supplied through the component creator.
    pub requires_construction: bool,
}

/// An injectable constructor.
#[derive(Debug, Clone)]
pub struct InjectableDeclaration {
    pub type_data: TypeData,
    pub ctor_name: String,
    pub scope: Option<Scope>,
    pub dependencies: Vec<DependencyRequest>,
    pub is_assisted: bool,
    pub assisted_params: Vec<(String, TypeData)>,
    pub is_production: bool,
}

/// An assisted factory trait and the assisted type it creates.
#[derive(Debug, Clone)]
pub struct AssistedFactoryDeclaration {
    pub type_data: TypeData,
    pub method_name: String,
    pub target: TypeData,
    pub assisted_params: Vec<(String, TypeData)>,
}

/// Everything collected from the program model in one round.
#[derive(Debug, Default)]
pub struct DeclarationDatabase {
    pub modules: IndexMap<String, ModuleDeclaration>,
    pub injectables: IndexMap<String, InjectableDeclaration>,
    pub assisted_factories: IndexMap<String, AssistedFactoryDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
    /// Elements whose collection hit a type not present this round; they are
    /// handed back to the host for a later round, without diagnostics.
    pub deferred: Vec<String>,
}

pub fn db_key(type_: &TypeData) -> String {
    type_.canonical_string_path_without_args()
}

impl DeclarationDatabase {
    pub fn module(&self, type_: &TypeData) -> Option<&ModuleDeclaration> {
        self.modules.get(&db_key(type_))
    }

    pub fn injectable(&self, type_: &TypeData) -> Option<&InjectableDeclaration> {
        self.injectables.get(&db_key(type_))
    }

    pub fn assisted_factory(&self, type_: &TypeData) -> Option<&AssistedFactoryDeclaration> {
        self.assisted_factories.get(&db_key(type_))
    }
}

/// Collects all declarations visible in the program model.
///
/// User errors become diagnostics and collection of sibling elements
/// continues; a missing type defers the originating element instead.
pub fn collect(model: &dyn ProgramModel) -> DeclarationDatabase {
    let mut db = DeclarationDatabase::default();
    for element in model.annotated_with(MODULE) {
        collect_module_element(model, element, false, &mut db);
    }
    for element in model.annotated_with(PRODUCER_MODULE) {
        collect_module_element(model, element, true, &mut db);
    }
    for element in model.all_elements() {
        collect_injectable(model, element, &mut db);
    }
    for element in model.annotated_with(ASSISTED_FACTORY) {
        collect_assisted_factory(element, &mut db);
    }
    db
}

fn collect_module_element(
    model: &dyn ProgramModel,
    element: &TypeElement,
    is_production: bool,
    db: &mut DeclarationDatabase,
) {
    match collect_module(model, element, is_production, db) {
        Ok(module) => {
            db.modules.insert(db_key(&module.type_data), module);
        }
        Err(ModelError::TypeNotFound { .. }) => {
            db.deferred.push(element.type_data.readable());
        }
    }
}

fn collect_module(
    model: &dyn ProgramModel,
    element: &TypeElement,
    is_production: bool,
    db: &mut DeclarationDatabase,
) -> Result<ModuleDeclaration, ModelError> {
    let annotation_path = if is_production { PRODUCER_MODULE } else { MODULE };
    let annotation = element
        .annotation(annotation_path)
        .expect("module annotation vanished");
    let includes = annotation
        .member("includes")
        .and_then(AnnotationValue::as_type_list)
        .cloned()
        .unwrap_or_default();
    // Included modules must be present this round; otherwise the whole
    // closure would silently lose bindings.
    for include in &includes {
        model.type_element(include)?;
    }
    let install_in = annotation
        .member("install_in")
        .and_then(AnnotationValue::as_type_list)
        .cloned()
        .unwrap_or_default();
    let subcomponents = annotation
        .member("subcomponents")
        .and_then(AnnotationValue::as_type_list)
        .cloned()
        .unwrap_or_default();

    let mut bindings = Vec::new();
    let mut needs_instance = false;
    for method in &element.methods {
        if let Some(binding) =
            collect_binding_method(model, element, method, is_production, db)
        {
            if !binding.is_static {
                needs_instance = true;
            }
            bindings.push(binding);
        }
    }
    Ok(ModuleDeclaration {
        type_data: element.type_data.clone(),
        includes,
        install_in,
        subcomponents,
        bindings,
        is_production,
        needs_instance,
        requires_construction: !element.fields.is_empty(),
    })
}

fn collect_binding_method(
    model: &dyn ProgramModel,
    module: &TypeElement,
    method: &MethodElement,
    module_is_production: bool,
    db: &mut DeclarationDatabase,
) -> Option<BindingDeclaration> {
    let kind = if method.has_annotation(PROVIDES) {
        BindingDeclKind::Provides
    } else if method.has_annotation(PRODUCES) {
        BindingDeclKind::Produces
    } else if method.has_annotation(BINDS) {
        BindingDeclKind::Binds
    } else if method.has_annotation(BINDS_OPTION_OF) {
        BindingDeclKind::BindsOptionOf
    } else if method.has_annotation(MULTIBINDS) {
        BindingDeclKind::Multibinds
    } else {
        return None;
    };
    let printable = format!("{}.{}", module.type_data.readable(), method.name);

    if kind == BindingDeclKind::Produces && !module_is_production {
        db.diagnostics.push(
            Diagnostic::error("produces methods are only allowed on producer modules".to_owned())
                .on(printable),
        );
        return None;
    }

    let return_type = match method.return_type {
        Some(ref return_type) => return_type.clone(),
        None => {
            db.diagnostics.push(
                Diagnostic::error("binding methods must declare a bound type".to_owned())
                    .on(printable),
            );
            return None;
        }
    };

    let qualifier = match qualifier_of(&method.annotations, model) {
        Ok(qualifier) => qualifier,
        Err(e) => {
            db.diagnostics.push(Diagnostic::error(e.to_string()).on(printable));
            return None;
        }
    };
    let scope = match scope_of(&method.annotations, model) {
        Ok(scope) => scope,
        Err(e) => {
            db.diagnostics.push(Diagnostic::error(e.to_string()).on(printable));
            return None;
        }
    };

    match kind {
        BindingDeclKind::Binds => {
            if !method.is_abstract || method.parameters.len() != 1 {
                db.diagnostics.push(
                    Diagnostic::error(
                        "binds methods must be abstract and take exactly one parameter".to_owned(),
                    )
                    .on(printable),
                );
                return None;
            }
        }
        BindingDeclKind::Multibinds => {
            let declares_collection = is_vec_type(&return_type) || is_map_type(&return_type);
            if !method.is_abstract || !method.parameters.is_empty() || !declares_collection {
                db.diagnostics.push(
                    Diagnostic::error(
                        "multibinds methods must be abstract, take no parameters, and return a vec or map".to_owned(),
                    )
                    .on(printable),
                );
                return None;
            }
        }
        BindingDeclKind::BindsOptionOf => {
            if !method.is_abstract || !method.parameters.is_empty() {
                db.diagnostics.push(
                    Diagnostic::error(
                        "binds_option_of methods must be abstract and take no parameters".to_owned(),
                    )
                    .on(printable),
                );
                return None;
            }
        }
        _ => {}
    }

    let multibinding_annotations = [INTO_VEC, ELEMENTS_INTO_VEC, INTO_MAP]
        .iter()
        .filter(|path| method.has_annotation(path))
        .count();
    if multibinding_annotations > 1 {
        db.diagnostics.push(
            Diagnostic::error(
                "at most one of into_vec, elements_into_vec and into_map is allowed".to_owned(),
            )
            .on(printable),
        );
        return None;
    }
    let multibinding_type = if method.has_annotation(INTO_VEC) {
        MultibindingType::IntoVec
    } else if method.has_annotation(ELEMENTS_INTO_VEC) {
        MultibindingType::ElementsIntoVec
    } else if method.has_annotation(INTO_MAP) {
        MultibindingType::IntoMap
    } else {
        MultibindingType::None
    };

    let map_key = match multibinding_type {
        MultibindingType::IntoMap => match parse_map_key(method) {
            Ok(map_key) => Some(map_key),
            Err(message) => {
                db.diagnostics.push(Diagnostic::error(message).on(printable));
                return None;
            }
        },
        _ => None,
    };

    if multibinding_type == MultibindingType::ElementsIntoVec && !is_vec_type(&return_type) {
        db.diagnostics.push(
            Diagnostic::error("elements_into_vec methods must return a vec".to_owned())
                .on(printable),
        );
        return None;
    }

    let dependencies = method
        .parameters
        .iter()
        .map(|parameter| {
            let request_kind = RequestKind::from_wrapped_type(&parameter.type_data);
            let parameter_qualifier = qualifier_of(&parameter.annotations, model).ok().flatten();
            let raw_key = match parameter_qualifier {
                Some(q) => Key::qualified(parameter.type_data.clone(), q),
                None => Key::from_type(parameter.type_data.clone()),
            };
            DependencyRequest {
                kind: request_kind,
                key: raw_key.unwrapped(request_kind),
                request_element: Some(format!("{}({})", printable, parameter.name)),
                is_nullable: parameter.has_annotation(NULLABLE),
            }
        })
        .collect::<Vec<DependencyRequest>>();

    let key = match qualifier {
        Some(q) => Key::qualified(return_type, q),
        None => Key::from_type(return_type),
    };

    Some(BindingDeclaration {
        module: module.type_data.clone(),
        name: method.name.clone(),
        kind,
        key,
        dependencies,
        multibinding_type,
        map_key,
        scope,
        is_static: method.is_static,
        is_nullable: method.has_annotation(NULLABLE),
        is_production: kind == BindingDeclKind::Produces,
    })
}

fn parse_map_key(method: &MethodElement) -> Result<MapKeyValue, String> {
    let annotation = method.annotation(INTO_MAP).expect("into_map vanished");
    let mut keys = Vec::new();
    if let Some(AnnotationValue::Str(s)) = annotation.member("string_key") {
        keys.push(MapKeyValue::Str(s.clone()));
    }
    if let Some(AnnotationValue::I32(i)) = annotation.member("i32_key") {
        keys.push(MapKeyValue::I32(*i));
    }
    if let Some(AnnotationValue::EnumValue(enum_type, variant)) = annotation.member("enum_key") {
        keys.push(MapKeyValue::Enum(enum_type.clone(), variant.clone()));
    }
    if let Some(AnnotationValue::Type(type_)) = annotation.member("class_key") {
        keys.push(MapKeyValue::Class(type_.clone()));
    }
    match keys.len() {
        0 => Err("into_map requires a map key".to_owned()),
        1 => Ok(keys.remove(0)),
        _ => Err("into_map accepts exactly one map key".to_owned()),
    }
}

fn collect_injectable(
    model: &dyn ProgramModel,
    element: &TypeElement,
    db: &mut DeclarationDatabase,
) {
    let ctor = element
        .methods
        .iter()
        .find(|m| m.is_static && (m.has_annotation(INJECT) || m.has_annotation(ASSISTED_INJECT)));
    let ctor = match ctor {
        Some(ctor) => ctor,
        None => return,
    };
    let printable = format!("{}.{}", element.type_data.readable(), ctor.name);
    let is_assisted = ctor.has_annotation(ASSISTED_INJECT);

    let scope = match scope_of(&element.annotations, model) {
        Ok(scope) => scope,
        Err(e) => {
            db.diagnostics
                .push(Diagnostic::error(e.to_string()).on(element.type_data.readable()));
            return;
        }
    };
    if is_assisted && scope.is_some() {
        db.diagnostics.push(
            Diagnostic::error("assisted injection types cannot be scoped".to_owned())
                .on(element.type_data.readable()),
        );
        return;
    }

    let mut dependencies = Vec::new();
    let mut assisted_params = Vec::new();
    for parameter in &ctor.parameters {
        if parameter.has_annotation(ASSISTED) {
            if !is_assisted {
                db.diagnostics.push(
                    Diagnostic::error(
                        "assisted parameters are only allowed on assisted_inject constructors"
                            .to_owned(),
                    )
                    .on(printable.clone()),
                );
                return;
            }
            assisted_params.push((parameter.name.clone(), parameter.type_data.clone()));
            continue;
        }
        let request_kind = RequestKind::from_wrapped_type(&parameter.type_data);
        let parameter_qualifier = qualifier_of(&parameter.annotations, model).ok().flatten();
        let raw_key = match parameter_qualifier {
            Some(q) => Key::qualified(parameter.type_data.clone(), q),
            None => Key::from_type(parameter.type_data.clone()),
        };
        dependencies.push(DependencyRequest {
            kind: request_kind,
            key: raw_key.unwrapped(request_kind),
            request_element: Some(format!("{}({})", printable, parameter.name)),
            is_nullable: parameter.has_annotation(NULLABLE),
        });
    }

    db.injectables.insert(
        db_key(&element.type_data),
        InjectableDeclaration {
            type_data: element.type_data.clone(),
            ctor_name: ctor.name.clone(),
            scope,
            dependencies,
            is_assisted,
            assisted_params,
            is_production: false,
        },
    );
}

fn collect_assisted_factory(element: &TypeElement, db: &mut DeclarationDatabase) {
    let printable = element.type_data.readable();
    let abstract_methods = element
        .methods
        .iter()
        .filter(|m| m.is_abstract)
        .collect::<Vec<&MethodElement>>();
    if abstract_methods.len() != 1 {
        db.diagnostics.push(
            Diagnostic::error(
                "assisted factories must declare exactly one abstract method".to_owned(),
            )
            .on(printable),
        );
        return;
    }
    let method = abstract_methods[0];
    let target = match method.return_type {
        Some(ref target) => target.clone(),
        None => {
            db.diagnostics.push(
                Diagnostic::error("assisted factory methods must return the assisted type".to_owned())
                    .on(printable),
            );
            return;
        }
    };
    let assisted_params = method
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.type_data.clone()))
        .collect::<Vec<(String, TypeData)>>();
    // Injectables are collected before factories, so the target's
    // constructor is already known here.
    let target_ctor = db.injectable(&target).cloned();
    match target_ctor {
        Some(ref ctor) if ctor.is_assisted => {
            if !assisted_params_match(&assisted_params, &ctor.assisted_params) {
                db.diagnostics.push(
                    Diagnostic::error(format!(
                        "assisted factory parameters ({}) do not match the assisted parameters of {}.{} ({})",
                        readable_params(&assisted_params),
                        target.readable(),
                        ctor.ctor_name,
                        readable_params(&ctor.assisted_params)
                    ))
                    .on(printable),
                );
                return;
            }
        }
        _ => {
            db.diagnostics.push(
                Diagnostic::error(
                    "assisted factories must return a type with an assisted_inject constructor"
                        .to_owned(),
                )
                .on(printable),
            );
            return;
        }
    }
    db.assisted_factories.insert(
        db_key(&element.type_data),
        AssistedFactoryDeclaration {
            type_data: element.type_data.clone(),
            method_name: method.name.clone(),
            target,
            assisted_params,
        },
    );
}

/// Name and type of every assisted parameter must agree, order aside.
fn assisted_params_match(
    factory: &[(String, TypeData)],
    constructor: &[(String, TypeData)],
) -> bool {
    if factory.len() != constructor.len() {
        return false;
    }
    let mut factory_sorted = factory.to_vec();
    factory_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let mut constructor_sorted = constructor.to_vec();
    constructor_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    factory_sorted == constructor_sorted
}

fn readable_params(params: &[(String, TypeData)]) -> String {
    params
        .iter()
        .map(|(name, type_)| format!("{}: {}", name, type_.readable()))
        .collect::<Vec<String>>()
        .join(", ")
}

pub fn is_vec_type(type_: &TypeData) -> bool {
    type_.canonical_string_path_without_args() == VEC_PATH
}

pub fn is_map_type(type_: &TypeData) -> bool {
    type_.canonical_string_path_without_args() == MAP_PATH
}

pub fn is_option_type(type_: &TypeData) -> bool {
    type_.canonical_string_path_without_args() == OPTION_PATH
}

/// Transitive closure of a component's installed modules, insertion ordered:
/// installed modules first, then includes depth-first. Include cycles are
/// tolerated.
pub fn module_closure(db: &DeclarationDatabase, roots: &[TypeData]) -> Vec<TypeData> {
    let mut seen = IndexSet::<String>::new();
    let mut result = Vec::new();
    let mut stack: Vec<TypeData> = roots.to_vec();
    stack.reverse();
    while let Some(module) = stack.pop() {
        if !seen.insert(db_key(&module)) {
            continue;
        }
        if let Some(declaration) = db.module(&module) {
            for include in declaration.includes.iter().rev() {
                stack.push(include.clone());
            }
        }
        result.push(module);
    }
    result
}
