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

use crate::binding::{Binding, BindingFactory, BindingKind, DependencyRequest};
use crate::component::ComponentDescriptor;
use crate::declarations::{
    self, db_key, BindingDeclKind, BindingDeclaration, DeclarationDatabase, MultibindingType,
    PRODUCTION_COMPONENT,
};
use indexmap::IndexMap;
use solder_common::key::{Key, RequestKind, MEMBERS_INJECTOR_PATH};
use solder_common::model::{qualifier_of, ModelError, ProgramModel};
use solder_common::type_data::TypeData;
use std::collections::VecDeque;

/// Everything known about one key at one component after resolution.
///
/// A non-multibinding key has at most one contribution binding among the
/// owning component's own declarations; anything else survives here so that
/// validation can report it with every source location.
#[derive(Debug, Clone)]
pub struct ResolvedBindings {
    pub owning_component: TypeData,
    pub key: Key,
    pub contribution_bindings: Vec<Binding>,
    pub members_injection_binding: Option<Binding>,
    pub multibinding_declarations: Vec<BindingDeclaration>,
    pub optional_declarations: Vec<BindingDeclaration>,
    pub subcomponent_declarations: Vec<TypeData>,
}

impl ResolvedBindings {
    fn empty(owning_component: TypeData, key: Key) -> Self {
        ResolvedBindings {
            owning_component,
            key,
            contribution_bindings: Vec::new(),
            members_injection_binding: None,
            multibinding_declarations: Vec::new(),
            optional_declarations: Vec::new(),
            subcomponent_declarations: Vec::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.contribution_bindings.is_empty() && self.members_injection_binding.is_none()
    }

    /// All bindings, members injector included.
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut result = self.contribution_bindings.iter().collect::<Vec<&Binding>>();
        if let Some(ref members) = self.members_injection_binding {
            result.push(members);
        }
        result
    }
}

/// The frozen result of resolving one component and its subtree.
#[derive(Debug)]
pub struct ComponentResolution {
    pub descriptor: ComponentDescriptor,
    /// Component types from the root down to this component.
    pub path: Vec<TypeData>,
    pub resolved: IndexMap<Key, ResolvedBindings>,
    pub children: Vec<ComponentResolution>,
    pub deferred: Vec<String>,
}

impl ComponentResolution {
    pub fn component_type(&self) -> &TypeData {
        &self.descriptor.type_data
    }

    /// Level of a component type within this resolution's path.
    pub fn level_of(&self, component: &TypeData) -> usize {
        self.path
            .iter()
            .position(|t| t == component)
            .unwrap_or(self.path.len() - 1)
    }
}

/// The key under which a request is stored in the resolved map.
///
/// Members-injection requests store under the framework-wrapped key so an
/// instance binding of the same type stays distinct. Everything else stores
/// under its effective key, contribution identity included for multibinding
/// contributions.
pub fn storage_key(request: &DependencyRequest) -> Key {
    match request.kind {
        RequestKind::MembersInjection => request.key.wrapped(RequestKind::MembersInjection),
        _ => request.key.clone(),
    }
}

fn is_members_injector_key(key: &Key) -> bool {
    key.type_.canonical_string_path_without_args() == format!("::{}", MEMBERS_INJECTOR_PATH)
}

struct Ctx<'a> {
    model: &'a dyn ProgramModel,
    db: &'a DeclarationDatabase,
}

/// Resolves the full component hierarchy rooted at `root`.
///
/// Components resolve root first; a child only starts after its parent's
/// resolved map froze, and a key already resolved by an ancestor is
/// referenced, never re-resolved.
pub fn resolve(
    model: &dyn ProgramModel,
    db: &DeclarationDatabase,
    root: &ComponentDescriptor,
) -> ComponentResolution {
    let ctx = Ctx { model, db };
    resolve_component(&ctx, root, &[], vec![root.type_data.clone()])
}

fn resolve_component(
    ctx: &Ctx,
    descriptor: &ComponentDescriptor,
    ancestors: &[&ComponentResolution],
    path: Vec<TypeData>,
) -> ComponentResolution {
    let mut resolution = ComponentResolution {
        descriptor: descriptor.clone(),
        path,
        resolved: IndexMap::new(),
        children: Vec::new(),
        deferred: Vec::new(),
    };

    let mut queue = VecDeque::<Key>::new();
    for entry_point in &descriptor.entry_points {
        queue.push_back(storage_key(&entry_point.request));
    }
    // Module-level graphs have no entry points; every unique declaration of
    // the module closure seeds instead.
    if descriptor.kind == crate::component::ComponentKind::ModuleComponent {
        for module in &descriptor.modules {
            let Some(declaration) = ctx.db.module(module) else {
                continue;
            };
            for binding_declaration in &declaration.bindings {
                if binding_declaration.multibinding_type == MultibindingType::None
                    && matches!(
                        binding_declaration.kind,
                        BindingDeclKind::Provides
                            | BindingDeclKind::Produces
                            | BindingDeclKind::Binds
                    )
                {
                    queue.push_back(binding_declaration.key.clone());
                }
            }
        }
    }

    while let Some(key) = queue.pop_front() {
        if resolution.resolved.contains_key(&key) {
            continue;
        }
        if ancestor_resolution(ancestors, &key).is_some() {
            // Reuse the ancestor's resolution unless this component's own
            // modules add local multibinding or optional contributions, in
            // which case the key resolves again with a lower owner.
            if !has_local_contributions(ctx, descriptor, &key) {
                continue;
            }
        }
        let entries = resolve_key(ctx, &key, descriptor, ancestors, &mut resolution);
        for (entry_key, resolved_bindings) in entries {
            for binding in resolved_bindings.bindings() {
                for dependency in &binding.dependencies {
                    queue.push_back(storage_key(dependency));
                }
            }
            resolution.resolved.entry(entry_key).or_insert(resolved_bindings);
        }
    }

    refine_ownership(&mut resolution, ancestors);

    let children = {
        let mut chain: Vec<&ComponentResolution> = ancestors.to_vec();
        chain.push(&resolution);
        descriptor
            .children
            .iter()
            .map(|child| {
                let mut child_path = chain.last().unwrap().path.clone();
                child_path.push(child.type_data.clone());
                resolve_component(ctx, child, &chain, child_path)
            })
            .collect::<Vec<ComponentResolution>>()
    };
    resolution.children = children;
    resolution
}

fn ancestor_resolution<'a>(
    ancestors: &'a [&ComponentResolution],
    key: &Key,
) -> Option<&'a ResolvedBindings> {
    for ancestor in ancestors.iter().rev() {
        if let Some(resolved) = ancestor.resolved.get(key) {
            return Some(resolved);
        }
    }
    None
}

/// True if the component's own module set contributes to a multibound or
/// optional key that an ancestor already resolved.
fn has_local_contributions(ctx: &Ctx, descriptor: &ComponentDescriptor, key: &Key) -> bool {
    if key.multibinding_contribution.is_some() {
        return false;
    }
    let is_vec = declarations::is_vec_type(&key.type_);
    let is_map = declarations::is_map_type(&key.type_);
    let is_option = declarations::is_option_type(&key.type_);
    if !is_vec && !is_map && !is_option {
        return false;
    }
    for module in &descriptor.modules {
        let Some(declaration) = ctx.db.module(module) else {
            continue;
        };
        for binding in &declaration.bindings {
            if is_option {
                if binding.kind == BindingDeclKind::BindsOptionOf
                    && option_matches(key, &binding.key)
                {
                    return true;
                }
                continue;
            }
            if contributes_to(binding, key) {
                return true;
            }
        }
    }
    false
}

fn option_matches(option_key: &Key, underlying: &Key) -> bool {
    option_key.qualifier == underlying.qualifier
        && option_key.type_.args.first() == Some(&underlying.type_)
}

/// True if a contribution declaration feeds the multibound aggregate `key`.
fn contributes_to(declaration: &BindingDeclaration, key: &Key) -> bool {
    if declaration.key.qualifier != key.qualifier {
        return false;
    }
    match declaration.multibinding_type {
        MultibindingType::IntoVec => {
            declarations::is_vec_type(&key.type_)
                && key.type_.args.first() == Some(&declaration.key.type_)
        }
        MultibindingType::ElementsIntoVec => {
            declarations::is_vec_type(&key.type_)
                && key.type_.args == declaration.key.type_.args
                && declarations::is_vec_type(&declaration.key.type_)
        }
        MultibindingType::IntoMap => {
            if !declarations::is_map_type(&key.type_) {
                return false;
            }
            let Some(map_key) = declaration.map_key.as_ref() else {
                return false;
            };
            key.type_.args.first() == Some(&map_key.key_type())
                && key.type_.args.get(1) == Some(&declaration.key.type_)
        }
        MultibindingType::None => false,
    }
}

/// Resolves one storage key at one component. May return extra entries for
/// multibinding contributions discovered along the way.
fn resolve_key(
    ctx: &Ctx,
    key: &Key,
    descriptor: &ComponentDescriptor,
    ancestors: &[&ComponentResolution],
    resolution: &mut ComponentResolution,
) -> Vec<(Key, ResolvedBindings)> {
    let factory = BindingFactory::new(ctx.model, ctx.db);
    let chain = chain_of(descriptor, ancestors);
    let current_level = chain.len() - 1;
    let path = &resolution.path;

    // Members injection requests synthesize an injector for the target type.
    if is_members_injector_key(key) {
        let target = key.type_.args.first().cloned().unwrap_or_default();
        return match factory.members_injector(&target) {
            Ok(binding) => {
                let mut resolved =
                    ResolvedBindings::empty(descriptor.type_data.clone(), key.clone());
                resolved.members_injection_binding = Some(binding);
                vec![(key.clone(), resolved)]
            }
            Err(ModelError::TypeNotFound { path: missing }) => {
                resolution.deferred.push(missing);
                vec![(
                    key.clone(),
                    ResolvedBindings::empty(descriptor.type_data.clone(), key.clone()),
                )]
            }
        };
    }

    // A key carrying contribution identity names one specific declaration.
    if let Some(ref contribution) = key.multibinding_contribution {
        for (level, chain_descriptor) in chain.iter().enumerate() {
            for module in &chain_descriptor.modules {
                if db_key(module) != contribution.module {
                    continue;
                }
                let Some(declaration) = ctx.db.module(module) else {
                    continue;
                };
                for binding_declaration in &declaration.bindings {
                    if binding_declaration.name == contribution.binding_name {
                        let binding = factory.from_declaration(binding_declaration);
                        let mut resolved =
                            ResolvedBindings::empty(path[level].clone(), key.clone());
                        resolved.contribution_bindings.push(binding);
                        return vec![(key.clone(), resolved)];
                    }
                }
            }
        }
        return vec![(
            key.clone(),
            ResolvedBindings::empty(descriptor.type_data.clone(), key.clone()),
        )];
    }

    // Multibound aggregates union contributions from the whole chain.
    if declarations::is_vec_type(&key.type_) || declarations::is_map_type(&key.type_) {
        let aggregated = resolve_multibound(ctx, &factory, key, &chain, path);
        if let Some(entries) = aggregated {
            return entries;
        }
    }

    // Optional bindings wrap presence or absence of the underlying key.
    if declarations::is_option_type(&key.type_) {
        if let Some(entries) = resolve_optional(ctx, &factory, key, &chain, path) {
            return entries;
        }
    }

    // Subcomponent creator requests resolve to a creator binding owned by
    // the parent of the requested subcomponent.
    if let Some(entry) = resolve_subcomponent_creator(ctx, &factory, key, &chain, path) {
        return vec![entry];
    }

    // Explicit declarations: own declarations first, then walk ancestors.
    for level in (0..=current_level).rev() {
        let explicit = explicit_bindings_at(ctx, &factory, key, chain[level]);
        if !explicit.is_empty() {
            let mut resolved = ResolvedBindings::empty(path[level].clone(), key.clone());
            resolved.contribution_bindings = explicit;
            return vec![(key.clone(), resolved)];
        }
    }

    // Injectable constructors and assisted factories float; ownership
    // refinement hoists them afterwards.
    if key.qualifier.is_none() {
        if let Some(injectable) = ctx.db.injectable(&key.type_) {
            if injectable.is_assisted {
                // Assisted types are only reachable through their factory;
                // requesting one directly is reported by validation as
                // missing.
            } else {
                let mut resolved =
                    ResolvedBindings::empty(descriptor.type_data.clone(), key.clone());
                resolved
                    .contribution_bindings
                    .push(factory.from_injectable(injectable));
                return vec![(key.clone(), resolved)];
            }
        }
        if let Some(assisted_factory) = ctx.db.assisted_factory(&key.type_) {
            let mut resolved = ResolvedBindings::empty(descriptor.type_data.clone(), key.clone());
            resolved
                .contribution_bindings
                .push(factory.assisted_factory(assisted_factory));
            let target = ctx
                .db
                .injectable(&assisted_factory.target)
                .map(|injectable| factory.from_injectable(injectable));
            let mut entries = vec![(key.clone(), resolved)];
            if let Some(target_binding) = target {
                let target_key = target_binding.key.clone();
                if ancestor_resolution(ancestors, &target_key).is_none()
                    && !resolution.resolved.contains_key(&target_key)
                {
                    let mut target_resolved =
                        ResolvedBindings::empty(descriptor.type_data.clone(), target_key.clone());
                    target_resolved.contribution_bindings.push(target_binding);
                    entries.push((target_key, target_resolved));
                }
            }
            return entries;
        }
    }

    // Nothing: a missing binding node, recorded where it was required.
    vec![(
        key.clone(),
        ResolvedBindings::empty(descriptor.type_data.clone(), key.clone()),
    )]
}

fn chain_of<'a>(
    descriptor: &'a ComponentDescriptor,
    ancestors: &'a [&ComponentResolution],
) -> Vec<&'a ComponentDescriptor> {
    let mut chain = ancestors
        .iter()
        .map(|a| &a.descriptor)
        .collect::<Vec<&ComponentDescriptor>>();
    chain.push(descriptor);
    chain
}

/// Unique (non-multibinding) bindings declared directly at one component:
/// module methods, bound instances, and component-dependency provisions.
fn explicit_bindings_at(
    ctx: &Ctx,
    factory: &BindingFactory,
    key: &Key,
    descriptor: &ComponentDescriptor,
) -> Vec<Binding> {
    let mut result = Vec::new();
    for module in &descriptor.modules {
        let Some(declaration) = ctx.db.module(module) else {
            continue;
        };
        for binding_declaration in &declaration.bindings {
            if binding_declaration.multibinding_type != MultibindingType::None {
                continue;
            }
            if !matches!(
                binding_declaration.kind,
                BindingDeclKind::Provides | BindingDeclKind::Produces | BindingDeclKind::Binds
            ) {
                continue;
            }
            if &binding_declaration.key == key {
                result.push(factory.from_declaration(binding_declaration));
            }
        }
    }
    if let Some(creator) = descriptor.creator() {
        for (setter, bound_key, is_nullable) in &creator.bound_instances {
            if bound_key == key {
                result.push(factory.bound_instance(key.clone(), setter, *is_nullable));
            }
        }
    }
    for dependency_component in &descriptor.dependencies {
        let Ok(element) = ctx.model.type_element(dependency_component) else {
            continue;
        };
        let is_production = element.has_annotation(PRODUCTION_COMPONENT);
        for method in &element.methods {
            if !method.parameters.is_empty() {
                continue;
            }
            let Some(ref return_type) = method.return_type else {
                continue;
            };
            let qualifier = qualifier_of(&method.annotations, ctx.model).ok().flatten();
            let method_key = match qualifier {
                Some(q) => Key::qualified(return_type.clone(), q),
                None => Key::from_type(return_type.clone()),
            };
            if &method_key == key {
                result.push(factory.component_provision(
                    key.clone(),
                    dependency_component.clone(),
                    &method.name,
                    is_production,
                ));
            }
        }
    }
    result
}

/// Union of multibinding contributions along the chain, depth first by
/// component path (root first), then module order, then declaration order.
/// Returns None when the key has neither contributions nor declarations, so
/// explicit `Vec`/`HashMap` provisions still resolve normally.
fn resolve_multibound(
    ctx: &Ctx,
    factory: &BindingFactory,
    key: &Key,
    chain: &[&ComponentDescriptor],
    path: &[TypeData],
) -> Option<Vec<(Key, ResolvedBindings)>> {
    let mut contribution_entries: Vec<(usize, Binding)> = Vec::new();
    let mut multibinding_declarations = Vec::new();
    for (level, descriptor) in chain.iter().enumerate() {
        for module in &descriptor.modules {
            let Some(declaration) = ctx.db.module(module) else {
                continue;
            };
            for binding_declaration in &declaration.bindings {
                if binding_declaration.kind == BindingDeclKind::Multibinds
                    && &binding_declaration.key == key
                {
                    multibinding_declarations.push(binding_declaration.clone());
                    continue;
                }
                if contributes_to(binding_declaration, key) {
                    contribution_entries
                        .push((level, factory.from_declaration(binding_declaration)));
                }
            }
        }
    }
    if contribution_entries.is_empty() && multibinding_declarations.is_empty() {
        return None;
    }

    // Owner: the lowest component that introduces a local contribution, or
    // the root when only declarations exist.
    let owner_level = contribution_entries
        .iter()
        .map(|(level, _)| *level)
        .max()
        .unwrap_or(0);
    let contributions = contribution_entries
        .iter()
        .map(|(_, binding)| binding)
        .collect::<Vec<&Binding>>();
    let aggregate = if declarations::is_map_type(&key.type_) {
        factory.multibound_map(key.clone(), &contributions)
    } else {
        factory.multibound_vec(key.clone(), &contributions)
    };
    let mut resolved = ResolvedBindings::empty(path[owner_level].clone(), key.clone());
    resolved.contribution_bindings.push(aggregate);
    resolved.multibinding_declarations = multibinding_declarations;
    // A unique binding for the same key is a conflict with the aggregate,
    // not a silent shadow; keep it so duplicate validation sees both.
    for descriptor in chain.iter() {
        resolved
            .contribution_bindings
            .extend(explicit_bindings_at(ctx, factory, key, descriptor));
    }

    let mut entries = vec![(key.clone(), resolved)];
    for (level, binding) in contribution_entries {
        let mut contribution_resolved =
            ResolvedBindings::empty(path[level].clone(), binding.key.clone());
        let contribution_key = binding.key.clone();
        contribution_resolved.contribution_bindings.push(binding);
        entries.push((contribution_key, contribution_resolved));
    }
    Some(entries)
}

fn resolve_optional(
    ctx: &Ctx,
    factory: &BindingFactory,
    key: &Key,
    chain: &[&ComponentDescriptor],
    path: &[TypeData],
) -> Option<Vec<(Key, ResolvedBindings)>> {
    let mut declaration_level = None;
    let mut optional_declarations = Vec::new();
    for (level, descriptor) in chain.iter().enumerate() {
        for module in &descriptor.modules {
            let Some(declaration) = ctx.db.module(module) else {
                continue;
            };
            for binding_declaration in &declaration.bindings {
                if binding_declaration.kind == BindingDeclKind::BindsOptionOf
                    && option_matches(key, &binding_declaration.key)
                {
                    declaration_level.get_or_insert(level);
                    optional_declarations.push(binding_declaration.clone());
                }
            }
        }
    }
    let declaration_level = declaration_level?;

    let underlying_key = Key {
        type_: key.type_.args.first().cloned().unwrap_or_default(),
        qualifier: key.qualifier.clone(),
        multibinding_contribution: None,
    };
    let underlying_level = lowest_visible_level(ctx, &underlying_key, chain);
    let underlying = underlying_level.map(|_| DependencyRequest {
        kind: RequestKind::Instance,
        key: underlying_key,
        request_element: None,
        is_nullable: false,
    });
    // Owner: the lowest component with visibility into both the declaration
    // and the underlying binding, when one exists.
    let owner_level = underlying_level
        .unwrap_or(declaration_level)
        .max(declaration_level);
    let mut resolved = ResolvedBindings::empty(path[owner_level].clone(), key.clone());
    resolved
        .contribution_bindings
        .push(factory.optional(key.clone(), underlying));
    resolved.optional_declarations = optional_declarations;
    Some(vec![(key.clone(), resolved)])
}

/// The deepest chain level at which an explicit source for the key becomes
/// visible, or None when the key has no source anywhere in the chain.
fn lowest_visible_level(
    ctx: &Ctx,
    key: &Key,
    chain: &[&ComponentDescriptor],
) -> Option<usize> {
    let factory = BindingFactory::new(ctx.model, ctx.db);
    for (level, descriptor) in chain.iter().enumerate().rev() {
        if !explicit_bindings_at(ctx, &factory, key, descriptor).is_empty() {
            return Some(level);
        }
    }
    if key.qualifier.is_none() {
        if let Some(injectable) = ctx.db.injectable(&key.type_) {
            if !injectable.is_assisted {
                return Some(0);
            }
        }
    }
    None
}

fn resolve_subcomponent_creator(
    ctx: &Ctx,
    factory: &BindingFactory,
    key: &Key,
    chain: &[&ComponentDescriptor],
    path: &[TypeData],
) -> Option<(Key, ResolvedBindings)> {
    for (level, descriptor) in chain.iter().enumerate() {
        for child in &descriptor.children {
            let Some(creator) = child.creator() else {
                continue;
            };
            if db_key(&creator.type_data) != db_key(&key.type_) {
                continue;
            }
            let declaring_modules = descriptor
                .modules
                .iter()
                .filter(|module| {
                    ctx.db
                        .module(module)
                        .map(|m| {
                            m.subcomponents
                                .iter()
                                .any(|s| db_key(s) == db_key(&child.type_data))
                        })
                        .unwrap_or(false)
                })
                .cloned()
                .collect::<Vec<TypeData>>();
            let binding = factory.subcomponent_creator(
                key.clone(),
                child.type_data.clone(),
                declaring_modules.clone(),
            );
            let mut resolved = ResolvedBindings::empty(path[level].clone(), key.clone());
            resolved.contribution_bindings.push(binding);
            resolved.subcomponent_declarations = declaring_modules;
            return Some((key.clone(), resolved));
        }
    }
    None
}

/// Hoists floating bindings upward to a fixpoint.
///
/// An unscoped injection binding moves to the highest component at which
/// every dependency is satisfiable; a scoped one sinks to the component
/// declaring its scope. Declaration-sourced bindings never float above the
/// component installing their module.
fn refine_ownership(resolution: &mut ComponentResolution, ancestors: &[&ComponentResolution]) {
    let path = resolution.path.clone();
    let current_level = path.len() - 1;

    let floating_keys = resolution
        .resolved
        .iter()
        .filter(|(_, resolved)| {
            resolved.contribution_bindings.len() == 1
                && matches!(
                    resolved.contribution_bindings[0].kind,
                    BindingKind::Injection | BindingKind::AssistedFactory { .. }
                )
        })
        .map(|(key, _)| key.clone())
        .collect::<Vec<Key>>();

    // Scoped bindings pin to the topmost component declaring the scope.
    let chain_scopes = {
        let mut scopes = ancestors
            .iter()
            .map(|a| a.descriptor.scopes.clone())
            .collect::<Vec<_>>();
        scopes.push(resolution.descriptor.scopes.clone());
        scopes
    };

    for _ in 0..=(current_level + 1) * resolution.resolved.len().max(1) {
        let mut changed = false;
        for key in &floating_keys {
            let binding_scope = resolution.resolved[key].contribution_bindings[0].scope.clone();
            let new_level = match binding_scope {
                Some(ref scope) if !scope.is_reusable() => chain_scopes
                    .iter()
                    .position(|scopes| scopes.contains(scope))
                    .unwrap_or(current_level),
                _ => {
                    let dependencies = resolution.resolved[key].contribution_bindings[0]
                        .dependencies
                        .clone();
                    dependencies
                        .iter()
                        .map(|dependency| {
                            owner_level_of(&storage_key(dependency), resolution, ancestors, &path)
                        })
                        .max()
                        .unwrap_or(0)
                }
            };
            let resolved = resolution.resolved.get_mut(key).unwrap();
            if resolved.owning_component != path[new_level] {
                resolved.owning_component = path[new_level].clone();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

fn owner_level_of(
    key: &Key,
    resolution: &ComponentResolution,
    ancestors: &[&ComponentResolution],
    path: &[TypeData],
) -> usize {
    if let Some(resolved) = resolution.resolved.get(key) {
        if resolved.is_missing() {
            return path.len() - 1;
        }
        return path
            .iter()
            .position(|t| t == &resolved.owning_component)
            .unwrap_or(path.len() - 1);
    }
    if let Some(resolved) = ancestor_resolution(ancestors, key) {
        return path
            .iter()
            .position(|t| t == &resolved.owning_component)
            .unwrap_or(path.len() - 1);
    }
    path.len() - 1
}
