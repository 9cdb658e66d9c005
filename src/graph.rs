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

use crate::binding::{Binding, BindingKind, DependencyRequest};
use crate::component::{ComponentDescriptor, EntryPoint};
use crate::error::{invariant, InternalError};
use crate::resolver::{storage_key, ComponentResolution, ResolvedBindings};
use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{Bfs, EdgeRef, Reversed};
use petgraph::Direction;
use solder_common::key::{Key, RequestKind};
use solder_common::scope::Scope;
use solder_common::type_data::TypeData;

/// The components from the root down to the component a node belongs to.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ComponentPath(Vec<TypeData>);

impl ComponentPath {
    pub fn new(path: Vec<TypeData>) -> Self {
        assert!(!path.is_empty(), "component paths are never empty");
        ComponentPath(path)
    }

    pub fn at_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn root(&self) -> &TypeData {
        &self.0[0]
    }

    pub fn current(&self) -> &TypeData {
        self.0.last().unwrap()
    }

    pub fn components(&self) -> &[TypeData] {
        &self.0
    }

    pub fn parent(&self) -> Option<ComponentPath> {
        if self.at_root() {
            return None;
        }
        Some(ComponentPath(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, component: TypeData) -> ComponentPath {
        let mut path = self.0.clone();
        path.push(component);
        ComponentPath(path)
    }

    pub fn readable(&self) -> String {
        self.0
            .iter()
            .map(|t| t.readable())
            .collect::<Vec<String>>()
            .join(" → ")
    }

    fn id(&self) -> String {
        self.0
            .iter()
            .map(|t| t.identifier_string())
            .collect::<Vec<String>>()
            .join("→")
    }
}

#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component_path: ComponentPath,
    pub entry_points: Vec<EntryPoint>,
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone)]
pub struct BindingNode {
    pub component_path: ComponentPath,
    pub binding: Binding,
}

#[derive(Debug, Clone)]
pub struct MissingBindingNode {
    pub component_path: ComponentPath,
    pub key: Key,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Component(ComponentNode),
    Binding(BindingNode),
    Missing(MissingBindingNode),
}

impl NodeKind {
    pub fn component_path(&self) -> &ComponentPath {
        match self {
            NodeKind::Component(node) => &node.component_path,
            NodeKind::Binding(node) => &node.component_path,
            NodeKind::Missing(node) => &node.component_path,
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            NodeKind::Component(_) => None,
            NodeKind::Binding(node) => Some(&node.binding.key),
            NodeKind::Missing(node) => Some(&node.key),
        }
    }

    pub fn readable(&self) -> String {
        match self {
            NodeKind::Component(node) => node.component_path.readable(),
            NodeKind::Binding(node) => node.binding.readable_name(),
            NodeKind::Missing(node) => format!("{} (missing)", node.key.readable()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EdgeKind {
    Dependency {
        request: DependencyRequest,
        is_entry_point: bool,
    },
    ChildFactoryMethod {
        factory_method: String,
    },
    SubcomponentCreatorBinding {
        declaring_modules: Vec<TypeData>,
    },
}

impl EdgeKind {
    pub fn as_dependency(&self) -> Option<(&DependencyRequest, bool)> {
        match self {
            EdgeKind::Dependency {
                request,
                is_entry_point,
            } => Some((request, *is_entry_point)),
            _ => None,
        }
    }
}

/// The immutable dependency network of one root component (or of one module,
/// for full binding graphs). All query results observe the frozen snapshot.
pub struct BindingGraph {
    network: StableDiGraph<NodeKind, EdgeKind>,
    root: NodeIndex,
    is_full: bool,
    component_index: IndexMap<String, NodeIndex>,
    binding_index: IndexMap<(String, Key), NodeIndex>,
    missing_index: IndexMap<(String, Key), NodeIndex>,
    resolutions: IndexMap<(String, Key), ResolvedBindings>,
    descriptors: IndexMap<String, ComponentDescriptor>,
}

impl BindingGraph {
    /// Builds the network from a frozen resolution tree.
    pub fn build(resolution: &ComponentResolution, is_full: bool) -> BindingGraph {
        let mut graph = BindingGraph {
            network: StableDiGraph::new(),
            root: NodeIndex::new(0),
            is_full,
            component_index: IndexMap::new(),
            binding_index: IndexMap::new(),
            missing_index: IndexMap::new(),
            resolutions: IndexMap::new(),
            descriptors: IndexMap::new(),
        };
        graph.add_components(resolution);
        graph.root = *graph
            .component_index
            .first()
            .expect("resolution tree had no components")
            .1;
        graph.add_binding_nodes(resolution);
        graph.add_edges(resolution);
        if cfg!(debug_assertions) {
            if let Err(violation) = graph.verify_invariants() {
                panic!("{}", violation);
            }
        }
        graph
    }

    /// Structural invariants of the frozen network. A violation is a
    /// compiler bug, never a user error.
    pub fn verify_invariants(&self) -> Result<(), InternalError> {
        let roots = self
            .component_nodes()
            .filter(|(_, node)| node.component_path.at_root())
            .count();
        invariant!(roots == 1, "expected exactly one root component, found {}", roots);
        for (edge, kind) in self.edges() {
            let (source, target) = self.endpoints(edge);
            match kind {
                EdgeKind::Dependency { request, .. } => {
                    invariant!(
                        !matches!(self.network[source], NodeKind::Missing(_)),
                        "dependency edges never start at missing bindings"
                    );
                    if let Some(target_key) = self.network[target].key() {
                        // Node keys are stored effective; only members
                        // injection keeps its framework wrapper.
                        let effective = if request.kind == RequestKind::MembersInjection {
                            target_key.unwrapped(request.kind)
                        } else {
                            target_key.clone()
                        };
                        invariant!(
                            effective.without_contribution() == request.key.without_contribution(),
                            "dependency edge key mismatch: {} -> {}",
                            request.key.readable(),
                            target_key.readable()
                        );
                    }
                }
                EdgeKind::ChildFactoryMethod { .. }
                | EdgeKind::SubcomponentCreatorBinding { .. } => {
                    invariant!(
                        matches!(self.network[target], NodeKind::Component(_)),
                        "factory method and creator edges target component nodes"
                    );
                }
            }
        }
        Ok(())
    }

    fn add_components(&mut self, resolution: &ComponentResolution) {
        let path = ComponentPath::new(resolution.path.clone());
        let node = self.network.add_node(NodeKind::Component(ComponentNode {
            component_path: path.clone(),
            entry_points: resolution.descriptor.entry_points.clone(),
            scopes: resolution.descriptor.scopes.clone(),
        }));
        self.component_index.insert(path.id(), node);
        self.descriptors
            .insert(path.id(), resolution.descriptor.clone());
        for child in &resolution.children {
            self.add_components(child);
        }
    }

    fn add_binding_nodes(&mut self, resolution: &ComponentResolution) {
        for (key, resolved) in &resolution.resolved {
            let owner_level = resolution.level_of(&resolved.owning_component);
            let owner_path =
                ComponentPath::new(resolution.path[..=owner_level].to_vec());
            self.resolutions
                .entry((owner_path.id(), key.clone()))
                .or_insert_with(|| resolved.clone());
            if resolved.is_missing() {
                // Missing bindings become nodes lazily, at the source that
                // requires them, while edges are added.
                continue;
            }
            let binding = resolved
                .members_injection_binding
                .as_ref()
                .unwrap_or_else(|| &resolved.contribution_bindings[0]);
            let index_key = (owner_path.id(), key.clone());
            if !self.binding_index.contains_key(&index_key) {
                let node = self.network.add_node(NodeKind::Binding(BindingNode {
                    component_path: owner_path,
                    binding: binding.clone(),
                }));
                self.binding_index.insert(index_key, node);
            }
        }
        for child in &resolution.children {
            self.add_binding_nodes(child);
        }
    }

    /// Finds the node a request from `path` resolves to, walking from the
    /// requesting component toward the root.
    fn target_of(&mut self, path: &ComponentPath, key: &Key) -> NodeIndex {
        let mut prefix = path.components().to_vec();
        loop {
            let prefix_path = ComponentPath::new(prefix.clone());
            if let Some(node) = self.binding_index.get(&(prefix_path.id(), key.clone())) {
                return *node;
            }
            if prefix.len() == 1 {
                break;
            }
            prefix.pop();
        }
        let missing_key = (path.id(), key.clone());
        if let Some(node) = self.missing_index.get(&missing_key) {
            return *node;
        }
        let node = self.network.add_node(NodeKind::Missing(MissingBindingNode {
            component_path: path.clone(),
            key: key.clone(),
        }));
        self.missing_index.insert(missing_key, node);
        node
    }

    fn add_edges(&mut self, resolution: &ComponentResolution) {
        let path = ComponentPath::new(resolution.path.clone());
        let component_node = self.component_index[&path.id()];

        for entry_point in &resolution.descriptor.entry_points {
            let target = self.target_of(&path, &storage_key(&entry_point.request));
            self.network.add_edge(
                component_node,
                target,
                EdgeKind::Dependency {
                    request: entry_point.request.clone(),
                    is_entry_point: true,
                },
            );
        }

        for factory_method in &resolution.descriptor.factory_methods {
            let child_path = path.child(factory_method.child.clone());
            if let Some(child_node) = self.component_index.get(&child_path.id()) {
                self.network.add_edge(
                    component_node,
                    *child_node,
                    EdgeKind::ChildFactoryMethod {
                        factory_method: factory_method.name.clone(),
                    },
                );
            }
        }

        for (key, resolved) in &resolution.resolved {
            if resolved.is_missing() {
                continue;
            }
            let owner_level = resolution.level_of(&resolved.owning_component);
            let owner_path = ComponentPath::new(resolution.path[..=owner_level].to_vec());
            let Some(&source) = self.binding_index.get(&(owner_path.id(), key.clone()))
            else {
                continue;
            };
            let source_binding = match &self.network[source] {
                NodeKind::Binding(node) => node.binding.clone(),
                _ => continue,
            };
            if self
                .network
                .edges_directed(source, Direction::Outgoing)
                .next()
                .is_some()
            {
                // Shared with an ancestor path that already wired it.
                continue;
            }
            for dependency in &source_binding.dependencies {
                let target = self.target_of(&path, &storage_key(dependency));
                self.network.add_edge(
                    source,
                    target,
                    EdgeKind::Dependency {
                        request: dependency.clone(),
                        is_entry_point: false,
                    },
                );
            }
            if let BindingKind::SubcomponentCreator {
                ref child,
                ref declaring_modules,
            } = source_binding.kind
            {
                let child_path = owner_path.child(child.clone());
                if let Some(child_node) = self.component_index.get(&child_path.id()) {
                    self.network.add_edge(
                        source,
                        *child_node,
                        EdgeKind::SubcomponentCreatorBinding {
                            declaring_modules: declaring_modules.clone(),
                        },
                    );
                }
            }
        }

        for child in &resolution.children {
            self.add_edges(child);
        }
    }

    pub fn network(&self) -> &StableDiGraph<NodeKind, EdgeKind> {
        &self.network
    }

    pub fn is_full_binding_graph(&self) -> bool {
        self.is_full
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &NodeKind)> {
        self.network
            .node_indices()
            .map(move |index| (index, &self.network[index]))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &EdgeKind)> {
        self.network
            .edge_indices()
            .map(move |index| (index, &self.network[index]))
    }

    pub fn node(&self, index: NodeIndex) -> &NodeKind {
        &self.network[index]
    }

    pub fn endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.network
            .edge_endpoints(edge)
            .expect("edge vanished from frozen network")
    }

    pub fn binding_nodes(&self) -> impl Iterator<Item = (NodeIndex, &BindingNode)> {
        self.nodes().filter_map(|(index, node)| match node {
            NodeKind::Binding(binding) => Some((index, binding)),
            _ => None,
        })
    }

    pub fn binding_nodes_for_key<'a>(
        &'a self,
        key: &'a Key,
    ) -> impl Iterator<Item = (NodeIndex, &'a BindingNode)> + 'a {
        self.binding_nodes()
            .filter(move |(_, node)| &node.binding.key == key)
    }

    pub fn missing_bindings(&self) -> impl Iterator<Item = (NodeIndex, &MissingBindingNode)> {
        self.nodes().filter_map(|(index, node)| match node {
            NodeKind::Missing(missing) => Some((index, missing)),
            _ => None,
        })
    }

    pub fn component_nodes(&self) -> impl Iterator<Item = (NodeIndex, &ComponentNode)> {
        self.nodes().filter_map(|(index, node)| match node {
            NodeKind::Component(component) => Some((index, component)),
            _ => None,
        })
    }

    pub fn root_component_node(&self) -> (NodeIndex, &ComponentNode) {
        match &self.network[self.root] {
            NodeKind::Component(component) => (self.root, component),
            _ => unreachable!("root node is always a component"),
        }
    }

    pub fn component_node(&self, path: &ComponentPath) -> Option<(NodeIndex, &ComponentNode)> {
        self.component_index.get(&path.id()).map(|&index| {
            match &self.network[index] {
                NodeKind::Component(component) => (index, component),
                _ => unreachable!("component index points at a component"),
            }
        })
    }

    pub fn descriptor(&self, path: &ComponentPath) -> Option<&ComponentDescriptor> {
        self.descriptors.get(&path.id())
    }

    pub fn dependency_edges(
        &self,
    ) -> impl Iterator<Item = (EdgeIndex, &DependencyRequest, bool)> {
        self.edges().filter_map(|(index, edge)| {
            edge.as_dependency()
                .map(|(request, is_entry_point)| (index, request, is_entry_point))
        })
    }

    /// Entry point edges, optionally restricted to one component.
    pub fn entry_point_edges<'a>(
        &'a self,
        component: Option<&'a ComponentPath>,
    ) -> Vec<EdgeIndex> {
        self.edges()
            .filter(|(index, edge)| match edge.as_dependency() {
                Some((_, true)) => match component {
                    Some(path) => {
                        let (source, _) = self.endpoints(*index);
                        self.network[source].component_path() == path
                    }
                    None => true,
                },
                _ => false,
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Entry point edges whose target can reach the given binding node,
    /// computed over the transposed network.
    pub fn entry_point_edges_depending_on(&self, binding: NodeIndex) -> Vec<EdgeIndex> {
        let reversed = Reversed(&self.network);
        let mut reachable = vec![binding];
        let mut bfs = Bfs::new(reversed, binding);
        while let Some(node) = bfs.next(reversed) {
            reachable.push(node);
        }
        self.entry_point_edges(None)
            .into_iter()
            .filter(|&edge| {
                let (_, target) = self.endpoints(edge);
                reachable.contains(&target)
            })
            .collect()
    }

    /// The resolved-bindings aggregate per (owner component, key), for
    /// validators that need every contribution, not just the chosen binding.
    pub fn all_resolved(&self) -> impl Iterator<Item = (&(String, Key), &ResolvedBindings)> {
        self.resolutions.iter()
    }

    /// Incoming dependency edges of a node.
    pub fn dependants(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        self.network
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
            .collect()
    }
}
