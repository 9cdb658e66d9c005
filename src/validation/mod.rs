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

pub mod component_shape;
pub mod creator_coverage;
pub mod delegate_types;
pub mod dependency_cycles;
pub mod duplicate_bindings;
pub mod entry_points;
pub mod framework_requests;
pub mod incompatible_scopes;
pub mod install_in;
pub mod map_key_strategies;
pub mod members_injection;
pub mod missing_bindings;
pub mod multibinding_coherence;
pub mod nullability;
pub mod subcomponent_references;

use crate::declarations::DeclarationDatabase;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use crate::options::CompilerOptions;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use solder_common::model::ProgramModel;

/// Everything a validator may look at. The graph is frozen; validators never
/// mutate it.
pub struct ValidationContext<'a> {
    pub graph: &'a BindingGraph,
    pub model: &'a dyn ProgramModel,
    pub db: &'a DeclarationDatabase,
    pub options: &'a CompilerOptions,
}

/// The narrow surface validators report through. Every message is prefixed
/// with the reporting validator's name.
pub struct DiagnosticReporter<'a> {
    graph: &'a BindingGraph,
    plugin: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DiagnosticReporter<'a> {
    fn new(graph: &'a BindingGraph, plugin: &'static str) -> Self {
        DiagnosticReporter {
            graph,
            plugin,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, kind: DiagnosticKind, message: String, element: Option<String>) {
        let mut diagnostic = Diagnostic {
            kind,
            message: format!("[{}] {}", self.plugin, message),
            element: None,
        };
        if let Some(element) = element {
            diagnostic = diagnostic.on(element);
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn report_component(&mut self, kind: DiagnosticKind, node: NodeIndex, message: String) {
        let element = self.graph.node(node).component_path().readable();
        self.push(kind, message, Some(element));
    }

    pub fn report_binding(&mut self, kind: DiagnosticKind, node: NodeIndex, message: String) {
        let element = self.graph.node(node).readable();
        self.push(kind, message, Some(element));
    }

    pub fn report_dependency(&mut self, kind: DiagnosticKind, edge: EdgeIndex, message: String) {
        let element = self
            .graph
            .edges()
            .find(|(index, _)| *index == edge)
            .and_then(|(_, edge_kind)| edge_kind.as_dependency())
            .and_then(|(request, _)| request.request_element.clone());
        self.push(kind, message, element);
    }

    pub fn report_subcomponent_factory_method(
        &mut self,
        kind: DiagnosticKind,
        edge: EdgeIndex,
        message: String,
    ) {
        let (source, _) = self.graph.endpoints(edge);
        let element = self.graph.node(source).component_path().readable();
        self.push(kind, message, Some(element));
    }
}

/// One semantic check over the frozen network.
pub trait Validator {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter);
}

/// The default pipeline, in order. Validators run independently; an error
/// from one never prevents the others, so users see all errors at once.
pub fn default_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(component_shape::ComponentShapeValidator),
        Box::new(creator_coverage::CreatorCoverageValidator),
        Box::new(entry_points::EntryPointValidator),
        Box::new(missing_bindings::MissingBindingValidator),
        Box::new(duplicate_bindings::DuplicateBindingValidator),
        Box::new(incompatible_scopes::IncompatibleScopeValidator),
        Box::new(dependency_cycles::DependencyCycleValidator),
        Box::new(nullability::NullabilityValidator),
        Box::new(framework_requests::FrameworkRequestValidator),
        Box::new(delegate_types::DelegateTypeValidator),
        Box::new(multibinding_coherence::MultibindingCoherenceValidator),
        Box::new(map_key_strategies::MapKeyStrategyValidator),
        Box::new(subcomponent_references::SubcomponentReferenceValidator),
        Box::new(members_injection::MembersInjectionValidator),
        Box::new(install_in::InstallInValidator),
    ]
}

/// Runs the pipeline and returns every diagnostic, in validator order.
pub fn run_pipeline(ctx: &ValidationContext) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for validator in default_validators() {
        let mut reporter = DiagnosticReporter::new(ctx.graph, validator.name());
        validator.validate(ctx, &mut reporter);
        diagnostics.extend(reporter.diagnostics);
    }
    diagnostics
}
