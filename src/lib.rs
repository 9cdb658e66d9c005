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

//! Build-time dependency injection graph compiler.
//!
//! Given a program model of annotated declarations, the compiler resolves a
//! binding graph per component, validates it, and plans code emission:
//!
//! ```text
//! (program model, options) -> (diagnostics, emission plan)
//! ```
//!
//! The host supplies the program model and persists the emission plan;
//! the compiler itself never reads source text or writes files.

#[macro_use]
mod log;

pub mod binding;
pub mod component;
pub mod declarations;
pub mod diagnostics;
pub mod error;
pub mod framework;
pub mod graph;
pub mod options;
pub mod planner;
pub mod records;
pub mod render;
pub mod resolver;
pub mod trace;
pub mod validation;

pub use solder_common::annotation;
pub use solder_common::key;
pub use solder_common::manifest;
pub use solder_common::model;
pub use solder_common::scope;
pub use solder_common::type_data;

use crate::component::ComponentDescriptor;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::BindingGraph;
use crate::options::CompilerOptions;
use crate::planner::EmissionPlan;
use crate::resolver::ComponentResolution;
use crate::validation::ValidationContext;
use indexmap::IndexSet;
use solder_common::model::ProgramModel;

/// The result of one compilation round.
#[derive(Debug)]
pub struct CompileOutput {
    /// Every diagnostic, in pipeline order. One error anywhere suppresses
    /// the plan.
    pub diagnostics: Vec<Diagnostic>,
    pub plan: Option<EmissionPlan>,
    /// Elements that referenced types absent from this round; the host
    /// re-submits them once the types exist.
    pub deferred: Vec<String>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Error)
            .collect()
    }
}

/// Compiles one round: collects declarations, resolves every root
/// component, validates the graphs, and plans emission.
///
/// Pure: two calls on the same model and options produce identical output.
pub fn compile(model: &dyn ProgramModel, options: &CompilerOptions) -> CompileOutput {
    let db = declarations::collect(model);
    let mut diagnostics = db.diagnostics.clone();
    let mut deferred = db.deferred.clone();

    let descriptors = component::build_descriptors(model, &db);
    diagnostics.extend(descriptors.diagnostics.iter().cloned());
    deferred.extend(descriptors.deferred.iter().cloned());

    let mut plan = EmissionPlan::default();
    for root in &descriptors.roots {
        let resolution = resolver::resolve(model, &db, root);
        collect_deferred(&resolution, &mut deferred);
        let graph = BindingGraph::build(&resolution, false);
        let ctx = ValidationContext {
            graph: &graph,
            model,
            db: &db,
            options,
        };
        let mut root_diagnostics = validation::run_pipeline(&ctx);
        if options.experimental_error_messages {
            root_diagnostics = aggregate_errors(&root.type_data.readable(), root_diagnostics);
        }
        diagnostics.extend(root_diagnostics);

        let root_plan = planner::plan(&graph, &db, options);
        merge_plan(&mut plan, root_plan);
        plan.records.extend(records::records_for(&resolution));
    }

    if options.full_binding_graph_validation {
        validate_uninstalled_modules(model, &db, options, &descriptors.roots, &mut diagnostics);
    }

    let has_errors = diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Error);
    CompileOutput {
        diagnostics,
        plan: if has_errors { None } else { Some(plan) },
        deferred,
    }
}

fn collect_deferred(resolution: &ComponentResolution, deferred: &mut Vec<String>) {
    deferred.extend(resolution.deferred.iter().cloned());
    for child in &resolution.children {
        collect_deferred(child, deferred);
    }
}

fn merge_plan(into: &mut EmissionPlan, from: EmissionPlan) {
    into.generated_types.extend(from.generated_types);
    into.planned_bindings.extend(from.planned_bindings);
    into.records.extend(from.records);
}

/// Merges the error-kind diagnostics of one root into a single message;
/// warnings and notes stay separate.
fn aggregate_errors(root: &str, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let (errors, mut rest): (Vec<Diagnostic>, Vec<Diagnostic>) = diagnostics
        .into_iter()
        .partition(|d| d.kind == DiagnosticKind::Error);
    if errors.is_empty() {
        return rest;
    }
    let mut merged = diagnostics::aggregate(root, errors);
    merged.append(&mut rest);
    merged
}

/// Validates module-level graphs for modules never installed into a root
/// component. Reachability from a real root does not apply to these.
fn validate_uninstalled_modules(
    model: &dyn ProgramModel,
    db: &declarations::DeclarationDatabase,
    options: &CompilerOptions,
    roots: &[ComponentDescriptor],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut installed = IndexSet::new();
    for root in roots {
        collect_installed(root, &mut installed);
    }
    let uninstalled = db
        .modules
        .values()
        .filter(|module| !installed.contains(&declarations::db_key(&module.type_data)))
        .map(|module| module.type_data.clone())
        .collect::<Vec<_>>();
    for module in uninstalled {
        let descriptor = component::module_component(db, &module);
        let resolution = resolver::resolve(model, db, &descriptor);
        let graph = BindingGraph::build(&resolution, true);
        let ctx = ValidationContext {
            graph: &graph,
            model,
            db,
            options,
        };
        diagnostics.extend(validation::run_pipeline(&ctx));
    }
}

fn collect_installed(descriptor: &ComponentDescriptor, installed: &mut IndexSet<String>) {
    for module in &descriptor.modules {
        installed.insert(declarations::db_key(module));
    }
    for child in &descriptor.children {
        collect_installed(child, installed);
    }
}
