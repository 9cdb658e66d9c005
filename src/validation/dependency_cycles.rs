/*
Copyright 2021 Google LLC

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

use crate::diagnostics::DiagnosticKind;
use crate::graph::{BindingGraph, EdgeKind};
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use petgraph::stable_graph::NodeIndex;
use solder_common::key::RequestKind;
use std::collections::HashMap;

/// A cycle composed entirely of instance-kinded edges is fatal. A cycle
/// containing a provider/lazy/producer edge is broken there by a lazy
/// indirection at emission time; it is only worth a note, and only when the
/// cycle-warning option is on.
pub struct DependencyCycleValidator;

impl Validator for DependencyCycleValidator {
    fn name(&self) -> &'static str {
        "dependency cycles"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        let instance_cycles = nontrivial_sccs(ctx.graph, true);
        for scc in &instance_cycles {
            let message = format!(
                "Cyclic dependency detected:\n{}",
                render_cycle(ctx.graph, scc)
            );
            reporter.report_binding(DiagnosticKind::Error, scc[0], message);
        }

        if !ctx.options.warn_if_injection_factory_generation_fails {
            return;
        }
        for scc in nontrivial_sccs(ctx.graph, false) {
            // Skip cycles already reported as fatal.
            if instance_cycles
                .iter()
                .any(|fatal| fatal.iter().all(|node| scc.contains(node)))
            {
                continue;
            }
            let message = format!(
                "dependency cycle broken by a framework-typed edge:\n{}",
                render_cycle(ctx.graph, &scc)
            );
            reporter.report_binding(DiagnosticKind::Note, scc[0], message);
        }
    }
}

/// Strongly connected components with more than one node (or a self edge),
/// over dependency edges only. With `instance_only`, edges requesting
/// anything but a direct instance are left out.
fn nontrivial_sccs(graph: &BindingGraph, instance_only: bool) -> Vec<Vec<NodeIndex>> {
    let mut mapping = HashMap::new();
    let mut projected = DiGraph::<NodeIndex, ()>::new();
    for (index, _) in graph.nodes() {
        let projected_index = projected.add_node(index);
        mapping.insert(index, projected_index);
    }
    for (edge, kind) in graph.edges() {
        let EdgeKind::Dependency { request, .. } = kind else {
            continue;
        };
        if instance_only && request.kind != RequestKind::Instance {
            continue;
        }
        let (source, target) = graph.endpoints(edge);
        projected.add_edge(mapping[&source], mapping[&target], ());
    }
    tarjan_scc(&projected)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || projected
                    .neighbors(scc[0])
                    .any(|neighbor| neighbor == scc[0])
        })
        .map(|scc| {
            let mut nodes = scc
                .into_iter()
                .map(|projected_index| projected[projected_index])
                .collect::<Vec<NodeIndex>>();
            nodes.sort_by_key(|n| n.index());
            nodes
        })
        .collect()
}

fn render_cycle(graph: &BindingGraph, scc: &[NodeIndex]) -> String {
    let mut s = String::new();
    for (position, node) in scc.iter().enumerate() {
        if position == 0 {
            s.push_str(&format!("*-- {}\n", graph.node(*node).readable()));
        } else {
            s.push_str(&format!("|   {}\n", graph.node(*node).readable()));
        }
    }
    if let Some(first) = scc.first() {
        s.push_str(&format!("*-> {}\n", graph.node(*first).readable()));
    }
    s
}
