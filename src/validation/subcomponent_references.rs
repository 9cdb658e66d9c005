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
use crate::graph::EdgeKind;
use crate::options::FloorType;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Each subcomponent must be reachable through exactly one factory method or
/// creator; two paths to the same child are ambiguous.
pub struct SubcomponentReferenceValidator;

impl Validator for SubcomponentReferenceValidator {
    fn name(&self) -> &'static str {
        "subcomponent references"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.component_nodes() {
            if node.component_path.at_root() {
                continue;
            }
            let references = ctx
                .graph
                .network()
                .edges_directed(index, Direction::Incoming)
                .filter(|edge| {
                    matches!(
                        edge.weight(),
                        EdgeKind::ChildFactoryMethod { .. }
                            | EdgeKind::SubcomponentCreatorBinding { .. }
                    )
                })
                .count();
            if references > 1 {
                reporter.report_component(
                    DiagnosticKind::Error,
                    index,
                    format!(
                        "{} is reachable through more than one factory method or creator",
                        node.component_path.current().readable()
                    ),
                );
            } else if references == 0 && ctx.options.floor_type == FloorType::Strict {
                // Advisory only; lenient mode waives it.
                reporter.report_component(
                    DiagnosticKind::Warning,
                    index,
                    format!(
                        "{} is declared as a subcomponent but nothing creates it",
                        node.component_path.current().readable()
                    ),
                );
            }
        }
    }
}
