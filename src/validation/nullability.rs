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
use crate::graph::NodeKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// A non-nullable request must not land on a nullable binding.
pub struct NullabilityValidator;

impl Validator for NullabilityValidator {
    fn name(&self) -> &'static str {
        "nullability"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (edge, request, _) in ctx.graph.dependency_edges() {
            if request.is_nullable {
                continue;
            }
            let (_, target) = ctx.graph.endpoints(edge);
            if let NodeKind::Binding(node) = ctx.graph.node(target) {
                if node.binding.is_nullable {
                    reporter.report_dependency(
                        DiagnosticKind::Error,
                        edge,
                        format!(
                            "{} is nullable but the request does not accept null",
                            node.binding.readable_name()
                        ),
                    );
                }
            }
        }
    }
}
