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

use crate::component::ComponentKind;
use crate::diagnostics::DiagnosticKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// Component declarations themselves: abstract, at most one creator, no
/// reusable scope, cancellation policy only on production components.
pub struct ComponentShapeValidator;

impl Validator for ComponentShapeValidator {
    fn name(&self) -> &'static str {
        "component shape"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.component_nodes() {
            let Some(descriptor) = ctx.graph.descriptor(&node.component_path) else {
                continue;
            };
            if descriptor.kind == ComponentKind::ModuleComponent {
                continue;
            }
            if !descriptor.is_abstract {
                reporter.report_component(
                    DiagnosticKind::Error,
                    index,
                    "components must be abstract".to_owned(),
                );
            }
            if descriptor.creators.len() > 1 {
                reporter.report_component(
                    DiagnosticKind::Error,
                    index,
                    format!(
                        "components may declare at most one builder or factory, found: {}",
                        descriptor
                            .creators
                            .iter()
                            .map(|c| c.type_data.readable())
                            .collect::<Vec<String>>()
                            .join(", ")
                    ),
                );
            }
            if descriptor.scopes.iter().any(|scope| scope.is_reusable()) {
                reporter.report_component(
                    DiagnosticKind::Error,
                    index,
                    "components cannot declare the reusable scope".to_owned(),
                );
            }
            if descriptor.cancellation_policy.is_some() && !descriptor.kind.is_production() {
                reporter.report_component(
                    DiagnosticKind::Error,
                    index,
                    "cancellation policies are only allowed on production components".to_owned(),
                );
            }
        }
    }
}
