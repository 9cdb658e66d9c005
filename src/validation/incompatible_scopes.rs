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
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// A binding scoped `S` may only be owned by a component declaring `S`.
/// The reusable scope is valid in any component.
pub struct IncompatibleScopeValidator;

impl Validator for IncompatibleScopeValidator {
    fn name(&self) -> &'static str {
        "incompatible scopes"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let Some(ref scope) = node.binding.scope else {
                continue;
            };
            if scope.is_reusable() {
                continue;
            }
            let declared = ctx
                .graph
                .descriptor(&node.component_path)
                .map(|descriptor| descriptor.scopes.contains(scope))
                .unwrap_or(false);
            if !declared {
                reporter.report_binding(
                    DiagnosticKind::Error,
                    index,
                    format!(
                        "binding with scope {} cannot be reached from component {} which does not declare that scope",
                        scope.readable(),
                        node.component_path.current().readable()
                    ),
                );
            }
        }
    }
}
