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

/// A non-multibinding key with more than one contributing declaration
/// reachable at one component: every source is listed.
pub struct DuplicateBindingValidator;

impl Validator for DuplicateBindingValidator {
    fn name(&self) -> &'static str {
        "duplicate bindings"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for ((_, key), resolved) in ctx.graph.all_resolved() {
            if resolved.contribution_bindings.len() <= 1 {
                continue;
            }
            let sources = resolved
                .contribution_bindings
                .iter()
                .map(|binding| format!("\t{}", binding.readable_name()))
                .collect::<Vec<String>>()
                .join("\n");
            let message = format!(
                "found duplicated bindings for {}, provided by:\n{}",
                key.readable(),
                sources
            );
            match ctx
                .graph
                .binding_nodes_for_key(key)
                .next()
                .map(|(index, _)| index)
            {
                Some(index) => reporter.report_binding(DiagnosticKind::Error, index, message),
                None => {
                    // The aggregate never made it into the network; anchor
                    // the report at the root component.
                    reporter.report_component(
                        DiagnosticKind::Error,
                        ctx.graph.root_component_node().0,
                        message,
                    );
                }
            }
        }
    }
}
