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

use crate::binding::BindingKind;
use crate::diagnostics::DiagnosticKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};
use indexmap::IndexMap;

/// Map multibindings must have unique keys, and multibinds declarations must
/// not collide with unique bindings for the same key.
pub struct MultibindingCoherenceValidator;

impl Validator for MultibindingCoherenceValidator {
    fn name(&self) -> &'static str {
        "multibindings"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let BindingKind::MultiboundMap { ref entries } = node.binding.kind else {
                continue;
            };
            let mut by_key = IndexMap::<String, Vec<String>>::new();
            for (map_key, contribution_key) in entries {
                let source = ctx
                    .graph
                    .binding_nodes_for_key(contribution_key)
                    .next()
                    .map(|(_, contribution)| contribution.binding.readable_name())
                    .unwrap_or_else(|| contribution_key.readable());
                by_key
                    .entry(map_key.normalized())
                    .or_default()
                    .push(source);
            }
            for (map_key, sources) in by_key {
                if sources.len() > 1 {
                    reporter.report_binding(
                        DiagnosticKind::Error,
                        index,
                        format!(
                            "found duplicated key {} for {}, provided by:\n{}",
                            map_key,
                            node.binding.key.readable(),
                            sources
                                .iter()
                                .map(|s| format!("\t{}", s))
                                .collect::<Vec<String>>()
                                .join("\n")
                        ),
                    );
                }
            }
        }
    }
}
