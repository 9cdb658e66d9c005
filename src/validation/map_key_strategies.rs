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
use crate::declarations::MapKeyStrategy;
use crate::diagnostics::DiagnosticKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};
use indexmap::IndexSet;

/// Class-valued and string-valued map keys normalize to the same canonical
/// string form, so they would collide silently; mixing the two strategies
/// for one effective map is rejected instead.
pub struct MapKeyStrategyValidator;

impl Validator for MapKeyStrategyValidator {
    fn name(&self) -> &'static str {
        "map key strategies"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let BindingKind::MultiboundMap { ref entries } = node.binding.kind else {
                continue;
            };
            let strategies = entries
                .iter()
                .map(|(map_key, _)| map_key.strategy())
                .collect::<IndexSet<MapKeyStrategy>>();
            if strategies.contains(&MapKeyStrategy::Str)
                && strategies.contains(&MapKeyStrategy::Class)
            {
                reporter.report_binding(
                    DiagnosticKind::Error,
                    index,
                    format!(
                        "string-valued and class-valued map keys may not be mixed for {}",
                        node.binding.key.readable()
                    ),
                );
            }
        }
    }
}
