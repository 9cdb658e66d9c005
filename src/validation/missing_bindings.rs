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
use crate::trace;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// Any missing binding reachable from an entry point is an error, reported
/// with the shortest dependency trace from that entry point.
pub struct MissingBindingValidator;

impl Validator for MissingBindingValidator {
    fn name(&self) -> &'static str {
        "missing bindings"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        let nodes = ctx
            .graph
            .missing_bindings()
            .map(|(index, node)| (index, node.key.clone()))
            .collect::<Vec<_>>();
        for (index, key) in nodes {
            let message = trace::message_with_trace(
                ctx.graph,
                index,
                format!("missing bindings for {}", key.readable()),
            );
            reporter.report_binding(DiagnosticKind::Error, index, message);
        }
    }
}
