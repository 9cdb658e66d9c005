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

/// A delegate must forward to an assignable type: the parameter type of a
/// binds method must be assignable to its return type.
pub struct DelegateTypeValidator;

impl Validator for DelegateTypeValidator {
    fn name(&self) -> &'static str {
        "delegate types"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let BindingKind::Delegate {
                ref delegate_request,
            } = node.binding.kind
            else {
                continue;
            };
            let parameter = &delegate_request.key.type_;
            let bound = &node.binding.key.type_;
            if !ctx.model.is_assignable(parameter, bound) {
                reporter.report_binding(
                    DiagnosticKind::Error,
                    index,
                    format!(
                        "{} is not assignable to the bound type {}",
                        parameter.readable(),
                        bound.readable()
                    ),
                );
            }
        }
    }
}
