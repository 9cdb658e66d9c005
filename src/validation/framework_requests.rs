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
use crate::framework::{framework_type, BindingStyle};
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// Producer machinery can only be requested from production bindings; the
/// framework-type tables have no mapping otherwise.
pub struct FrameworkRequestValidator;

impl Validator for FrameworkRequestValidator {
    fn name(&self) -> &'static str {
        "framework requests"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let style = BindingStyle::of(&node.binding);
            for dependency in &node.binding.dependencies {
                if let Err(message) = framework_type(style, dependency.kind) {
                    reporter.report_binding(DiagnosticKind::Error, index, message);
                }
            }
        }
        // Entry points on non-production components are provision requests.
        for (index, node) in ctx.graph.component_nodes() {
            let Some(descriptor) = ctx.graph.descriptor(&node.component_path) else {
                continue;
            };
            if descriptor.kind.is_production() {
                continue;
            }
            for entry_point in &node.entry_points {
                if let Err(message) =
                    framework_type(BindingStyle::Provision, entry_point.request.kind)
                {
                    reporter.report_component(
                        DiagnosticKind::Error,
                        index,
                        format!("{}: {}", entry_point.method_name, message),
                    );
                }
            }
        }
    }
}
