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
use crate::declarations::db_key;
use crate::diagnostics::DiagnosticKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// A module restricted with `install_in` may only be installed into the
/// components it names. Waived by the disable_install_in_check option.
pub struct InstallInValidator;

impl Validator for InstallInValidator {
    fn name(&self) -> &'static str {
        "install in"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        if ctx.options.disable_install_in_check {
            return;
        }
        for (index, node) in ctx.graph.component_nodes() {
            let Some(descriptor) = ctx.graph.descriptor(&node.component_path) else {
                continue;
            };
            if descriptor.kind == ComponentKind::ModuleComponent {
                continue;
            }
            for module in &descriptor.modules {
                let Some(declaration) = ctx.db.module(module) else {
                    continue;
                };
                if declaration.install_in.is_empty() {
                    continue;
                }
                let allowed = declaration
                    .install_in
                    .iter()
                    .any(|allowed| db_key(allowed) == db_key(&descriptor.type_data));
                if !allowed {
                    reporter.report_component(
                        DiagnosticKind::Error,
                        index,
                        format!(
                            "{} is restricted to other components and cannot be installed in {}",
                            module.readable(),
                            descriptor.type_data.readable()
                        ),
                    );
                }
            }
        }
    }
}
