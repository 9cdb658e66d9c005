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

/// Members injection targets must expose accessible, non-private, non-static
/// injection sites.
pub struct MembersInjectionValidator;

impl Validator for MembersInjectionValidator {
    fn name(&self) -> &'static str {
        "members injection"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.binding_nodes() {
            let BindingKind::MembersInjector {
                ref injection_sites,
            } = node.binding.kind
            else {
                continue;
            };
            for site in injection_sites {
                if site.is_private {
                    reporter.report_binding(
                        DiagnosticKind::Error,
                        index,
                        format!("injection site {} must not be private", site.name),
                    );
                }
                if site.is_static {
                    reporter.report_binding(
                        DiagnosticKind::Error,
                        index,
                        format!("injection site {} must not be static", site.name),
                    );
                }
            }
        }
    }
}
