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

/// Builder setters and factory parameters must cover every module that
/// cannot be constructed automatically, and every setter must supply
/// something the component actually uses.
pub struct CreatorCoverageValidator;

impl Validator for CreatorCoverageValidator {
    fn name(&self) -> &'static str {
        "creator coverage"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.component_nodes() {
            let Some(descriptor) = ctx.graph.descriptor(&node.component_path) else {
                continue;
            };
            if descriptor.kind == ComponentKind::ModuleComponent {
                continue;
            }

            // A module with fields has no automatic construction; an
            // instance must come in through the creator.
            for module in &descriptor.modules {
                let Some(declaration) = ctx.db.module(module) else {
                    continue;
                };
                if !declaration.requires_construction {
                    continue;
                }
                let covered = descriptor.creators.iter().any(|creator| {
                    creator
                        .module_setters
                        .iter()
                        .any(|(_, supplied)| db_key(supplied) == db_key(module))
                });
                if !covered {
                    reporter.report_component(
                        DiagnosticKind::Error,
                        index,
                        format!(
                            "{} cannot be constructed automatically and must be supplied through the component builder",
                            module.readable()
                        ),
                    );
                }
            }

            for creator in &descriptor.creators {
                for (setter, type_) in &creator.unknown_setters {
                    reporter.report_component(
                        DiagnosticKind::Error,
                        index,
                        format!(
                            "{}.{} neither binds an instance nor supplies an installed module ({})",
                            creator.type_data.readable(),
                            setter,
                            type_.readable()
                        ),
                    );
                }
                for (setter, supplied) in &creator.module_setters {
                    let installed = descriptor
                        .modules
                        .iter()
                        .any(|module| db_key(module) == db_key(supplied));
                    if !installed {
                        reporter.report_component(
                            DiagnosticKind::Error,
                            index,
                            format!(
                                "{}.{} supplies {} which is not installed in {}",
                                creator.type_data.readable(),
                                setter,
                                supplied.readable(),
                                descriptor.type_data.readable()
                            ),
                        );
                    }
                }
            }
        }
    }
}
