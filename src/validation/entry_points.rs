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

use crate::declarations::{COMPONENT_BUILDER, COMPONENT_FACTORY, PRODUCTION_SUBCOMPONENT, SUBCOMPONENT};
use crate::diagnostics::DiagnosticKind;
use crate::validation::{DiagnosticReporter, ValidationContext, Validator};

/// Well-formedness of the methods on each component surface: no type
/// variables, zero-arg provisions returning a type, one-arg members
/// injection returning nothing or the parameter type.
pub struct EntryPointValidator;

impl Validator for EntryPointValidator {
    fn name(&self) -> &'static str {
        "entry points"
    }

    fn validate(&self, ctx: &ValidationContext, reporter: &mut DiagnosticReporter) {
        for (index, node) in ctx.graph.component_nodes() {
            if ctx
                .graph
                .descriptor(&node.component_path)
                .map(|d| d.kind == crate::component::ComponentKind::ModuleComponent)
                .unwrap_or(false)
            {
                continue;
            }
            let Ok(element) = ctx.model.type_element(node.component_path.current()) else {
                continue;
            };
            for method in &element.methods {
                if !method.is_abstract {
                    continue;
                }
                let printable = format!("{}.{}", element.type_data.readable(), method.name);
                if !method.type_variables.is_empty() {
                    reporter.report_component(
                        DiagnosticKind::Error,
                        index,
                        format!("{} must not declare type variables", printable),
                    );
                    continue;
                }
                // Factory methods for subcomponents and creator requests are
                // validated by the subcomponent checks.
                if let Some(ref return_type) = method.return_type {
                    if let Ok(return_element) = ctx.model.type_element(return_type) {
                        if return_element.has_annotation(SUBCOMPONENT)
                            || return_element.has_annotation(PRODUCTION_SUBCOMPONENT)
                            || return_element.has_annotation(COMPONENT_BUILDER)
                            || return_element.has_annotation(COMPONENT_FACTORY)
                        {
                            continue;
                        }
                    }
                }
                match method.parameters.len() {
                    0 => {
                        if method.return_type.is_none() {
                            reporter.report_component(
                                DiagnosticKind::Error,
                                index,
                                format!("{} must return the provided type", printable),
                            );
                        }
                    }
                    1 => {
                        let parameter_type = &method.parameters[0].type_data;
                        let valid = match method.return_type {
                            None => true,
                            Some(ref return_type) => {
                                ctx.model.is_same(return_type, parameter_type)
                            }
                        };
                        if !valid {
                            reporter.report_component(
                                DiagnosticKind::Error,
                                index,
                                format!(
                                    "{} must return nothing or its parameter type to inject members",
                                    printable
                                ),
                            );
                        }
                    }
                    _ => {
                        reporter.report_component(
                            DiagnosticKind::Error,
                            index,
                            format!("{} must take at most one parameter", printable),
                        );
                    }
                }
            }
        }
    }
}
