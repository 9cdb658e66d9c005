/*
Copyright 2020 Google LLC

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

use crate::diagnostics::Diagnostic;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FloorType {
    Strict,
    Lenient,
}

/// Recognized compiler options. Unknown keys are reported with a warning and
/// otherwise ignored; recognized ones override these defaults.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Merge all errors on a root component into one aggregated message.
    pub experimental_error_messages: bool,
    /// Bias generated code for startup cost over invocation cost.
    pub fast_init: bool,
    /// Waive the "module must be installed" check.
    pub disable_install_in_check: bool,
    /// Emit a note when a cycle is broken at a framework-typed edge.
    pub warn_if_injection_factory_generation_fails: bool,
    /// Also validate module-level graphs for modules without root components.
    pub full_binding_graph_validation: bool,
    pub floor_type: FloorType,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            experimental_error_messages: false,
            fast_init: false,
            disable_install_in_check: false,
            warn_if_injection_factory_generation_fails: false,
            full_binding_graph_validation: false,
            floor_type: FloorType::Strict,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses host-supplied key/value pairs.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> (CompilerOptions, Vec<Diagnostic>) {
        let mut options = CompilerOptions::new();
        let mut diagnostics = Vec::new();
        for (key, value) in pairs {
            let enabled = value.eq_ignore_ascii_case("true") || value.is_empty();
            match key {
                "experimental_error_messages" => options.experimental_error_messages = enabled,
                "fast_init" => options.fast_init = enabled,
                "disable_install_in_check" => options.disable_install_in_check = enabled,
                "warn_if_injection_factory_generation_fails" => {
                    options.warn_if_injection_factory_generation_fails = enabled
                }
                "full_binding_graph_validation" => options.full_binding_graph_validation = enabled,
                "floor_type" => {
                    options.floor_type = match value {
                        "strict" => FloorType::Strict,
                        "lenient" => FloorType::Lenient,
                        _ => {
                            diagnostics.push(Diagnostic::warning(format!(
                                "unrecognized floor_type '{}', expected 'strict' or 'lenient'",
                                value
                            )));
                            options.floor_type
                        }
                    }
                }
                _ => diagnostics.push(Diagnostic::warning(format!(
                    "unrecognized compiler option '{}'",
                    key
                ))),
            }
        }
        (options, diagnostics)
    }
}
