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

use serde::{Deserialize, Serialize};

/// Severity of a reported diagnostic. `Error` prevents emission.
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy, PartialOrd, Ord)]
pub enum DiagnosticKind {
    Note,
    Warning,
    Error,
}

/// One user-visible message produced while compiling.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Printable form of the offending element, when one exists.
    pub element: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Error,
            message,
            element: None,
        }
    }

    pub fn warning(message: String) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Warning,
            message,
            element: None,
        }
    }

    pub fn note(message: String) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Note,
            message,
            element: None,
        }
    }

    pub fn on(mut self, element: String) -> Self {
        self.element = Some(element);
        self
    }

    /// The rendered message: `[element] message` when an element is attached.
    pub fn rendered(&self) -> String {
        match self.element {
            Some(ref element) => format!("[{}] {}", element, self.message),
            None => self.message.clone(),
        }
    }
}

/// Merges all error/warning/note diagnostics attributed to one root component
/// into a single diagnostic whose severity is the maximum of the
/// contributors. Enabled by the aggregated-diagnostics option.
pub fn aggregate(root: &str, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    if diagnostics.len() <= 1 {
        return diagnostics;
    }
    let kind = diagnostics
        .iter()
        .map(|d| d.kind)
        .max()
        .expect("no diagnostics to aggregate");
    let message = diagnostics
        .iter()
        .map(|d| d.rendered())
        .collect::<Vec<String>>()
        .join("\n\n");
    vec![Diagnostic {
        kind,
        message: format!("errors while compiling {}:\n{}", root, message),
        element: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_takes_max_severity() {
        let merged = aggregate(
            "::test::MyComponent",
            vec![
                Diagnostic::note("a cycle was broken".to_owned()),
                Diagnostic::error("missing bindings".to_owned()),
            ],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, DiagnosticKind::Error);
        assert!(merged[0].message.contains("missing bindings"));
        assert!(merged[0].message.contains("a cycle was broken"));
    }

    #[test]
    fn rendered_includes_element() {
        let d = Diagnostic::error("bad binding".to_owned()).on("::test::MyModule.provide".to_owned());
        assert_eq!(d.rendered(), "[::test::MyModule.provide] bad binding");
    }
}
