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

use crate::resolver::ComponentResolution;
use serde::{Deserialize, Serialize};
use solder_common::annotation::{AnnotationData, AnnotationValue};
use solder_common::model::ProgramModel;

/// The annotation carried by aggregator marker types.
pub const AGGREGATED_DEPS: &str = "solder::AggregatedDeps";
/// The dedicated package aggregator marker types are emitted into.
pub const AGGREGATED_PACKAGE: &str = "solder::aggregated";

/// One persisted compile-round artifact. Later rounds read these back to
/// gather transitively installed modules and entry points without
/// re-scanning source.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
pub struct AggregatorRecord {
    pub component_names: Vec<String>,
    pub module_name: Option<String>,
    pub entry_point_name: Option<String>,
    pub component_entry_point_name: Option<String>,
    pub test: Option<String>,
}

impl AggregatorRecord {
    /// Encodes the record as the marker annotation. Members are
    /// string-array valued; this is a descriptor, not a wire protocol.
    pub fn to_annotation(&self) -> AnnotationData {
        let mut annotation = AnnotationData::from_path(AGGREGATED_DEPS).with_member(
            "component_names",
            AnnotationValue::StrList(self.component_names.clone()),
        );
        if let Some(ref module) = self.module_name {
            annotation =
                annotation.with_member("module_name", AnnotationValue::Str(module.clone()));
        }
        if let Some(ref entry_point) = self.entry_point_name {
            annotation = annotation
                .with_member("entry_point_name", AnnotationValue::Str(entry_point.clone()));
        }
        if let Some(ref component_entry_point) = self.component_entry_point_name {
            annotation = annotation.with_member(
                "component_entry_point_name",
                AnnotationValue::Str(component_entry_point.clone()),
            );
        }
        if let Some(ref test) = self.test {
            annotation = annotation.with_member("test", AnnotationValue::Str(test.clone()));
        }
        annotation
    }

    pub fn from_annotation(annotation: &AnnotationData) -> AggregatorRecord {
        let member_str = |name: &str| {
            annotation
                .member(name)
                .and_then(AnnotationValue::as_str)
                .map(str::to_owned)
        };
        AggregatorRecord {
            component_names: match annotation.member("component_names") {
                Some(AnnotationValue::StrList(names)) => names.clone(),
                _ => Vec::new(),
            },
            module_name: member_str("module_name"),
            entry_point_name: member_str("entry_point_name"),
            component_entry_point_name: member_str("component_entry_point_name"),
            test: member_str("test"),
        }
    }

    /// Stable JSON form, for hosts that persist records between rounds the
    /// way manifests are persisted between crates.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("record serialization cannot fail")
    }

    pub fn from_json(json: &str) -> serde_json::Result<AggregatorRecord> {
        serde_json::from_str(json)
    }
}

/// Reads back every aggregator record present in the program model.
pub struct ComponentDependencies;

impl ComponentDependencies {
    pub fn from_model(model: &dyn ProgramModel) -> Vec<AggregatorRecord> {
        model
            .annotated_with(AGGREGATED_DEPS)
            .into_iter()
            .filter_map(|element| element.annotation(AGGREGATED_DEPS))
            .map(AggregatorRecord::from_annotation)
            .collect()
    }
}

/// The records one resolved root contributes: one per installed module and
/// one per entry point, across the whole hierarchy.
pub fn records_for(resolution: &ComponentResolution) -> Vec<AggregatorRecord> {
    let mut records = Vec::new();
    collect_records(resolution, &mut records);
    records
}

fn collect_records(resolution: &ComponentResolution, records: &mut Vec<AggregatorRecord>) {
    let component_names = resolution
        .path
        .iter()
        .map(|component| component.readable())
        .collect::<Vec<String>>();
    for module in &resolution.descriptor.modules {
        records.push(AggregatorRecord {
            component_names: component_names.clone(),
            module_name: Some(module.readable()),
            ..Default::default()
        });
    }
    for entry_point in &resolution.descriptor.entry_points {
        records.push(AggregatorRecord {
            component_names: component_names.clone(),
            entry_point_name: Some(entry_point.method_name.clone()),
            component_entry_point_name: entry_point.request.request_element.clone(),
            ..Default::default()
        });
    }
    for child in &resolution.children {
        collect_records(child, records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_roundtrip() {
        let record = AggregatorRecord {
            component_names: vec!["::test::MyComponent".to_owned()],
            module_name: Some("::test::MyModule".to_owned()),
            entry_point_name: None,
            component_entry_point_name: None,
            test: None,
        };
        let annotation = record.to_annotation();
        assert!(annotation.is(AGGREGATED_DEPS));
        assert_eq!(AggregatorRecord::from_annotation(&annotation), record);
    }

    #[test]
    fn json_roundtrip() {
        let record = AggregatorRecord {
            component_names: vec!["::test::MyComponent".to_owned()],
            entry_point_name: Some("value".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            AggregatorRecord::from_json(&record.to_json()).unwrap(),
            record
        );
    }
}
