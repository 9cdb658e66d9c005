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

mod common;

use common::*;
use solder::component::build_descriptors;
use solder::declarations::collect;
use solder::graph::BindingGraph;
use solder::key::Key;
use solder::resolver::resolve;

fn build_graph() -> BindingGraph {
    let model = model_of(vec![
        injectable("::test::Db", vec![]),
        injectable("::test::Repo", vec![param("db", "::test::Db")]),
        component("::test::MyComponent", &[], vec![entry("repo", "::test::Repo")]),
    ]);
    let db = collect(&model);
    let descriptors = build_descriptors(&model, &db);
    assert_eq!(descriptors.roots.len(), 1);
    let resolution = resolve(&model, &db, &descriptors.roots[0]);
    BindingGraph::build(&resolution, false)
}

#[test]
fn root_component_node_is_unique_and_at_root() {
    let graph = build_graph();
    let (_, root) = graph.root_component_node();
    assert!(root.component_path.at_root());
    assert_eq!(graph.component_nodes().count(), 1);
    assert!(!graph.is_full_binding_graph());
}

#[test]
fn dependency_edges_target_nodes_with_matching_keys() {
    let graph = build_graph();
    for (edge, request, _) in graph.dependency_edges() {
        let (_, target) = graph.endpoints(edge);
        let target_key = graph
            .node(target)
            .key()
            .expect("dependency edges never target component nodes");
        // The target's key, unwrapped per the request kind, equals the
        // request's effective key.
        assert_eq!(&target_key.unwrapped(request.kind), &request.key);
    }
}

#[test]
fn entry_point_edges_depending_on_transitive_binding() {
    let graph = build_graph();
    let db_key = Key::from_type(t("::test::Db"));
    let (db_node, _) = graph
        .binding_nodes_for_key(&db_key)
        .next()
        .expect("db binding resolved");
    let entry_points = graph.entry_point_edges_depending_on(db_node);
    assert_eq!(
        entry_points.len(),
        1,
        "the repo entry point depends on db transitively"
    );
}

#[test]
fn every_node_reachable_from_the_root() {
    let graph = build_graph();
    let (root, _) = graph.root_component_node();
    let mut seen = vec![root];
    let mut queue = vec![root];
    let edges = graph.network().edge_indices().collect::<Vec<_>>();
    while let Some(node) = queue.pop() {
        for &edge in &edges {
            let (source, target) = graph.endpoints(edge);
            if source == node && !seen.contains(&target) {
                seen.push(target);
                queue.push(target);
            }
        }
    }
    assert_eq!(seen.len(), graph.nodes().count());
}
