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

use crate::graph::{BindingGraph, EdgeKind};
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// One shortest dependency trace from an entry point to a node.
#[derive(Debug, Clone)]
pub struct Trace {
    /// Printable form of the chosen entry point.
    pub entry_point: String,
    /// Names of the nodes along the path, entry point target first.
    pub steps: Vec<String>,
    /// Other entry points that also depend on the node, in comparator order.
    pub other_entry_points: Vec<String>,
}

impl Trace {
    /// Renders the requested-by chain.
    pub fn requested_by_chain(&self) -> String {
        let mut lines = Vec::new();
        for step in self.steps.iter().rev().skip(1) {
            lines.push(format!("requested by: {}", step));
        }
        lines.push(format!("requested by: {}", self.entry_point));
        lines.join("\n")
    }
}

struct BfsResult {
    /// node -> (distance, predecessor node)
    table: HashMap<NodeIndex, (usize, Option<NodeIndex>)>,
}

/// Cached shortest-path computation over the dependency edges of a graph.
///
/// The cache is keyed by entry point, so repeated diagnostics on one graph
/// do not recompute reachability.
pub struct TraceTable<'g> {
    graph: &'g BindingGraph,
    cache: RefCell<HashMap<NodeIndex, std::rc::Rc<BfsResult>>>,
}

impl<'g> TraceTable<'g> {
    pub fn new(graph: &'g BindingGraph) -> Self {
        TraceTable {
            graph,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The shortest trace from any entry point to the target, chosen by
    /// (1) entry points in components closest to the root, (2) shortest
    /// path, (3) entry point declaration order. None if no entry point
    /// reaches the target.
    pub fn trace_to(&self, target: NodeIndex) -> Option<Trace> {
        let mut candidates = Vec::new();
        for (order, edge) in self.graph.entry_point_edges(None).into_iter().enumerate() {
            let (source, entry_target) = self.graph.endpoints(edge);
            let depth = self.graph.node(source).component_path().components().len();
            let bfs = self.bfs_from(entry_target);
            if let Some((distance, _)) = bfs.table.get(&target) {
                candidates.push((depth, *distance, order, edge, entry_target));
            }
        }
        candidates.sort_by_key(|(depth, distance, order, _, _)| (*depth, *distance, *order));
        let (_, _, _, chosen_edge, entry_target) = *candidates.first()?;

        let bfs = self.bfs_from(entry_target);
        let mut steps = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            steps.push(self.graph.node(node).readable());
            cursor = bfs.table.get(&node).and_then(|(_, pred)| *pred);
        }
        steps.reverse();

        let other_entry_points = candidates
            .iter()
            .skip(1)
            .map(|(_, _, _, edge, _)| self.entry_point_name(*edge))
            .collect();
        Some(Trace {
            entry_point: self.entry_point_name(chosen_edge),
            steps,
            other_entry_points,
        })
    }

    fn entry_point_name(&self, edge: EdgeIndex) -> String {
        let (source, _) = self.graph.endpoints(edge);
        let request = self
            .graph
            .edges()
            .find(|(index, _)| *index == edge)
            .and_then(|(_, kind)| kind.as_dependency())
            .map(|(request, _)| request.clone());
        match request.and_then(|r| r.request_element) {
            Some(element) => element,
            None => self.graph.node(source).readable(),
        }
    }

    fn bfs_from(&self, start: NodeIndex) -> std::rc::Rc<BfsResult> {
        if let Some(result) = self.cache.borrow().get(&start) {
            return result.clone();
        }
        let mut table = HashMap::new();
        table.insert(start, (0usize, None));
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            let (distance, _) = table[&node];
            let mut successors = self
                .graph
                .network()
                .edges_directed(node, Direction::Outgoing)
                .filter(|edge| matches!(edge.weight(), EdgeKind::Dependency { .. }))
                .map(|edge| edge.target())
                .collect::<Vec<NodeIndex>>();
            // Parallel edges make successor order unstable; normalize.
            successors.sort_by_key(|n| n.index());
            for successor in successors {
                if let std::collections::hash_map::Entry::Vacant(entry) =
                    table.entry(successor)
                {
                    entry.insert((distance + 1, Some(node)));
                    queue.push_back(successor);
                }
            }
        }
        let result = std::rc::Rc::new(BfsResult { table });
        self.cache.borrow_mut().insert(start, result.clone());
        result
    }
}

/// Brackets a message with the component path when the node is not at the
/// root component.
pub fn with_component_context(graph: &BindingGraph, node: NodeIndex, message: String) -> String {
    let path = graph.node(node).component_path();
    if path.at_root() {
        message
    } else {
        format!("{} [in {}]", message, path.readable())
    }
}

/// The full diagnostic body for a node: the message, the requested-by chain
/// of the shortest trace, and the other affected entry points.
pub fn message_with_trace(graph: &BindingGraph, node: NodeIndex, message: String) -> String {
    let table = TraceTable::new(graph);
    let mut body = with_component_context(graph, node, message);
    if let Some(trace) = table.trace_to(node) {
        body.push('\n');
        body.push_str(&trace.requested_by_chain());
        if !trace.other_entry_points.is_empty() {
            body.push_str(&format!(
                "\nalso requested by: {}",
                trace.other_entry_points.join(", ")
            ));
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_by_chain_reads_bottom_up() {
        let trace = Trace {
            entry_point: "::test::MyComponent.value".to_owned(),
            steps: vec![
                "::test::Foo (injectable)".to_owned(),
                "::test::Bar (injectable)".to_owned(),
            ],
            other_entry_points: Vec::new(),
        };
        assert_eq!(
            trace.requested_by_chain(),
            "requested by: ::test::Foo (injectable)\nrequested by: ::test::MyComponent.value"
        );
    }
}
