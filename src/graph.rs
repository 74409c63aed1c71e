//! Initialization graph module.
//!
//! Provides the `InitGraph` type, which records which lazy proxy forced
//! which other proxy during construction. The graph answers two questions
//! at startup: in what order were features built, and which construction
//! path closed a cycle.

use crate::error::FrameworkError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared handle to an `InitGraph`, passed to every tracked proxy.
pub type InitTracker = Rc<RefCell<InitGraph>>;

/// Construction dependencies between lazy proxies.
///
/// An edge `dependency -> dependent` is recorded when the factory of
/// `dependent` forces `dependency`. The graph also keeps the stack of
/// constructions currently in progress, used to report the path when a
/// proxy is re-entered.
///
/// # Examples
///
/// ```rust
/// use zzidle::graph::InitGraph;
///
/// let mut graph = InitGraph::new();
/// graph.enter("coal");
/// graph.enter("trees");
/// graph.exit();
/// graph.exit();
///
/// // trees was built inside coal's construction, so it comes first
/// assert_eq!(graph.construction_order().unwrap(), vec!["trees", "coal"]);
/// ```
#[derive(Debug, Default)]
pub struct InitGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    stack: Vec<String>,
}

impl InitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared tracker.
    pub fn tracker() -> InitTracker {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Add a node if it doesn't exist and return its index.
    pub fn add_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.node_map.insert(label.to_string(), idx);
        idx
    }

    /// Record that `dependent` forced `dependency` during construction.
    pub fn add_edge(&mut self, dependent: &str, dependency: &str) {
        let from = self.add_node(dependency);
        let to = self.add_node(dependent);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Mark the start of a construction.
    ///
    /// If another construction is in progress, it depends on this one.
    pub fn enter(&mut self, label: &str) {
        self.add_node(label);
        if let Some(parent) = self.stack.last().cloned() {
            self.add_edge(&parent, label);
        }
        self.stack.push(label.to_string());
    }

    /// Mark the end of the innermost construction.
    pub fn exit(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// Constructions currently in progress, outermost first.
    pub fn in_progress(&self) -> &[String] {
        &self.stack
    }

    /// The path that closes a cycle when `label` is re-entered.
    ///
    /// Starts at the outstanding construction of `label` and ends with
    /// `label` again. Falls back to `[label, label]` when `label` is not
    /// on the stack.
    pub fn reentry_path(&self, label: &str) -> Vec<String> {
        match self.stack.iter().position(|l| l == label) {
            Some(start) => {
                let mut path = self.stack[start..].to_vec();
                path.push(label.to_string());
                path
            }
            None => vec![label.to_string(), label.to_string()],
        }
    }

    /// Check the recorded edges for cycles.
    ///
    /// # Errors
    ///
    /// `CircularInitialization` with the cycle path, first node repeated
    /// at the end.
    pub fn detect_cycles(&self) -> Result<(), FrameworkError> {
        let mut visited = HashSet::new();
        let mut on_path = Vec::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            if let Some(path) = self.find_cycle(start, &mut visited, &mut on_path) {
                return Err(FrameworkError::CircularInitialization { path });
            }
        }
        Ok(())
    }

    fn find_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        on_path.push(node);

        for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(pos) = on_path.iter().position(|&n| n == next) {
                let mut path: Vec<String> = on_path[pos..]
                    .iter()
                    .map(|&idx| self.graph[idx].clone())
                    .collect();
                path.push(self.graph[next].clone());
                return Some(path);
            }
            if !visited.contains(&next) {
                if let Some(path) = self.find_cycle(next, visited, on_path) {
                    return Some(path);
                }
            }
        }

        on_path.pop();
        None
    }

    /// Labels in an order where every dependency precedes its dependents.
    pub fn construction_order(&self) -> Result<Vec<String>, FrameworkError> {
        self.detect_cycles()?;

        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| FrameworkError::CircularInitialization {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    /// Direct construction dependencies of `label`.
    pub fn dependencies_of(&self, label: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(label) else {
            return Vec::new();
        };
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        deps.sort();
        deps
    }

    pub fn contains(&self, label: &str) -> bool {
        self.node_map.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
