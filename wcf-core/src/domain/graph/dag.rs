// wcf-core/src/domain/graph/dag.rs

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::domain::error::DomainError;
use crate::domain::runbook::Runbook;

/// The artifact dependency graph: edges point from an artifact to each of its
/// declared inputs' predecessors. Built once by the planner and never mutated.
#[derive(Debug, Clone)]
pub struct Dag {
    /// `predecessors[id]` — the artifacts `id` directly depends on, in the order
    /// declared by `inputs` (fan-in ordering depends on this).
    predecessors: HashMap<String, Vec<String>>,
    /// `successors[id]` — the artifacts that directly depend on `id`.
    successors: HashMap<String, Vec<String>>,
}

impl Dag {
    /// Builds the graph from a flattened runbook's artifacts. Errors if any
    /// artifact names a nonexistent input.
    pub fn build(runbook: &Runbook) -> Result<Self, DomainError> {
        let mut predecessors: HashMap<String, Vec<String>> = HashMap::new();
        let mut successors: HashMap<String, Vec<String>> = HashMap::new();

        for id in runbook.artifacts.keys() {
            predecessors.entry(id.clone()).or_default();
            successors.entry(id.clone()).or_default();
        }

        for (id, artifact) in &runbook.artifacts {
            for input_id in artifact.input_ids() {
                if !runbook.artifacts.contains_key(input_id) {
                    return Err(DomainError::RunbookValidationError(format!(
                        "artifact '{id}' names nonexistent input '{input_id}'"
                    )));
                }
                predecessors.get_mut(id).unwrap().push(input_id.to_string());
                successors.get_mut(input_id).unwrap().push(id.clone());
            }
        }

        Ok(Self { predecessors, successors })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.predecessors.keys().map(String::as_str)
    }

    pub fn predecessors(&self, id: &str) -> &[String] {
        self.predecessors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn successors(&self, id: &str) -> &[String] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topological layering via Kahn's algorithm: level-0 is every node with no
    /// predecessors, level-*k* is every node whose predecessors are all in an
    /// earlier level. Within a layer, ids are sorted lexicographically so the
    /// result is deterministic regardless of `HashMap` iteration order.
    pub fn layers(&self) -> Result<Vec<Vec<String>>, DomainError> {
        let mut in_degree: HashMap<&str, usize> = self
            .predecessors
            .iter()
            .map(|(id, preds)| (id.as_str(), preds.len()))
            .collect();

        let mut ready: BTreeSet<String> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| id.to_string())
            .collect();

        let mut layers = Vec::new();
        let mut resolved = 0usize;
        let mut queue: VecDeque<String> = ready.iter().cloned().collect();
        ready.clear();

        while !queue.is_empty() {
            let mut layer: Vec<String> = queue.drain(..).collect();
            layer.sort();
            resolved += layer.len();

            let mut next: BTreeSet<String> = BTreeSet::new();
            for id in &layer {
                for succ in self.successors(id) {
                    let degree = in_degree.get_mut(succ.as_str()).expect("successor must be a known node");
                    *degree -= 1;
                    if *degree == 0 {
                        next.insert(succ.clone());
                    }
                }
            }
            layers.push(layer);
            queue.extend(next);
        }

        let total = self.predecessors.len();
        if resolved != total {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, &deg)| deg > 0)
                .map(|(id, _)| *id)
                .collect();
            let mut stuck = stuck;
            stuck.sort();
            return Err(DomainError::CircularDependencyError(format!(
                "cycle detected among artifacts: {}",
                stuck.join(", ")
            )));
        }

        Ok(layers)
    }
}
