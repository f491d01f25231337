// qaspec-core/src/domain/graph/dag.rs

use crate::domain::error::DomainError;
use std::collections::{BTreeMap, VecDeque};

pub struct GraphSolver;

impl GraphSolver {
    /// Layered topological sort (Kahn) over `node -> dependencies`.
    /// Layer N only depends on layers 0..N-1. Dependencies that are not
    /// themselves nodes are ignored; they are reported by reference
    /// resolution, not here.
    pub fn plan_layers(
        dependencies: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<Vec<String>>, DomainError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        // 1. Initialization: all known nodes
        for node in dependencies.keys() {
            in_degree.insert(node.as_str(), 0);
            dependents.insert(node.as_str(), Vec::new());
        }

        // 2. Graph construction (dependency inversion)
        for (node, deps) in dependencies {
            for dep in deps {
                if let Some(list) = dependents.get_mut(dep.as_str()) {
                    list.push(node.as_str());
                    *in_degree.entry(node.as_str()).or_insert(0) += 1;
                }
            }
        }

        // 3. Kahn's algorithm (layered)
        let mut layers: Vec<Vec<String>> = Vec::new();
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut total_resolved = 0;

        while !queue.is_empty() {
            let mut current_layer = Vec::new();
            let layer_size = queue.len();

            for _ in 0..layer_size {
                if let Some(current) = queue.pop_front() {
                    current_layer.push(current.to_string());
                    total_resolved += 1;

                    if let Some(neighbors) = dependents.get(current) {
                        for neighbor in neighbors {
                            if let Some(degree) = in_degree.get_mut(neighbor) {
                                *degree -= 1;
                                if *degree == 0 {
                                    queue.push_back(neighbor);
                                }
                            }
                        }
                    }
                }
            }
            layers.push(current_layer);
        }

        // 4. Cycle detection: whatever kept a non-zero degree is on (or behind) a cycle
        if total_resolved != dependencies.len() {
            let blocked: Vec<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(name, _)| *name)
                .collect();
            return Err(DomainError::CyclicReference(format!(
                "unresolvable references between {}",
                blocked.join(", ")
            )));
        }

        Ok(layers)
    }
}
