use serde::{Deserialize, Serialize};
use weave_core::{EdgeBundle, WeaveError};

/// Parallel source/destination index sequences over `[0, num_nodes)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeList {
    pub src: Vec<usize>,
    pub dst: Vec<usize>,
}

impl EdgeList {
    pub fn new(src: Vec<usize>, dst: Vec<usize>) -> Result<Self, WeaveError> {
        if src.len() != dst.len() {
            return Err(WeaveError::LengthMismatch(format!(
                "edge list has {} sources but {} destinations",
                src.len(),
                dst.len()
            )));
        }
        Ok(Self { src, dst })
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Check that every endpoint lies in `[0, num_nodes)`.
    pub fn validate(&self, num_nodes: usize) -> Result<(), WeaveError> {
        for (index, (s, d)) in self.iter().enumerate() {
            for vertex in [s, d] {
                if vertex >= num_nodes {
                    return Err(WeaveError::InvalidEdge {
                        index,
                        vertex,
                        num_nodes,
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of edges leaving each vertex.
    pub fn out_degrees(&self, num_nodes: usize) -> Vec<usize> {
        let mut degree = vec![0usize; num_nodes];
        for &s in &self.src {
            if let Some(d) = degree.get_mut(s) {
                *d += 1;
            }
        }
        degree
    }

    /// Vertices with out-degree 0, ascending.
    pub fn dead_ends(&self, num_nodes: usize) -> Vec<usize> {
        self.out_degrees(num_nodes)
            .into_iter()
            .enumerate()
            .filter(|&(_, degree)| degree == 0)
            .map(|(vertex, _)| vertex)
            .collect()
    }

    /// Append a self-loop for every vertex with no outgoing edge.
    ///
    /// Random-walk sampling needs at least one outgoing edge per vertex.
    /// Existing edges keep their positions; returns the number of loops added.
    pub fn patch_dead_ends(&mut self, num_nodes: usize) -> usize {
        let dead_ends = self.dead_ends(num_nodes);
        self.src.extend_from_slice(&dead_ends);
        self.dst.extend_from_slice(&dead_ends);
        dead_ends.len()
    }
}

impl From<&EdgeBundle> for EdgeList {
    fn from(bundle: &EdgeBundle) -> Self {
        Self {
            src: bundle.src.clone(),
            dst: bundle.dst.clone(),
        }
    }
}
