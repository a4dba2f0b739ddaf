//! Second-order biased random walks over a compressed adjacency.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use weave_graph::EdgeList;

use crate::error::Node2VecError;

/// Samples node2vec walks.
///
/// With `p == q == 1` the walk is uniform over out-neighbours. Otherwise each
/// step draws once from the out-neighbours weighted by the previous vertex:
/// going back is `1/p`, staying within its neighbourhood `1`, moving away `1/q`.
#[derive(Debug, Clone)]
pub struct RandomWalker {
    row_ptr: Vec<usize>,
    col: Vec<usize>,
    uniform: bool,
    // Step weights scaled by min(p, 1, q) so none of them overflows.
    return_weight: f64,
    stay_weight: f64,
    away_weight: f64,
}

impl RandomWalker {
    /// Build the sampler. Every endpoint must lie in `[0, num_nodes)`.
    pub fn new(num_nodes: usize, edges: &EdgeList, p: f64, q: f64) -> Result<Self, Node2VecError> {
        edges.validate(num_nodes)?;

        let mut row_ptr = vec![0usize; num_nodes + 1];
        for &s in &edges.src {
            row_ptr[s + 1] += 1;
        }
        for i in 0..num_nodes {
            row_ptr[i + 1] += row_ptr[i];
        }

        let mut next = row_ptr.clone();
        let mut col = vec![0usize; edges.len()];
        for (s, d) in edges.iter() {
            col[next[s]] = d;
            next[s] += 1;
        }
        // Sorted rows make the neighbourhood test a binary search.
        for v in 0..num_nodes {
            col[row_ptr[v]..row_ptr[v + 1]].sort_unstable();
        }

        let scale = p.min(1.0).min(q);
        Ok(Self {
            row_ptr,
            col,
            uniform: p == 1.0 && q == 1.0,
            return_weight: scale / p,
            stay_weight: scale,
            away_weight: scale / q,
        })
    }

    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.col[self.row_ptr[vertex]..self.row_ptr[vertex + 1]]
    }

    fn is_neighbor(&self, from: usize, to: usize) -> bool {
        self.neighbors(from).binary_search(&to).is_ok()
    }

    fn uniform_step<R: Rng>(&self, vertex: usize, rng: &mut R) -> Result<usize, Node2VecError> {
        let neighbors = self.neighbors(vertex);
        if neighbors.is_empty() {
            return Err(Node2VecError::DeadEnd { vertex });
        }
        Ok(neighbors[rng.gen_range(0..neighbors.len())])
    }

    fn biased_step<R: Rng>(
        &self,
        prev: usize,
        current: usize,
        rng: &mut R,
    ) -> Result<usize, Node2VecError> {
        let neighbors = self.neighbors(current);
        if neighbors.is_empty() {
            return Err(Node2VecError::DeadEnd { vertex: current });
        }
        let weights = neighbors.iter().map(|&candidate| {
            if candidate == prev {
                self.return_weight
            } else if self.is_neighbor(prev, candidate) {
                self.stay_weight
            } else {
                self.away_weight
            }
        });
        match WeightedIndex::new(weights) {
            Ok(dist) => Ok(neighbors[dist.sample(rng)]),
            // Every weight underflowed to zero.
            Err(_) => Ok(neighbors[rng.gen_range(0..neighbors.len())]),
        }
    }

    /// A walk of `length` steps from `start`; the result has `length + 1` vertices.
    pub fn walk<R: Rng>(
        &self,
        start: usize,
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, Node2VecError> {
        let mut walk = Vec::with_capacity(length + 1);
        walk.push(start);
        if length == 0 {
            return Ok(walk);
        }

        let mut prev = start;
        let mut current = self.uniform_step(start, rng)?;
        walk.push(current);

        for _ in 1..length {
            let next = if self.uniform {
                self.uniform_step(current, rng)?
            } else {
                self.biased_step(prev, current, rng)?
            };
            prev = current;
            current = next;
            walk.push(current);
        }
        Ok(walk)
    }

    /// One walk per entry of `starts`, sampled in parallel.
    ///
    /// Each walk gets its own generator seeded from `rng`, so the result
    /// depends only on the state of `rng`.
    pub fn sample<R: Rng>(
        &self,
        starts: &[usize],
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<usize>>, Node2VecError> {
        let seeds: Vec<u64> = starts.iter().map(|_| rng.gen()).collect();
        starts
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(&start, &seed)| {
                let mut walk_rng = StdRng::seed_from_u64(seed);
                self.walk(start, length, &mut walk_rng)
            })
            .collect()
    }
}

/// Negative "walks": the start vertex followed by `length` uniformly random vertices.
pub fn negative_walks<R: Rng>(
    starts: &[usize],
    length: usize,
    num_nodes: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    starts
        .iter()
        .map(|&start| {
            let mut walk = Vec::with_capacity(length + 1);
            walk.push(start);
            walk.extend((0..length).map(|_| rng.gen_range(0..num_nodes)));
            walk
        })
        .collect()
}

/// Every run of `context_size` consecutive vertices in each walk.
pub fn windows(walks: &[Vec<usize>], context_size: usize) -> Vec<&[usize]> {
    walks
        .iter()
        .flat_map(|walk| walk.windows(context_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(n: usize) -> EdgeList {
        EdgeList::new((0..n).collect(), (0..n).map(|i| (i + 1) % n).collect()).unwrap()
    }

    #[test]
    fn walks_follow_edges() {
        let mut edges = EdgeList::new(vec![0, 0, 1, 2, 3], vec![1, 2, 3, 3, 0]).unwrap();
        edges.patch_dead_ends(5);
        let walker = RandomWalker::new(5, &edges, 0.5, 2.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for start in 0..5 {
            let walk = walker.walk(start, 20, &mut rng).unwrap();
            assert_eq!(walk.len(), 21);
            assert_eq!(walk[0], start);
            for step in walk.windows(2) {
                assert!(
                    walker.neighbors(step[0]).contains(&step[1]),
                    "{} -> {} is not an edge",
                    step[0],
                    step[1]
                );
            }
        }
    }

    #[test]
    fn cycle_walk_is_deterministic() {
        let walker = RandomWalker::new(4, &cycle(4), 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(walker.walk(2, 5, &mut rng).unwrap(), vec![2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn extreme_biases_finish_and_follow_them() {
        let two_cycle = EdgeList::new(vec![0, 1], vec![1, 0]).unwrap();
        let walker = RandomWalker::new(2, &two_cycle, 1e9, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(walker.walk(0, 5, &mut rng).unwrap(), vec![0, 1, 0, 1, 0, 1]);

        // Vertex 1 can go back to 0 or on to 2; a tiny p makes it go back.
        let path = EdgeList::new(vec![0, 1, 1, 2], vec![1, 0, 2, 1]).unwrap();
        let walker = RandomWalker::new(3, &path, 1e-9, 1e9).unwrap();
        let walk = walker.walk(0, 20, &mut rng).unwrap();
        assert!(walk.iter().enumerate().all(|(i, &v)| v == i % 2), "{:?}", walk);

        // Weights that underflow fall back to a uniform step.
        let walker = RandomWalker::new(3, &path, f64::MAX, f64::MIN_POSITIVE).unwrap();
        assert_eq!(walker.walk(1, 10, &mut rng).unwrap().len(), 11);
    }

    #[test]
    fn dead_end_is_reported() {
        let edges = EdgeList::new(vec![0], vec![1]).unwrap();
        let walker = RandomWalker::new(2, &edges, 1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let err = walker.walk(0, 3, &mut rng).unwrap_err();
        assert!(matches!(err, Node2VecError::DeadEnd { vertex: 1 }));
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let edges = EdgeList::new(vec![0], vec![4]).unwrap();
        assert!(matches!(
            RandomWalker::new(2, &edges, 1.0, 1.0),
            Err(Node2VecError::Core(_))
        ));
    }

    #[test]
    fn parallel_sampling_is_reproducible() {
        let mut edges = EdgeList::new(vec![0, 0, 1, 2, 2], vec![1, 2, 2, 0, 1]).unwrap();
        edges.patch_dead_ends(3);
        let walker = RandomWalker::new(3, &edges, 1.0, 1.0).unwrap();
        let starts = vec![0, 1, 2, 0, 1, 2];

        let a = walker
            .sample(&starts, 8, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = walker
            .sample(&starts, 8, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), starts.len());
    }

    #[test]
    fn windows_slide_over_each_walk() {
        let walks = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let w = windows(&walks, 3);
        assert_eq!(w.len(), 4);
        assert_eq!(w[1], &[1, 2, 3]);
        assert_eq!(w[2], &[4, 5, 6]);
    }

    #[test]
    fn negative_walks_start_at_the_batch_vertex() {
        let mut rng = StdRng::seed_from_u64(3);
        let walks = negative_walks(&[5, 6], 4, 10, &mut rng);
        assert_eq!(walks.len(), 2);
        assert_eq!(walks[1][0], 6);
        assert!(walks.iter().all(|w| w.len() == 5 && w.iter().all(|&v| v < 10)));
    }
}
