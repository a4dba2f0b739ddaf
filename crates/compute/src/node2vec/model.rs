use rand::Rng;
use rand_distr::StandardNormal;

const EPS: f64 = 1e-15;

/// One row of `dim` weights per vertex, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    dim: usize,
    weights: Vec<f64>,
}

impl Embedding {
    /// Weights drawn from N(0, 1).
    pub fn random<R: Rng>(num_nodes: usize, dim: usize, rng: &mut R) -> Self {
        let weights = (0..num_nodes * dim)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        Self { dim, weights }
    }

    #[cfg(test)]
    fn from_rows(rows: &[Vec<f64>]) -> Self {
        let dim = rows.first().map_or(0, Vec::len);
        Self {
            dim,
            weights: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn row(&self, vertex: usize) -> &[f64] {
        &self.weights[vertex * self.dim..(vertex + 1) * self.dim]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.dim == 0 {
            return Vec::new();
        }
        self.weights.chunks(self.dim).map(<[f64]>::to_vec).collect()
    }

    fn score(&self, a: usize, b: usize) -> f64 {
        self.row(a).iter().zip(self.row(b)).map(|(x, y)| x * y).sum()
    }

    /// Skip-gram loss over context windows, accumulating its gradient into `grad`.
    ///
    /// The first vertex of each window is paired with every other one. For
    /// positive windows the loss is `-mean(log(σ(s) + ε))`, for negative
    /// windows `-mean(log(1 - σ(s) + ε))`, the mean running over all pairs.
    pub fn window_loss(&self, windows: &[&[usize]], positive: bool, grad: &mut [f64]) -> f64 {
        let pairs: usize = windows.iter().map(|w| w.len().saturating_sub(1)).sum();
        if pairs == 0 {
            return 0.0;
        }
        let scale = 1.0 / pairs as f64;
        let dim = self.dim;

        let mut loss = 0.0;
        for window in windows {
            let start = window[0];
            for &context in &window[1..] {
                let sigma = sigmoid(self.score(start, context));
                let d_sigma = if positive {
                    loss -= (sigma + EPS).ln();
                    -sigma * (1.0 - sigma) / (sigma + EPS)
                } else {
                    loss -= (1.0 - sigma + EPS).ln();
                    sigma * (1.0 - sigma) / (1.0 - sigma + EPS)
                };
                let d_score = d_sigma * scale;

                for k in 0..dim {
                    let hs = self.weights[start * dim + k];
                    let hc = self.weights[context * dim + k];
                    grad[start * dim + k] += d_score * hc;
                    grad[context * dim + k] += d_score * hs;
                }
            }
        }
        loss * scale
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_embedding_has_requested_shape() {
        let emb = Embedding::random(5, 3, &mut StdRng::seed_from_u64(1));
        let rows = emb.to_rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn zero_embedding_loss_is_log_two() {
        let emb = Embedding::from_rows(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        let mut grad = vec![0.0; 4];
        let window: &[usize] = &[0, 1];

        let pos = emb.window_loss(&[window], true, &mut grad);
        let neg = emb.window_loss(&[window], false, &mut grad);
        assert!((pos - 2f64.ln()).abs() < 1e-12);
        assert!((neg - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let emb = Embedding::from_rows(&[vec![0.3, -0.2], vec![0.1, 0.5], vec![-0.4, 0.2]]);
        let windows: Vec<&[usize]> = vec![&[0, 1, 2], &[1, 2, 0]];

        for positive in [true, false] {
            let mut grad = vec![0.0; 6];
            emb.window_loss(&windows, positive, &mut grad);

            let h = 1e-6;
            for i in 0..6 {
                let mut plus = emb.clone();
                plus.weights_mut()[i] += h;
                let mut minus = emb.clone();
                minus.weights_mut()[i] -= h;
                let mut scratch = vec![0.0; 6];
                let numeric = (plus.window_loss(&windows, positive, &mut scratch)
                    - minus.window_loss(&windows, positive, &mut scratch))
                    / (2.0 * h);
                assert!(
                    (numeric - grad[i]).abs() < 1e-6,
                    "weight {}: analytic {} numeric {}",
                    i,
                    grad[i],
                    numeric
                );
            }
        }
    }
}
