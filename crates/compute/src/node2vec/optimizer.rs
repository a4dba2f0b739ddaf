use weave_core::WeaveError;

use crate::error::Node2VecError;

/// Dense Adam over the flattened embedding table.
///
/// Bias correction is folded into the step size, so the moment buffers hold
/// the raw running averages.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    // beta1^t and beta2^t for the current step t.
    beta1_pow: f64,
    beta2_pow: f64,
    first_moment: Box<[f64]>,
    second_moment: Box<[f64]>,
    epsilon: f64,
}

impl Adam {
    /// Optimizer state for a table of `len` weights.
    pub fn new(len: usize, learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_pow: 1.0,
            beta2_pow: 1.0,
            first_moment: vec![0.0; len].into_boxed_slice(),
            second_moment: vec![0.0; len].into_boxed_slice(),
            epsilon,
        }
    }

    /// `beta1 = 0.9`, `beta2 = 0.999`, `epsilon = 1e-8`.
    pub fn with_defaults(len: usize, learning_rate: f64) -> Self {
        Self::new(len, learning_rate, 0.9, 0.999, 1e-8)
    }

    /// Apply one step of `grad` to `params`.
    pub fn update_params(&mut self, grad: &[f64], params: &mut [f64]) -> Result<(), Node2VecError> {
        let len = self.first_moment.len();
        if grad.len() != params.len() || params.len() != len {
            return Err(WeaveError::LengthMismatch(format!(
                "optimizer holds {} weights, got {} gradients for {} weights",
                len,
                grad.len(),
                params.len()
            ))
            .into());
        }

        self.beta1_pow *= self.beta1;
        self.beta2_pow *= self.beta2;
        let step_size =
            self.learning_rate * (1.0 - self.beta2_pow).sqrt() / (1.0 - self.beta1_pow);

        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        for (i, (w, &g)) in params.iter_mut().zip(grad).enumerate() {
            let m = &mut self.first_moment[i];
            let v = &mut self.second_moment[i];
            *m = b1 * *m + (1.0 - b1) * g;
            *v = b2 * *v + (1.0 - b2) * g * g;
            *w -= step_size * *m / (v.sqrt() + eps);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut adam = Adam::with_defaults(2, 0.01);
        let mut params = vec![1.0, -1.0];
        adam.update_params(&[0.5, -3.0], &mut params).unwrap();

        assert!((params[0] - 0.99).abs() < 1e-6);
        assert!((params[1] + 0.99).abs() < 1e-6);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adam = Adam::with_defaults(1, 0.1);
        let mut params = vec![5.0];
        for _ in 0..500 {
            let grad = [2.0 * params[0]];
            adam.update_params(&grad, &mut params).unwrap();
        }
        assert!(params[0].abs() < 0.1, "ended at {}", params[0]);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let mut adam = Adam::with_defaults(2, 0.01);
        let mut params = vec![0.0; 2];
        assert!(adam.update_params(&[1.0], &mut params).is_err());
    }
}
