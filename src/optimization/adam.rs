use super::Optimizer;

/// Adam with bias-corrected first and second moment estimates.
///
/// Moment buffers are sized once for a fixed parameter count and persist
/// across steps, so one instance belongs to one training run.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    epsilon: f32,
    mean: Box<[f32]>,
    var: Box<[f32]>,
}

impl Adam {
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.0,
            beta2_t: 1.0,
            epsilon,
            mean: vec![0.0; len].into_boxed_slice(),
            var: vec![0.0; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) {
        debug_assert_eq!(params.len(), grad.len());
        debug_assert_eq!(params.len(), self.mean.len());

        // Running decay products carry the bias corrections across steps.
        self.beta1_t *= self.beta1;
        self.beta2_t *= self.beta2;
        let correction1 = 1.0 - self.beta1_t;
        let correction2 = 1.0 - self.beta2_t;
        let step_size = self.learning_rate * correction2.sqrt() / correction1;

        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        for i in 0..params.len() {
            let g = grad[i];
            let mean = &mut self.mean[i];
            let var = &mut self.var[i];
            *mean = b1 * *mean + (1.0 - b1) * g;
            *var = b2 * *var + (1.0 - b2) * g * g;
            params[i] -= step_size * *mean / (var.sqrt() + eps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_the_learning_rate_against_the_gradient() {
        let mut adam = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [0.0, 0.0];

        adam.update_params(&mut params, &[1.0, -2.0]);

        // Bias correction makes the first step learning-rate sized.
        assert!((params[0] + 0.1).abs() < 1e-4);
        assert!((params[1] - 0.1).abs() < 1e-4);
    }

    #[test]
    fn repeated_steps_keep_descending() {
        let mut adam = Adam::new(1, 0.01, 0.9, 0.999, 1e-8);
        let mut params = [1.0];

        let mut previous = params[0];
        for _ in 0..5 {
            adam.update_params(&mut params, &[3.0]);
            assert!(params[0] < previous);
            previous = params[0];
        }
    }

    #[test]
    fn constant_gradient_steps_stay_learning_rate_sized() {
        // With a constant gradient both bias-corrected moments cancel to
        // the gradient itself, so every step moves by the learning rate.
        let mut adam = Adam::new(1, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [0.0];

        let mut previous = params[0];
        for _ in 0..50 {
            adam.update_params(&mut params, &[1.0]);
            let delta = previous - params[0];
            assert!((delta - 0.1).abs() < 1e-4, "{delta}");
            previous = params[0];
        }
    }
}
