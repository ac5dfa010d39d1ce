use super::Optimizer;

/// Gradient descent optimization algorithm.
#[derive(Clone, Copy, Debug)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) {
        let lr = self.learning_rate;

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::{Model, Sequential, layers::Layer};

    #[test]
    fn steps_against_the_gradient() {
        let mut optimizer = GradientDescent::new(0.5);
        let mut params = [1., -1., 0.];

        optimizer.update_params(&mut params, &[2., -4., 0.]);

        assert_eq!(params, [0., 1., 0.]);
    }

    #[test]
    fn step_then_zero_grad_on_model() {
        let mut model = Sequential::new([Layer::dense((1, 1), None)]);
        let mut optimizer = GradientDescent::new(0.1);

        // y = w * x + b with w = b = 0, d = 1 gives dw = x = 2, db = 1
        model.forward(array![[2.]].view()).unwrap();
        model.backward(array![[1.]]).unwrap();
        optimizer.step(&mut model);
        optimizer.zero_grad(&mut model);

        assert_eq!(model.parameters(), [-0.2, -0.1]);
        assert_eq!(model.grad(), [0., 0.]);
    }
}
