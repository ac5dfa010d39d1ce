use crate::arch::Model;

/// Updates a model's parameters from its accumulated gradient.
pub trait Optimizer {
    /// Makes one update of `params` following the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient of the loss with respect to `params`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]);

    /// Applies one update to the model using the gradient it accumulated.
    fn step<M: Model>(&mut self, model: &mut M) {
        let (params, grad) = model.params_and_grad();
        self.update_params(params, grad);
    }

    /// Clears the model's accumulated gradient, should be called after every `step`.
    fn zero_grad<M: Model>(&self, model: &mut M) {
        model.zero_grad();
    }
}
