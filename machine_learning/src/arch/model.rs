use ndarray::{Array2, ArrayView2};

use crate::error::Result;

/// A trainable model that owns its parameters and their gradient.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Makes a forward pass, keeping the intermediate values needed by `backward`.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The model's output (the logits, for a classifier).
    fn forward<'a>(&'a mut self, x: ArrayView2<'a, f32>) -> Result<ArrayView2<'a, f32>>;

    /// Makes a forward pass without recording anything for backpropagation.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Backpropagates `d` through the last forward pass, **adding** the result into the
    /// model's gradient.
    ///
    /// # Arguments
    /// * `d` - The derivative of the loss with respect to the model's output.
    fn backward(&mut self, d: Array2<f32>) -> Result<()>;

    /// Returns the model's parameters.
    fn parameters(&self) -> &[f32];

    /// Returns the gradient accumulated since the last `zero_grad`.
    fn grad(&self) -> &[f32];

    /// Returns the parameters for writing alongside the accumulated gradient.
    fn params_and_grad(&mut self) -> (&mut [f32], &[f32]);

    /// Resets the accumulated gradient.
    fn zero_grad(&mut self);
}
