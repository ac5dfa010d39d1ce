use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer, `a = act_fn(x · w + b)`.
///
/// The layer does not own its parameters, it views the slice it is given as a row-major
/// `(in, out)` weight matrix followed by `out` biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Option<Array2<f32>>,
    z: Array2<f32>,
    a: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of input and output features.
    /// * `act_fn` - The activation applied to the output, `None` for a linear layer.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: None,
            z: Array2::zeros((0, dim.1)),
            a: Array2::zeros((0, dim.1)),
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the amount of input and output features.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Makes a forward pass keeping what's needed to backpropagate afterwards.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `x` - The input, one sample per row.
    ///
    /// # Returns
    /// A view of this layer's output.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<ArrayView2<'_, f32>> {
        self.check_input(x.view())?;
        let (w, b) = self.view_params(params)?;
        let shape = (x.nrows(), self.dim.1);

        if self.z.dim() != shape {
            self.z = Array2::zeros(shape);
        }

        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut self.z);
        self.z += &b;

        self.x = Some(x.to_owned());

        let Some(ref act_fn) = self.act_fn else {
            return Ok(self.z.view());
        };

        if self.a.dim() != shape {
            self.a = Array2::zeros(shape);
        }

        self.a.zip_mut_with(&self.z, |a, &z| *a = act_fn.f(z));
        Ok(self.a.view())
    }

    /// Makes a forward pass without touching the layer's state.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `x` - The input, one sample per row.
    ///
    /// # Returns
    /// This layer's output.
    pub fn infer(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;
        let (w, b) = self.view_params(params)?;

        let mut y = x.dot(&w) + &b;

        if let Some(act_fn) = &self.act_fn {
            y.mapv_inplace(|z| act_fn.f(z));
        }

        Ok(y)
    }

    /// Adds this layer's gradient for the last forward pass into `grad` and turns `d` into
    /// the derivative of the loss with respect to this layer's weighted sum.
    ///
    /// # Arguments
    /// * `grad` - This layer's slice of the gradient buffer.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    pub fn accumulate_grad(&self, grad: &mut [f32], d: &mut Array2<f32>) -> Result<()> {
        let x = self.x.as_ref().ok_or(MlErr::MissingForwardPass)?;

        if d.dim() != self.z.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dense output delta rows",
                got: d.nrows(),
                expected: self.z.nrows(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &*d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        Ok(())
    }

    /// Propagates the delta returned by `accumulate_grad` to the previous layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `d` - The derivative of the loss with respect to this layer's weighted sum.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn propagate(&self, params: &[f32], d: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn check_input(&self, x: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense input features",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense gradient", grad.len())?;

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw)?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense parameters", params.len())?;

        let w_size = self.size - self.dim.1;
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size])?;
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..])?;
        Ok((weights, biases))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // w = [[1, 2], [3, 4], [5, 6]], b = [0.5, -1]
    const PARAMS: [f32; 8] = [1., 2., 3., 4., 5., 6., 0.5, -1.];

    #[test]
    fn forward_computes_affine_map() {
        let mut dense = Dense::new((3, 2), None);
        let x = array![[1., 0., -1.], [0., 1., 0.]];

        let y = dense.forward(&PARAMS, x.view()).unwrap();

        assert_eq!(y, array![[-3.5, -5.], [3.5, 3.]]);
    }

    #[test]
    fn infer_matches_forward() {
        let mut dense = Dense::new((3, 2), Some(ActFn::relu()));
        let x = array![[1., 0., -1.], [0., 1., 0.], [0.2, -0.3, 0.7]];

        let inferred = dense.infer(&PARAMS, x.view()).unwrap();
        let forwarded = dense.forward(&PARAMS, x.view()).unwrap();

        assert_eq!(inferred, forwarded);
        assert_eq!(inferred.row(0), array![0., 0.]);
    }

    #[test]
    fn wrong_input_width_fails() {
        let mut dense = Dense::new((3, 2), None);
        let x = Array2::zeros((4, 2));

        assert!(matches!(
            dense.forward(&PARAMS, x.view()),
            Err(MlErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn backward_before_forward_fails() {
        let dense = Dense::new((3, 2), None);
        let mut grad = [0.; 8];
        let mut d = Array2::zeros((1, 2));

        assert!(matches!(
            dense.accumulate_grad(&mut grad, &mut d),
            Err(MlErr::MissingForwardPass)
        ));
    }

    #[test]
    fn gradient_accumulates_across_calls() {
        let mut dense = Dense::new((3, 2), None);
        let x = array![[1., 2., 3.]];
        dense.forward(&PARAMS, x.view()).unwrap();

        let mut grad = [0.; 8];
        dense.accumulate_grad(&mut grad, &mut array![[1., 1.]]).unwrap();
        dense.accumulate_grad(&mut grad, &mut array![[1., 1.]]).unwrap();

        assert_eq!(grad, [2., 2., 4., 4., 6., 6., 2., 2.]);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let dense = Dense::new((3, 2), Some(ActFn::sigmoid(1.)));
        let x = array![[0.3, -0.2, 0.1], [-0.5, 0.4, 0.9]];

        // loss = sum(a), so d = ones
        let loss = |params: &[f32]| dense.infer(params, x.view()).unwrap().sum();

        let mut grad = [0.; 8];
        let mut d = Array2::ones((2, 2));
        let mut trained = dense.clone();
        trained.forward(&PARAMS, x.view()).unwrap();
        trained.accumulate_grad(&mut grad, &mut d).unwrap();

        let h = 1e-2;
        for i in 0..PARAMS.len() {
            let mut plus = PARAMS;
            let mut minus = PARAMS;
            plus[i] += h;
            minus[i] -= h;

            let numeric = (loss(&plus) - loss(&minus)) / (2. * h);
            assert!(
                (numeric - grad[i]).abs() < 1e-2,
                "param {i}: numeric {numeric} vs analytic {}",
                grad[i]
            );
        }
    }

    #[test]
    fn propagate_multiplies_by_transposed_weights() {
        let dense = Dense::new((3, 2), None);
        let d = array![[1., -1.]];

        let prev = dense.propagate(&PARAMS, d.view()).unwrap();

        assert_eq!(prev, array![[-1., -1., -1.]]);
    }
}
