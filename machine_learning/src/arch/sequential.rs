use std::{cell::RefCell, rc::Rc};

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Model, layers::Layer};
use crate::{
    MlErr, Result,
    initialization::{ChainedParamGen, ParamGen, RandParamGen},
};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The parameters of every layer live back to back in a single buffer, in layer order.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl Sequential {
    /// Creates a new `Sequential` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = layers.iter().map(Layer::size).sum();

        Self {
            layers,
            params: vec![0.; size],
            grad: vec![0.; size],
        }
    }

    /// Creates a new `Sequential` drawing its parameters from `param_gen`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `param_gen` - The generator of the initial parameters.
    ///
    /// # Returns
    /// An error if the generator runs out before filling every parameter.
    pub fn init<I, G>(layers: I, param_gen: &mut G) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
        G: ParamGen + ?Sized,
    {
        let mut model = Self::new(layers);
        let size = model.size();
        let params = param_gen.sample(size).unwrap_or_default();

        if params.len() != size {
            return Err(MlErr::SizeMismatch {
                what: "initial parameters",
                got: params.len(),
                expected: size,
            });
        }

        model.params = params;
        Ok(model)
    }

    /// Creates a new `Sequential` where every layer's parameters are drawn from
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `rng` - The random number generator shared by every layer.
    pub fn random<I, R>(layers: I, rng: Rc<RefCell<R>>) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
        R: Rng + 'static,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let param_gens = layers
            .iter()
            .map(|layer| {
                let param_gen =
                    RandParamGen::fan_in_uniform(rng.clone(), layer.size(), layer.fan_in())?;
                Ok(Box::new(param_gen) as Box<dyn ParamGen>)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::init(layers, &mut ChainedParamGen::new(param_gens))
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.params.len()
    }

    fn forward<'a>(&'a mut self, mut x: ArrayView2<'a, f32>) -> Result<ArrayView2<'a, f32>> {
        let Self { layers, params, .. } = self;
        let mut rest = &params[..];

        for layer in layers.iter_mut() {
            let (head, tail) = rest.split_at(layer.size());
            rest = tail;
            x = layer.forward(head, x)?;
        }

        Ok(x)
    }

    fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut rest = &self.params[..];
        let mut y = x.to_owned();

        for layer in &self.layers {
            let (head, tail) = rest.split_at(layer.size());
            rest = tail;
            y = layer.infer(head, y.view())?;
        }

        Ok(y)
    }

    fn backward(&mut self, mut d: Array2<f32>) -> Result<()> {
        let mut end = self.params.len();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let start = end - layer.size();
            layer.accumulate_grad(&mut self.grad[start..end], &mut d)?;

            if i > 0 {
                d = layer.propagate(&self.params[start..end], d.view())?;
            }

            end = start;
        }

        Ok(())
    }

    fn parameters(&self) -> &[f32] {
        &self.params
    }

    fn grad(&self) -> &[f32] {
        &self.grad
    }

    fn params_and_grad(&mut self) -> (&mut [f32], &[f32]) {
        (&mut self.params, &self.grad)
    }

    fn zero_grad(&mut self) {
        self.grad.fill(0.);
    }
}
