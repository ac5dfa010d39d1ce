use ndarray::{Array2, ArrayView2};

use super::Dense;
use crate::{Result, arch::activations::ActFn};

#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
}
use Layer::*;

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
        }
    }

    /// Returns the amount of inputs each output unit sees, used to scale the initialization.
    pub fn fan_in(&self) -> usize {
        match self {
            Dense(l) => l.dim().0,
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<ArrayView2<'_, f32>> {
        match self {
            Dense(l) => l.forward(params, x),
        }
    }

    pub fn infer(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.infer(params, x),
        }
    }

    pub fn accumulate_grad(&self, grad: &mut [f32], d: &mut Array2<f32>) -> Result<()> {
        match self {
            Dense(l) => l.accumulate_grad(grad, d),
        }
    }

    pub fn propagate(&self, params: &[f32], d: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.propagate(params, d),
        }
    }
}
