use std::num::NonZeroUsize;

use log::debug;
use ndarray::{ArrayView1, ArrayView2, Zip};

use super::Metrics;
use crate::{
    MlErr, Result,
    arch::{Model, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    model: M,
    optimizer: O,
    loss_fn: L,
    batch_size: NonZeroUsize,
}

impl<M, O, L> ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The algorithm that updates the model's parameters.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `batch_size` - The amount of samples per batch, both when training and evaluating.
    pub fn new(model: M, optimizer: O, loss_fn: L, batch_size: NonZeroUsize) -> Self {
        Self {
            model,
            optimizer,
            loss_fn,
            batch_size,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Runs `epochs` epochs, each one a training pass over `train` followed by an evaluation
    /// pass over `test`.
    ///
    /// # Returns
    /// The metrics of the evaluation after the last epoch.
    pub fn fit(&mut self, train: &Dataset, test: &Dataset, epochs: NonZeroUsize) -> Result<Metrics> {
        let mut metrics = Metrics::default();

        for epoch in 1..=epochs.get() {
            let train_loss = self.train_epoch(train)?;
            metrics = self.evaluate(test)?;

            debug!(
                "epoch {epoch}/{epochs}: train loss {train_loss:.6}, accuracy {:.4}, avg loss {:.6}",
                metrics.accuracy(),
                metrics.avg_loss()
            );
        }

        Ok(metrics)
    }

    /// Makes one pass over `dataset` updating the model once per batch.
    ///
    /// # Returns
    /// The training loss averaged over the batches, `0` if there were none.
    pub fn train_epoch(&mut self, dataset: &Dataset) -> Result<f32> {
        let mut total_loss = 0.;
        let mut num_batches = 0;

        for (x, y) in dataset.batches(self.batch_size) {
            let y_pred = self.model.forward(x)?;
            check_output(y_pred, y)?;

            total_loss += self.loss_fn.loss(y_pred, y);
            let d = self.loss_fn.loss_prime(y_pred, y);

            self.model.backward(d)?;
            self.optimizer.step(&mut self.model);
            self.optimizer.zero_grad(&mut self.model);
            num_batches += 1;
        }

        if num_batches == 0 {
            return Ok(0.);
        }

        Ok(total_loss / num_batches as f32)
    }

    /// Evaluates the model over every sample of `dataset` without modifying it.
    ///
    /// A prediction is correct when its highest score is at the target's class.
    ///
    /// # Returns
    /// The accuracy over the samples and the loss averaged over the batches, or an error if
    /// the dataset is empty.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<Metrics> {
        if dataset.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let mut total_loss = 0.;
        let mut correct = 0;
        let mut num_batches = 0;

        for (x, y) in dataset.batches(self.batch_size) {
            let y_pred = self.model.infer(x)?;
            check_output(y_pred.view(), y)?;

            total_loss += self.loss_fn.loss(y_pred.view(), y);
            correct += Zip::from(y_pred.rows())
                .and(y.rows())
                .fold(0, |acc, pred, target| {
                    acc + (argmax(pred) == argmax(target)) as usize
                });
            num_batches += 1;
        }

        let accuracy = correct as f32 / dataset.len() as f32;
        Ok(Metrics::new(accuracy, total_loss / num_batches as f32))
    }
}

fn check_output(y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
    if y_pred.ncols() != y.ncols() {
        return Err(MlErr::SizeMismatch {
            what: "model outputs",
            got: y_pred.ncols(),
            expected: y.ncols(),
        });
    }

    Ok(())
}

/// Returns the index of the first maximum.
fn argmax(row: ArrayView1<f32>) -> usize {
    row.indexed_iter()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max { (i, v) } else { (best, max) }
        })
        .0
}
