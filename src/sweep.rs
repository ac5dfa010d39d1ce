use std::{
    io::Write,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use anyhow::Context;
use log::info;
use machine_learning::{
    arch::{Model, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
    training::{Metrics, ModelTrainer},
};

use crate::report::Reporter;

/// The outcome of training with one batch size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub batch_size: NonZeroUsize,
    pub metrics: Metrics,
    pub elapsed: Duration,
}

/// Trains a fresh model once per batch size and reports how each run did on the test set.
pub struct Sweep<MF, OF, L> {
    batch_sizes: Vec<NonZeroUsize>,
    epochs: NonZeroUsize,
    model_factory: MF,
    optimizer_factory: OF,
    loss_fn: L,
}

impl<M, O, L, MF, OF> Sweep<MF, OF, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn + Clone,
    MF: FnMut() -> machine_learning::Result<M>,
    OF: FnMut(&M) -> O,
{
    /// Creates a new `Sweep`.
    ///
    /// # Arguments
    /// * `batch_sizes` - The batch sizes to run, in the order they are run.
    /// * `epochs` - The amount of epochs per run.
    /// * `model_factory` - Builds a freshly initialized model for every run.
    /// * `optimizer_factory` - Builds the optimizer for every run's model.
    /// * `loss_fn` - The loss function, cloned into every run.
    pub fn new(
        batch_sizes: Vec<NonZeroUsize>,
        epochs: NonZeroUsize,
        model_factory: MF,
        optimizer_factory: OF,
        loss_fn: L,
    ) -> Self {
        Self {
            batch_sizes,
            epochs,
            model_factory,
            optimizer_factory,
            loss_fn,
        }
    }

    /// Runs every batch size in order, writing a header and a metrics line per run and the
    /// total time taken at the end.
    ///
    /// # Returns
    /// The result of each run, or the first error found. Lines reported before the error are
    /// kept.
    pub fn run<F: Write, C: Write>(
        &mut self,
        train: &Dataset,
        test: &Dataset,
        reporter: &mut Reporter<F, C>,
    ) -> anyhow::Result<Vec<RunResult>> {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.batch_sizes.len());

        for &batch_size in &self.batch_sizes {
            reporter.line(format_args!("Batch Size: {batch_size}"))?;
            info!("training {} epochs with batch size {batch_size}", self.epochs);

            let run_start = Instant::now();
            let model = (self.model_factory)().context("failed to build the model")?;
            let optimizer = (self.optimizer_factory)(&model);
            let mut trainer = ModelTrainer::new(model, optimizer, self.loss_fn.clone(), batch_size);

            let metrics = trainer
                .fit(train, test, self.epochs)
                .with_context(|| format!("run with batch size {batch_size} failed"))?;
            let elapsed = run_start.elapsed();

            reporter.line(metrics)?;
            info!("batch size {batch_size} done in {:.2}s", elapsed.as_secs_f64());

            results.push(RunResult {
                batch_size,
                metrics,
                elapsed,
            });
        }

        reporter.line(format_args!("Time taken: {}", start.elapsed().as_secs_f64()))?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use machine_learning::{
        MlErr,
        arch::{Sequential, layers::Layer, loss::CrossEntropy},
        optimization::GradientDescent,
    };
    use ndarray::Array2;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn dataset(len: usize) -> Dataset {
        let labels: Vec<u8> = (0..len).map(|i| (i % 2) as u8).collect();
        let x = Array2::from_shape_fn((len, 2), |(i, j)| (i % 2 == j) as u8 as f32);
        Dataset::from_labels(x, &labels, 2).unwrap()
    }

    #[test]
    fn one_fresh_model_per_batch_size() {
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(1)));
        let mut built = 0;
        let mut sweep = Sweep::new(
            vec![nz(4), nz(8)],
            nz(2),
            || {
                built += 1;
                Sequential::random([Layer::dense((2, 2), None)], rng.clone())
            },
            |_: &Sequential| GradientDescent::new(0.1),
            CrossEntropy,
        );
        let mut reporter = Reporter::new(Vec::new(), Vec::new());

        let results = sweep.run(&dataset(16), &dataset(6), &mut reporter).unwrap();
        drop(sweep);

        assert_eq!(built, 2);
        let batch_sizes: Vec<_> = results.iter().map(|r| r.batch_size.get()).collect();
        assert_eq!(batch_sizes, [4, 8]);

        let (file, _) = reporter.into_inner();
        let report = String::from_utf8(file).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Batch Size: 4");
        assert_eq!(lines[1], results[0].metrics.to_string());
        assert_eq!(lines[2], "Batch Size: 8");
        assert!(lines[4].starts_with("Time taken: "));
    }

    #[test]
    fn failed_run_keeps_earlier_lines() {
        let mut sweep = Sweep::new(
            vec![nz(4)],
            nz(1),
            || Err::<Sequential, _>(MlErr::InvalidInit("no parameters".into())),
            |_: &Sequential| GradientDescent::new(0.1),
            CrossEntropy,
        );
        let mut reporter = Reporter::new(Vec::new(), Vec::new());

        assert!(sweep.run(&dataset(8), &dataset(8), &mut reporter).is_err());

        let (file, _) = reporter.into_inner();
        assert_eq!(file, b"Batch Size: 4\n");
    }
}
