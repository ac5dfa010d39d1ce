use std::{cell::RefCell, num::NonZeroUsize, path::PathBuf, rc::Rc};

use machine_learning::arch::{activations::ActFn, layers::Layer};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

const BATCH_SIZES: [NonZeroUsize; 4] = [
    NonZeroUsize::new(50).unwrap(),
    NonZeroUsize::new(100).unwrap(),
    NonZeroUsize::new(150).unwrap(),
    NonZeroUsize::new(200).unwrap(),
];
const EPOCHS: NonZeroUsize = NonZeroUsize::new(25).unwrap();
const LEARNING_RATE: f32 = 1e-3;
const HIDDEN: [usize; 2] = [512, 512];

/// Everything a sweep needs to know, fixed at build time through `Default`.
#[derive(Debug, Clone, Serialize)]
pub struct SweepConfig {
    /// The batch sizes to run, in order, one run each.
    pub batch_sizes: Vec<NonZeroUsize>,
    /// The amount of epochs per run.
    pub epochs: NonZeroUsize,
    pub learning_rate: f32,
    /// The widths of the hidden layers, each followed by a ReLU.
    pub hidden: Vec<usize>,
    /// Where the report is written.
    pub output_path: PathBuf,
    /// Where the dataset is downloaded and cached.
    pub data_root: PathBuf,
    /// Seeds the parameter initialization, drawn from the OS when missing.
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            batch_sizes: BATCH_SIZES.to_vec(),
            epochs: EPOCHS,
            learning_rate: LEARNING_RATE,
            hidden: HIDDEN.to_vec(),
            output_path: PathBuf::from("out.txt"),
            data_root: PathBuf::from("data"),
            seed: None,
        }
    }
}

impl SweepConfig {
    /// Builds the layers of the classifier: one ReLU dense layer per hidden width and a
    /// linear output layer producing the logits.
    ///
    /// # Arguments
    /// * `inputs` - The amount of input features.
    /// * `classes` - The amount of classes.
    pub fn layers(&self, inputs: usize, classes: usize) -> Vec<Layer> {
        let mut fan_in = inputs;
        let mut layers = Vec::with_capacity(self.hidden.len() + 1);

        for &width in &self.hidden {
            layers.push(Layer::dense((fan_in, width), Some(ActFn::relu())));
            fan_in = width;
        }

        layers.push(Layer::dense((fan_in, classes), None));
        layers
    }

    /// Returns the random number generator used to initialize every run's model.
    pub fn rng(&self) -> Rc<RefCell<StdRng>> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Rc::new(RefCell::new(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SweepConfig::default();
        let batch_sizes: Vec<_> = config.batch_sizes.iter().map(|b| b.get()).collect();

        assert_eq!(batch_sizes, [50, 100, 150, 200]);
        assert_eq!(config.epochs.get(), 25);
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.output_path, PathBuf::from("out.txt"));
    }

    #[test]
    fn layers_chain_widths() {
        let config = SweepConfig::default();
        let sizes: Vec<_> = config.layers(784, 10).iter().map(Layer::size).collect();

        assert_eq!(sizes, [785 * 512, 513 * 512, 513 * 10]);
    }

    #[test]
    fn no_hidden_layers_is_linear() {
        let config = SweepConfig {
            hidden: vec![],
            ..Default::default()
        };

        let layers = config.layers(4, 3);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].fan_in(), 4);
    }

    #[test]
    fn serializes_to_json() {
        let config = SweepConfig {
            seed: Some(3),
            ..Default::default()
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["batch_sizes"], serde_json::json!([50, 100, 150, 200]));
        assert_eq!(json["epochs"], 25);
        assert_eq!(json["seed"], 3);
    }
}
