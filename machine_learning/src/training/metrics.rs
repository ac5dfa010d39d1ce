use std::fmt;

/// The result of evaluating a model over a whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    accuracy: f32,
    avg_loss: f32,
}

impl Metrics {
    /// Creates a new `Metrics`.
    ///
    /// # Arguments
    /// * `accuracy` - The fraction of correctly classified samples, in `[0, 1]`.
    /// * `avg_loss` - The loss averaged over the evaluated batches.
    pub fn new(accuracy: f32, avg_loss: f32) -> Self {
        Self { accuracy, avg_loss }
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    pub fn avg_loss(&self) -> f32 {
        self.avg_loss
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Test Error - [Accuracy: {:.1}%, Avg loss: {:>8.6}]",
            100. * self.accuracy,
            self.avg_loss
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_format() {
        let metrics = Metrics::new(0.8523, 0.412345678);

        assert_eq!(
            metrics.to_string(),
            "Test Error - [Accuracy: 85.2%, Avg loss: 0.412346]"
        );
    }

    #[test]
    fn perfect_score_format() {
        let metrics = Metrics::new(1., 0.);

        assert_eq!(
            metrics.to_string(),
            "Test Error - [Accuracy: 100.0%, Avg loss: 0.000000]"
        );
    }
}
