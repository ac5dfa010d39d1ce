use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use super::LossFn;

/// Cross entropy between the softmax of the predicted logits and the target distribution
/// (one-hot rows for plain classification), averaged over the batch.
#[derive(Default, Clone, Copy, Debug)]
pub struct CrossEntropy;

/// Computes `ln(sum(exp(z)))` shifting by the maximum to avoid overflowing.
fn log_sum_exp(logits: ArrayView1<f32>) -> f32 {
    let max = logits.fold(f32::NEG_INFINITY, |m, &z| m.max(z));
    logits.mapv(|z| (z - max).exp()).sum().ln() + max
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        if y_pred.nrows() == 0 {
            return 0.;
        }

        let total: f32 = y_pred
            .rows()
            .into_iter()
            .zip(y.rows())
            .map(|(logits, target)| {
                let lse = log_sum_exp(logits);
                Zip::from(&logits)
                    .and(&target)
                    .fold(0., |acc, &z, &t| acc + t * (lse - z))
            })
            .sum();

        total / y_pred.nrows() as f32
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.nrows().max(1) as f32;
        let mut d = y_pred.to_owned();

        for (mut row, target) in d.rows_mut().into_iter().zip(y.rows()) {
            let lse = log_sum_exp(row.view());
            row.zip_mut_with(&target, |z, &t| *z = ((*z - lse).exp() - t) / n);
        }

        d
    }
}
