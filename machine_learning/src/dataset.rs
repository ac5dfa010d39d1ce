use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, s};

use crate::{MlErr, Result};

/// An ordered, in-memory collection of `(input, target)` samples, one per row.
#[derive(Clone, Debug)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The inputs, one sample per row.
    /// * `y` - The targets, one sample per row.
    ///
    /// # Returns
    /// An error if `x` and `y` don't have the same amount of rows.
    pub fn new(x: Array2<f32>, y: Array2<f32>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "dataset targets",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    /// Creates a new classification `Dataset`, one-hot encoding the labels.
    ///
    /// # Arguments
    /// * `x` - The inputs, one sample per row.
    /// * `labels` - The class of each sample.
    /// * `classes` - The amount of classes.
    ///
    /// # Returns
    /// An error if there's not one label per row or a label is out of range.
    pub fn from_labels(x: Array2<f32>, labels: &[u8], classes: usize) -> Result<Self> {
        let mut y = Array2::zeros((labels.len(), classes));

        for (mut row, &label) in y.rows_mut().into_iter().zip(labels) {
            let label = label as usize;
            if label >= classes {
                return Err(MlErr::SizeMismatch {
                    what: "label class",
                    got: label,
                    expected: classes,
                });
            }

            row[label] = 1.;
        }

        Self::new(x, y)
    }

    /// Returns the amount of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    pub fn y_size(&self) -> usize {
        self.y.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f32> {
        self.y.view()
    }

    /// Returns how many batches `batches` yields for this batch size.
    pub fn num_batches(&self, batch_size: NonZeroUsize) -> usize {
        self.len().div_ceil(batch_size.get())
    }

    /// Splits the dataset into contiguous batches, in order. The last one holds the remainder
    /// when the batch size doesn't divide the length of the dataset.
    ///
    /// # Arguments
    /// * `batch_size` - The maximum amount of samples per batch.
    pub fn batches(&self, batch_size: NonZeroUsize) -> Batches<'_> {
        Batches {
            dataset: self,
            batch_size: batch_size.get(),
            cursor: 0,
        }
    }
}

/// Iterator over the `(x, y)` batches of a `Dataset`, borrowed (zero-copy).
#[derive(Clone, Debug)]
pub struct Batches<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = (ArrayView2<'a, f32>, ArrayView2<'a, f32>);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.dataset.len();
        if self.cursor >= len {
            return None;
        }

        let start = self.cursor;
        let end = (start + self.batch_size).min(len);
        self.cursor = end;

        let x = self.dataset.x.slice(s![start..end, ..]);
        let y = self.dataset.y.slice(s![start..end, ..]);
        Some((x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.dataset.len() - self.cursor.min(self.dataset.len()))
            .div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn range_dataset(len: usize) -> Dataset {
        let x = Array2::from_shape_fn((len, 2), |(i, j)| (i * 2 + j) as f32);
        let y = Array2::from_shape_fn((len, 1), |(i, _)| i as f32);
        Dataset::new(x, y).unwrap()
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn mismatched_rows_fail() {
        let res = Dataset::new(Array2::zeros((3, 2)), Array2::zeros((2, 1)));
        assert!(matches!(
            res,
            Err(MlErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }

    #[test]
    fn one_hot_labels() {
        let ds = Dataset::from_labels(Array2::zeros((3, 1)), &[2, 0, 1], 3).unwrap();
        assert_eq!(ds.y(), array![[0., 0., 1.], [1., 0., 0.], [0., 1., 0.]]);
    }

    #[test]
    fn out_of_range_label_fails() {
        assert!(Dataset::from_labels(Array2::zeros((1, 1)), &[3], 3).is_err());
    }

    #[test]
    fn batches_are_in_order_with_a_short_tail() {
        let ds = range_dataset(5);
        let batches: Vec<_> = ds.batches(nz(2)).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0, array![[0., 1.], [2., 3.]]);
        assert_eq!(batches[1].1, array![[2.], [3.]]);
        assert_eq!(batches[2].0, array![[8., 9.]]);
    }

    #[test]
    fn batch_count_is_ceil_and_sizes_sum_to_len() {
        for len in [0, 1, 7, 100, 1000] {
            let ds = range_dataset(len);

            for batch_size in 1..=13 {
                let batches = ds.batches(nz(batch_size));
                assert_eq!(batches.len(), len.div_ceil(batch_size));

                let sizes: Vec<_> = batches.map(|(x, y)| {
                    assert_eq!(x.nrows(), y.nrows());
                    x.nrows()
                }).collect();

                assert_eq!(sizes.len(), ds.num_batches(nz(batch_size)));
                assert_eq!(sizes.iter().sum::<usize>(), len);
                assert!(sizes.iter().all(|&s| s <= batch_size));
            }
        }
    }

    #[test]
    fn empty_dataset_has_no_batches() {
        let ds = range_dataset(0);
        assert!(ds.is_empty());
        assert_eq!(ds.batches(nz(4)).next(), None);
    }
}
