use burn::prelude::*;
use burn::tensor::TensorData;

use crate::data::{BoardExample, Dataset};
use crate::error::DataError;

/// Tensors for one training batch.
#[derive(Debug, Clone)]
pub struct BoardBatch<B: Backend> {
    /// `[batch, 1, height, width]`
    pub boards: Tensor<B, 4>,
    /// `[batch, policy_size]`
    pub policies: Tensor<B, 2>,
    /// `[batch, 1]`
    pub values: Tensor<B, 2>,
}

/// Gathers [`BoardExample`]s for a batch of indices into tensors on one device.
#[derive(Debug, Clone)]
pub struct BoardBatcher<B: Backend> {
    device: B::Device,
    height: usize,
    width: usize,
}

impl<B: Backend> BoardBatcher<B> {
    /// Batcher for `height x width` boards placed on `device`.
    pub fn new(height: usize, width: usize, device: B::Device) -> Self {
        BoardBatcher {
            device,
            height,
            width,
        }
    }

    /// Board area, which is also the expected policy length.
    pub fn policy_size(&self) -> usize {
        self.height * self.width
    }

    /// Look up every index in `dataset` and stack the examples in index order.
    pub fn batch<D>(&self, dataset: &D, indices: &[usize]) -> Result<BoardBatch<B>, DataError>
    where
        D: Dataset<Item = BoardExample> + ?Sized,
    {
        if indices.is_empty() {
            return Err(DataError::EmptyBatch);
        }

        let n = indices.len();
        let area = self.policy_size();
        let mut boards = Vec::with_capacity(n * area);
        let mut policies = Vec::with_capacity(n * area);
        let mut values = Vec::with_capacity(n);

        for &index in indices {
            let example = dataset.get(index).ok_or(DataError::IndexOutOfRange {
                index,
                len: dataset.len(),
            })?;
            check_len(index, "cells", area, example.cells.len())?;
            check_len(index, "policy", area, example.policy.len())?;

            boards.extend_from_slice(&example.cells);
            policies.extend_from_slice(&example.policy);
            values.push(example.value);
        }

        Ok(BoardBatch {
            boards: Tensor::<B, 1>::from_data(TensorData::from(boards.as_slice()), &self.device)
                .reshape([n, 1, self.height, self.width]),
            policies: Tensor::<B, 1>::from_data(TensorData::from(policies.as_slice()), &self.device)
                .reshape([n, area]),
            values: Tensor::<B, 1>::from_data(TensorData::from(values.as_slice()), &self.device)
                .reshape([n, 1]),
        })
    }
}

fn check_len(
    index: usize,
    field: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), DataError> {
    if expected == found {
        Ok(())
    } else {
        Err(DataError::ExampleShape {
            index,
            field,
            expected,
            found,
        })
    }
}
