use burn::prelude::*;
use burn::tensor::activation::softmax;
use burn::tensor::{Element, ElementConversion, TensorData};

use crate::error::NetworkError;

/// Encode a 2D board as a `[1, 1, height, width]` float tensor on `device`.
///
/// Rows must all have the same length. Cells may be any numeric element type
/// and are cast to `f32` without range checks.
pub fn board_to_tensor<B, R, T>(
    board: &[R],
    device: &B::Device,
) -> Result<Tensor<B, 4>, NetworkError>
where
    B: Backend,
    R: AsRef<[T]>,
    T: Element,
{
    let height = board.len();
    let width = board.first().map_or(0, |row| row.as_ref().len());
    if height == 0 || width == 0 {
        return Err(NetworkError::EmptyBoard);
    }

    let mut cells = Vec::with_capacity(height * width);
    for (row, values) in board.iter().enumerate() {
        let values = values.as_ref();
        if values.len() != width {
            return Err(NetworkError::RaggedBoard {
                row,
                expected: width,
                found: values.len(),
            });
        }
        cells.extend(values.iter().map(|&v| v.elem::<f32>()));
    }

    Ok(Tensor::<B, 1>::from_data(TensorData::from(cells.as_slice()), device)
        .reshape([1, 1, height, width]))
}

/// Softmax a single-example `[1, policy_size]` logit tensor into host probabilities.
pub fn policy_probabilities<B: Backend>(logits: Tensor<B, 2>) -> Result<Vec<f32>, NetworkError> {
    let dims = logits.dims();
    if dims[0] != 1 {
        return Err(NetworkError::NotSingleExample(dims.to_vec()));
    }

    softmax(logits.detach(), 1)
        .squeeze::<1>(0)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| NetworkError::TensorData(format!("{e:?}")))
}

/// Read a single-example `[1, 1]` value tensor as a plain scalar.
pub fn value_scalar<B: Backend>(value: Tensor<B, 2>) -> Result<f32, NetworkError> {
    let dims = value.dims();
    if dims != [1, 1] {
        return Err(NetworkError::NotSingleExample(dims.to_vec()));
    }
    Ok(value.detach().into_scalar().elem::<f32>())
}
