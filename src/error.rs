use std::path::PathBuf;

/// Errors raised when building a [`SliceSampler`](crate::data::SliceSampler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplerError {
    #[error("slice_size must be > 0")]
    ZeroSliceSize,

    #[error("batch_size must be > 0")]
    ZeroBatchSize,

    #[error("batch_size {batch_size} is not a multiple of slice_size {slice_size}")]
    BatchNotMultipleOfSlice { batch_size: usize, slice_size: usize },

    #[error("dataset is empty")]
    EmptyDataset,
}

/// Errors raised by the network's input and output helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("board has no cells")]
    EmptyBoard,

    #[error("board row {row} has {found} cells, expected {expected}")]
    RaggedBoard {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("input shape {found:?} does not match [batch, 1, H, W] with H*W = {policy_size}")]
    InputShape {
        found: Vec<usize>,
        policy_size: usize,
    },

    #[error("expected a single-example batch, got shape {0:?}")]
    NotSingleExample(Vec<usize>),

    #[error("failed to read tensor data: {0}")]
    TensorData(String),
}

/// Errors raised while gathering examples into a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("example {index}: {field} has {found} values, expected {expected}")]
    ExampleShape {
        index: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("cannot build an empty batch")]
    EmptyBatch,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_error_display() {
        let err = SamplerError::BatchNotMultipleOfSlice {
            batch_size: 20,
            slice_size: 6,
        };
        assert_eq!(
            err.to_string(),
            "batch_size 20 is not a multiple of slice_size 6"
        );
    }

    #[test]
    fn test_network_error_display() {
        let err = NetworkError::RaggedBoard {
            row: 2,
            expected: 7,
            found: 6,
        };
        assert_eq!(err.to_string(), "board row 2 has 6 cells, expected 7");

        let err = NetworkError::InputShape {
            found: vec![1, 3, 6, 7],
            policy_size: 42,
        };
        assert_eq!(
            err.to_string(),
            "input shape [1, 3, 6, 7] does not match [batch, 1, H, W] with H*W = 42"
        );
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::IndexOutOfRange { index: 10, len: 5 };
        assert_eq!(
            err.to_string(),
            "index 10 out of range for dataset of length 5"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("sampler.batch_size must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: sampler.batch_size must be > 0"
        );
    }
}
