mod batcher;
mod dataset;
pub mod sampler;

pub use batcher::{BoardBatch, BoardBatcher};
pub use dataset::{BoardExample, Dataset, InMemoryDataset};
pub use sampler::{Epoch, SamplerConfig, SliceSampler};
