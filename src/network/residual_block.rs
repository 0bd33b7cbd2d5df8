use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, PaddingConfig2d, Relu};
use burn::prelude::*;

/// One residual stage of the trunk.
///
/// ```text
/// x ─ conv3x3 ─ BN ─ ReLU ─ conv3x3 ─ BN ─ (+ x) ─ ReLU
/// ```
///
/// Stride 1 and padding 1 keep `[batch, C, H, W]` unchanged.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    conv1: Conv2d<B>,
    norm1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    norm2: BatchNorm<B, 2>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct ResidualBlockConfig {
    /// Channel count in and out of the block.
    pub num_features: usize,
}

impl ResidualBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ResidualBlock<B> {
        let c = self.num_features;
        ResidualBlock {
            conv1: conv3x3(c, c, device),
            norm1: BatchNormConfig::new(c).init(device),
            conv2: conv3x3(c, c, device),
            norm2: BatchNormConfig::new(c).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> ResidualBlock<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv1.forward(input.clone());
        let x = self.relu.forward(self.norm1.forward(x));
        let x = self.norm2.forward(self.conv2.forward(x));
        self.relu.forward(x + input)
    }
}

/// 3x3 convolution, stride 1, padding 1.
pub(crate) fn conv3x3<B: Backend>(
    channels_in: usize,
    channels_out: usize,
    device: &B::Device,
) -> Conv2d<B> {
    Conv2dConfig::new([channels_in, channels_out], [3, 3])
        .with_stride([1, 1])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_block_preserves_shape() {
        let device = Default::default();
        let block = ResidualBlockConfig::new(8).init::<TestBackend>(&device);

        let input = Tensor::random([2, 8, 6, 7], Distribution::Normal(0.0, 1.0), &device);
        let output = block.forward(input);
        assert_eq!(output.shape().dims, [2, 8, 6, 7]);
    }

    #[test]
    fn test_stacked_blocks_preserve_shape() {
        let device = Default::default();
        let blocks: Vec<ResidualBlock<TestBackend>> = (0..3)
            .map(|_| ResidualBlockConfig::new(4).init(&device))
            .collect();

        let mut x = Tensor::random([1, 4, 3, 5], Distribution::Normal(0.0, 1.0), &device);
        for block in &blocks {
            x = block.forward(x);
        }
        assert_eq!(x.shape().dims, [1, 4, 3, 5]);
    }

    #[test]
    fn test_block_output_is_non_negative() {
        let device = Default::default();
        let block = ResidualBlockConfig::new(4).init::<TestBackend>(&device);

        let input = Tensor::random([2, 4, 3, 3], Distribution::Normal(0.0, 1.0), &device);
        let output: Vec<f32> = block.forward(input).into_data().to_vec().unwrap();
        assert!(output.iter().all(|&v| v >= 0.0));
    }
}
