use burn::module::Ignored;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::Element;
use tracing::debug;

use crate::error::NetworkError;
use crate::network::encoding::{board_to_tensor, policy_probabilities, value_scalar};
use crate::network::residual_block::{conv3x3, ResidualBlock, ResidualBlockConfig};

/// Residual policy-value network over single-channel boards.
///
/// ```text
/// Input:   [batch, 1, H, W]            (H*W = policy_size = P)
/// Stem:    conv3x3 1 -> F, BN, ReLU
/// Trunk:   num_blocks x ResidualBlock(F)
///
/// Policy:  conv1x1 F -> F, BN, ReLU
///          conv1x1 F -> F, BN, ReLU
///          flatten F*P -> Linear P      (logits)
///
/// Value:   conv1x1 F -> 1, BN, ReLU
///          flatten P -> Linear 1 -> tanh
/// ```
#[derive(Module, Debug)]
pub struct DualHeadResNet<B: Backend> {
    stem_conv: Conv2d<B>,
    stem_norm: BatchNorm<B, 2>,
    blocks: Vec<ResidualBlock<B>>,
    policy_conv1: Conv2d<B>,
    policy_norm1: BatchNorm<B, 2>,
    policy_conv2: Conv2d<B>,
    policy_norm2: BatchNorm<B, 2>,
    policy_fc: Linear<B>,
    value_conv: Conv2d<B>,
    value_norm: BatchNorm<B, 2>,
    value_fc: Linear<B>,
    relu: Relu,
    policy_size: usize,
    device: Ignored<B::Device>,
}

#[derive(Config, Debug)]
pub struct DualHeadResNetConfig {
    /// Number of residual blocks in the trunk.
    pub num_blocks: usize,
    /// Channel width of the trunk.
    pub num_features: usize,
    /// Number of actions; also the board area `H * W`.
    pub policy_size: usize,
}

impl DualHeadResNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DualHeadResNet<B> {
        let f = self.num_features;
        let p = self.policy_size;
        debug!(
            num_blocks = self.num_blocks,
            num_features = f,
            policy_size = p,
            "initializing dual-head resnet"
        );

        DualHeadResNet {
            stem_conv: conv3x3(1, f, device),
            stem_norm: BatchNormConfig::new(f).init(device),
            blocks: (0..self.num_blocks)
                .map(|_| ResidualBlockConfig::new(f).init(device))
                .collect(),
            policy_conv1: conv1x1(f, f, device),
            policy_norm1: BatchNormConfig::new(f).init(device),
            policy_conv2: conv1x1(f, f, device),
            policy_norm2: BatchNormConfig::new(f).init(device),
            policy_fc: LinearConfig::new(f * p, p).init(device),
            value_conv: conv1x1(f, 1, device),
            value_norm: BatchNormConfig::new(1).init(device),
            value_fc: LinearConfig::new(p, 1).init(device),
            relu: Relu::new(),
            policy_size: p,
            device: Ignored(device.clone()),
        }
    }
}

/// Post-processed network output for one board.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Prediction {
    /// Action probabilities, `policy_size` long, summing to 1.
    pub policy: Vec<f32>,
    /// Position value in [-1, 1].
    pub value: f32,
}

impl<B: Backend> DualHeadResNet<B> {
    /// Forward pass: `[batch, 1, H, W]` -> (logits `[batch, P]`, value `[batch, 1]`).
    ///
    /// Panics inside the offending layer if the input shape is wrong; use
    /// [`try_forward`](Self::try_forward) to get an error instead.
    pub fn forward(&self, input: Tensor<B, 4>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = self.stem_conv.forward(input);
        let x = self.relu.forward(self.stem_norm.forward(x));
        let x = self.blocks.iter().fold(x, |x, block| block.forward(x));

        let logits = self.policy_head(x.clone());
        let value = self.value_head(x);
        (logits, value)
    }

    /// Forward pass that checks the input is `[batch, 1, H, W]` with
    /// `H * W == policy_size` before touching any layer.
    pub fn try_forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Result<(Tensor<B, 2>, Tensor<B, 2>), NetworkError> {
        let [batch, channels, height, width] = input.dims();
        if batch == 0 || channels != 1 || height * width != self.policy_size {
            return Err(NetworkError::InputShape {
                found: vec![batch, channels, height, width],
                policy_size: self.policy_size,
            });
        }
        Ok(self.forward(input))
    }

    fn policy_head(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.policy_norm1.forward(self.policy_conv1.forward(x)));
        let x = self.relu.forward(self.policy_norm2.forward(self.policy_conv2.forward(x)));
        self.policy_fc.forward(x.flatten::<2>(1, 3))
    }

    fn value_head(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.value_norm.forward(self.value_conv.forward(x)));
        self.value_fc.forward(x.flatten::<2>(1, 3)).tanh()
    }

    /// Encode a raw board as network input on this network's device.
    pub fn board_tensor<R, T>(&self, board: &[R]) -> Result<Tensor<B, 4>, NetworkError>
    where
        R: AsRef<[T]>,
        T: Element,
    {
        board_to_tensor::<B, R, T>(board, &self.device.0)
    }

    /// Softmax single-example logits into a host-side distribution.
    pub fn policy(&self, logits: Tensor<B, 2>) -> Result<Vec<f32>, NetworkError> {
        policy_probabilities(logits)
    }

    /// Read a single-example value output as a scalar.
    pub fn value(&self, value: Tensor<B, 2>) -> Result<f32, NetworkError> {
        value_scalar(value)
    }

    /// Run one board through the network and post-process both heads.
    pub fn predict<R, T>(&self, board: &[R]) -> Result<Prediction, NetworkError>
    where
        R: AsRef<[T]>,
        T: Element,
    {
        let input = self.board_tensor(board)?;
        let (logits, value) = self.try_forward(input)?;
        Ok(Prediction {
            policy: self.policy(logits)?,
            value: self.value(value)?,
        })
    }

    /// Number of actions the policy head scores.
    pub fn policy_size(&self) -> usize {
        self.policy_size
    }

    /// Number of residual blocks in the trunk.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Device the network was initialized on.
    pub fn device(&self) -> &B::Device {
        &self.device.0
    }
}

/// 1x1 convolution, stride 1, no padding.
fn conv1x1<B: Backend>(channels_in: usize, channels_out: usize, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([channels_in, channels_out], [1, 1]).init(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    fn small_network(device: &<TestBackend as Backend>::Device) -> DualHeadResNet<TestBackend> {
        DualHeadResNetConfig::new(2, 4, 9).init(device)
    }

    #[test]
    fn test_output_shapes() {
        let device = Default::default();
        let network = small_network(&device);

        let input = Tensor::zeros([2, 1, 3, 3], &device);
        let (logits, value) = network.forward(input);
        assert_eq!(logits.shape().dims, [2, 9]);
        assert_eq!(value.shape().dims, [2, 1]);
    }

    #[test]
    fn test_output_shapes_non_square_board() {
        let device = Default::default();
        let network = DualHeadResNetConfig::new(1, 3, 42).init::<TestBackend>(&device);

        let input = Tensor::random([5, 1, 6, 7], Distribution::Normal(0.0, 1.0), &device);
        let (logits, value) = network.forward(input);
        assert_eq!(logits.shape().dims, [5, 42]);
        assert_eq!(value.shape().dims, [5, 1]);
    }

    #[test]
    fn test_zero_blocks() {
        let device = Default::default();
        let network = DualHeadResNetConfig::new(0, 2, 4).init::<TestBackend>(&device);
        assert_eq!(network.num_blocks(), 0);

        let (logits, value) = network.forward(Tensor::ones([1, 1, 2, 2], &device));
        assert_eq!(logits.shape().dims, [1, 4]);
        assert_eq!(value.shape().dims, [1, 1]);
    }

    #[test]
    fn test_value_is_bounded() {
        let device = Default::default();
        let network = small_network(&device);

        let input = Tensor::random([8, 1, 3, 3], Distribution::Normal(0.0, 100.0), &device);
        let (_, value) = network.forward(input);
        let values: Vec<f32> = value.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Default::default();
        let network = small_network(&device);

        let input = Tensor::<TestBackend, 4>::random(
            [3, 1, 3, 3],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let (logits_a, value_a) = network.forward(input.clone());
        let (logits_b, value_b) = network.forward(input);

        let logits_a: Vec<f32> = logits_a.into_data().to_vec().unwrap();
        let logits_b: Vec<f32> = logits_b.into_data().to_vec().unwrap();
        let value_a: Vec<f32> = value_a.into_data().to_vec().unwrap();
        let value_b: Vec<f32> = value_b.into_data().to_vec().unwrap();
        assert_eq!(logits_a, logits_b);
        assert_eq!(value_a, value_b);
    }

    #[test]
    fn test_try_forward_rejects_bad_shapes() {
        let device = Default::default();
        let network = small_network(&device);

        let wrong_channels = Tensor::zeros([1, 3, 3, 3], &device);
        assert_eq!(
            network.try_forward(wrong_channels).unwrap_err(),
            NetworkError::InputShape {
                found: vec![1, 3, 3, 3],
                policy_size: 9
            }
        );

        let wrong_area = Tensor::zeros([1, 1, 4, 4], &device);
        assert!(network.try_forward(wrong_area).is_err());

        let ok = Tensor::zeros([1, 1, 3, 3], &device);
        assert!(network.try_forward(ok).is_ok());
    }

    #[test]
    fn test_predict_single_board() {
        let device = Default::default();
        let network = small_network(&device);

        let board = [[1i32, 0, -1], [0, 1, 0], [-1, 0, 0]];
        let prediction = network.predict(&board).unwrap();

        assert_eq!(prediction.policy.len(), 9);
        assert!(prediction.policy.iter().all(|&p| p >= 0.0));
        assert!((prediction.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((-1.0..=1.0).contains(&prediction.value));
    }

    #[test]
    fn test_predict_rejects_wrong_board_size() {
        let device = Default::default();
        let network = small_network(&device);

        let board = [[0u8; 4]; 4];
        assert!(matches!(
            network.predict(&board),
            Err(NetworkError::InputShape { .. })
        ));
    }

    #[test]
    fn test_board_tensor_on_network_device() {
        let device = Default::default();
        let network = small_network(&device);

        let tensor = network.board_tensor(&[[0.0f32; 3]; 3]).unwrap();
        assert_eq!(tensor.shape().dims, [1, 1, 3, 3]);
        assert_eq!(&tensor.device(), network.device());
    }

    #[test]
    fn test_gradients_reach_stem() {
        type AdBackend = Autodiff<TestBackend>;
        let device = Default::default();
        let network = DualHeadResNetConfig::new(1, 2, 4).init::<AdBackend>(&device);

        let input = Tensor::random([4, 1, 2, 2], Distribution::Normal(0.0, 1.0), &device);
        let (logits, value) = network.forward(input);
        let grads = (logits.sum() + value.sum()).backward();

        assert!(network.stem_conv.weight.grad(&grads).is_some());
        assert!(network.policy_fc.weight.grad(&grads).is_some());
        assert!(network.value_fc.weight.grad(&grads).is_some());
    }
}
