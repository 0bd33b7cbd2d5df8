pub mod encoding;
mod residual_block;
mod resnet;

pub use encoding::{board_to_tensor, policy_probabilities, value_scalar};
pub use residual_block::{ResidualBlock, ResidualBlockConfig};
pub use resnet::{DualHeadResNet, DualHeadResNetConfig, Prediction};
