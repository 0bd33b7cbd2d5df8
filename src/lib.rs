//! # boardnet
//!
//! Training-side building blocks for a self-play board-game agent, built on the
//! Burn ML framework.
//!
//! ## Modules
//!
//! - [`data`] — Slice-based epoch sampler, dataset trait, example batcher
//! - [`network`] — Dual-head residual network (policy logits + bounded value)
//!   and its input/output helpers
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod config;
pub mod data;
pub mod error;
pub mod network;
