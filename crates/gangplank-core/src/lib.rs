//! gangplank-core — shared types, label decoding and configuration.

pub mod config;
pub mod labels;
pub mod types;

pub use config::{ConfigError, GangplankConfig, StreakPolicy};
pub use labels::{Decoded, LabelDefault, decode_unit};
pub use types::*;
