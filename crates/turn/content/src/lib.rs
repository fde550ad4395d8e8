//! Data-driven turn-system configuration.
//!
//! The stock dungeon rules ship as `data/turn_system.toml` (with a RON twin);
//! loaders read these or user-supplied files into a validated
//! [`turn_core::TurnSystemConfig`].

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};

/// The stock rules in TOML form.
pub const BUNDLED_TURN_SYSTEM_TOML: &str = include_str!("../data/turn_system.toml");

/// The stock rules in RON form.
pub const BUNDLED_TURN_SYSTEM_RON: &str = include_str!("../data/turn_system.ron");
