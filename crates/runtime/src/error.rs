use thiserror::Error;
use turn_core::{ConfigError, Faction};

/// Errors raised while setting up a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("map {width}x{height} is too small (minimum {min_width}x{min_height})")]
    MapTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("map {width}x{height} is too large (maximum side {max_side})")]
    MapTooLarge {
        width: u32,
        height: u32,
        max_side: u32,
    },

    #[error("no free tile left to place a {0}")]
    NoFreeTile(Faction),

    #[error("invalid turn-system configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, SimError>;
