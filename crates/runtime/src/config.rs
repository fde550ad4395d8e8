//! Simulation settings read from the environment.
use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use turn_content::ConfigLoader;
use turn_core::{SpeedTier, TurnSystemConfig};

/// Settings for one `turn-sim` run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub seed: u64,
    pub turns: u64,
    pub map_width: u32,
    pub map_height: u32,
    pub hostiles: u32,
    pub allies: u32,
    pub player_speed: SpeedTier,
    /// TOML or RON `TurnSystemConfig`; the bundled rules are used when unset.
    pub turn_config: Option<PathBuf>,
    /// Directory for the daily-rolling log file; stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            turns: 200,
            map_width: 48,
            map_height: 30,
            hostiles: 6,
            allies: 1,
            player_speed: SpeedTier::Normal,
            turn_config: None,
            log_dir: None,
        }
    }
}

impl SimConfig {
    /// Construct the configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SIM_SEED` - Seed for every random stream (default: 42)
    /// - `SIM_TURNS` - Turns to play (default: 200)
    /// - `SIM_MAP_WIDTH` / `SIM_MAP_HEIGHT` - Map size in tiles (default: 48x30)
    /// - `SIM_HOSTILES` - Hostiles placed at start (default: 6)
    /// - `SIM_ALLIES` - Allies placed next to the player (default: 1)
    /// - `SIM_PLAYER_SPEED` - `slow`, `normal` or `fast` (default: normal)
    /// - `SIM_CONFIG` - Path to a turn-system config file
    /// - `SIM_LOG_DIR` - Directory for log files
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source. Unset or
    /// unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(seed) = parse(read("SIM_SEED")) {
            config.seed = seed;
        }
        if let Some(turns) = parse(read("SIM_TURNS")) {
            config.turns = turns;
        }
        if let Some(width) = parse(read("SIM_MAP_WIDTH")) {
            config.map_width = width;
        }
        if let Some(height) = parse(read("SIM_MAP_HEIGHT")) {
            config.map_height = height;
        }
        if let Some(hostiles) = parse(read("SIM_HOSTILES")) {
            config.hostiles = hostiles;
        }
        if let Some(allies) = parse(read("SIM_ALLIES")) {
            config.allies = allies;
        }
        if let Some(speed) = parse(read("SIM_PLAYER_SPEED")) {
            config.player_speed = speed;
        }
        config.turn_config = read("SIM_CONFIG").map(PathBuf::from);
        config.log_dir = read("SIM_LOG_DIR").map(PathBuf::from);

        config
    }

    /// Loads the configured turn rules, or the bundled ones.
    pub fn load_turn_system(&self) -> anyhow::Result<TurnSystemConfig> {
        match self.turn_config.as_deref() {
            Some(path) => load_from(path),
            None => ConfigLoader::bundled().context("bundled turn-system config is broken"),
        }
    }
}

fn load_from(path: &Path) -> anyhow::Result<TurnSystemConfig> {
    ConfigLoader::load(path)
        .with_context(|| format!("loading turn-system config from {}", path.display()))
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}
