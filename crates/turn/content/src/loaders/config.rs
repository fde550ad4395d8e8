//! Turn-system configuration loader.

use std::path::Path;

use turn_core::TurnSystemConfig;

use crate::loaders::{LoadResult, read_file};
use crate::{BUNDLED_TURN_SYSTEM_RON, BUNDLED_TURN_SYSTEM_TOML};

/// Loader for turn-system configuration from TOML or RON files.
///
/// Every loaded configuration is validated before it is returned, so a
/// successful load can be handed straight to `TurnScheduler::new`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration, choosing the format from the file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a `.toml` or `.ron` file containing TurnSystemConfig
    ///
    /// # Returns
    ///
    /// Returns a validated TurnSystemConfig.
    pub fn load(path: &Path) -> LoadResult<TurnSystemConfig> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::load_toml(path),
            Some("ron") => Self::load_ron(path),
            _ => anyhow::bail!(
                "Unsupported config format for {} (expected .toml or .ron)",
                path.display()
            ),
        }
    }

    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing TurnSystemConfig
    ///
    /// # Returns
    ///
    /// Returns a validated TurnSystemConfig.
    pub fn load_toml(path: &Path) -> LoadResult<TurnSystemConfig> {
        let content = read_file(path)?;
        Self::parse_toml(&content)
    }

    /// Load config data from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing TurnSystemConfig
    ///
    /// # Returns
    ///
    /// Returns a validated TurnSystemConfig.
    pub fn load_ron(path: &Path) -> LoadResult<TurnSystemConfig> {
        let content = read_file(path)?;
        Self::parse_ron(&content)
    }

    pub fn parse_toml(content: &str) -> LoadResult<TurnSystemConfig> {
        let config: TurnSystemConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validated(config)
    }

    pub fn parse_ron(content: &str) -> LoadResult<TurnSystemConfig> {
        let config: TurnSystemConfig = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config RON: {}", e))?;
        Self::validated(config)
    }

    /// The stock rules shipped with this crate.
    pub fn bundled() -> LoadResult<TurnSystemConfig> {
        Self::parse_toml(BUNDLED_TURN_SYSTEM_TOML)
    }

    /// The stock rules, read from the bundled RON file.
    pub fn bundled_ron() -> LoadResult<TurnSystemConfig> {
        Self::parse_ron(BUNDLED_TURN_SYSTEM_RON)
    }

    fn validated(config: TurnSystemConfig) -> LoadResult<TurnSystemConfig> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid turn-system config: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use turn_core::{EndTurnProcess, Phase, PhaseCondition, Slot, SpeedTier};

    use super::*;

    #[test]
    fn bundled_files_match_the_built_in_defaults() {
        let default = TurnSystemConfig::default();
        assert_eq!(ConfigLoader::bundled().unwrap(), default);
        assert_eq!(ConfigLoader::bundled_ron().unwrap(), default);
    }

    #[test]
    fn loads_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
            [[phases]]
            phase = "turn-start"

            [[phases]]
            phase = "enemy-action-1"
            conditions = ["exclude-slow", "movement-only"]

            [[end_turn]]
            process = "hunger-decrease"
            order = 7
            "#
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.phases.len(), 2);
        assert_eq!(config.phases[1].phase, Phase::EnemyAction(Slot::First));
        assert_eq!(
            config.phases[1].conditions,
            [PhaseCondition::ExcludeSlow, PhaseCondition::MovementOnly]
        );
        assert_eq!(config.end_turn[0].process, EndTurnProcess::HungerDecrease);
        // Sections left out keep their stock values.
        assert_eq!(config.speed, TurnSystemConfig::default().speed);
        assert_eq!(config.population, TurnSystemConfig::default().population);

        let mut ron_file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(ron_file, r#"(phases: [(phase: "ally-action-2")], speed: (slow: None, normal: None, fast: None))"#)
            .unwrap();
        let config = ConfigLoader::load(ron_file.path()).unwrap();
        assert_eq!(config.phases[0].phase, Phase::AllyAction(Slot::Second));
        assert!(config.speed.tier(SpeedTier::Fast).is_none());
    }

    #[test]
    fn rejects_unknown_names_and_invalid_configs() {
        let unknown_phase = ConfigLoader::parse_toml("[[phases]]\nphase = \"lunch-break\"\n");
        let message = unknown_phase.unwrap_err().to_string();
        assert!(message.contains("lunch-break"), "{message}");

        let unknown_process = ConfigLoader::parse_toml(
            "[[end_turn]]\nprocess = \"regeneration\"\norder = 1\n",
        );
        assert!(unknown_process.unwrap_err().to_string().contains("regeneration"));

        let empty = ConfigLoader::parse_ron("(phases: [])");
        assert!(empty.unwrap_err().to_string().contains("Invalid turn-system config"));
    }

    #[test]
    fn rejects_unsupported_extensions_and_missing_files() {
        let file = NamedTempFile::new().unwrap();
        let error = ConfigLoader::load(file.path()).unwrap_err();
        assert!(error.to_string().contains("Unsupported config format"));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let error = ConfigLoader::load(&missing).unwrap_err();
        assert!(error.to_string().contains("Failed to read file"));
    }
}
