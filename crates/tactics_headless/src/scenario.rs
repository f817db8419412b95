//! Scenario loading.
//!
//! Scenarios are [`ScenarioData`] RON files: terrain rows, unit templates and
//! placements. The built-in demo is embedded at compile time.

use std::path::Path;
use std::result::Result;

use tactics_core::prelude::*;
use thiserror::Error;

/// RON source of the built-in demo scenario.
pub const DEMO_SCENARIO: &str = include_str!("../scenarios/skirmish.ron");

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but does not describe a valid level.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] GameError),
}

/// Load a scenario from a RON file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ScenarioData, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    from_ron_str(&contents)
}

/// Load from a RON string (useful for embedded scenarios).
pub fn from_ron_str(ron: &str) -> Result<ScenarioData, ScenarioError> {
    let scenario: ScenarioData = ron::from_str(ron)?;
    Ok(scenario)
}

/// The built-in demo scenario.
pub fn demo() -> Result<ScenarioData, ScenarioError> {
    from_ron_str(DEMO_SCENARIO)
}

/// Load and build a level, reporting every problem as a [`ScenarioError`].
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<(ScenarioData, Level), ScenarioError> {
    let scenario = load(path)?;
    let level = scenario.build()?;
    Ok((scenario, level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_scenario_builds() {
        let scenario = demo().unwrap();
        let level = scenario.build().unwrap();

        assert_eq!(scenario.name, "Border Skirmish");
        assert_eq!(level.map().width(), 12);
        assert_eq!(level.map().height(), 6);
        assert_eq!(level.faction_units(Faction::Ally).count(), 4);
        assert_eq!(level.faction_units(Faction::Enemy).count(), 5);
        assert_eq!(level.next_spawn_location(), Some(Position::new(11, 1)));
        assert!(!level.leader_fallen());
    }

    #[test]
    fn test_demo_terrain_override_applies() {
        let level = demo().unwrap().build().unwrap();
        let fort = level.map().get(Position::new(2, 2)).unwrap();
        assert_eq!(fort.tile, TileType::Fort);
        assert_eq!(fort.stats.defense, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.ron");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(DEMO_SCENARIO.as_bytes())
            .unwrap();

        let (scenario, level) = load_level(&path).unwrap();
        assert_eq!(scenario, demo().unwrap());
        assert_eq!(level.units().count(), 9);
    }

    #[test]
    fn test_missing_file() {
        let err = load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_scenario_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(
            &path,
            r#"ScenarioData(name: "Broken", map: ["..", "..."])"#,
        )
        .unwrap();

        let err = load_level(&path).unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid(GameError::Configuration(_))));
    }

    #[test]
    fn test_parse_error_reported() {
        assert!(matches!(
            from_ron_str("ScenarioData(name: "),
            Err(ScenarioError::ParseError(_))
        ));
    }
}
