use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Numeric tunables, grouped the way the options screen groups them.
/// Loaded once at startup; the core treats these as constants afterwards.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub asteroid: AsteroidConfig,
    pub music: MusicConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub thrust_power: f64,
    pub mass: f64,
    pub turn_speed: f64, // deg/s
    pub fluid_density: f64,
    pub fire_rate: f64, // shots/s
    pub shot_power: f64,
    pub shot_lifespan: f64, // seconds
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            thrust_power: 16_000.0,
            mass: 32.0,
            turn_speed: 500.0,
            fluid_density: 0.1,
            fire_rate: 10.0,
            shot_power: 700.0,
            shot_lifespan: 1.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub min_speed: f64,
    pub max_speed: f64,
    pub fire_rate: f64, // shots/s, halved for the big saucer
    pub shot_power: f64,
    pub shot_lifespan: f64,
    pub spawn_interval_ms: u64,
    /// Shortens the wait for the next saucer after one is destroyed.
    pub overlap_offset_ms: u64,
    pub max_inaccuracy_angle: f64, // degrees
    pub min_inaccuracy_angle: f64,
    /// Score at which the small saucer is at full accuracy and spawn
    /// weighting saturates.
    pub max_score: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            min_speed: 100.0,
            max_speed: 150.0,
            fire_rate: 1.0,
            shot_power: 400.0,
            shot_lifespan: 1.5,
            spawn_interval_ms: 20_000,
            overlap_offset_ms: 5_000,
            max_inaccuracy_angle: 30.0,
            min_inaccuracy_angle: 5.0,
            max_score: 40_000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AsteroidConfig {
    pub min_speed: f64,
    pub max_speed: f64,
    /// Minimum |x| and |y| of a spawn direction; rejects near-axis-aligned
    /// headings.
    pub min_direction_angle: f64,
    pub min_spawn_distance: f64,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        AsteroidConfig {
            min_speed: 100.0,
            max_speed: 150.0,
            min_direction_angle: 0.3,
            min_spawn_distance: 100.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MusicConfig {
    pub music_volume: f64,
    pub effects_volume: f64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        MusicConfig { music_volume: 0.6, effects_volume: 0.8 }
    }
}

impl Config {
    /// An absent file means a fresh install and falls back to defaults; a
    /// file that exists but does not parse is fatal.
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"player": {"mass": 64.0}}"#).unwrap();
        assert_eq!(config.player.mass, 64.0);
        assert_eq!(config.player.turn_speed, 500.0);
        assert_eq!(config.asteroid.min_direction_angle, 0.3);
    }

    #[test]
    fn absent_file_uses_defaults() {
        let config =
            Config::load(Path::new("/nonexistent/rusteroids.json")).unwrap();
        assert_eq!(config.enemy.max_score, 40_000);
    }
}
