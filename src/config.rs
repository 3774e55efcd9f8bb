use std::{fs, path::{Path, PathBuf}, time::Duration};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// What happens when the head leaves the grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// Re-enter from the opposite edge.
    Wrap,
    /// Leaving the grid kills the snake.
    Solid,
    /// No wall checks; the snake may wander off the grid.
    Open,
}

/// Game settings. Every field is optional in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid width in cells
    pub width: u16,
    /// Grid height in cells
    pub height: u16,
    pub initial_length: u16,
    pub points_per_food: u32,
    /// Whether the grid edges are checked at all
    pub walls: bool,
    /// Whether the snake wraps around the edges instead of dying
    pub wrap_walls: bool,
    /// Append the final score to `high_score_path` on death
    pub write_high_scores: bool,
    pub high_score_path: PathBuf,
    /// Game updates per second
    pub fps: u32,
    /// Fixed seed for food placement; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 40,
            height: 30,
            initial_length: 5,
            points_per_food: 5,
            walls: false,
            wrap_walls: true,
            write_high_scores: false,
            high_score_path: PathBuf::from("highscores.txt"),
            fps: 18,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn new(width: u16, height: u16) -> Self {
        GameConfig { width, height, ..Default::default() }
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "grid must be at least 1x1, got {}x{}", self.width, self.height);
        ensure!(self.initial_length > 0, "initial snake length must be at least 1");
        ensure!(
            self.initial_length <= self.width,
            "initial snake length {} does not fit in a grid {} cells wide",
            self.initial_length, self.width
        );
        ensure!(
            (self.width as u32) * (self.height as u32) > self.initial_length as u32,
            "no room left for food on a {}x{} grid", self.width, self.height
        );
        ensure!(self.fps > 0, "fps must be at least 1");

        Ok(())
    }

    pub fn boundary(&self) -> Boundary {
        if self.wrap_walls {
            Boundary::Wrap
        } else if self.walls {
            Boundary::Solid
        } else {
            Boundary::Open
        }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_classic_game() {
        let config = GameConfig::default();
        assert_eq!((config.width, config.height), (40, 30));
        assert_eq!(config.initial_length, 5);
        assert_eq!(config.points_per_food, 5);
        assert_eq!(config.fps, 18);
        assert_eq!(config.boundary(), Boundary::Wrap);
        assert!(!config.write_high_scores);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn boundary_from_flags() {
        let mut config = GameConfig::default();

        config.walls = true;
        config.wrap_walls = false;
        assert_eq!(config.boundary(), Boundary::Solid);

        config.walls = false;
        assert_eq!(config.boundary(), Boundary::Open);

        config.walls = true;
        config.wrap_walls = true;
        assert_eq!(config.boundary(), Boundary::Wrap);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "width": 12, "walls": true, "wrap_walls": false }"#).unwrap();

        assert_eq!(config.width, 12);
        assert_eq!(config.height, 30);
        assert_eq!(config.boundary(), Boundary::Solid);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn load_reports_bad_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snake.json");
        fs::write(&path, "{ not json").unwrap();

        let err = GameConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));

        fs::write(&path, r#"{ "fps": 30, "seed": 7 }"#).unwrap();
        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.fps, 30);
        assert_eq!(config.seed, Some(7));

        fs::remove_file(&path).unwrap();
        assert!(GameConfig::load(&path).is_err());
    }

    #[test]
    fn validate_rejects_impossible_grids() {
        assert!(GameConfig::new(0, 10).validate().is_err());
        assert!(GameConfig::new(4, 10).validate().is_err()); // snake wider than grid
        assert!(GameConfig { initial_length: 0, ..GameConfig::default() }.validate().is_err());
        assert!(GameConfig { fps: 0, ..GameConfig::default() }.validate().is_err());

        let full = GameConfig { initial_length: 5, ..GameConfig::new(5, 1) };
        assert!(full.validate().is_err());

        let tight = GameConfig { initial_length: 5, ..GameConfig::new(6, 1) };
        assert!(tight.validate().is_ok());
    }

    #[test]
    fn frame_duration_from_fps() {
        let config = GameConfig { fps: 20, ..GameConfig::default() };
        assert_eq!(config.frame_duration(), Duration::from_millis(50));
    }
}
