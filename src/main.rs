mod config;
mod game;
mod play;
mod scores;
mod snake;
mod term;

use std::{fs::File, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};

use config::GameConfig;

#[derive(Parser)]
#[command(name = "snake")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u16>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u16>,

    /// Check the grid edges
    #[arg(long)]
    walls: bool,

    /// Die at the edges instead of wrapping around
    #[arg(long)]
    no_wrap: bool,

    /// Append the final score of each game to the score file
    #[arg(long)]
    save_scores: bool,

    /// Where scores are appended
    #[arg(long)]
    scores_file: Option<PathBuf>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Game updates per second
    #[arg(long)]
    fps: Option<u32>,

    /// Write logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.walls {
            config.walls = true;
        }
        if self.no_wrap {
            config.wrap_walls = false;
        }
        if self.save_scores {
            config.write_high_scores = true;
        }
        if let Some(path) = &self.scores_file {
            config.high_score_path = path.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Logs are off by default since stderr shares the screen with the game;
/// `RUST_LOG` turns them on.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")),
    };

    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = cli.game_config()?;
    let mut game = play::SnakeGame::new(config)?;

    // The game loop restores the terminal before returning, even on error
    game.run()
}
