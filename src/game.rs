use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{Boundary, GameConfig};
use crate::snake::{Cell, Direction, Snake};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Paused,
    Dead,
    /// The snake filled the grid, leaving nowhere to put food.
    Won,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Dead | GameStatus::Won)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfCollision,
}

/// What a single call to [`GameState::step`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Paused or over; nothing moved.
    Idle,
    Moved { head: Cell },
    Ate { head: Cell, score: u32 },
    Died(Collision),
    Won,
}

/// The whole game: snake, food, score and status.
///
/// `R` is the source of randomness for food placement. Real games use a
/// [`Pcg32`]; tests seed one to get repeatable boards.
pub struct GameState<R = Pcg32> {
    config: GameConfig,
    snake: Snake,
    food: Option<Cell>,
    score: u32,
    status: GameStatus,
    death_cause: Option<Collision>,
    rng: R,
}

impl GameState<Pcg32> {
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        GameState::new(config, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        let snake = initial_snake(&config);
        let mut state = GameState {
            config,
            snake,
            food: None,
            score: 0,
            status: GameStatus::Running,
            death_cause: None,
            rng,
        };
        state.reset_food();
        state
    }

    /// Advances the game by one frame.
    ///
    /// `heading` is the last direction the player asked for since the previous
    /// frame; reversals are ignored.
    pub fn step(&mut self, heading: Option<Direction>) -> StepOutcome {
        if self.status != GameStatus::Running {
            return StepOutcome::Idle;
        }

        if let Some(direction) = heading {
            self.snake.set_direction(direction);
        }

        let (width, height) = (self.width(), self.height());
        let mut head = self.snake.next_head();

        match self.config.boundary() {
            Boundary::Wrap => head = head.wrapped(width, height),
            Boundary::Solid if !head.in_bounds(width, height) => {
                return self.die(Collision::Wall);
            }
            _ => {}
        }

        let eating = self.food == Some(head);
        self.snake.advance(head, eating);

        if self.snake.bites_itself() {
            return self.die(Collision::SelfCollision);
        }

        if !eating {
            return StepOutcome::Moved { head };
        }

        self.score = self.score.saturating_add(self.config.points_per_food);
        self.food = place_food(&mut self.rng, &self.snake, self.config.width, self.config.height);

        match self.food {
            Some(food) => {
                log::debug!("food eaten at {:?}, next at {:?}, score {}", head, food, self.score);
                StepOutcome::Ate { head, score: self.score }
            }
            None => {
                log::info!("grid filled, won with {} points", self.score);
                self.status = GameStatus::Won;
                StepOutcome::Won
            }
        }
    }

    /// Flips between Running and Paused. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            over => over,
        };
        log::debug!("status is now {:?}", self.status);
    }

    /// Starts a fresh game with the same configuration. The random stream is
    /// not rewound.
    pub fn restart(&mut self) {
        log::info!("restarting the game");
        self.snake = initial_snake(&self.config);
        self.score = 0;
        self.status = GameStatus::Running;
        self.death_cause = None;
        self.reset_food();
    }

    /// Ends the current game on the spot. No collision caused it, so
    /// [`death_cause`](Self::death_cause) stays `None`.
    pub fn kill(&mut self) {
        if self.status.is_over() {
            return;
        }
        log::info!("the snake has been killed with {} points", self.score);
        self.status = GameStatus::Dead;
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn heading(&self) -> Direction {
        self.snake.direction()
    }

    pub fn death_cause(&self) -> Option<Collision> {
        self.death_cause
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn width(&self) -> i32 {
        self.config.width as i32
    }

    pub fn height(&self) -> i32 {
        self.config.height as i32
    }

    ///////////////////////////////////////////////////////////////////////////

    fn die(&mut self, cause: Collision) -> StepOutcome {
        log::info!("snake died ({:?}) with {} points", cause, self.score);
        self.status = GameStatus::Dead;
        self.death_cause = Some(cause);
        StepOutcome::Died(cause)
    }

    fn reset_food(&mut self) {
        self.food = place_food(&mut self.rng, &self.snake, self.config.width, self.config.height);
        if self.food.is_none() {
            self.status = GameStatus::Won;
        }
    }
}

fn initial_snake(config: &GameConfig) -> Snake {
    let length = config.initial_length.max(1);
    Snake::new(Cell::new(length as i32 - 1, 0), length as usize, Direction::Right)
}

/// Picks a uniformly random grid cell the snake does not cover, or `None` when
/// the grid is full.
pub fn place_food<R: Rng + ?Sized>(rng: &mut R, snake: &Snake, width: u16, height: u16) -> Option<Cell> {
    let occupied: HashSet<Cell> = snake.cells().collect();

    let choices: Vec<Cell> = (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Cell::new(x, y)))
        .filter(|cell| !occupied.contains(cell))
        .collect();

    choices.choose(rng).copied()
}
