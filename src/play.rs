use std::{thread::sleep, time::Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::GameConfig;
use crate::game::{Collision, GameState, GameStatus};
use crate::scores::ScoreLog;
use crate::snake::{Cell, Direction::{self, *}};
use crate::term::{Coords, TermManager};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';
const EMPTY_CHAR: char = ' ';

/// Top-left corner of the field's border; the score line sits above it.
const FIELD_ORIGIN: Coords = (0, 1);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Command {
    Turn(Direction),
    TogglePause,
    Restart,
    Kill,
    Quit,
}

/// Runs a [`GameState`] in the terminal at a fixed frame rate.
pub struct SnakeGame {
    term: TermManager,
    state: GameState,
    scores: Option<ScoreLog>,
    best: Option<u32>,
    end_screen_showing: bool,
}

impl SnakeGame {
    pub fn new(mut config: GameConfig) -> Result<Self> {
        let term = TermManager::new().context("Failed to read terminal size")?;
        fit_to_terminal(&mut config, term.size())?;

        let scores = config.write_high_scores.then(|| ScoreLog::new(&config.high_score_path));
        let best = match &scores {
            Some(log) => log.best().unwrap_or_else(|e| {
                log::warn!("could not read {}: {}", log.path().display(), e);
                None
            }),
            None => None,
        };

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("starting a {}x{} game with seed {}", config.width, config.height, seed);

        Ok(SnakeGame {
            term,
            state: GameState::seeded(config, seed),
            scores,
            best,
            end_screen_showing: false,
        })
    }

    /// Takes over the terminal until the player quits. The terminal is restored
    /// even when the game loop fails; a loop error wins over a restore error.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup().context("Failed to set up terminal")?;
        let result = self.play();
        let restored = self.term.restore().context("Failed to restore terminal");
        first_error(result, restored)
    }

    fn play(&mut self) -> Result<()> {
        let (width, height) = (self.state.config().width, self.state.config().height);
        let frame = self.state.config().frame_duration();

        self.term.clear()?;
        self.term.draw_borders(FIELD_ORIGIN, width + 2, height + 2);
        self.draw();
        self.term.flush()?;

        loop {
            let started = Instant::now();
            let mut turn = None;

            for key_ev in self.term.read_key_events_queue().context("Failed to read keyboard input")? {
                match map_key(&key_ev) {
                    Some(Command::Quit) => return Ok(()),
                    // Turning is ignored while paused
                    Some(Command::Turn(dir)) if self.state.status() == GameStatus::Running => {
                        turn = Some(dir)
                    }
                    Some(Command::TogglePause) => self.toggle_pause(),
                    Some(Command::Restart) if self.end_screen_showing => self.restart(),
                    Some(Command::Kill) => self.state.kill(),
                    _ => {}
                }
            }

            self.state.step(turn);

            let status = self.state.status();
            if status == GameStatus::Running {
                self.draw();
            } else if status.is_over() && !self.end_screen_showing {
                self.game_over();
            }
            self.term.flush().context("Failed to draw frame")?;

            sleep(frame.saturating_sub(started.elapsed()));
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn toggle_pause(&mut self) {
        if self.state.status().is_over() {
            return;
        }

        self.state.toggle_pause();

        if self.state.status() == GameStatus::Paused {
            self.term.show_message(&["Paused", "Press p to resume", "or Esc to quit"]);
        } else {
            self.term.hide_message();
        }
    }

    fn restart(&mut self) {
        self.state.restart();
        self.end_screen_showing = false;
        self.term.hide_message();
        self.draw();
    }

    fn game_over(&mut self) {
        // Draw the dead snake before the message covers the field
        self.draw();

        let score = self.state.score();
        let mut lines = vec![match self.state.status() {
            GameStatus::Won => format!("You won with {} points", score),
            _ => format!("You died with {} points", score),
        }];

        match self.state.death_cause() {
            Some(Collision::Wall) => lines.push("You hit the wall".to_string()),
            Some(Collision::SelfCollision) => lines.push("You bit yourself".to_string()),
            None => {}
        }

        if let Some(scores) = &self.scores {
            match scores.append(score) {
                Ok(()) => self.best = self.best.max(Some(score)),
                Err(e) => {
                    log::error!("could not save score to {}: {}", scores.path().display(), e);
                    lines.push(format!("Could not save score: {}", e));
                }
            }
        }

        lines.extend(["".to_string(), "press enter to restart".to_string(), "press ESC to exit".to_string()]);

        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.term.show_message(&lines);
        self.end_screen_showing = true;
    }

    fn draw(&mut self) {
        let width = self.state.config().width;
        let (x0, y0) = (FIELD_ORIGIN.0 + 1, FIELD_ORIGIN.1 + 1);

        for (i, ch) in field_chars(&self.state).into_iter().enumerate() {
            let (x, y) = (i % width as usize, i / width as usize);
            self.term.print_at((x0 + x as u16, y0 + y as u16), ch);
        }

        let line = score_line(self.state.score(), self.best);
        let line = format!("{:<width$}", line, width = width as usize + 2);
        self.term.print_str_at((0, 0), &line);
    }
}

/// The game loop's error if it failed, otherwise the terminal restore's.
fn first_error(result: Result<()>, restored: Result<()>) -> Result<()> {
    result?;
    restored
}

fn map_key(ev: &KeyEvent) -> Option<Command> {
    if ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Turn(Right)),
        KeyCode::Char('p') => Some(Command::TogglePause),
        KeyCode::Enter => Some(Command::Restart),
        // Shift+K, for debugging the end screen
        KeyCode::Char('K') => Some(Command::Kill),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// The field row by row, one char per cell. Cells off the grid are not drawn.
fn field_chars(state: &GameState) -> Vec<char> {
    let (width, height) = (state.width(), state.height());
    let mut field = vec![EMPTY_CHAR; (width * height) as usize];

    let mut put = |cell: Cell, ch: char| {
        if cell.in_bounds(width, height) {
            field[(cell.y * width + cell.x) as usize] = ch;
        }
    };

    if let Some(food) = state.food() {
        put(food, FOOD_CHAR);
    }

    let snake = state.snake();
    if state.status() == GameStatus::Dead {
        snake.cells().for_each(|cell| put(cell, DEAD_SNAKE_CHAR));
    } else {
        snake.cells().for_each(|cell| put(cell, SNAKE_BODY_CHAR));
        put(snake.head(), snake.head_char());
    }

    field
}

fn score_line(score: u32, best: Option<u32>) -> String {
    match best {
        Some(best) => format!("Score: {}  Best: {}", score, best.max(score)),
        None => format!("Score: {}", score),
    }
}

/// Shrinks the grid when the terminal cannot hold it plus its border and the
/// score line.
fn fit_to_terminal(config: &mut GameConfig, (cols, rows): Coords) -> Result<()> {
    let max_width = cols.saturating_sub(2);
    let max_height = rows.saturating_sub(3);

    if config.width <= max_width && config.height <= max_height {
        return Ok(());
    }

    log::warn!(
        "terminal is {}x{}, shrinking the grid from {}x{}",
        cols, rows, config.width, config.height
    );
    config.width = config.width.min(max_width);
    config.height = config.height.min(max_height);

    config.validate().context("Terminal is too small for this game")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn loop_error_outranks_restore_error() {
        let err = first_error(Err(anyhow::anyhow!("loop failed")), Err(anyhow::anyhow!("restore failed")))
            .unwrap_err();
        assert_eq!(err.to_string(), "loop failed");

        let err = first_error(Ok(()), Err(anyhow::anyhow!("restore failed"))).unwrap_err();
        assert_eq!(err.to_string(), "restore failed");

        assert!(first_error(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Command::Turn(Up)));
        assert_eq!(map_key(&key(KeyCode::Char('a'))), Some(Command::Turn(Left)));
        assert_eq!(map_key(&key(KeyCode::Char('s'))), Some(Command::Turn(Down)));
        assert_eq!(map_key(&key(KeyCode::Right)), Some(Command::Turn(Right)));
        assert_eq!(map_key(&key(KeyCode::Char('p'))), Some(Command::TogglePause));
        assert_eq!(map_key(&key(KeyCode::Enter)), Some(Command::Restart));
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(map_key(&KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)), Some(Command::Kill));
        assert_eq!(map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Command::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('c'))), None);
        assert_eq!(map_key(&key(KeyCode::Char('k'))), None);
    }

    #[test]
    fn field_shows_snake_and_food() {
        let state = GameState::seeded(GameConfig::new(8, 3), 1);
        let food = state.food().unwrap();

        let field = field_chars(&state);

        assert_eq!(field.len(), 24);
        assert_eq!(&field[0..5], &['█', '█', '█', '█', '>']);
        assert_eq!(field[(food.y * 8 + food.x) as usize], FOOD_CHAR);
        assert_eq!(field.iter().filter(|&&ch| ch == EMPTY_CHAR).count(), 24 - 6);
    }

    #[test]
    fn dead_snake_is_crossed_out() {
        let mut state = GameState::seeded(GameConfig::new(8, 3), 1);
        state.kill();

        let field = field_chars(&state);

        assert_eq!(&field[0..5], &['X'; 5]);
    }

    #[test]
    fn score_line_includes_best() {
        assert_eq!(score_line(10, None), "Score: 10");
        assert_eq!(score_line(10, Some(25)), "Score: 10  Best: 25");
        assert_eq!(score_line(30, Some(25)), "Score: 30  Best: 30");
    }

    #[test]
    fn shrinks_grid_to_terminal() {
        let mut config = GameConfig::default();
        fit_to_terminal(&mut config, (80, 24)).unwrap();
        assert_eq!((config.width, config.height), (40, 21));

        let mut config = GameConfig::default();
        fit_to_terminal(&mut config, (200, 60)).unwrap();
        assert_eq!((config.width, config.height), (40, 30));

        let mut config = GameConfig::default();
        assert!(fit_to_terminal(&mut config, (5, 3)).is_err());
    }
}
