use std::collections::VecDeque;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::{Direction, GameConfig, GameOverReason, GameStatus, Point};

/// Authoritative snake board. Segments are stored tail first, head last.
#[derive(Debug, Clone)]
pub struct SnakeEnv {
    config: GameConfig,
    rng: ChaCha8Rng,
    snake: VecDeque<Point>,
    dir: Direction,
    turns: VecDeque<Direction>,
    food: Option<Point>,
    status: GameStatus,
    game_over_reason: Option<GameOverReason>,
    steps: u64,
}

impl SnakeEnv {
    const TURN_QUEUE_CAPACITY: usize = 2;

    pub fn new(config: GameConfig) -> Self {
        let mut env = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            snake: VecDeque::new(),
            dir: Direction::Right,
            turns: VecDeque::new(),
            food: None,
            status: GameStatus::Running,
            game_over_reason: None,
            steps: 0,
        };
        env.reset();
        env
    }

    pub fn reset(&mut self) {
        self.status = GameStatus::Running;
        self.game_over_reason = None;
        self.steps = 0;
        self.dir = Direction::Right;
        self.turns.clear();
        self.snake.clear();

        let cx = self.config.board_w / 2;
        let cy = self.config.board_h / 2;
        self.snake.push_back(Point::new(cx - 1, cy));
        self.snake.push_back(Point::new(cx, cy));
        self.snake.push_back(Point::new(cx + 1, cy));
        self.spawn_food();
    }

    /// Queue a direction change for the next step. Repeats and reversals
    /// against the last effective heading are dropped.
    pub fn turn(&mut self, next: Direction) {
        let last = self.turns.back().copied().unwrap_or(self.dir);
        if next == last || next == last.opposite() {
            return;
        }
        if self.turns.len() >= Self::TURN_QUEUE_CAPACITY {
            return;
        }
        self.turns.push_back(next);
    }

    pub fn step(&mut self) -> GameStatus {
        if self.status != GameStatus::Running {
            return self.status;
        }

        if let Some(next) = self.turns.pop_front() {
            if next != self.dir.opposite() {
                self.dir = next;
            }
        }

        let head = self
            .snake
            .back()
            .copied()
            .expect("snake should always have at least one segment");
        let (dx, dy) = self.dir.delta();
        let next_x = head.x as isize + dx;
        let next_y = head.y as isize + dy;

        if next_x < 0
            || next_y < 0
            || next_x >= self.config.board_w as isize
            || next_y >= self.config.board_h as isize
        {
            return self.finish(GameOverReason::HitWall);
        }

        let next = Point::new(next_x as usize, next_y as usize);
        let eating = self.food == Some(next);

        // The tail cell frees up this step unless the snake grows.
        let collision = self
            .snake
            .iter()
            .enumerate()
            .any(|(idx, segment)| !(idx == 0 && !eating) && *segment == next);
        if collision {
            return self.finish(GameOverReason::HitSelf);
        }

        self.snake.push_back(next);
        if eating {
            self.spawn_food();
        } else {
            let _ = self.snake.pop_front();
        }
        self.steps += 1;
        self.status
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Running
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn length(&self) -> usize {
        self.snake.len()
    }

    pub fn snake(&self) -> &VecDeque<Point> {
        &self.snake
    }

    pub fn head(&self) -> Option<Point> {
        self.snake.back().copied()
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn debug_set_food(&mut self, x: usize, y: usize) {
        self.food = Some(Point::new(x, y));
    }

    pub fn debug_set_snake(&mut self, segments_from_tail_to_head: &[Point], dir: Direction) {
        self.snake.clear();
        self.snake.extend(segments_from_tail_to_head.iter().copied());
        self.dir = dir;
        self.turns.clear();
        self.status = GameStatus::Running;
        self.game_over_reason = None;
        self.steps = 0;
    }

    fn finish(&mut self, reason: GameOverReason) -> GameStatus {
        self.status = GameStatus::GameOver;
        self.game_over_reason = Some(reason);
        self.status
    }

    fn spawn_food(&mut self) {
        let cells = self.config.board_w.saturating_mul(self.config.board_h);
        if self.snake.len() >= cells {
            self.food = None;
            self.status = GameStatus::Victory;
            return;
        }

        loop {
            let x = self.rng.gen_range(0..self.config.board_w);
            let y = self.rng.gen_range(0..self.config.board_h);
            let occupied = self.snake.iter().any(|s| s.x == x && s.y == y);
            if !occupied {
                self.food = Some(Point::new(x, y));
                break;
            }
        }
    }
}
