use serde::{Deserialize, Serialize};

pub const MIN_BOARD_SIDE: usize = 4;
pub const MAX_BOARD_SIDE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// (dx, dy) in board cells, y grows downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Wire form used by the scene: `[row, col]`.
    pub fn cell(self) -> [i64; 2] {
        [self.y as i64, self.x as i64]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub board_w: usize,
    pub board_h: usize,
    pub seed: u64,
}

impl GameConfig {
    /// Sides below [`MIN_BOARD_SIDE`] are raised to it so the starting snake
    /// always fits.
    pub fn new(board_w: usize, board_h: usize, seed: u64) -> Self {
        Self {
            board_w: board_w.max(MIN_BOARD_SIDE),
            board_h: board_h.max(MIN_BOARD_SIDE),
            seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    GameOver,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    HitWall,
    HitSelf,
}
