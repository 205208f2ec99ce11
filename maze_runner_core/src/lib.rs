use serde::{Deserialize, Serialize};

pub mod agent;
pub mod collision;
pub mod config;
pub mod game;
pub mod input;
pub mod map;
pub mod pickup;

/// Integer grid coordinate.
///
/// Signed so that positions inside the tunnel, past the left or right edge of
/// the maze, still map to a (virtual) column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: i64,
    pub row: i64,
}

impl Cell {
    pub fn new(col: i64, row: i64) -> Self {
        Cell { col, row }
    }
}

/// Continuous position in world units (the same units as the cell size).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    pub fn new(x: f64, y: f64) -> Self {
        WorldPos { x, y }
    }

    /// Returns the position moved `distance` units along `direction`.
    #[inline]
    pub fn step(self, direction: Direction, distance: f64) -> Self {
        WorldPos {
            x: self.x + direction.dx() * distance,
            y: self.y + direction.dy() * distance,
        }
    }

    /// Squared euclidean distance to `other`.
    #[inline]
    pub fn distance_sq(self, other: WorldPos) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Movement direction. At most one axis is ever non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Horizontal component: -1, 0 or 1.
    #[inline]
    pub fn dx(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            _ => 0.0,
        }
    }

    /// Vertical component: -1 (up), 0 or 1 (down).
    #[inline]
    pub fn dy(self) -> f64 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}
