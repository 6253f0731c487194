use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_SIZE: u32 = 16;

/// World-space point in pixels. `+y` points down the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn lerp(self, to: Vec2, weight: f32) -> Vec2 {
        self + (to - self) * weight
    }

    /// Steps toward `to` by at most `max_delta`, landing exactly on `to` when close enough.
    pub fn move_toward(self, to: Vec2, max_delta: f32) -> Vec2 {
        let delta = to - self;
        let distance = delta.length();
        if distance <= max_delta || distance <= f32::EPSILON {
            return to;
        }
        self + delta * (max_delta / distance)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub const fn as_token(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses the tile custom-data token (`"UP"`, `"DOWN"`, `"LEFT"`, `"RIGHT"`).
    pub fn from_ledge_token(token: &str) -> Option<Direction> {
        match token {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_token().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown direction '{value}'"))
    }
}

/// Side length of one movement cell, shared by every piece of geometry math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize(u32);

impl GridSize {
    pub fn new(size: u32) -> Self {
        Self(size.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }

    pub fn half(self) -> f32 {
        self.as_f32() * 0.5
    }

    pub fn snap(self, position: Vec2) -> Vec2 {
        let size = self.as_f32();
        Vec2::new(
            (position.x / size).round() * size,
            (position.y / size).round() * size,
        )
    }

    pub fn is_aligned(self, position: Vec2) -> bool {
        let size = self.as_f32();
        position.x % size == 0.0 && position.y % size == 0.0
    }

    /// Cell containing the centre of a tile whose top-left corner is `position`.
    pub fn cell_of(self, position: Vec2) -> (i32, i32) {
        let size = self.as_f32();
        (
            ((position.x + self.half()) / size).floor() as i32,
            ((position.y + self.half()) / size).floor() as i32,
        )
    }

    pub fn cell_origin(self, cell: (i32, i32)) -> Vec2 {
        let size = self.as_f32();
        Vec2::new(cell.0 as f32 * size, cell.1 as f32 * size)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self(DEFAULT_GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_toward_never_overshoots() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(16.0, 0.0);
        assert_eq!(from.move_toward(to, 4.0), Vec2::new(4.0, 0.0));
        assert_eq!(from.move_toward(to, 40.0), to);
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Vec2::new(0.0, 0.0).lerp(Vec2::new(32.0, 8.0), 0.5);
        assert_eq!(mid, Vec2::new(16.0, 4.0));
    }

    #[test]
    fn snap_rounds_to_nearest_cell() {
        let grid = GridSize::new(16);
        assert_eq!(grid.snap(Vec2::new(15.4, -7.9)), Vec2::new(16.0, 0.0));
        assert_eq!(grid.snap(Vec2::new(23.9, 40.1)), Vec2::new(16.0, 48.0));
    }

    #[test]
    fn cell_of_uses_tile_centre() {
        let grid = GridSize::new(16);
        assert_eq!(grid.cell_of(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(Vec2::new(7.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(Vec2::new(8.0, 0.0)), (1, 0));
        assert_eq!(grid.cell_of(Vec2::new(-16.0, 32.0)), (-1, 2));
    }

    #[test]
    fn direction_tokens_round_trip() {
        assert_eq!(Direction::from_ledge_token("RIGHT"), Some(Direction::Right));
        assert_eq!(Direction::from_ledge_token("right"), None);
        assert_eq!("Up".parse::<Direction>(), Ok(Direction::Up));
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn zero_grid_size_is_clamped() {
        assert_eq!(GridSize::new(0).get(), 1);
    }
}
