//! Game pieces: a shape and a color

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Star];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Star => "star",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }
}

/// Number of distinct shape/color combinations
pub const COMBINATIONS: usize = Shape::ALL.len() * Color::ALL.len();

/// Id carried by the target piece
pub const TARGET_ID: &str = "target";

/// A shape/color pair shown on the board
///
/// `id` is a rendering key only. Two pieces are the same answer when
/// [`Piece::matches`] says so, regardless of id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub shape: Shape,
    pub color: Color,
}

impl Piece {
    pub fn new(id: impl Into<String>, shape: Shape, color: Color) -> Self {
        Self {
            id: id.into(),
            shape,
            color,
        }
    }

    pub fn target(shape: Shape, color: Color) -> Self {
        Self::new(TARGET_ID, shape, color)
    }

    /// Shape and color equivalence
    pub fn matches(&self, other: &Piece) -> bool {
        self.shape == other.shape && self.color == other.color
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color.as_str(), self.shape.as_str())
    }
}
