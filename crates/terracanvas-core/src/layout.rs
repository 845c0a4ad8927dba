//! Layout option types shared by every layout engine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name a layout option value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownLayoutOption {
    #[error("unknown layout direction `{0}`, expected one of LR, TB, RL, BT")]
    Direction(String),
    #[error("unknown layout engine `{0}`, expected `layered` or `sugiyama`")]
    Engine(String),
}

/// The flow direction of ranks in a layered layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Ranks advance from left to right.
    #[default]
    #[serde(rename = "LR", alias = "left-to-right")]
    LeftToRight,
    /// Ranks advance from top to bottom.
    #[serde(rename = "TB", alias = "top-to-bottom")]
    TopToBottom,
    /// Ranks advance from right to left.
    #[serde(rename = "RL", alias = "right-to-left")]
    RightToLeft,
    /// Ranks advance from bottom to top.
    #[serde(rename = "BT", alias = "bottom-to-top")]
    BottomToTop,
}

impl Direction {
    /// Whether ranks are laid out along the horizontal axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftToRight | Direction::RightToLeft)
    }

    /// Whether the rank axis runs against the coordinate axis.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::RightToLeft | Direction::BottomToTop)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::LeftToRight => "LR",
            Direction::TopToBottom => "TB",
            Direction::RightToLeft => "RL",
            Direction::BottomToTop => "BT",
        };
        f.write_str(s)
    }
}

impl FromStr for Direction {
    type Err = UnknownLayoutOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LR" | "left-to-right" => Ok(Direction::LeftToRight),
            "TB" | "top-to-bottom" => Ok(Direction::TopToBottom),
            "RL" | "right-to-left" => Ok(Direction::RightToLeft),
            "BT" | "bottom-to-top" => Ok(Direction::BottomToTop),
            other => Err(UnknownLayoutOption::Direction(other.to_string())),
        }
    }
}

/// Available layout engine types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Built-in longest-path layered layout.
    #[default]
    Layered,
    /// Layered layout backed by the `rust-sugiyama` crate.
    Sugiyama,
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutEngine::Layered => f.write_str("layered"),
            LayoutEngine::Sugiyama => f.write_str("sugiyama"),
        }
    }
}

impl FromStr for LayoutEngine {
    type Err = UnknownLayoutOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layered" => Ok(LayoutEngine::Layered),
            "sugiyama" => Ok(LayoutEngine::Sugiyama),
            other => Err(UnknownLayoutOption::Engine(other.to_string())),
        }
    }
}

/// Spacing and direction options for a layout run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub direction: Direction,
    /// Gap between neighbouring nodes within one rank.
    pub node_spacing: f32,
    /// Gap between consecutive ranks.
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            node_spacing: 50.0,
            rank_spacing: 80.0,
            margin_x: 20.0,
            margin_y: 20.0,
        }
    }
}

impl LayoutOptions {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_node_spacing(mut self, spacing: f32) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_rank_spacing(mut self, spacing: f32) -> Self {
        self.rank_spacing = spacing;
        self
    }

    pub fn with_margins(mut self, margin_x: f32, margin_y: f32) -> Self {
        self.margin_x = margin_x;
        self.margin_y = margin_y;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing_accepts_both_spellings() {
        assert_eq!("TB".parse::<Direction>(), Ok(Direction::TopToBottom));
        assert_eq!(
            "right-to-left".parse::<Direction>(),
            Ok(Direction::RightToLeft)
        );
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn test_unknown_option_names_what_was_parsed() {
        let err = "diagonal".parse::<Direction>().unwrap_err();
        assert_eq!(err, UnknownLayoutOption::Direction("diagonal".to_string()));
        assert!(err.to_string().starts_with("unknown layout direction `diagonal`"));

        let err = "force".parse::<LayoutEngine>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown layout engine `force`, expected `layered` or `sugiyama`"
        );
        assert_eq!("sugiyama".parse::<LayoutEngine>(), Ok(LayoutEngine::Sugiyama));
    }

    #[test]
    fn test_direction_axes() {
        assert!(Direction::LeftToRight.is_horizontal());
        assert!(!Direction::BottomToTop.is_horizontal());
        assert!(Direction::BottomToTop.is_reversed());
        assert!(!Direction::TopToBottom.is_reversed());
    }

    #[test]
    fn test_layout_options_deserialize_with_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"direction":"top-to-bottom","nodeSpacing":10}"#).unwrap();
        assert_eq!(options.direction, Direction::TopToBottom);
        assert_eq!(options.node_spacing, 10.0);
        assert_eq!(options.rank_spacing, LayoutOptions::default().rank_spacing);
    }
}
