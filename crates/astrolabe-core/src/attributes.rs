//! Diagram and edge attribute enumerations.
//!
//! These are the closed vocabularies shared between the declaration API, the
//! manifest format and the DOT translation:
//!
//! - [`Direction`] - rank direction of the whole diagram
//! - [`EdgeDirection`] - where arrowheads are drawn on an edge
//! - [`LineStyle`] - stroke style of an edge
//!
//! All three parse from the spellings used in configuration files and render
//! to the attribute values Graphviz expects.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// An attribute string that is not part of the expected vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {attribute} `{value}`, expected one of: {expected}")]
pub struct AttributeError {
    attribute: &'static str,
    value: String,
    expected: &'static str,
}

impl AttributeError {
    fn new(attribute: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            attribute,
            value: value.to_string(),
            expected,
        }
    }
}

/// Normalizes `Top-To-Bottom`, `top_to_bottom` and `top to bottom` to one form.
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Rank direction of a diagram.
///
/// # Examples
///
/// ```
/// use astrolabe_core::attributes::Direction;
///
/// let direction: Direction = "left-to-right".parse().unwrap();
/// assert_eq!(direction, Direction::LeftToRight);
/// assert_eq!(direction.rankdir(), "LR");
/// assert_eq!("TB".parse::<Direction>().unwrap(), Direction::TopToBottom);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Direction {
    /// Ranks flow downwards (default)
    #[default]
    TopToBottom,
    /// Ranks flow to the right
    LeftToRight,
    /// Ranks flow upwards
    BottomToTop,
    /// Ranks flow to the left
    RightToLeft,
}

impl Direction {
    /// Returns the Graphviz `rankdir` value.
    pub fn rankdir(self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::LeftToRight => "LR",
            Self::BottomToTop => "BT",
            Self::RightToLeft => "RL",
        }
    }

    /// Whether ranks are laid out along the horizontal axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }
}

impl FromStr for Direction {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "tb" | "top_to_bottom" => Ok(Self::TopToBottom),
            "lr" | "left_to_right" => Ok(Self::LeftToRight),
            "bt" | "bottom_to_top" => Ok(Self::BottomToTop),
            "rl" | "right_to_left" => Ok(Self::RightToLeft),
            _ => Err(AttributeError::new(
                "direction",
                s,
                "top-to-bottom, left-to-right, bottom-to-top, right-to-left",
            )),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = AttributeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopToBottom => "top-to-bottom",
            Self::LeftToRight => "left-to-right",
            Self::BottomToTop => "bottom-to-top",
            Self::RightToLeft => "right-to-left",
        };
        write!(f, "{name}")
    }
}

/// Where arrowheads are drawn on an edge.
///
/// `Forward` is a directed edge, `None` an undirected one. `Back` and `Both`
/// exist because architecture diagrams routinely show replies and
/// bidirectional links.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum EdgeDirection {
    #[default]
    Forward,
    Back,
    Both,
    None,
}

impl EdgeDirection {
    /// Returns the Graphviz `dir` value.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Back => "back",
            Self::Both => "both",
            Self::None => "none",
        }
    }

    /// Whether the edge carries at least one arrowhead.
    pub fn is_directed(self) -> bool {
        self != Self::None
    }
}

impl FromStr for EdgeDirection {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "forward" => Ok(Self::Forward),
            "back" | "reverse" => Ok(Self::Back),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            _ => Err(AttributeError::new(
                "edge direction",
                s,
                "forward, back, both, none",
            )),
        }
    }
}

impl TryFrom<String> for EdgeDirection {
    type Error = AttributeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Stroke style of an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl LineStyle {
    /// Returns the Graphviz `style` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Bold => "bold",
        }
    }
}

impl FromStr for LineStyle {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            _ => Err(AttributeError::new(
                "line style",
                s,
                "solid, dashed, dotted, bold",
            )),
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_spellings() {
        for (input, expected) in [
            ("TB", Direction::TopToBottom),
            ("top-to-bottom", Direction::TopToBottom),
            ("Left To Right", Direction::LeftToRight),
            ("bottom_to_top", Direction::BottomToTop),
            ("rl", Direction::RightToLeft),
        ] {
            assert_eq!(input.parse::<Direction>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_direction_rejects_unknown() {
        let err = "diagonal".parse::<Direction>().unwrap_err();
        assert!(err.to_string().contains("diagonal"));
        assert!(err.to_string().contains("direction"));
    }

    #[test]
    fn test_direction_rankdir_and_display() {
        assert_eq!(Direction::default().rankdir(), "TB");
        assert_eq!(Direction::RightToLeft.rankdir(), "RL");
        assert_eq!(Direction::LeftToRight.to_string(), "left-to-right");
        assert!(Direction::LeftToRight.is_horizontal());
        assert!(!Direction::BottomToTop.is_horizontal());
    }

    #[test]
    fn test_edge_direction() {
        assert_eq!("reverse".parse::<EdgeDirection>().unwrap(), EdgeDirection::Back);
        assert_eq!(EdgeDirection::Both.dir(), "both");
        assert!(EdgeDirection::Forward.is_directed());
        assert!(!EdgeDirection::None.is_directed());
        assert!("sideways".parse::<EdgeDirection>().is_err());
    }

    #[test]
    fn test_line_style() {
        assert_eq!("Dashed".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!(LineStyle::Bold.as_str(), "bold");
        assert_eq!(LineStyle::default(), LineStyle::Solid);
        assert!("wavy".parse::<LineStyle>().is_err());
    }
}
