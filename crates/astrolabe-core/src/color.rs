//! Color handling for Astrolabe diagrams
//!
//! This module provides the [`Color`] type which validates a CSS color string
//! with the `DynamicColor` parser from the color crate while keeping the
//! original spelling, so the color can be handed to Graphviz exactly as the
//! author wrote it.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Rgba8, Srgb};
use serde::Deserialize;

/// A validated CSS color
///
/// Accepts everything the color crate understands: "#ff0000", "rgb(255, 0, 0)",
/// "white", "transparent", etc.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    source: String,
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    ///
    /// # Errors
    ///
    /// Returns a message naming the rejected string if it is not a CSS color.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrolabe_core::color::Color;
    ///
    /// let white = Color::new("white").unwrap();
    /// assert_eq!(white.as_str(), "white");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        let trimmed = color_str.trim();
        match DynamicColor::from_str(trimmed) {
            Ok(color) => Ok(Self {
                source: trimmed.to_string(),
                color,
            }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns the color exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Spelling understood by Graphviz.
    ///
    /// Six and eight digit hex colors and plain color names are passed
    /// through; everything else (`#abc`, `rgb(...)`, `hsl(...)`, `oklch(...)`)
    /// is converted to `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    ///
    /// # Examples
    ///
    /// ```
    /// use astrolabe_core::color::Color;
    ///
    /// assert_eq!(Color::new("white").unwrap().graphviz_value(), "white");
    /// assert_eq!(Color::new("rgb(255, 0, 0)").unwrap().graphviz_value(), "#ff0000");
    /// ```
    pub fn graphviz_value(&self) -> String {
        let source = self.source.as_str();
        let is_long_hex = source.strip_prefix('#').is_some_and(|hex| {
            matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        });
        let is_name = !source.is_empty() && source.chars().all(|c| c.is_ascii_alphabetic());
        if is_long_hex || is_name {
            return self.source.clone();
        }

        let Rgba8 { r, g, b, a } = self.color.to_alpha_color::<Srgb>().to_rgba8();
        if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
