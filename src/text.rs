//! Font selection and text measurement types.
//!
//! Fonts are selected by family name and pixel size, using the
//! same shorthand as the canvas `font` property (`"12px serif"`).
//! Only the size and family parts of the shorthand are understood;
//! style, variant, and weight keywords are accepted and ignored.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A font selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    /// Size in pixels.
    pub size: f32,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 10.)
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size, self.family)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FontParseError {
    #[error("font shorthand has no size (expected e.g. `12px serif`)")]
    MissingSize,
    #[error("unsupported font size `{0}` - expected a value in `px` or `pt`")]
    InvalidSize(String),
    #[error("font shorthand has no family")]
    MissingFamily,
}

const IGNORED_KEYWORDS: &[&str] = &[
    "normal",
    "italic",
    "oblique",
    "small-caps",
    "bold",
    "bolder",
    "lighter",
];

impl FromStr for Font {
    type Err = FontParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace().peekable();
        while let Some(word) = words.peek() {
            let numeric_weight = word.chars().all(|c| c.is_ascii_digit());
            if IGNORED_KEYWORDS.contains(word) || numeric_weight {
                words.next();
            } else {
                break;
            }
        }

        let size = words.next().ok_or(FontParseError::MissingSize)?;
        // `12px/1.5` carries a line height we have no use for
        let size = size.split('/').next().unwrap_or(size);
        let size = parse_size(size)?;

        let family = words.collect::<Vec<_>>().join(" ");
        let family = family.trim_matches(|c| c == '"' || c == '\'');
        if family.is_empty() {
            return Err(FontParseError::MissingFamily);
        }

        Ok(Font::new(family, size))
    }
}

fn parse_size(size: &str) -> Result<f32, FontParseError> {
    let invalid = || FontParseError::InvalidSize(size.to_owned());
    let (number, points) = if let Some(number) = size.strip_suffix("px") {
        (number, false)
    } else if let Some(number) = size.strip_suffix("pt") {
        (number, true)
    } else {
        return Err(invalid());
    };
    let number: f32 = number.parse().map_err(|_| invalid())?;
    if !number.is_finite() || number < 0. {
        return Err(invalid());
    }
    if points {
        Ok(number * 4. / 3.)
    } else {
        Ok(number)
    }
}

/// Measurements of a run of text, as returned by `measure_text`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the text.
    pub width: f32,
    /// Distance from the baseline to the top of the font's ascent.
    pub font_ascent: f32,
    /// Distance from the baseline to the bottom of the font's descent.
    pub font_descent: f32,
}
