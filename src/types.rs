use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Color;

/// Determines how to fill paths with self-intersections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::NonZero
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl Default for LineCap {
    fn default() -> Self {
        LineCap::Butt
    }
}

impl Default for LineJoin {
    fn default() -> Self {
        LineJoin::Miter
    }
}

/// How new pixels are combined with the existing content
/// of the surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeOperation {
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl Default for CompositeOperation {
    fn default() -> Self {
        CompositeOperation::SourceOver
    }
}

/// Horizontal alignment of text relative to the drawing position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlign {
    Start,
    End,
    Left,
    Right,
    Center,
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::Start
    }
}

/// Vertical alignment of text relative to the drawing position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

impl Default for TextBaseline {
    fn default() -> Self {
        TextBaseline::Alphabetic
    }
}

/// A post-processing filter applied to drawn content.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    None,
    Blur(f32),
    Brightness(f32),
    Grayscale(f32),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::None
    }
}

/// A "stop" in a gradient, consisting
/// of a position (0.0..=1.0) along the gradient
/// and the color value at that position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientStop {
    position: f32,
    color: Color,
}

impl GradientStop {
    pub fn new(position: f32, color: impl Into<Color>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// A fill or stroke style.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient {
        start: Vec2,
        end: Vec2,
        stops: Vec<GradientStop>,
    },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}
