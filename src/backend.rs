use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    image::{Image, ImagePlacement},
    Color, FillRule, Property, PropertyKind, Rect, TextMetrics,
};

#[cfg(test)]
pub(crate) mod recording;
#[cfg(feature = "software")]
pub mod software;

/// Settings used when acquiring a drawing context.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Whether the surface has an alpha channel. An opaque
    /// surface starts out (and clears to) solid black.
    pub alpha: bool,
    /// Whether shapes are rendered with anti-aliased edges.
    pub anti_alias: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            alpha: true,
            anti_alias: true,
        }
    }
}

/// A 2D drawing context, modeled after the HTML5 canvas API.
///
/// Paths are built in user space and interpreted under the transform
/// current at the time they are filled, stroked, or clipped.
pub trait Context2d {
    type Error: std::error::Error + 'static;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resizes the surface. Clears its pixels and resets all state.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), Self::Error>;

    fn property(&self, kind: PropertyKind) -> Property;

    fn set_property(&mut self, property: Property);

    fn save(&mut self);

    /// Pops the last saved state. Does nothing if the stack is empty.
    fn restore(&mut self);

    fn translate(&mut self, translation: Vec2);

    fn scale(&mut self, scale: Vec2);

    fn rotate(&mut self, angle_in_radians: f32);

    /// Multiplies the current transform by `transform`.
    fn transform(&mut self, transform: Affine2);

    fn set_transform(&mut self, transform: Affine2);

    fn reset_transform(&mut self) {
        self.set_transform(Affine2::IDENTITY);
    }

    fn current_transform(&self) -> Affine2;

    fn begin_path(&mut self);

    fn move_to(&mut self, point: Vec2);

    fn line_to(&mut self, point: Vec2);

    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2);

    fn bezier_curve_to(&mut self, control1: Vec2, control2: Vec2, end: Vec2);

    /// Adds a circular arc to the path. Fails on a negative radius.
    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) -> Result<(), Self::Error>;

    fn rect(&mut self, rect: Rect);

    fn close_path(&mut self);

    /// Intersects the clip region with the current path.
    fn clip(&mut self, fill_rule: FillRule);

    fn is_point_in_path(&self, point: Vec2, fill_rule: FillRule) -> bool;

    fn fill(&mut self, fill_rule: FillRule);

    fn stroke(&mut self);

    fn fill_rect(&mut self, rect: Rect);

    fn stroke_rect(&mut self, rect: Rect);

    /// Sets the pixels covered by `rect` to transparent black.
    fn clear_rect(&mut self, rect: Rect);

    fn fill_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>);

    fn stroke_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>);

    fn measure_text(&self, text: &str) -> TextMetrics;

    fn draw_image(&mut self, image: &Image, placement: ImagePlacement) -> Result<(), Self::Error>;

    /// Reads back a region of the surface in device pixels.
    ///
    /// Pixels outside the surface read as transparent black.
    fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32)
        -> Result<Image, Self::Error>;

    /// Reads a single device pixel, or `None` outside the surface.
    fn pixel(&self, x: i32, y: i32) -> Option<Color>;
}

/// A context that can create blank offscreen contexts of its own kind.
pub trait Offscreen: Context2d + Sized {
    fn create_offscreen(
        &self,
        width: u32,
        height: u32,
        config: SurfaceConfig,
    ) -> Result<Self, Self::Error>;

    /// The settings this context was acquired with.
    fn config(&self) -> SurfaceConfig;
}
