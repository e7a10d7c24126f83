//! Pixel-accurate hit testing for 2D drawing contexts.
//!
//! [`HitCanvas`] wraps a [`Context2d`] and mirrors everything drawn
//! through it onto a hidden surface, painting each shape in a flat color
//! that encodes the current layer ID. Reading one pixel of that surface
//! tells which layer is on top at a point, however irregular the shapes.
//!
//! With the default `software` feature, [`SoftwareContext`] provides a
//! CPU-rendered context to draw on.

mod backend;
pub mod codec;
mod color;
mod hit_canvas;
mod image;
mod path;
mod property;
mod rect;
mod text;
mod types;

pub use crate::image::{Image, ImageError, ImagePlacement};
pub use backend::{Context2d, Offscreen, SurfaceConfig};
#[cfg(feature = "software")]
pub use backend::software::{FontError, FontId, FontStore, SoftwareContext, SurfaceError};
pub use codec::{Codec, CodecOverrides, DefaultCodec, MAX_LAYER_ID};
pub use color::Color;
pub use glam::{Affine2, Vec2};
pub use hit_canvas::{HitCanvas, HitCanvasBuilder};
pub use path::{Path, PathSegment};
pub use property::{MirrorPolicy, Operation, Property, PropertyKind};
pub use rect::Rect;
pub use text::{Font, FontParseError, TextMetrics};
pub use types::{
    CompositeOperation, FillRule, Filter, GradientStop, LineCap, LineJoin, Paint, TextAlign,
    TextBaseline,
};

pub extern crate glam;
