//! A software [`Context2d`] that uses [`tiny-skia`](https://docs.rs/tiny-skia).
//!
//! Shadow and filter properties are tracked as state (so they can be
//! read back and saved/restored) but are not rasterized.

use std::{mem, rc::Rc, sync::Arc};

use glam::{vec2, Affine2, Vec2};
use tiny_skia::{
    BlendMode, ClipMask, ColorU8, FilterQuality, LinearGradient, Paint as SkiaPaint, Pattern,
    Pixmap, PremultipliedColorU8, Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::{
    backend::{Context2d, Offscreen, SurfaceConfig},
    image::{Image, ImagePlacement},
    Color, CompositeOperation, FillRule, Filter, Font, GradientStop, LineCap, LineJoin, Paint,
    Path, PathSegment, Property, PropertyKind, Rect, TextAlign, TextBaseline, TextMetrics,
};

mod font;

pub use font::{FontError, FontId, FontStore};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} surface")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("arc radius must not be negative (got {0})")]
    NegativeRadius(f32),
    #[error("cannot draw an image with no pixels")]
    EmptyImage,
    #[error("image data region must have a non-zero width and height")]
    EmptyRegion,
}

/// A CPU-rendered drawing context.
pub struct SoftwareContext {
    /// `None` while either dimension is zero.
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    config: SurfaceConfig,
    fonts: Arc<FontStore>,

    state_stack: Vec<State>,
    state: State,
    path: Path,
}

impl SoftwareContext {
    /// Creates a context with no fonts. Text draws nothing.
    pub fn new(width: u32, height: u32, config: SurfaceConfig) -> Result<Self, SurfaceError> {
        Self::with_fonts(width, height, config, Arc::new(FontStore::new()))
    }

    pub fn with_fonts(
        width: u32,
        height: u32,
        config: SurfaceConfig,
        fonts: Arc<FontStore>,
    ) -> Result<Self, SurfaceError> {
        let mut context = Self {
            pixmap: None,
            width: 0,
            height: 0,
            config,
            fonts,
            state_stack: Vec::new(),
            state: State::default(),
            path: Path::new(),
        };
        context.resize(width, height)?;
        Ok(context)
    }

    pub fn fonts(&self) -> &Arc<FontStore> {
        &self.fonts
    }

    /// Copies the surface into an unpremultiplied RGBA image.
    pub fn to_image(&self) -> Image {
        let pixels = self
            .pixmap
            .iter()
            .flat_map(|pixmap| pixmap.pixels().iter().copied().map(demultiply));
        Image::from_pixels(self.width, self.height, pixels)
    }

    fn background(&self) -> tiny_skia::Color {
        if self.config.alpha {
            tiny_skia::Color::TRANSPARENT
        } else {
            tiny_skia::Color::BLACK
        }
    }

    fn device_transform(&self) -> Transform {
        convert_transform(self.state.transform)
    }

    fn paint(&self, paint: &Paint) -> Option<SkiaPaint<'static>> {
        let alpha = self.state.global_alpha;
        let shader = match paint {
            Paint::Solid(color) => Shader::SolidColor(convert_color(color.with_opacity(alpha))),
            Paint::LinearGradient { start, end, stops } => LinearGradient::new(
                convert_point(*start),
                convert_point(*end),
                stops
                    .iter()
                    .map(|stop| convert_gradient_stop(*stop, alpha))
                    .collect(),
                SpreadMode::Pad,
                Transform::identity(),
            )?,
        };
        Some(SkiaPaint {
            shader,
            blend_mode: convert_composite(self.state.composite),
            anti_alias: self.config.anti_alias,
            ..Default::default()
        })
    }

    fn stroke_settings(&self) -> Stroke {
        let dash = if self.state.line_dash.is_empty() {
            None
        } else {
            StrokeDash::new(self.state.line_dash.clone(), self.state.line_dash_offset)
        };
        Stroke {
            width: self.state.line_width,
            miter_limit: self.state.miter_limit,
            line_cap: convert_line_cap(self.state.line_cap),
            line_join: convert_line_join(self.state.line_join),
            dash,
        }
    }

    fn fill_path_with(&mut self, path: &Path, fill_rule: FillRule) {
        let paint = match self.paint(&self.state.fill_style) {
            Some(paint) => paint,
            None => return,
        };
        self.draw(path, |pixmap, path, transform, clip| {
            pixmap.fill_path(path, &paint, convert_fill_rule(fill_rule), transform, clip);
        });
    }

    fn stroke_path_with(&mut self, path: &Path) {
        let paint = match self.paint(&self.state.stroke_style) {
            Some(paint) => paint,
            None => return,
        };
        let stroke = self.stroke_settings();
        self.draw(path, |pixmap, path, transform, clip| {
            pixmap.stroke_path(path, &paint, &stroke, transform, clip);
        });
    }

    /// Runs a draw callback with the converted path, the current transform,
    /// and the current clip. Skips drawing entirely if nothing would show.
    fn draw(
        &mut self,
        path: &Path,
        callback: impl FnOnce(&mut Pixmap, &tiny_skia::Path, Transform, Option<&ClipMask>),
    ) {
        let transform = self.device_transform();
        let clip = match &self.state.clip {
            Clip::Disabled => None,
            Clip::Mask(mask) => Some(&**mask),
            Clip::Everything => return,
        };
        let (pixmap, path) = match (&mut self.pixmap, convert_path(path)) {
            (Some(pixmap), Some(path)) => (pixmap, path),
            _ => return,
        };
        callback(pixmap, &path, transform, clip);
    }

    fn text_path(&self, text: &str, position: Vec2, max_width: Option<f32>) -> Path {
        let mut path = Path::new();
        let font = &self.state.font;
        let metrics = self.fonts.measure(font, text);
        let x_scale = match max_width {
            Some(max_width) if max_width.is_nan() || max_width <= 0. => return path,
            Some(max_width) if metrics.width > max_width => max_width / metrics.width,
            _ => 1.,
        };
        let width = metrics.width * x_scale;

        let dx = match self.state.text_align {
            TextAlign::Start | TextAlign::Left => 0.,
            TextAlign::End | TextAlign::Right => -width,
            TextAlign::Center => -width / 2.,
        };
        let dy = match self.state.text_baseline {
            TextBaseline::Top => metrics.font_ascent,
            TextBaseline::Hanging => metrics.font_ascent * 0.8,
            TextBaseline::Middle => (metrics.font_ascent - metrics.font_descent) / 2.,
            TextBaseline::Alphabetic => 0.,
            TextBaseline::Ideographic | TextBaseline::Bottom => -metrics.font_descent,
        };

        self.fonts
            .outline(font, text, position + vec2(dx, dy), x_scale, &mut path);
        path
    }

    fn set_clip(&mut self, fill_rule: FillRule) {
        let transform = self.device_transform();
        let path = match convert_path(&self.path).and_then(|path| path.transform(transform)) {
            Some(path) => path,
            None => {
                self.state.clip = Clip::Everything;
                return;
            }
        };
        let fill_rule = convert_fill_rule(fill_rule);
        let anti_alias = self.config.anti_alias;

        self.state.clip = match mem::take(&mut self.state.clip) {
            Clip::Everything => Clip::Everything,
            Clip::Disabled => {
                let mut mask = ClipMask::new();
                match mask.set_path(self.width, self.height, &path, fill_rule, anti_alias) {
                    Some(()) => Clip::Mask(Rc::new(mask)),
                    None => Clip::Everything,
                }
            }
            Clip::Mask(mut mask) => {
                match Rc::make_mut(&mut mask).intersect_path(&path, fill_rule, anti_alias) {
                    Some(()) => Clip::Mask(mask),
                    None => Clip::Everything,
                }
            }
        };
    }

    fn image_pixmap(image: &Image) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(image.width(), image.height())?;
        for (pixel, rgba) in pixmap
            .pixels_mut()
            .iter_mut()
            .zip(image.data().chunks_exact(4))
        {
            *pixel = ColorU8::from_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).premultiply();
        }
        Some(pixmap)
    }
}

impl Context2d for SoftwareContext {
    type Error = SurfaceError;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), Self::Error> {
        self.pixmap = if width == 0 || height == 0 {
            None
        } else {
            let mut pixmap = Pixmap::new(width, height)
                .ok_or(SurfaceError::InvalidDimensions { width, height })?;
            pixmap.fill(self.background());
            Some(pixmap)
        };
        self.width = width;
        self.height = height;
        self.state_stack.clear();
        self.state = State::default();
        self.path.clear();
        Ok(())
    }

    fn property(&self, kind: PropertyKind) -> Property {
        let state = &self.state;
        match kind {
            PropertyKind::FillStyle => Property::FillStyle(state.fill_style.clone()),
            PropertyKind::StrokeStyle => Property::StrokeStyle(state.stroke_style.clone()),
            PropertyKind::LineWidth => Property::LineWidth(state.line_width),
            PropertyKind::LineCap => Property::LineCap(state.line_cap),
            PropertyKind::LineJoin => Property::LineJoin(state.line_join),
            PropertyKind::MiterLimit => Property::MiterLimit(state.miter_limit),
            PropertyKind::LineDash => Property::LineDash(state.line_dash.clone()),
            PropertyKind::LineDashOffset => Property::LineDashOffset(state.line_dash_offset),
            PropertyKind::GlobalAlpha => Property::GlobalAlpha(state.global_alpha),
            PropertyKind::GlobalCompositeOperation => {
                Property::GlobalCompositeOperation(state.composite)
            }
            PropertyKind::ShadowBlur => Property::ShadowBlur(state.shadow_blur),
            PropertyKind::ShadowColor => Property::ShadowColor(state.shadow_color),
            PropertyKind::ShadowOffset => Property::ShadowOffset(state.shadow_offset),
            PropertyKind::Filter => Property::Filter(state.filter),
            PropertyKind::Font => Property::Font(state.font.clone()),
            PropertyKind::TextAlign => Property::TextAlign(state.text_align),
            PropertyKind::TextBaseline => Property::TextBaseline(state.text_baseline),
            PropertyKind::ImageSmoothing => Property::ImageSmoothing(state.image_smoothing),
        }
    }

    /// Invalid values (negative widths, alpha outside `[0, 1]`,
    /// non-finite numbers) are ignored, leaving the property unchanged.
    fn set_property(&mut self, property: Property) {
        let state = &mut self.state;
        match property {
            Property::FillStyle(paint) => state.fill_style = paint,
            Property::StrokeStyle(paint) => state.stroke_style = paint,
            Property::LineWidth(width) if width.is_finite() && width > 0. => {
                state.line_width = width
            }
            Property::LineCap(cap) => state.line_cap = cap,
            Property::LineJoin(join) => state.line_join = join,
            Property::MiterLimit(limit) if limit.is_finite() && limit > 0. => {
                state.miter_limit = limit
            }
            Property::LineDash(mut dashes)
                if dashes.iter().all(|length| length.is_finite() && *length >= 0.) =>
            {
                if dashes.len() % 2 == 1 {
                    dashes.extend_from_within(..);
                }
                state.line_dash = dashes;
            }
            Property::LineDashOffset(offset) if offset.is_finite() => {
                state.line_dash_offset = offset
            }
            Property::GlobalAlpha(alpha) if (0. ..=1.).contains(&alpha) => {
                state.global_alpha = alpha
            }
            Property::GlobalCompositeOperation(op) => state.composite = op,
            Property::ShadowBlur(blur) if blur.is_finite() && blur >= 0. => {
                state.shadow_blur = blur
            }
            Property::ShadowColor(color) => state.shadow_color = color,
            Property::ShadowOffset(offset) if offset.is_finite() => state.shadow_offset = offset,
            Property::Filter(filter) => state.filter = filter,
            Property::Font(font) if font.size.is_finite() && font.size >= 0. => state.font = font,
            Property::TextAlign(align) => state.text_align = align,
            Property::TextBaseline(baseline) => state.text_baseline = baseline,
            Property::ImageSmoothing(enabled) => state.image_smoothing = enabled,
            _ => {}
        }
    }

    fn save(&mut self) {
        self.state_stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, translation: Vec2) {
        if translation.is_finite() {
            self.transform(Affine2::from_translation(translation));
        }
    }

    fn scale(&mut self, scale: Vec2) {
        if scale.is_finite() {
            self.transform(Affine2::from_scale(scale));
        }
    }

    fn rotate(&mut self, angle_in_radians: f32) {
        if angle_in_radians.is_finite() {
            self.transform(Affine2::from_angle(angle_in_radians));
        }
    }

    fn transform(&mut self, transform: Affine2) {
        if transform.is_finite() {
            self.state.transform = self.state.transform * transform;
        }
    }

    fn set_transform(&mut self, transform: Affine2) {
        if transform.is_finite() {
            self.state.transform = transform;
        }
    }

    fn current_transform(&self) -> Affine2 {
        self.state.transform
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Vec2) {
        if point.is_finite() {
            self.path.move_to(point);
        }
    }

    fn line_to(&mut self, point: Vec2) {
        if point.is_finite() {
            self.path.line_to(point);
        }
    }

    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        if control.is_finite() && end.is_finite() {
            self.path.quad_to(control, end);
        }
    }

    fn bezier_curve_to(&mut self, control1: Vec2, control2: Vec2, end: Vec2) {
        if control1.is_finite() && control2.is_finite() && end.is_finite() {
            self.path.cubic_to(control1, control2, end);
        }
    }

    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) -> Result<(), Self::Error> {
        let finite = center.is_finite()
            && radius.is_finite()
            && start_angle.is_finite()
            && end_angle.is_finite();
        if !finite {
            return Ok(());
        }
        if radius < 0. {
            return Err(SurfaceError::NegativeRadius(radius));
        }
        self.path
            .arc(center, radius, start_angle, end_angle, anticlockwise);
        Ok(())
    }

    fn rect(&mut self, rect: Rect) {
        if rect.is_finite() {
            self.path.rect(rect);
        }
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn clip(&mut self, fill_rule: FillRule) {
        self.set_clip(fill_rule);
    }

    fn is_point_in_path(&self, point: Vec2, fill_rule: FillRule) -> bool {
        if !point.is_finite() {
            return false;
        }
        let (path, mut sample) = match (convert_path(&self.path), Pixmap::new(1, 1)) {
            (Some(path), Some(sample)) => (path, sample),
            _ => return false,
        };
        // Moves the queried point onto the center of the single sample pixel
        let transform =
            Transform::from_translate(0.5 - point.x, 0.5 - point.y).pre_concat(self.device_transform());
        let mut paint = SkiaPaint {
            anti_alias: false,
            ..Default::default()
        };
        paint.set_color(tiny_skia::Color::BLACK);
        sample.fill_path(&path, &paint, convert_fill_rule(fill_rule), transform, None);
        sample.pixels()[0].alpha() > 0
    }

    fn fill(&mut self, fill_rule: FillRule) {
        let path = mem::take(&mut self.path);
        self.fill_path_with(&path, fill_rule);
        self.path = path;
    }

    fn stroke(&mut self) {
        let path = mem::take(&mut self.path);
        self.stroke_path_with(&path);
        self.path = path;
    }

    fn fill_rect(&mut self, rect: Rect) {
        if !rect.is_finite() || rect.is_empty() {
            return;
        }
        let mut path = Path::new();
        path.rect(rect);
        self.fill_path_with(&path, FillRule::NonZero);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        if !rect.is_finite() {
            return;
        }
        let mut path = Path::new();
        path.rect(rect);
        self.stroke_path_with(&path);
    }

    fn clear_rect(&mut self, rect: Rect) {
        if !rect.is_finite() || rect.is_empty() {
            return;
        }
        let mut path = Path::new();
        path.rect(rect);
        let mut paint = SkiaPaint {
            anti_alias: self.config.anti_alias,
            blend_mode: BlendMode::Source,
            ..Default::default()
        };
        paint.set_color(self.background());
        self.draw(&path, |pixmap, path, transform, clip| {
            pixmap.fill_path(path, &paint, tiny_skia::FillRule::Winding, transform, clip);
        });
    }

    fn fill_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        if !position.is_finite() {
            return;
        }
        let path = self.text_path(text, position, max_width);
        self.fill_path_with(&path, FillRule::NonZero);
    }

    fn stroke_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        if !position.is_finite() {
            return;
        }
        let path = self.text_path(text, position, max_width);
        self.stroke_path_with(&path);
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        self.fonts.measure(&self.state.font, text)
    }

    fn draw_image(&mut self, image: &Image, placement: ImagePlacement) -> Result<(), Self::Error> {
        if image.is_empty() {
            return Err(SurfaceError::EmptyImage);
        }
        let image_bounds = Rect::new(Vec2::ZERO, image.size());
        let source = placement.source(image.size()).normalized();
        let destination = placement.destination(image.size()).normalized();
        if !source.is_finite() || !destination.is_finite() {
            return Ok(());
        }
        if source.is_empty() || destination.is_empty() {
            return Ok(());
        }

        // Only the part of the source inside the image is drawn,
        // with the destination shrunk to match.
        let visible = match source.intersection(image_bounds) {
            Some(visible) => visible,
            None => return Ok(()),
        };
        let scale = destination.size / source.size;
        let destination = Rect::new(
            destination.pos + (visible.pos - source.pos) * scale,
            visible.size * scale,
        );

        let pixmap = match Self::image_pixmap(image) {
            Some(pixmap) => pixmap,
            None => return Ok(()),
        };
        let quality = if self.state.image_smoothing {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };
        let offset = destination.pos - visible.pos * scale;
        let paint = SkiaPaint {
            shader: Pattern::new(
                pixmap.as_ref(),
                SpreadMode::Pad,
                quality,
                self.state.global_alpha,
                Transform::from_row(scale.x, 0., 0., scale.y, offset.x, offset.y),
            ),
            blend_mode: convert_composite(self.state.composite),
            anti_alias: self.config.anti_alias,
            ..Default::default()
        };

        let mut path = Path::new();
        path.rect(destination);
        self.draw(&path, |target, path, transform, clip| {
            target.fill_path(path, &paint, tiny_skia::FillRule::Winding, transform, clip);
        });
        Ok(())
    }

    fn get_image_data(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Image, Self::Error> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::EmptyRegion);
        }
        let pixels = (0..i64::from(height)).flat_map(|row| {
            (0..i64::from(width)).map(move |column| {
                match (
                    i32::try_from(i64::from(x) + column),
                    i32::try_from(i64::from(y) + row),
                ) {
                    (Ok(px), Ok(py)) => self.pixel(px, py).unwrap_or(Color::TRANSPARENT),
                    _ => Color::TRANSPARENT,
                }
            })
        });
        Ok(Image::from_pixels(width, height, pixels))
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        // `Pixmap::pixel` only checks the linear index, so a column past
        // the right edge would wrap onto the next row
        if x >= self.width || y >= self.height {
            return None;
        }
        let pixel = self.pixmap.as_ref()?.pixel(x, y)?;
        Some(Color::from_array(demultiply(pixel).to_array()))
    }
}

impl Offscreen for SoftwareContext {
    fn create_offscreen(
        &self,
        width: u32,
        height: u32,
        config: SurfaceConfig,
    ) -> Result<Self, Self::Error> {
        Self::with_fonts(width, height, config, Arc::clone(&self.fonts))
    }

    fn config(&self) -> SurfaceConfig {
        self.config
    }
}

/// The clip region of a [`State`].
#[derive(Clone, Debug)]
enum Clip {
    Disabled,
    Mask(Rc<ClipMask>),
    /// Clipped to an empty path; nothing can be drawn.
    Everything,
}

impl Default for Clip {
    fn default() -> Self {
        Clip::Disabled
    }
}

/// The saveable drawing state.
#[derive(Clone, Debug)]
struct State {
    transform: Affine2,
    clip: Clip,
    fill_style: Paint,
    stroke_style: Paint,
    line_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    line_dash: Vec<f32>,
    line_dash_offset: f32,
    global_alpha: f32,
    composite: CompositeOperation,
    shadow_blur: f32,
    shadow_color: Color,
    shadow_offset: Vec2,
    filter: Filter,
    font: Font,
    text_align: TextAlign,
    text_baseline: TextBaseline,
    image_smoothing: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            clip: Clip::Disabled,
            fill_style: Paint::default(),
            stroke_style: Paint::default(),
            line_width: 1.,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.,
            line_dash: Vec::new(),
            line_dash_offset: 0.,
            global_alpha: 1.,
            composite: CompositeOperation::default(),
            shadow_blur: 0.,
            shadow_color: Color::TRANSPARENT,
            shadow_offset: Vec2::ZERO,
            filter: Filter::default(),
            font: Font::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            image_smoothing: true,
        }
    }
}

fn demultiply(pixel: PremultipliedColorU8) -> Color {
    let color = pixel.demultiply();
    Color::rgba(color.red(), color.green(), color.blue(), color.alpha())
}

fn convert_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(pos) => builder.move_to(pos.x, pos.y),
            PathSegment::LineTo(pos) => builder.line_to(pos.x, pos.y),
            PathSegment::QuadTo { control, end } => {
                builder.quad_to(control.x, control.y, end.x, end.y)
            }
            PathSegment::CubicTo {
                control1,
                control2,
                end,
            } => builder.cubic_to(control1.x, control1.y, control2.x, control2.y, end.x, end.y),
            PathSegment::Close => builder.close(),
        }
    }
    builder.finish()
}

fn convert_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.red(), color.green(), color.blue(), color.alpha())
}

fn convert_gradient_stop(stop: GradientStop, opacity: f32) -> tiny_skia::GradientStop {
    tiny_skia::GradientStop::new(stop.position(), convert_color(stop.color().with_opacity(opacity)))
}

fn convert_transform(transform: Affine2) -> Transform {
    let cols = transform.to_cols_array();
    Transform::from_row(cols[0], cols[1], cols[2], cols[3], cols[4], cols[5])
}

fn convert_point(point: Vec2) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(point.x, point.y)
}

fn convert_line_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn convert_line_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

fn convert_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        FillRule::NonZero => tiny_skia::FillRule::Winding,
    }
}

fn convert_composite(op: CompositeOperation) -> BlendMode {
    match op {
        CompositeOperation::SourceOver => BlendMode::SourceOver,
        CompositeOperation::SourceIn => BlendMode::SourceIn,
        CompositeOperation::SourceOut => BlendMode::SourceOut,
        CompositeOperation::SourceAtop => BlendMode::SourceAtop,
        CompositeOperation::DestinationOver => BlendMode::DestinationOver,
        CompositeOperation::DestinationIn => BlendMode::DestinationIn,
        CompositeOperation::DestinationOut => BlendMode::DestinationOut,
        CompositeOperation::DestinationAtop => BlendMode::DestinationAtop,
        CompositeOperation::Lighter => BlendMode::Plus,
        CompositeOperation::Copy => BlendMode::Source,
        CompositeOperation::Xor => BlendMode::Xor,
        CompositeOperation::Multiply => BlendMode::Multiply,
        CompositeOperation::Screen => BlendMode::Screen,
        CompositeOperation::Overlay => BlendMode::Overlay,
        CompositeOperation::Darken => BlendMode::Darken,
        CompositeOperation::Lighten => BlendMode::Lighten,
        CompositeOperation::ColorDodge => BlendMode::ColorDodge,
        CompositeOperation::ColorBurn => BlendMode::ColorBurn,
        CompositeOperation::HardLight => BlendMode::HardLight,
        CompositeOperation::SoftLight => BlendMode::SoftLight,
        CompositeOperation::Difference => BlendMode::Difference,
        CompositeOperation::Exclusion => BlendMode::Exclusion,
        CompositeOperation::Hue => BlendMode::Hue,
        CompositeOperation::Saturation => BlendMode::Saturation,
        CompositeOperation::Color => BlendMode::Color,
        CompositeOperation::Luminosity => BlendMode::Luminosity,
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn context(width: u32, height: u32) -> SoftwareContext {
        let config = SurfaceConfig {
            anti_alias: false,
            ..Default::default()
        };
        SoftwareContext::new(width, height, config).unwrap()
    }

    #[test]
    fn fill_rect_covers_pixels() {
        let mut cx = context(20, 20);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_rect(Rect::from_xywh(10., 10., 5., 5.));

        assert_eq!(cx.pixel(12, 12), Some(RED));
        assert_eq!(cx.pixel(14, 14), Some(RED));
        assert_eq!(cx.pixel(15, 15), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(20, 0), None);
        assert_eq!(cx.pixel(-1, 0), None);
    }

    #[test]
    fn columns_past_the_right_edge_do_not_wrap() {
        let mut cx = context(20, 20);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_rect(Rect::from_xywh(0., 1., 5., 1.));
        assert_eq!(cx.pixel(2, 1), Some(RED));
        assert_eq!(cx.pixel(20, 0), None);
        assert_eq!(cx.pixel(22, 0), None);
        assert_eq!(cx.pixel(0, 20), None);

        let image = cx.get_image_data(18, 0, 4, 1).unwrap();
        assert_eq!(image.pixel(2, 0), Some(Color::TRANSPARENT));
        assert_eq!(image.pixel(3, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn opaque_surface_starts_black() {
        let config = SurfaceConfig {
            alpha: false,
            anti_alias: false,
        };
        let mut cx = SoftwareContext::new(4, 4, config).unwrap();
        assert_eq!(cx.pixel(1, 1), Some(Color::BLACK));

        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_rect(Rect::from_xywh(0., 0., 4., 4.));
        cx.clear_rect(Rect::from_xywh(0., 0., 2., 4.));
        assert_eq!(cx.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(cx.pixel(3, 0), Some(RED));
    }

    #[test]
    fn clear_rect_ignores_fill_style() {
        let mut cx = context(10, 10);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_rect(Rect::from_xywh(0., 0., 10., 10.));
        cx.clear_rect(Rect::from_xywh(0., 0., 5., 10.));
        assert_eq!(cx.pixel(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(7, 2), Some(RED));
    }

    #[test]
    fn transforms_apply_to_rects() {
        let mut cx = context(20, 20);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.translate(vec2(10., 0.));
        cx.scale(vec2(2., 2.));
        cx.fill_rect(Rect::from_xywh(0., 0., 2., 2.));
        assert_eq!(cx.pixel(13, 3), Some(RED));
        assert_eq!(cx.pixel(9, 1), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(14, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn save_and_restore() {
        let mut cx = context(4, 4);
        cx.set_property(Property::LineWidth(3.));
        cx.save();
        cx.set_property(Property::LineWidth(8.));
        cx.translate(vec2(1., 1.));
        cx.restore();
        assert_eq!(cx.property(PropertyKind::LineWidth), Property::LineWidth(3.));
        assert_eq!(cx.current_transform(), Affine2::IDENTITY);

        // Unbalanced restore is a no-op
        cx.restore();
        assert_eq!(cx.property(PropertyKind::LineWidth), Property::LineWidth(3.));
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut cx = context(4, 4);
        cx.set_property(Property::LineWidth(-1.));
        cx.set_property(Property::LineWidth(f32::NAN));
        cx.set_property(Property::GlobalAlpha(1.5));
        cx.set_property(Property::LineDash(vec![1., -2.]));
        assert_eq!(cx.property(PropertyKind::LineWidth), Property::LineWidth(1.));
        assert_eq!(cx.property(PropertyKind::GlobalAlpha), Property::GlobalAlpha(1.));
        assert_eq!(cx.property(PropertyKind::LineDash), Property::LineDash(Vec::new()));

        cx.set_property(Property::LineDash(vec![1., 2., 3.]));
        assert_eq!(
            cx.property(PropertyKind::LineDash),
            Property::LineDash(vec![1., 2., 3., 1., 2., 3.])
        );

        cx.translate(vec2(f32::INFINITY, 0.));
        assert_eq!(cx.current_transform(), Affine2::IDENTITY);
    }

    #[test]
    fn global_alpha_blends() {
        let mut cx = context(4, 4);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.set_property(Property::GlobalAlpha(0.5));
        cx.fill_rect(Rect::from_xywh(0., 0., 4., 4.));
        let pixel = cx.pixel(1, 1).unwrap();
        assert_eq!(pixel.red(), 255);
        assert!((127..=129).contains(&pixel.alpha()), "{:?}", pixel);
    }

    #[test]
    fn destination_out_erases() {
        let mut cx = context(4, 4);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_rect(Rect::from_xywh(0., 0., 4., 4.));
        cx.set_property(Property::GlobalCompositeOperation(CompositeOperation::DestinationOut));
        cx.fill_rect(Rect::from_xywh(0., 0., 2., 4.));
        assert_eq!(cx.pixel(0, 0).unwrap().alpha(), 0);
        assert_eq!(cx.pixel(3, 0), Some(RED));
    }

    #[test]
    fn clip_restricts_drawing() {
        let mut cx = context(10, 10);
        cx.rect(Rect::from_xywh(0., 0., 5., 10.));
        cx.clip(FillRule::NonZero);
        cx.set_property(Property::FillStyle(BLUE.into()));
        cx.fill_rect(Rect::from_xywh(0., 0., 10., 10.));
        assert_eq!(cx.pixel(2, 2), Some(BLUE));
        assert_eq!(cx.pixel(7, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn empty_clip_blocks_everything() {
        let mut cx = context(10, 10);
        cx.begin_path();
        cx.clip(FillRule::NonZero);
        cx.fill_rect(Rect::from_xywh(0., 0., 10., 10.));
        assert_eq!(cx.pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn clip_is_saved_and_restored() {
        let mut cx = context(10, 10);
        cx.save();
        cx.rect(Rect::from_xywh(0., 0., 5., 10.));
        cx.clip(FillRule::NonZero);
        cx.restore();
        cx.fill_rect(Rect::from_xywh(0., 0., 10., 10.));
        assert_eq!(cx.pixel(7, 2), Some(Color::BLACK));
    }

    #[test]
    fn fill_and_stroke_paths() {
        let mut cx = context(20, 20);
        cx.set_property(Property::FillStyle(RED.into()));
        cx.move_to(vec2(0., 0.));
        cx.line_to(vec2(10., 0.));
        cx.line_to(vec2(0., 10.));
        cx.close_path();
        cx.fill(FillRule::NonZero);
        assert_eq!(cx.pixel(2, 2), Some(RED));
        assert_eq!(cx.pixel(9, 9), Some(Color::TRANSPARENT));

        cx.begin_path();
        cx.set_property(Property::StrokeStyle(BLUE.into()));
        cx.set_property(Property::LineWidth(4.));
        cx.move_to(vec2(0., 15.));
        cx.line_to(vec2(20., 15.));
        cx.stroke();
        assert_eq!(cx.pixel(10, 15), Some(BLUE));
        assert_eq!(cx.pixel(10, 18), Some(Color::TRANSPARENT));
    }

    #[test]
    fn dashed_stroke_has_gaps() {
        let mut cx = context(40, 4);
        cx.set_property(Property::LineWidth(2.));
        cx.set_property(Property::LineDash(vec![10., 10.]));
        cx.move_to(vec2(0., 2.));
        cx.line_to(vec2(40., 2.));
        cx.stroke();
        assert_eq!(cx.pixel(5, 2), Some(Color::BLACK));
        assert_eq!(cx.pixel(15, 2), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(25, 2), Some(Color::BLACK));
    }

    #[test]
    fn point_in_path() {
        let mut cx = context(10, 10);
        cx.rect(Rect::from_xywh(2., 2., 4., 4.));
        assert!(cx.is_point_in_path(vec2(3., 3.), FillRule::NonZero));
        assert!(!cx.is_point_in_path(vec2(8., 8.), FillRule::NonZero));

        cx.translate(vec2(100., 100.));
        assert!(cx.is_point_in_path(vec2(103., 103.), FillRule::NonZero));
        assert!(!cx.is_point_in_path(vec2(f32::NAN, 3.), FillRule::NonZero));
    }

    #[test]
    fn arc_rejects_negative_radius() {
        let mut cx = context(10, 10);
        assert_eq!(
            cx.arc(vec2(5., 5.), -1., 0., 1., false),
            Err(SurfaceError::NegativeRadius(-1.))
        );
        assert!(cx.arc(vec2(5., 5.), f32::NAN, 0., 1., false).is_ok());
    }

    #[test]
    fn resize_resets_pixels_and_state() {
        let mut cx = context(4, 4);
        cx.set_property(Property::LineWidth(5.));
        cx.fill_rect(Rect::from_xywh(0., 0., 4., 4.));
        cx.resize(8, 2).unwrap();
        assert_eq!((cx.width(), cx.height()), (8, 2));
        assert_eq!(cx.pixel(7, 1), Some(Color::TRANSPARENT));
        assert_eq!(cx.pixel(1, 3), None);
        assert_eq!(cx.property(PropertyKind::LineWidth), Property::LineWidth(1.));
    }

    #[test]
    fn zero_sized_surface() {
        let mut cx = context(0, 0);
        cx.fill_rect(Rect::from_xywh(0., 0., 10., 10.));
        assert_eq!(cx.pixel(0, 0), None);
        assert!(cx.to_image().is_empty());
    }

    #[test]
    fn image_data_outside_reads_transparent() {
        let mut cx = context(4, 4);
        cx.fill_rect(Rect::from_xywh(0., 0., 4., 4.));
        let image = cx.get_image_data(2, 2, 4, 4).unwrap();
        assert_eq!(image.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(image.pixel(3, 3), Some(Color::TRANSPARENT));
        assert_eq!(cx.get_image_data(0, 0, 0, 4), Err(SurfaceError::EmptyRegion));
    }

    #[test]
    fn draw_image_at_natural_size() {
        let mut cx = context(10, 10);
        cx.set_property(Property::ImageSmoothing(false));
        let image = Image::solid(3, 3, BLUE);
        cx.draw_image(&image, ImagePlacement::At(vec2(2., 2.)))
            .unwrap();
        assert_eq!(cx.pixel(2, 2), Some(BLUE));
        assert_eq!(cx.pixel(4, 4), Some(BLUE));
        assert_eq!(cx.pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn draw_image_cropped_and_scaled() {
        let mut cx = context(10, 10);
        cx.set_property(Property::ImageSmoothing(false));
        let mut data = Vec::new();
        for rgba in [RED, BLUE, BLUE, BLUE] {
            data.extend(rgba.to_array());
        }
        let image = Image::from_rgba8(2, 2, data).unwrap();
        cx.draw_image(
            &image,
            ImagePlacement::Cropped {
                source: Rect::from_xywh(0., 0., 1., 1.),
                destination: Rect::from_xywh(0., 0., 4., 4.),
            },
        )
        .unwrap();
        assert_eq!(cx.pixel(3, 3), Some(RED));
        assert_eq!(cx.pixel(4, 4), Some(Color::TRANSPARENT));
    }

    #[test]
    fn draw_empty_image_fails() {
        let mut cx = context(4, 4);
        let image = Image::solid(0, 3, RED);
        assert_eq!(
            cx.draw_image(&image, ImagePlacement::At(Vec2::ZERO)),
            Err(SurfaceError::EmptyImage)
        );
    }

    #[test]
    fn offscreen_shares_fonts() {
        let cx = context(4, 4);
        let offscreen = cx
            .create_offscreen(8, 8, SurfaceConfig::default())
            .unwrap();
        assert!(Arc::ptr_eq(cx.fonts(), offscreen.fonts()));
        assert_eq!((offscreen.width(), offscreen.height()), (8, 8));
        assert!(offscreen.config().anti_alias);
    }

    #[test]
    fn text_with_a_loaded_font() {
        let mut fonts = FontStore::new();
        fonts
            .load("DejaVu Sans", include_bytes!("../../assets/DejaVuSans.ttf").to_vec())
            .unwrap();
        let config = SurfaceConfig {
            anti_alias: false,
            ..Default::default()
        };
        let mut cx = SoftwareContext::with_fonts(60, 40, config, Arc::new(fonts)).unwrap();
        cx.set_property(Property::Font(Font::new("DejaVu Sans", 30.)));
        assert!(cx.measure_text("HH").width > 20.);

        cx.set_property(Property::FillStyle(RED.into()));
        cx.fill_text("HH", vec2(5., 30.), None);
        let image = cx.to_image();
        assert!(image.data().chunks_exact(4).any(|rgba| rgba == [255, 0, 0, 255]));

        // Text squeezed to nothing draws nothing
        let mut cx = SoftwareContext::with_fonts(60, 40, config, Arc::clone(cx.fonts())).unwrap();
        cx.set_property(Property::Font(Font::new("DejaVu Sans", 30.)));
        cx.fill_text("HH", vec2(5., 30.), Some(0.));
        assert_eq!(cx.to_image(), Image::solid(60, 40, Color::TRANSPARENT));
    }

    #[test]
    fn text_without_fonts_draws_nothing() {
        let mut cx = context(20, 20);
        cx.fill_text("hello", vec2(0., 10.), None);
        assert_eq!(cx.to_image(), Image::solid(20, 20, Color::TRANSPARENT));
        assert_eq!(cx.measure_text("hello"), TextMetrics::default());
    }
}
