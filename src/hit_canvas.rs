//! The mirroring proxy.
//!
//! A [`HitCanvas`] wraps a visible context and owns a hidden context
//! of the same kind. Every shape drawn on the visible context is drawn
//! again on the hidden one in a flat color encoding the active layer ID,
//! so a single pixel read answers "which layer is at this point?".

use glam::{Affine2, Vec2};

use crate::{
    backend::{Context2d, Offscreen, SurfaceConfig},
    codec::{Codec, DefaultCodec, MAX_LAYER_ID},
    image::{Image, ImagePlacement},
    Color, FillRule, MirrorPolicy, Operation, Paint, Property, PropertyKind, Rect, TextMetrics,
};

/// Builds a [`HitCanvas`].
#[derive(Debug)]
pub struct HitCanvasBuilder<C, K = DefaultCodec> {
    real: C,
    surface_config: Option<SurfaceConfig>,
    codec: K,
}

impl<C: Offscreen, K: Codec> HitCanvasBuilder<C, K> {
    /// Sets the settings of the hidden context. Defaults to the
    /// settings of the visible context.
    ///
    /// Anti-aliasing is always disabled on the hidden context.
    pub fn surface_config(mut self, config: SurfaceConfig) -> Self {
        self.surface_config = Some(config);
        self
    }

    /// Replaces the ID/color codec.
    pub fn codec<K2: Codec>(self, codec: K2) -> HitCanvasBuilder<C, K2> {
        HitCanvasBuilder {
            real: self.real,
            surface_config: self.surface_config,
            codec,
        }
    }

    pub fn build(self) -> Result<HitCanvas<C, K>, C::Error> {
        let config = SurfaceConfig {
            anti_alias: false,
            ..self.surface_config.unwrap_or_else(|| self.real.config())
        };
        let hidden = self
            .real
            .create_offscreen(self.real.width(), self.real.height(), config)?;

        let mut canvas = HitCanvas {
            real: self.real,
            hidden,
            codec: self.codec,
            layer_id: 0,
        };
        canvas.apply_layer_color();
        Ok(canvas)
    }
}

/// A drawing context that records, for every pixel, the layer
/// that last drew to it.
///
/// Use it anywhere the wrapped context would be used. Results of
/// every call come from the wrapped context unchanged.
#[derive(Debug)]
pub struct HitCanvas<C, K = DefaultCodec> {
    real: C,
    hidden: C,
    codec: K,
    layer_id: u32,
}

impl<C: Offscreen> HitCanvas<C> {
    /// Wraps `real` with the default settings and codec.
    pub fn new(real: C) -> Result<Self, C::Error> {
        Self::builder(real).build()
    }

    pub fn builder(real: C) -> HitCanvasBuilder<C> {
        HitCanvasBuilder {
            real,
            surface_config: None,
            codec: DefaultCodec,
        }
    }
}

impl<C: Offscreen, K: Codec> HitCanvas<C, K> {
    /// Sets the layer that subsequent drawing belongs to.
    ///
    /// IDs above [`MAX_LAYER_ID`] cannot be told apart from smaller
    /// ones by the default codec.
    pub fn set_current_layer_id(&mut self, id: u32) {
        if id > MAX_LAYER_ID {
            log::warn!(
                "Layer ID {} exceeds the maximum of {} and will collide with another layer",
                id,
                MAX_LAYER_ID
            );
        }
        self.layer_id = id;
        self.apply_layer_color();
    }

    pub fn current_layer_id(&self) -> u32 {
        self.layer_id
    }

    /// Gets the ID of the layer that last drew the pixel at `(x, y)`,
    /// in device pixels. Returns `0` where nothing was drawn and
    /// outside the surface.
    pub fn layer_id_at(&mut self, x: i32, y: i32) -> u32 {
        self.sync_dimensions();
        match self.hidden.pixel(x, y) {
            Some(color) => self.codec.color_to_id(color.to_rgb()),
            None => 0,
        }
    }

    pub fn codec(&self) -> &K {
        &self.codec
    }

    pub fn inner(&self) -> &C {
        &self.real
    }

    /// Mutable access to the visible context.
    ///
    /// Drawing through this reference bypasses the hit surface.
    /// Size changes are picked up by the next mirrored call.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.real
    }

    pub fn into_inner(self) -> C {
        self.real
    }

    /// The hidden context holding the layer colors.
    pub fn hit_surface(&self) -> &C {
        &self.hidden
    }

    fn layer_color(&self) -> Color {
        Color::from(self.codec.id_to_color(self.layer_id))
    }

    fn apply_layer_color(&mut self) {
        let paint = Paint::Solid(self.layer_color());
        self.hidden.set_property(Property::FillStyle(paint.clone()));
        self.hidden.set_property(Property::StrokeStyle(paint));
    }

    fn sync_dimensions(&mut self) {
        let (width, height) = (self.real.width(), self.real.height());
        if (self.hidden.width(), self.hidden.height()) == (width, height) {
            return;
        }
        log::debug!(
            "Resizing hit surface from {}x{} to {}x{}",
            self.hidden.width(),
            self.hidden.height(),
            width,
            height
        );
        if let Err(e) = self.hidden.resize(width, height) {
            log::warn!("Failed to resize hit surface: {}", e);
        }
        self.apply_layer_color();
    }

    /// Replays a call on the hidden context according to `policy`.
    fn replay(&mut self, policy: MirrorPolicy, replay: impl FnOnce(&mut C)) {
        match policy {
            MirrorPolicy::ForwardOnly | MirrorPolicy::Excluded => {}
            MirrorPolicy::Verbatim => {
                self.sync_dimensions();
                replay(&mut self.hidden);
            }
            MirrorPolicy::Substitute => {
                self.sync_dimensions();
                self.apply_layer_color();
                replay(&mut self.hidden);
            }
        }
    }

    /// Replays `call` on the hidden context, discarding the result,
    /// then runs it on the visible context.
    fn mirror<R>(&mut self, operation: Operation, mut call: impl FnMut(&mut C) -> R) -> R {
        self.replay(operation.mirror_policy(), |hidden| {
            call(hidden);
        });
        call(&mut self.real)
    }
}

impl<C: Offscreen, K: Codec> Context2d for HitCanvas<C, K> {
    type Error = C::Error;

    fn width(&self) -> u32 {
        self.real.width()
    }

    fn height(&self) -> u32 {
        self.real.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), Self::Error> {
        let result = self.mirror(Operation::Resize, |cx| cx.resize(width, height));
        self.apply_layer_color();
        result
    }

    fn property(&self, kind: PropertyKind) -> Property {
        self.real.property(kind)
    }

    fn set_property(&mut self, property: Property) {
        let policy = property.kind().mirror_policy();
        self.replay(policy, |hidden| hidden.set_property(property.clone()));
        self.real.set_property(property);
    }

    fn save(&mut self) {
        self.mirror(Operation::Save, |cx| cx.save());
    }

    fn restore(&mut self) {
        self.mirror(Operation::Restore, |cx| cx.restore());
    }

    fn translate(&mut self, translation: Vec2) {
        self.mirror(Operation::Translate, |cx| cx.translate(translation));
    }

    fn scale(&mut self, scale: Vec2) {
        self.mirror(Operation::Scale, |cx| cx.scale(scale));
    }

    fn rotate(&mut self, angle_in_radians: f32) {
        self.mirror(Operation::Rotate, |cx| cx.rotate(angle_in_radians));
    }

    fn transform(&mut self, transform: Affine2) {
        self.mirror(Operation::Transform, |cx| cx.transform(transform));
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.mirror(Operation::SetTransform, |cx| cx.set_transform(transform));
    }

    fn reset_transform(&mut self) {
        self.mirror(Operation::ResetTransform, |cx| cx.reset_transform());
    }

    fn current_transform(&self) -> Affine2 {
        self.real.current_transform()
    }

    fn begin_path(&mut self) {
        self.mirror(Operation::BeginPath, |cx| cx.begin_path());
    }

    fn move_to(&mut self, point: Vec2) {
        self.mirror(Operation::MoveTo, |cx| cx.move_to(point));
    }

    fn line_to(&mut self, point: Vec2) {
        self.mirror(Operation::LineTo, |cx| cx.line_to(point));
    }

    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        self.mirror(Operation::QuadraticCurveTo, |cx| {
            cx.quadratic_curve_to(control, end)
        });
    }

    fn bezier_curve_to(&mut self, control1: Vec2, control2: Vec2, end: Vec2) {
        self.mirror(Operation::BezierCurveTo, |cx| {
            cx.bezier_curve_to(control1, control2, end)
        });
    }

    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) -> Result<(), Self::Error> {
        self.mirror(Operation::Arc, |cx| {
            cx.arc(center, radius, start_angle, end_angle, anticlockwise)
        })
    }

    fn rect(&mut self, rect: Rect) {
        self.mirror(Operation::Rect, |cx| cx.rect(rect));
    }

    fn close_path(&mut self) {
        self.mirror(Operation::ClosePath, |cx| cx.close_path());
    }

    fn clip(&mut self, fill_rule: FillRule) {
        self.mirror(Operation::Clip, |cx| cx.clip(fill_rule));
    }

    fn is_point_in_path(&self, point: Vec2, fill_rule: FillRule) -> bool {
        self.real.is_point_in_path(point, fill_rule)
    }

    fn fill(&mut self, fill_rule: FillRule) {
        self.mirror(Operation::Fill, |cx| cx.fill(fill_rule));
    }

    fn stroke(&mut self) {
        self.mirror(Operation::Stroke, |cx| cx.stroke());
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.mirror(Operation::FillRect, |cx| cx.fill_rect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.mirror(Operation::StrokeRect, |cx| cx.stroke_rect(rect));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.mirror(Operation::ClearRect, |cx| cx.clear_rect(rect));
    }

    fn fill_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        self.mirror(Operation::FillText, |cx| {
            cx.fill_text(text, position, max_width)
        });
    }

    fn stroke_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        self.mirror(Operation::StrokeText, |cx| {
            cx.stroke_text(text, position, max_width)
        });
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        self.real.measure_text(text)
    }

    /// Draws the image on the visible context. The hit surface
    /// gets a solid rectangle over the image's destination.
    fn draw_image(&mut self, image: &Image, placement: ImagePlacement) -> Result<(), Self::Error> {
        let destination = placement.destination(image.size());
        self.replay(Operation::DrawImage.mirror_policy(), |hidden| {
            hidden.fill_rect(destination)
        });
        self.real.draw_image(image, placement)
    }

    fn get_image_data(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Image, Self::Error> {
        self.real.get_image_data(x, y, width, height)
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.real.pixel(x, y)
    }
}
