//! A context that rasterizes nothing and records every call made to it.

use glam::{Affine2, Vec2};

use crate::{
    backend::{Context2d, Offscreen, SurfaceConfig},
    image::{Image, ImagePlacement},
    Color, FillRule, Operation, Paint, Property, PropertyKind, Rect, TextMetrics,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordingError {
    #[error("negative radius {0}")]
    NegativeRadius(f32),
    #[error("empty image")]
    EmptyImage,
}

/// One recorded call: the operation and its arguments, formatted.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub args: String,
}

#[derive(Clone, Debug)]
struct State {
    transform: Affine2,
    properties: Vec<Property>,
}

impl Default for State {
    fn default() -> Self {
        let defaults = PropertyKind::ALL
            .into_iter()
            .map(default_property)
            .collect();
        Self {
            transform: Affine2::IDENTITY,
            properties: defaults,
        }
    }
}

fn default_property(kind: PropertyKind) -> Property {
    match kind {
        PropertyKind::FillStyle => Property::FillStyle(Paint::default()),
        PropertyKind::StrokeStyle => Property::StrokeStyle(Paint::default()),
        PropertyKind::LineWidth => Property::LineWidth(1.),
        PropertyKind::LineCap => Property::LineCap(Default::default()),
        PropertyKind::LineJoin => Property::LineJoin(Default::default()),
        PropertyKind::MiterLimit => Property::MiterLimit(10.),
        PropertyKind::LineDash => Property::LineDash(Vec::new()),
        PropertyKind::LineDashOffset => Property::LineDashOffset(0.),
        PropertyKind::GlobalAlpha => Property::GlobalAlpha(1.),
        PropertyKind::GlobalCompositeOperation => {
            Property::GlobalCompositeOperation(Default::default())
        }
        PropertyKind::ShadowBlur => Property::ShadowBlur(0.),
        PropertyKind::ShadowColor => Property::ShadowColor(Color::TRANSPARENT),
        PropertyKind::ShadowOffset => Property::ShadowOffset(Vec2::ZERO),
        PropertyKind::Filter => Property::Filter(Default::default()),
        PropertyKind::Font => Property::Font(Default::default()),
        PropertyKind::TextAlign => Property::TextAlign(Default::default()),
        PropertyKind::TextBaseline => Property::TextBaseline(Default::default()),
        PropertyKind::ImageSmoothing => Property::ImageSmoothing(true),
    }
}

#[derive(Debug)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    config: SurfaceConfig,
    state: State,
    state_stack: Vec<State>,
    calls: Vec<Call>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            config: SurfaceConfig::default(),
            state: State::default(),
            state_stack: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.calls.iter().map(|call| call.operation).collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Changes the size without going through `resize`, as
    /// an embedder resizing its surface directly would.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn record(&mut self, operation: Operation, args: impl Into<String>) {
        self.calls.push(Call {
            operation,
            args: args.into(),
        });
    }
}

impl Context2d for RecordingContext {
    type Error = RecordingError;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), Self::Error> {
        self.record(Operation::Resize, format!("{}x{}", width, height));
        self.width = width;
        self.height = height;
        self.state = State::default();
        self.state_stack.clear();
        Ok(())
    }

    fn property(&self, kind: PropertyKind) -> Property {
        self.state
            .properties
            .iter()
            .find(|property| property.kind() == kind)
            .cloned()
            .unwrap_or_else(|| default_property(kind))
    }

    fn set_property(&mut self, property: Property) {
        self.record(Operation::SetProperty, format!("{:?}", property));
        let kind = property.kind();
        if let Some(slot) = self
            .state
            .properties
            .iter_mut()
            .find(|slot| slot.kind() == kind)
        {
            *slot = property;
        }
    }

    fn save(&mut self) {
        self.record(Operation::Save, "");
        self.state_stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        self.record(Operation::Restore, "");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, translation: Vec2) {
        self.record(Operation::Translate, format!("{:?}", translation));
        self.state.transform = self.state.transform * Affine2::from_translation(translation);
    }

    fn scale(&mut self, scale: Vec2) {
        self.record(Operation::Scale, format!("{:?}", scale));
        self.state.transform = self.state.transform * Affine2::from_scale(scale);
    }

    fn rotate(&mut self, angle_in_radians: f32) {
        self.record(Operation::Rotate, format!("{:?}", angle_in_radians));
        self.state.transform = self.state.transform * Affine2::from_angle(angle_in_radians);
    }

    fn transform(&mut self, transform: Affine2) {
        self.record(Operation::Transform, format!("{:?}", transform));
        self.state.transform = self.state.transform * transform;
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.record(Operation::SetTransform, format!("{:?}", transform));
        self.state.transform = transform;
    }

    fn reset_transform(&mut self) {
        self.record(Operation::ResetTransform, "");
        self.state.transform = Affine2::IDENTITY;
    }

    fn current_transform(&self) -> Affine2 {
        self.state.transform
    }

    fn begin_path(&mut self) {
        self.record(Operation::BeginPath, "");
    }

    fn move_to(&mut self, point: Vec2) {
        self.record(Operation::MoveTo, format!("{:?}", point));
    }

    fn line_to(&mut self, point: Vec2) {
        self.record(Operation::LineTo, format!("{:?}", point));
    }

    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        self.record(
            Operation::QuadraticCurveTo,
            format!("{:?} {:?}", control, end),
        );
    }

    fn bezier_curve_to(&mut self, control1: Vec2, control2: Vec2, end: Vec2) {
        self.record(
            Operation::BezierCurveTo,
            format!("{:?} {:?} {:?}", control1, control2, end),
        );
    }

    fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) -> Result<(), Self::Error> {
        self.record(
            Operation::Arc,
            format!(
                "{:?} {:?} {:?} {:?} {:?}",
                center, radius, start_angle, end_angle, anticlockwise
            ),
        );
        if radius < 0. {
            return Err(RecordingError::NegativeRadius(radius));
        }
        Ok(())
    }

    fn rect(&mut self, rect: Rect) {
        self.record(Operation::Rect, format!("{:?}", rect));
    }

    fn close_path(&mut self) {
        self.record(Operation::ClosePath, "");
    }

    fn clip(&mut self, fill_rule: FillRule) {
        self.record(Operation::Clip, format!("{:?}", fill_rule));
    }

    fn is_point_in_path(&self, _point: Vec2, _fill_rule: FillRule) -> bool {
        false
    }

    fn fill(&mut self, fill_rule: FillRule) {
        self.record(Operation::Fill, format!("{:?}", fill_rule));
    }

    fn stroke(&mut self) {
        self.record(Operation::Stroke, "");
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.record(Operation::FillRect, format!("{:?}", rect));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.record(Operation::StrokeRect, format!("{:?}", rect));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.record(Operation::ClearRect, format!("{:?}", rect));
    }

    fn fill_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        self.record(
            Operation::FillText,
            format!("{:?} {:?} {:?}", text, position, max_width),
        );
    }

    fn stroke_text(&mut self, text: &str, position: Vec2, max_width: Option<f32>) {
        self.record(
            Operation::StrokeText,
            format!("{:?} {:?} {:?}", text, position, max_width),
        );
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        TextMetrics {
            width: text.chars().count() as f32,
            ..Default::default()
        }
    }

    fn draw_image(&mut self, image: &Image, placement: ImagePlacement) -> Result<(), Self::Error> {
        self.record(
            Operation::DrawImage,
            format!("{}x{} {:?}", image.width(), image.height(), placement),
        );
        if image.is_empty() {
            return Err(RecordingError::EmptyImage);
        }
        Ok(())
    }

    fn get_image_data(
        &self,
        _x: i32,
        _y: i32,
        width: u32,
        height: u32,
    ) -> Result<Image, Self::Error> {
        Ok(Image::solid(width, height, Color::TRANSPARENT))
    }

    fn pixel(&self, _x: i32, _y: i32) -> Option<Color> {
        None
    }
}

impl Offscreen for RecordingContext {
    fn create_offscreen(
        &self,
        width: u32,
        height: u32,
        config: SurfaceConfig,
    ) -> Result<Self, Self::Error> {
        let mut context = Self::new(width, height);
        context.config = config;
        Ok(context)
    }

    fn config(&self) -> SurfaceConfig {
        self.config
    }
}
