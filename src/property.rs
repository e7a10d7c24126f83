//! The closed set of context operations and properties, and how
//! each one is treated by the [`HitCanvas`](crate::HitCanvas) proxy.

use glam::Vec2;

use crate::{Color, CompositeOperation, Filter, Font, LineCap, LineJoin, Paint, TextAlign, TextBaseline};

/// How the proxy treats one operation or property write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MirrorPolicy {
    /// Sent to the visible context only. Used for reads.
    ForwardOnly,
    /// Replayed on the hit surface with the same arguments.
    Verbatim,
    /// Replayed on the hit surface in the current layer color.
    Substitute,
    /// Never reaches the hit surface; would corrupt the flat layer colors.
    Excluded,
}

/// A writable piece of context state.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    FillStyle(Paint),
    StrokeStyle(Paint),
    LineWidth(f32),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f32),
    /// Alternating dash and gap lengths. Empty for a solid line.
    LineDash(Vec<f32>),
    LineDashOffset(f32),
    GlobalAlpha(f32),
    GlobalCompositeOperation(CompositeOperation),
    ShadowBlur(f32),
    ShadowColor(Color),
    ShadowOffset(Vec2),
    Filter(Filter),
    Font(Font),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    ImageSmoothing(bool),
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Property::FillStyle(_) => PropertyKind::FillStyle,
            Property::StrokeStyle(_) => PropertyKind::StrokeStyle,
            Property::LineWidth(_) => PropertyKind::LineWidth,
            Property::LineCap(_) => PropertyKind::LineCap,
            Property::LineJoin(_) => PropertyKind::LineJoin,
            Property::MiterLimit(_) => PropertyKind::MiterLimit,
            Property::LineDash(_) => PropertyKind::LineDash,
            Property::LineDashOffset(_) => PropertyKind::LineDashOffset,
            Property::GlobalAlpha(_) => PropertyKind::GlobalAlpha,
            Property::GlobalCompositeOperation(_) => PropertyKind::GlobalCompositeOperation,
            Property::ShadowBlur(_) => PropertyKind::ShadowBlur,
            Property::ShadowColor(_) => PropertyKind::ShadowColor,
            Property::ShadowOffset(_) => PropertyKind::ShadowOffset,
            Property::Filter(_) => PropertyKind::Filter,
            Property::Font(_) => PropertyKind::Font,
            Property::TextAlign(_) => PropertyKind::TextAlign,
            Property::TextBaseline(_) => PropertyKind::TextBaseline,
            Property::ImageSmoothing(_) => PropertyKind::ImageSmoothing,
        }
    }
}

/// Names a [`Property`] without its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    FillStyle,
    StrokeStyle,
    LineWidth,
    LineCap,
    LineJoin,
    MiterLimit,
    LineDash,
    LineDashOffset,
    GlobalAlpha,
    GlobalCompositeOperation,
    ShadowBlur,
    ShadowColor,
    ShadowOffset,
    Filter,
    Font,
    TextAlign,
    TextBaseline,
    ImageSmoothing,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 18] = [
        PropertyKind::FillStyle,
        PropertyKind::StrokeStyle,
        PropertyKind::LineWidth,
        PropertyKind::LineCap,
        PropertyKind::LineJoin,
        PropertyKind::MiterLimit,
        PropertyKind::LineDash,
        PropertyKind::LineDashOffset,
        PropertyKind::GlobalAlpha,
        PropertyKind::GlobalCompositeOperation,
        PropertyKind::ShadowBlur,
        PropertyKind::ShadowColor,
        PropertyKind::ShadowOffset,
        PropertyKind::Filter,
        PropertyKind::Font,
        PropertyKind::TextAlign,
        PropertyKind::TextBaseline,
        PropertyKind::ImageSmoothing,
    ];

    /// The policy applied when this property is written.
    ///
    /// Fill and stroke styles on the hit surface are owned by the
    /// active layer, so caller writes stop at the visible context.
    pub fn mirror_policy(self) -> MirrorPolicy {
        match self {
            PropertyKind::FillStyle
            | PropertyKind::StrokeStyle
            | PropertyKind::GlobalAlpha
            | PropertyKind::GlobalCompositeOperation
            | PropertyKind::ShadowBlur
            | PropertyKind::ShadowColor
            | PropertyKind::ShadowOffset
            | PropertyKind::Filter => MirrorPolicy::Excluded,
            PropertyKind::LineWidth
            | PropertyKind::LineCap
            | PropertyKind::LineJoin
            | PropertyKind::MiterLimit
            | PropertyKind::LineDash
            | PropertyKind::LineDashOffset
            | PropertyKind::Font
            | PropertyKind::TextAlign
            | PropertyKind::TextBaseline
            | PropertyKind::ImageSmoothing => MirrorPolicy::Verbatim,
        }
    }
}

/// Every operation of [`Context2d`](crate::Context2d).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    // Reads
    Width,
    Height,
    Property,
    CurrentTransform,
    MeasureText,
    GetImageData,
    Pixel,
    IsPointInPath,

    // State
    Resize,
    SetProperty,
    Save,
    Restore,
    Translate,
    Scale,
    Rotate,
    Transform,
    SetTransform,
    ResetTransform,

    // Path building
    BeginPath,
    MoveTo,
    LineTo,
    QuadraticCurveTo,
    BezierCurveTo,
    Arc,
    Rect,
    ClosePath,
    Clip,
    ClearRect,

    // Color-producing
    Fill,
    FillRect,
    FillText,
    Stroke,
    StrokeRect,
    StrokeText,
    DrawImage,
}

impl Operation {
    /// The policy applied to this operation.
    ///
    /// `SetProperty` depends on the property written; this returns
    /// `Verbatim` for it and the proxy consults
    /// [`PropertyKind::mirror_policy`] instead.
    pub fn mirror_policy(self) -> MirrorPolicy {
        use Operation as Op;
        match self {
            Op::Width
            | Op::Height
            | Op::Property
            | Op::CurrentTransform
            | Op::MeasureText
            | Op::GetImageData
            | Op::Pixel
            | Op::IsPointInPath => MirrorPolicy::ForwardOnly,
            Op::Resize
            | Op::SetProperty
            | Op::Save
            | Op::Restore
            | Op::Translate
            | Op::Scale
            | Op::Rotate
            | Op::Transform
            | Op::SetTransform
            | Op::ResetTransform
            | Op::BeginPath
            | Op::MoveTo
            | Op::LineTo
            | Op::QuadraticCurveTo
            | Op::BezierCurveTo
            | Op::Arc
            | Op::Rect
            | Op::ClosePath
            | Op::Clip
            | Op::ClearRect => MirrorPolicy::Verbatim,
            Op::Fill
            | Op::FillRect
            | Op::FillText
            | Op::Stroke
            | Op::StrokeRect
            | Op::StrokeText
            | Op::DrawImage => MirrorPolicy::Substitute,
        }
    }
}
