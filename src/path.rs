use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{vec2, Vec2};

use crate::Rect;

/// A vector path composed of line segments and Bezier curves.
///
/// Follows the canvas rules for the "current point": drawing
/// without an open subpath implicitly starts one, and a segment
/// after [`Path::close`] starts a new subpath at the previous start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
    start: Option<Vec2>,
    current: Option<Vec2>,
    needs_move: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo {
        control: Vec2,
        end: Vec2,
    },
    CubicTo {
        control1: Vec2,
        control2: Vec2,
        end: Vec2,
    },
    Close,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.segments.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The pen position, if a subpath has been started.
    pub fn current_point(&self) -> Option<Vec2> {
        self.current
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Starts a new subpath at `point`.
    pub fn move_to(&mut self, point: Vec2) {
        self.segments.push(PathSegment::MoveTo(point));
        self.start = Some(point);
        self.current = Some(point);
        self.needs_move = false;
    }

    /// Adds a line segment from the pen position to `point`. Without
    /// a pen position this only moves the pen.
    pub fn line_to(&mut self, point: Vec2) {
        if self.current.is_none() {
            self.move_to(point);
            return;
        }
        self.reopen();
        self.segments.push(PathSegment::LineTo(point));
        self.current = Some(point);
    }

    /// Adds a quadratic Bezier curve from the pen position
    /// to `end` using the given control point.
    pub fn quad_to(&mut self, control: Vec2, end: Vec2) {
        self.ensure_subpath(control);
        self.segments.push(PathSegment::QuadTo { control, end });
        self.current = Some(end);
    }

    /// Adds a cubic Bezier curve from the pen position
    /// to `end` using the given control points.
    pub fn cubic_to(&mut self, control1: Vec2, control2: Vec2, end: Vec2) {
        self.ensure_subpath(control1);
        self.segments.push(PathSegment::CubicTo {
            control1,
            control2,
            end,
        });
        self.current = Some(end);
    }

    /// Closes the current subpath with a line back to its start.
    pub fn close(&mut self) {
        if self.current.is_none() || self.needs_move {
            return;
        }
        self.segments.push(PathSegment::Close);
        self.current = self.start;
        self.needs_move = true;
    }

    /// Adds a closed rectangle as its own subpath.
    ///
    /// Negative sizes are allowed and wind the rectangle the other way.
    pub fn rect(&mut self, rect: Rect) {
        let Rect { pos, size } = rect;
        self.move_to(pos);
        self.line_to(pos + vec2(size.x, 0.));
        self.line_to(pos + size);
        self.line_to(pos + vec2(0., size.y));
        self.close();
    }

    /// Adds a circular arc, connected to the pen position by a straight line.
    ///
    /// Angles are in radians, measured clockwise from the positive x-axis
    /// (y points down). `radius` must be non-negative.
    pub fn arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anticlockwise: bool,
    ) {
        let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
        let start = center + radius * unit(start_angle);
        self.line_to(start);
        if sweep == 0. || radius == 0. {
            return;
        }

        let segment_count = (sweep.abs() / FRAC_PI_2).ceil().max(1.);
        let step = sweep / segment_count;
        // Control point distance for a cubic approximating a `step` arc
        let k = 4. / 3. * (step / 4.).tan();
        let mut angle = start_angle;
        for _ in 0..segment_count as usize {
            let next = angle + step;
            let from = unit(angle);
            let to = unit(next);
            let control1 = center + radius * (from + k * from.perp());
            let control2 = center + radius * (to - k * to.perp());
            self.cubic_to(control1, control2, center + radius * to);
            angle = next;
        }
    }

    fn ensure_subpath(&mut self, point: Vec2) {
        if self.current.is_none() {
            self.move_to(point);
        }
        self.reopen();
    }

    fn reopen(&mut self) {
        if self.needs_move {
            if let Some(start) = self.start {
                self.move_to(start);
            }
        }
    }
}

fn unit(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

/// The signed angle swept by an arc.
fn arc_sweep(start_angle: f32, end_angle: f32, anticlockwise: bool) -> f32 {
    if anticlockwise {
        if start_angle - end_angle >= TAU {
            -TAU
        } else {
            -(start_angle - end_angle).rem_euclid(TAU)
        }
    } else if end_angle - start_angle >= TAU {
        TAU
    } else {
        (end_angle - start_angle).rem_euclid(TAU)
    }
}
