use glam::{vec2, Vec2};

/// A rectangle.
///
/// Sizes may be negative, as with the canvas API; use
/// [`Rect::normalized`] to get a rectangle with a top-left origin.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    /// The position of the top-left corner
    /// of this rectangle.
    pub pos: Vec2,
    /// The side lengths of this rectangle.
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(vec2(x, y), vec2(width, height))
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn offset(self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }

    /// Flips negative side lengths so that `pos` is the top-left corner.
    pub fn normalized(self) -> Self {
        let a = self.pos;
        let b = self.pos + self.size;
        Self {
            pos: a.min(b),
            size: (b - a).abs(),
        }
    }

    pub fn is_finite(self) -> bool {
        self.pos.is_finite() && self.size.is_finite()
    }

    pub fn is_empty(self) -> bool {
        self.size.x == 0. || self.size.y == 0.
    }

    pub fn contains(self, pos: Vec2) -> bool {
        let rect = self.normalized();
        pos.x >= rect.pos.x
            && pos.y >= rect.pos.y
            && pos.x < (rect.pos.x + rect.size.x)
            && pos.y < (rect.pos.y + rect.size.y)
    }

    /// Computes the overlap of two rectangles, if any.
    pub fn intersection(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();
        let min = a.pos.max(b.pos);
        let max = (a.pos + a.size).min(b.pos + b.size);
        if max.x > min.x && max.y > min.y {
            Some(Rect::new(min, max - min))
        } else {
            None
        }
    }
}
