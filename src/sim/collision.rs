//! Collision tests for the two shapes the game needs
//!
//! Paddles are axis-aligned rectangles, balls and pickups are circles. The
//! circle/rectangle test is a box test on the circle's bounding square, so a
//! ball grazing a paddle corner counts as a hit.

use glam::Vec2;

/// A circle (ball, pickup)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned rectangle given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }
}

/// Whether the circle's bounding box overlaps the rectangle (strict overlap,
/// touching edges do not count)
pub fn circle_intersects_rect(circle: Circle, rect: Rect) -> bool {
    let c = circle.center;
    let r = circle.radius;
    c.x + r > rect.left() && c.x - r < rect.right() && c.y + r > rect.top() && c.y - r < rect.bottom()
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Whether two circles overlap
pub fn circles_overlap(a: Circle, b: Circle) -> bool {
    distance(a.center, b.center) < a.radius + b.radius
}
