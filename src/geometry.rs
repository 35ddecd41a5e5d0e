//! Pixel-space geometry: rectangles, clip shapes and rotation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate this point by `degrees` (clockwise in y-down space) around `pivot`.
    pub fn rotated(self, pivot: Point, degrees: f32) -> Point {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Point {
            x: pivot.x + dx * cos - dy * sin,
            y: pivot.y + dx * sin + dy * cos,
        }
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True if the rect has a positive, finite area.
    pub fn is_drawable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Axis-aligned bounds of this rect rotated around `pivot`.
    pub fn rotated_bounds(&self, pivot: Point, degrees: f32) -> Rect {
        if degrees == 0.0 {
            return *self;
        }
        let corners = [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.x, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
        .map(|c| c.rotated(pivot, degrees));
        let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Region an image draw is clipped to, in unrotated layer space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ClipShape {
    Rect(Rect),
    Circle { center: Point, radius: f32 },
    Ellipse { center: Point, rx: f32, ry: f32 },
    RoundedRect { rect: Rect, radius: f32 },
    Polygon { points: Vec<Point> },
}

impl ClipShape {
    pub fn contains(&self, p: Point) -> bool {
        match self {
            ClipShape::Rect(r) => r.contains(p),
            ClipShape::Circle { center, radius } => {
                let dx = p.x - center.x;
                let dy = p.y - center.y;
                dx * dx + dy * dy <= radius * radius
            }
            ClipShape::Ellipse { center, rx, ry } => {
                if *rx <= 0.0 || *ry <= 0.0 {
                    return false;
                }
                let nx = (p.x - center.x) / rx;
                let ny = (p.y - center.y) / ry;
                nx * nx + ny * ny <= 1.0
            }
            ClipShape::RoundedRect { rect, radius } => {
                if !rect.contains(p) {
                    return false;
                }
                let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
                // Only the corner squares need the distance test.
                let cx = p.x.clamp(rect.x + r, rect.right() - r);
                let cy = p.y.clamp(rect.y + r, rect.bottom() - r);
                let dx = p.x - cx;
                let dy = p.y - cy;
                dx * dx + dy * dy <= r * r
            }
            ClipShape::Polygon { points } => point_in_polygon(p, points),
        }
    }
}

/// Even-odd point-in-polygon test.
fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Point::new(10.0, 0.0).rotated(Point::new(0.0, 0.0), 90.0);
        assert!(close(p.x, 0.0) && close(p.y, 10.0));
    }

    #[test]
    fn test_rotated_bounds_square() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = r.rotated_bounds(r.center(), 45.0);
        let diag = 10.0 * std::f32::consts::SQRT_2;
        assert!(close(b.width, diag));
        assert!(close(b.center().x, 5.0));
    }

    #[test]
    fn test_circle_and_ellipse() {
        let circle = ClipShape::Circle {
            center: Point::new(5.0, 5.0),
            radius: 5.0,
        };
        assert!(circle.contains(Point::new(5.0, 5.0)));
        assert!(!circle.contains(Point::new(0.5, 0.5)));

        let ellipse = ClipShape::Ellipse {
            center: Point::new(10.0, 5.0),
            rx: 10.0,
            ry: 5.0,
        };
        assert!(ellipse.contains(Point::new(1.0, 5.0)));
        assert!(!ellipse.contains(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_rounded_rect_corners() {
        let shape = ClipShape::RoundedRect {
            rect: Rect::new(0.0, 0.0, 100.0, 50.0),
            radius: 10.0,
        };
        assert!(shape.contains(Point::new(50.0, 25.0)));
        assert!(shape.contains(Point::new(5.0, 25.0)));
        assert!(!shape.contains(Point::new(0.5, 0.5)));
        assert!(shape.contains(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_polygon() {
        let triangle = ClipShape::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
        };
        assert!(triangle.contains(Point::new(2.0, 2.0)));
        assert!(!triangle.contains(Point::new(8.0, 8.0)));
        let degenerate = ClipShape::Polygon { points: vec![Point::new(0.0, 0.0)] };
        assert!(!degenerate.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_drawable() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_drawable());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_drawable());
        assert!(!Rect::new(f32::NAN, 0.0, 1.0, 1.0).is_drawable());
    }
}
