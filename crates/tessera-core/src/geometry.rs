//! Geometric primitives for designer shapes and connector routes.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in design space
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - An axis-aligned rectangle defined by its top-left corner and size
//! - [`RectSource`] - A loosely specified rectangle, resolved with field priorities
//! - [`Thickness`] - Per-side spacing (left, top, right, bottom)
//! - [`Direction`] - A compass side of a rectangle
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Origin is top-left, Y increases downward, as on every designer surface.

/// A 2D point in design coordinate space.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// A compass side of a rectangle, used for connector exits and entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, clockwise from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Returns `true` for east and west.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

/// An axis-aligned rectangle stored as top-left corner plus size.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::{Direction, Point, Rect};
/// let rect = Rect::new(100.0, 200.0, 80.0, 40.0);
/// assert_eq!(rect.right(), 180.0);
/// assert_eq!(rect.bottom(), 240.0);
/// assert_eq!(rect.center(), Point::new(140.0, 220.0));
/// assert_eq!(rect.edge_midpoint(Direction::West), Point::new(100.0, 220.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left point and a size.
    pub fn from_position(position: Point, size: Size) -> Self {
        Self::new(position.x(), position.y(), size.width(), size.height())
    }

    /// Left edge (same as `x`).
    pub fn x(self) -> f64 {
        self.x
    }

    /// Top edge (same as `y`).
    pub fn y(self) -> f64 {
        self.y
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    pub fn left(self) -> f64 {
        self.x
    }

    pub fn top(self) -> f64 {
        self.y
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    /// Returns the top-left corner as a Point
    pub fn position(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts the rectangle dimensions to a Size
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the center point of the rectangle
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns the same rectangle moved so its top-left corner is `position`.
    pub fn with_position(self, position: Point) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            ..self
        }
    }

    /// Returns the same rectangle resized to `size`, keeping its corner.
    pub fn with_size(self, size: Size) -> Self {
        Self {
            width: size.width(),
            height: size.height(),
            ..self
        }
    }

    /// Midpoint of the given side.
    pub fn edge_midpoint(self, side: Direction) -> Point {
        let center = self.center();
        match side {
            Direction::North => Point::new(center.x(), self.top()),
            Direction::East => Point::new(self.right(), center.y()),
            Direction::South => Point::new(center.x(), self.bottom()),
            Direction::West => Point::new(self.left(), center.y()),
        }
    }

    /// The side whose midpoint is closest to `point`.
    ///
    /// Ties resolve in [`Direction::ALL`] order.
    pub fn nearest_side(self, point: Point) -> Direction {
        let mut best = Direction::North;
        let mut best_distance = f64::INFINITY;
        for side in Direction::ALL {
            let distance = self.edge_midpoint(side).distance_to(point);
            if distance < best_distance {
                best = side;
                best_distance = distance;
            }
        }
        best
    }

    /// Returns `true` if `point` lies inside or on the border.
    pub fn contains(self, point: Point) -> bool {
        point.x() >= self.left()
            && point.x() <= self.right()
            && point.y() >= self.top()
            && point.y() <= self.bottom()
    }

    /// Returns `true` if the two rectangles overlap with a non-empty area.
    pub fn intersects(self, other: Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Moves the rectangle by the specified offset.
    pub fn translate(self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x(),
            y: self.y + offset.y(),
            ..self
        }
    }

    /// Grows the rectangle outward by a thickness on each side.
    pub fn inflate(self, thickness: Thickness) -> Self {
        Self {
            x: self.x - thickness.left(),
            y: self.y - thickness.top(),
            width: self.width + thickness.horizontal_sum(),
            height: self.height + thickness.vertical_sum(),
        }
    }
}

/// A rectangle whose fields may be missing or given under alternative names.
///
/// Designer payloads carry either `Left`/`Top` or `X`/`Y` for the corner.
/// [`RectSource::resolve`] prefers `Left` over `X` and `Top` over `Y`
/// independently, falling back to `0` when neither is present. `Width` and
/// `Height` fall back to `0`.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::{Rect, RectSource};
/// let source = RectSource::default().with_x(50.0).with_y(75.0);
/// assert_eq!(source.resolve(), Rect::new(50.0, 75.0, 0.0, 0.0));
///
/// let source = RectSource::default().with_x(1.0).with_left(2.0);
/// assert_eq!(source.resolve().x(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectSource {
    left: Option<f64>,
    top: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

impl RectSource {
    pub fn with_left(mut self, left: f64) -> Self {
        self.left = Some(left);
        self
    }

    pub fn with_top(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Returns `true` if no width was given.
    pub fn missing_width(&self) -> bool {
        self.width.is_none()
    }

    /// Returns `true` if no height was given.
    pub fn missing_height(&self) -> bool {
        self.height.is_none()
    }

    /// Resolves the source into a concrete rectangle.
    pub fn resolve(&self) -> Rect {
        Rect::new(
            self.left.or(self.x).unwrap_or(0.0),
            self.top.or(self.y).unwrap_or(0.0),
            self.width.unwrap_or(0.0),
            self.height.unwrap_or(0.0),
        )
    }
}

impl From<Rect> for RectSource {
    fn from(rect: Rect) -> Self {
        Self::default()
            .with_x(rect.x())
            .with_y(rect.y())
            .with_width(rect.width())
            .with_height(rect.height())
    }
}

/// Spacing around an element with potentially different values per side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thickness {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Thickness {
    /// Creates a thickness with specified values for each side
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a uniform thickness with the same value for all sides
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn left(self) -> f64 {
        self.left
    }

    pub fn top(self) -> f64 {
        self.top
    }

    pub fn right(self) -> f64 {
        self.right
    }

    pub fn bottom(self) -> f64 {
        self.bottom
    }

    /// Returns `true` if all four sides are equal
    pub fn is_uniform(self) -> bool {
        self.left == self.top && self.top == self.right && self.right == self.bottom
    }

    /// Returns the sum of left and right
    pub fn horizontal_sum(self) -> f64 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom
    pub fn vertical_sum(self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_default() {
        let point = Point::default();
        assert_eq!(point.x(), 0.0);
        assert_eq!(point.y(), 0.0);
        assert!(point.is_zero());
    }

    #[test]
    fn test_point_arithmetic() {
        let p1 = Point::new(1.0, 2.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.add_point(p2), Point::new(4.0, 6.0));
        assert_eq!(p2.sub_point(p1), Point::new(2.0, 2.0));
        assert_approx_eq!(f64, p1.distance_to(p2), 8.0f64.sqrt());
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.edge_midpoint(Direction::North), Point::new(60.0, 20.0));
        assert_eq!(rect.edge_midpoint(Direction::East), Point::new(110.0, 45.0));
        assert_eq!(rect.edge_midpoint(Direction::South), Point::new(60.0, 70.0));
        assert_eq!(rect.edge_midpoint(Direction::West), Point::new(10.0, 45.0));
    }

    #[test]
    fn test_rect_nearest_side() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(rect.nearest_side(Point::new(300.0, 50.0)), Direction::East);
        assert_eq!(rect.nearest_side(Point::new(-300.0, 40.0)), Direction::West);
        assert_eq!(rect.nearest_side(Point::new(50.0, -10.0)), Direction::North);
        assert_eq!(rect.nearest_side(Point::new(60.0, 500.0)), Direction::South);
    }

    #[test]
    fn test_rect_with_position_keeps_size() {
        let rect = Rect::new(0.0, 0.0, 200.0, 120.0).with_position(Point::new(100.0, 200.0));
        assert_eq!(rect, Rect::new(100.0, 200.0, 200.0, 120.0));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.contains(Point::new(10.0, 10.0)));
        assert!(!a.contains(Point::new(10.1, 10.0)));
    }

    #[test]
    fn test_rect_inflate() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(Thickness::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect, Rect::new(9.0, 8.0, 24.0, 26.0));
    }

    #[test]
    fn test_rect_source_priority() {
        let both = RectSource::default()
            .with_left(1.0)
            .with_x(2.0)
            .with_top(3.0)
            .with_y(4.0);
        assert_eq!(both.resolve(), Rect::new(1.0, 3.0, 0.0, 0.0));

        let only_xy = RectSource::default().with_x(2.0).with_y(4.0);
        assert_eq!(only_xy.resolve(), Rect::new(2.0, 4.0, 0.0, 0.0));

        let mixed = RectSource::default().with_left(7.0).with_y(9.0);
        assert_eq!(mixed.resolve(), Rect::new(7.0, 9.0, 0.0, 0.0));

        assert_eq!(RectSource::default().resolve(), Rect::default());
    }

    #[test]
    fn test_thickness() {
        let uniform = Thickness::uniform(5.0);
        assert!(uniform.is_uniform());
        assert_eq!(uniform.horizontal_sum(), 10.0);

        let mixed = Thickness::new(1.0, 2.0, 3.0, 4.0);
        assert!(!mixed.is_uniform());
        assert_eq!(mixed.vertical_sum(), 6.0);
    }

    #[test]
    fn test_direction_opposite() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert!(Direction::East.is_horizontal());
        assert!(!Direction::North.is_horizontal());
    }
}
