//! Connector routing contract.
//!
//! Routing itself is delegated to a [`Router`]. The designer describes the
//! two tables being connected as [`ShapeDescriptor`]s, passes the other
//! tables as obstacles, and receives either an orthogonal point list or
//! [`RouteResult::NotValid`]. A not-valid result never destroys an existing
//! path; when there is no path yet, the designer lays a straight two-point
//! route with [`straight_route`].
//!
//! Moving a table does not re-route. The touching end of every connected
//! path is snapped to the table's nearest edge midpoint with
//! [`snap_endpoint`].

use tessera_core::geometry::{Direction, Point, Rect};

/// One end of a route request.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    bounds: Rect,
    preferred_start: Point,
    directions: Vec<Direction>,
}

impl ShapeDescriptor {
    /// A shape that may be left in any direction, preferably from its center.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            preferred_start: bounds.center(),
            directions: Direction::ALL.to_vec(),
        }
    }

    pub fn with_preferred_start(mut self, point: Point) -> Self {
        self.preferred_start = point;
        self
    }

    /// Restricts the sides a route may leave or enter through.
    pub fn with_directions(mut self, directions: impl IntoIterator<Item = Direction>) -> Self {
        self.directions = directions.into_iter().collect();
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn preferred_start(&self) -> Point {
        self.preferred_start
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn accepts(&self, direction: Direction) -> bool {
        self.directions.contains(&direction)
    }
}

/// Outcome of a route request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResult {
    /// An ordered orthogonal path from source to target.
    Valid(Vec<Point>),
    NotValid,
}

impl RouteResult {
    /// The routed points, if the route is usable.
    ///
    /// A path with fewer than two points is treated as not valid.
    pub fn into_points(self) -> Option<Vec<Point>> {
        match self {
            RouteResult::Valid(points) if points.len() >= 2 => Some(points),
            _ => None,
        }
    }
}

/// Computes connector paths between tables.
pub trait Router {
    fn route(&self, source: &ShapeDescriptor, target: &ShapeDescriptor, obstacles: &[Rect]) -> RouteResult;
}

/// Router used when no routing engine is attached.
///
/// Every request is answered with [`RouteResult::NotValid`], so new
/// references get a [`straight_route`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRouter;

impl Router for NoRouter {
    fn route(&self, _source: &ShapeDescriptor, _target: &ShapeDescriptor, _obstacles: &[Rect]) -> RouteResult {
        RouteResult::NotValid
    }
}

/// Which end of a path to snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    Start,
    End,
}

/// Two-point path between the facing edge midpoints of two rectangles.
///
/// The facing sides follow the dominant axis between the centers. For a
/// rectangle connected to itself the path runs from its east to its north
/// edge.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::{Point, Rect};
/// # use tessera_orm::routing::straight_route;
/// let users = Rect::new(0.0, 0.0, 200.0, 120.0);
/// let orders = Rect::new(400.0, 40.0, 200.0, 120.0);
/// assert_eq!(
///     straight_route(users, orders),
///     vec![Point::new(200.0, 60.0), Point::new(400.0, 100.0)]
/// );
/// ```
pub fn straight_route(source: Rect, target: Rect) -> Vec<Point> {
    if source == target {
        return vec![
            source.edge_midpoint(Direction::East),
            source.edge_midpoint(Direction::North),
        ];
    }

    let offset = target.center().sub_point(source.center());
    let side = if offset.x().abs() >= offset.y().abs() {
        if offset.x() >= 0.0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if offset.y() >= 0.0 {
        Direction::South
    } else {
        Direction::North
    };
    vec![source.edge_midpoint(side), target.edge_midpoint(side.opposite())]
}

/// Moves one end of `points` onto the nearest edge midpoint of `bounds`.
///
/// The side is chosen by the neighbouring point. When the path has interior
/// points, the neighbour is shifted along the snapped side's axis so the
/// first (or last) segment stays orthogonal. Paths with fewer than two
/// points are left alone.
pub fn snap_endpoint(points: &mut [Point], bounds: Rect, end: PathEnd) {
    let len = points.len();
    if len < 2 {
        return;
    }
    let (index, neighbour) = match end {
        PathEnd::Start => (0, 1),
        PathEnd::End => (len - 1, len - 2),
    };

    let side = bounds.nearest_side(points[neighbour]);
    let snapped = bounds.edge_midpoint(side);
    points[index] = snapped;
    if len > 2 {
        let adjusted = if side.is_horizontal() {
            points[neighbour].with_y(snapped.y())
        } else {
            points[neighbour].with_x(snapped.x())
        };
        points[neighbour] = adjusted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_router_is_never_valid() {
        let shape = ShapeDescriptor::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(NoRouter.route(&shape, &shape, &[]), RouteResult::NotValid);
    }

    #[test]
    fn test_shape_descriptor_defaults() {
        let shape = ShapeDescriptor::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(shape.preferred_start(), Point::new(50.0, 25.0));
        assert_eq!(shape.directions(), &Direction::ALL);

        let shape = shape.with_directions([Direction::East, Direction::West]);
        assert!(shape.accepts(Direction::East));
        assert!(!shape.accepts(Direction::North));
    }

    #[test]
    fn test_short_routes_are_not_usable() {
        assert_eq!(RouteResult::Valid(vec![Point::new(1.0, 1.0)]).into_points(), None);
        assert_eq!(RouteResult::NotValid.into_points(), None);
        let points = vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)];
        assert_eq!(RouteResult::Valid(points.clone()).into_points(), Some(points));
    }

    #[test]
    fn test_straight_route_vertical() {
        let top = Rect::new(0.0, 0.0, 100.0, 50.0);
        let bottom = Rect::new(20.0, 300.0, 100.0, 50.0);
        assert_eq!(
            straight_route(bottom, top),
            vec![Point::new(70.0, 300.0), Point::new(50.0, 50.0)]
        );
    }

    #[test]
    fn test_straight_route_to_self() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            straight_route(rect, rect),
            vec![Point::new(100.0, 25.0), Point::new(50.0, 0.0)]
        );
    }

    #[test]
    fn test_snap_start_keeps_first_segment_orthogonal() {
        let mut points = vec![
            Point::new(200.0, 60.0),
            Point::new(300.0, 60.0),
            Point::new(300.0, 400.0),
            Point::new(400.0, 400.0),
        ];
        let moved = Rect::new(0.0, 100.0, 200.0, 120.0);

        snap_endpoint(&mut points, moved, PathEnd::Start);

        assert_eq!(points[0], Point::new(200.0, 160.0));
        assert_eq!(points[1], Point::new(300.0, 160.0));
        assert_eq!(points[2], Point::new(300.0, 400.0));
        assert_eq!(points[3], Point::new(400.0, 400.0));
    }

    #[test]
    fn test_snap_end_of_two_point_path() {
        let mut points = vec![Point::new(200.0, 60.0), Point::new(400.0, 60.0)];
        let moved = Rect::new(500.0, 0.0, 100.0, 100.0);

        snap_endpoint(&mut points, moved, PathEnd::End);

        assert_eq!(points, vec![Point::new(200.0, 60.0), Point::new(500.0, 50.0)]);
    }
}
