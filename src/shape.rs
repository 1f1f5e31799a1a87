//! Shape types for slide masks
//!
//! Each outline kind is its own type that carries its corner count in its
//! array length and knows how to:
//! - Report its corners (clockwise)
//! - Describe the outline used by shape arithmetic
//! - Hit-test a point
//!
//! [`Shape`] wraps an outline with the interaction state shared by every
//! kind: whether it is enabled and which z-level it lives on.

use enum_dispatch::enum_dispatch;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::errors::MaskError;
use crate::types::{Angle, Point, Size};

/// Geometric kind of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Four sides, four corners, opposite sides of equal length.
    Rectangle,
    /// A rectangle rotated by 45 degrees; same extreme positions as an oval.
    Diamond,
    /// A circle, width and height being the same.
    Circle,
    /// Connection of two points.
    Line,
    /// A single point instead of a proper shape.
    Point,
}

impl ShapeKind {
    /// Number of stored corners for this kind
    pub const fn corner_count(self) -> usize {
        match self {
            ShapeKind::Rectangle | ShapeKind::Diamond => 4,
            ShapeKind::Line => 2,
            ShapeKind::Circle | ShapeKind::Point => 1,
        }
    }
}

/// Draw and interaction priority. Higher levels sit in front and win when a
/// drag gesture grabs overlapping shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZLevel {
    Background = 0,
    Slide = 1,
    SpotField = 2,
    MeasureField = 3,
    NoiseRect = 4,
}

/// Common behavior for all outline kinds
#[enum_dispatch]
pub trait Outline {
    fn kind(&self) -> ShapeKind;

    /// Stored corners, clockwise
    fn corners(&self) -> &[Coordinate];

    fn corners_mut(&mut self) -> &mut [Coordinate];

    /// Points describing the outline for shape arithmetic. Defaults to the
    /// stored corners.
    fn outline_points(&self) -> Vec<Point> {
        self.corners().iter().map(Coordinate::point).collect()
    }

    /// Geometric hit test, ignoring the enabled state
    fn contains(&self, p: Point) -> bool {
        polygon_contains(self.corners(), p)
    }

    /// Called after the corners were rotated by `delta` around some center
    fn rotated(&mut self, _delta: Angle) {}
}

// ============================================================================
// Outline Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleOutline {
    corners: [Coordinate; 4],
}

impl RectangleOutline {
    /// Corners clockwise from the upper left
    pub fn new(corners: [Point; 4]) -> Self {
        Self {
            corners: corners.map(Coordinate::new),
        }
    }
}

impl Outline for RectangleOutline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn corners(&self) -> &[Coordinate] {
        &self.corners
    }

    fn corners_mut(&mut self) -> &mut [Coordinate] {
        &mut self.corners
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiamondOutline {
    corners: [Coordinate; 4],
}

impl DiamondOutline {
    /// Corners clockwise from the top
    pub fn new(corners: [Point; 4]) -> Self {
        Self {
            corners: corners.map(Coordinate::new),
        }
    }
}

impl Outline for DiamondOutline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Diamond
    }

    fn corners(&self) -> &[Coordinate] {
        &self.corners
    }

    fn corners_mut(&mut self) -> &mut [Coordinate] {
        &mut self.corners
    }
}

/// A circle stored as its center. Arithmetic sees it as its bounding square,
/// which turns along with the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleOutline {
    center: [Coordinate; 1],
    radius: f64,
    /// Accumulated rotation of the bounding square
    tilt: Angle,
}

impl CircleOutline {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center: [Coordinate::new(center)],
            radius,
            tilt: Angle::ZERO,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn center(&self) -> Point {
        self.center[0].point()
    }
}

impl Outline for CircleOutline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Circle
    }

    fn corners(&self) -> &[Coordinate] {
        &self.center
    }

    fn corners_mut(&mut self) -> &mut [Coordinate] {
        &mut self.center
    }

    fn outline_points(&self) -> Vec<Point> {
        let r = self.radius;
        let center = DVec2::from(self.center());
        // Same rotation sense as Coordinate::rotate_by (clockwise on screen)
        let turn = DVec2::from_angle(-self.tilt.radians());
        [
            DVec2::new(-r, -r),
            DVec2::new(r, -r),
            DVec2::new(r, r),
            DVec2::new(-r, r),
        ]
        .into_iter()
        .map(|corner| Point::from(center + turn.rotate(corner)))
        .collect()
    }

    fn contains(&self, p: Point) -> bool {
        within_box(self.center(), p, self.radius)
    }

    fn rotated(&mut self, delta: Angle) {
        self.tilt = (self.tilt + delta).normalized();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineOutline {
    ends: [Coordinate; 2],
}

impl LineOutline {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            ends: [Coordinate::new(start), Coordinate::new(end)],
        }
    }
}

impl Outline for LineOutline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn corners(&self) -> &[Coordinate] {
        &self.ends
    }

    fn corners_mut(&mut self) -> &mut [Coordinate] {
        &mut self.ends
    }
}

/// A single point, e.g. a label anchor
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOutline {
    at: [Coordinate; 1],
}

impl MarkerOutline {
    pub fn new(at: Point) -> Self {
        Self {
            at: [Coordinate::new(at)],
        }
    }
}

impl Outline for MarkerOutline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Point
    }

    fn corners(&self) -> &[Coordinate] {
        &self.at
    }

    fn corners_mut(&mut self) -> &mut [Coordinate] {
        &mut self.at
    }

    fn contains(&self, p: Point) -> bool {
        within_box(self.at[0].point(), p, 0.0)
    }
}

/// Enum wrapping all outline kinds
#[enum_dispatch(Outline)]
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rectangle(RectangleOutline),
    Diamond(DiamondOutline),
    Circle(CircleOutline),
    Line(LineOutline),
    Marker(MarkerOutline),
}

impl Geometry {
    /// Build an outline of `kind` from exactly `kind.corner_count()` points.
    /// Circles take their radius from `radius`.
    fn from_points(kind: ShapeKind, points: &[Point], radius: f64) -> Option<Geometry> {
        let geometry = match (kind, points) {
            (ShapeKind::Rectangle, &[a, b, c, d]) => RectangleOutline::new([a, b, c, d]).into(),
            (ShapeKind::Diamond, &[a, b, c, d]) => DiamondOutline::new([a, b, c, d]).into(),
            (ShapeKind::Circle, &[center]) => CircleOutline::new(center, radius).into(),
            (ShapeKind::Line, &[a, b]) => LineOutline::new(a, b).into(),
            (ShapeKind::Point, &[at]) => MarkerOutline::new(at).into(),
            _ => return None,
        };
        Some(geometry)
    }
}

// ============================================================================
// Shape
// ============================================================================

/// One region of a slide mask
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    geometry: Geometry,
    enabled: bool,
    z_level: ZLevel,
}

impl Shape {
    fn with_geometry(geometry: Geometry, z_level: ZLevel) -> Self {
        Self {
            geometry,
            enabled: true,
            z_level,
        }
    }

    /// Corners clockwise from the upper left
    pub fn rectangle(corners: [Point; 4], z_level: ZLevel) -> Self {
        Self::with_geometry(RectangleOutline::new(corners).into(), z_level)
    }

    /// Corners clockwise from the top
    pub fn diamond(corners: [Point; 4], z_level: ZLevel) -> Self {
        Self::with_geometry(DiamondOutline::new(corners).into(), z_level)
    }

    pub fn circle(center: Point, radius: f64, z_level: ZLevel) -> Self {
        Self::with_geometry(CircleOutline::new(center, radius).into(), z_level)
    }

    pub fn line(start: Point, end: Point, z_level: ZLevel) -> Self {
        Self::with_geometry(LineOutline::new(start, end).into(), z_level)
    }

    pub fn marker(at: Point, z_level: ZLevel) -> Self {
        Self::with_geometry(MarkerOutline::new(at).into(), z_level)
    }

    /// Lay out a shape of `kind` inside the box starting at `top_left`.
    ///
    /// Rectangles fill the box, diamonds touch the midpoints of its edges,
    /// circles are inscribed (radius = half the width), points sit on
    /// `top_left` and lines run along the box diagonal.
    pub fn from_cell(kind: ShapeKind, top_left: Point, size: Size, z_level: ZLevel) -> Self {
        let Point { x, y } = top_left;
        let Size { w, h } = size;
        match kind {
            ShapeKind::Rectangle => Self::rectangle(
                [
                    Point::new(x, y),
                    Point::new(x + w, y),
                    Point::new(x + w, y + h),
                    Point::new(x, y + h),
                ],
                z_level,
            ),
            ShapeKind::Diamond => Self::diamond(
                [
                    Point::new(x + w / 2.0, y),
                    Point::new(x + w, y + h / 2.0),
                    Point::new(x + w / 2.0, y + h),
                    Point::new(x, y + h / 2.0),
                ],
                z_level,
            ),
            ShapeKind::Circle => Self::circle(Point::new(x + w / 2.0, y + h / 2.0), w / 2.0, z_level),
            ShapeKind::Line => Self::line(top_left, Point::new(x + w, y + h), z_level),
            ShapeKind::Point => Self::marker(top_left, z_level),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn z_level(&self) -> ZLevel {
        self.z_level
    }

    pub fn corners(&self) -> &[Coordinate] {
        self.geometry.corners()
    }

    /// Corner positions, clockwise
    pub fn points(&self) -> Vec<Point> {
        self.corners().iter().map(Coordinate::point).collect()
    }

    /// Radius of a circle shape
    pub fn radius(&self) -> Option<f64> {
        match &self.geometry {
            Geometry::Circle(circle) => Some(circle.radius()),
            _ => None,
        }
    }

    /// Average of all corners
    pub fn center(&self) -> Point {
        let corners = self.corners();
        let sum = corners
            .iter()
            .fold(DVec2::ZERO, |acc, c| acc + DVec2::from(c.point()));
        Point::from(sum / corners.len() as f64)
    }

    /// Half of the axis-aligned extent of the outline
    pub fn bounding_half_extents(&self) -> Size {
        let points = self.geometry.outline_points();
        let (min, max) = points.iter().fold(
            (DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)),
            |(min, max), p| {
                let v = DVec2::from(*p);
                (min.min(v), max.max(v))
            },
        );
        let extent = (max - min) / 2.0;
        Size::new(extent.x, extent.y)
    }

    /// Move every corner linearly. Orbits stay valid only if the rotational
    /// center moves by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for corner in self.geometry.corners_mut() {
            corner.translate(dx, dy);
        }
    }

    /// Move the shape so that its center lands on `center`
    pub fn move_to_center(&mut self, center: Point) {
        let delta = center - self.center();
        self.translate(delta.dx, delta.dy);
    }

    /// Copy of this shape re-centered on `center`
    pub fn centered_at(&self, center: Point) -> Shape {
        let mut copy = self.clone();
        copy.move_to_center(center);
        copy
    }

    /// Rotate every corner by `delta` around `center`. Orbits must be current.
    pub fn rotate_by(&mut self, delta: Angle, center: Point) {
        for corner in self.geometry.corners_mut() {
            corner.rotate_by(delta, center);
        }
        self.geometry.rotated(delta);
    }

    /// Re-derive the polar state of every corner against `center`
    pub fn recompute_orbits(&mut self, center: Point) {
        for corner in self.geometry.corners_mut() {
            corner.recompute_orbit(center);
        }
    }

    /// Replace all corner positions. Orbits are stale afterwards.
    pub fn set_corners(&mut self, points: &[Point]) -> Result<(), MaskError> {
        let expected = self.kind().corner_count();
        if points.len() != expected {
            return Err(MaskError::CornerCount {
                kind: self.kind(),
                expected,
                got: points.len(),
            });
        }
        for (corner, p) in self.geometry.corners_mut().iter_mut().zip(points) {
            corner.set_point(*p);
        }
        Ok(())
    }

    /// Hit test honoring the enabled state.
    ///
    /// Polygons use even-odd ray casting; a point exactly on a vertex, or on a
    /// horizontal edge whose endpoints straddle it, counts as inside. Circles
    /// and points test the axis-aligned box around their center.
    pub fn contains_point(&self, p: Point) -> bool {
        self.enabled && self.geometry.contains(p)
    }

    /// Box test around the center with an explicit radius:
    /// `|dx| <= radius && |dy| <= radius`.
    pub fn contains_within(&self, p: Point, radius: f64) -> bool {
        self.enabled && within_box(self.center(), p, radius)
    }

    /// Whether `other` overlaps this shape.
    ///
    /// Circles are treated as boxes of half-width `2 * radius - 1` around their
    /// center, which only holds for two circles of the same radius. Polygons
    /// hit-test the corner of `other` nearest to this shape's center.
    pub fn intersects(&self, other: &Shape, radius: f64) -> bool {
        if self.kind() == ShapeKind::Circle {
            return self.contains_within(other.center(), radius * 2.0 - 1.0);
        }

        let center = self.center();
        let (closest, _) = other.corners().iter().map(Coordinate::point).fold(
            (other.center(), f64::MAX),
            |(best, best_dist), p| {
                let dist = center.distance_to(p);
                if dist < best_dist { (p, dist) } else { (best, best_dist) }
            },
        );
        self.contains_point(closest)
    }

    /// Move this shape's corners inward by the corner-to-center vectors of
    /// `other`. For a spot cell shrunk by its measure field this yields the
    /// region the measure field's center may occupy.
    ///
    /// Returns `None` if the outlines have different corner counts.
    pub fn shrink_by(&self, other: &Shape) -> Option<Shape> {
        let outline = other.geometry.outline_points();
        if self.corners().len() != outline.len() {
            return None;
        }

        let other_center = other.center();
        let mut deltas: Vec<_> = outline.iter().map(|p| other_center - *p).collect();
        if other.kind() == ShapeKind::Diamond {
            // Diamond corners sit on edge midpoints; combine neighbours to get
            // the deltas of the bounding rectangle
            let n = deltas.len();
            deltas = (0..n).map(|c| deltas[c] + deltas[(c + n - 1) % n]).collect();
        }

        let points: Vec<_> = self
            .corners()
            .iter()
            .zip(deltas)
            .map(|(corner, delta)| corner.point() + delta)
            .collect();
        let geometry = Geometry::from_points(self.kind(), &points, self.radius().unwrap_or(0.0))?;
        Some(Shape::with_geometry(geometry, ZLevel::Background))
    }

    /// Shape whose corners are the midpoints of corresponding corners.
    ///
    /// Returns `None` if the corner counts differ.
    pub fn average_with(&self, other: &Shape) -> Option<Shape> {
        if self.corners().len() != other.corners().len() {
            return None;
        }
        let points: Vec<_> = self
            .corners()
            .iter()
            .zip(other.corners())
            .map(|(a, b)| a.point().midpoint(b.point()))
            .collect();
        let geometry = Geometry::from_points(self.kind(), &points, self.radius().unwrap_or(0.0))?;
        Some(Shape::with_geometry(geometry, self.z_level))
    }
}

fn within_box(center: Point, p: Point, radius: f64) -> bool {
    (p.x - center.x).abs() <= radius && (p.y - center.y).abs() <= radius
}

/// Even-odd ray casting towards +x with explicit tie-breaks.
fn polygon_contains(corners: &[Coordinate], p: Point) -> bool {
    let n = corners.len();
    let edge = |i: usize| (corners[i].point(), corners[(i + 1) % n].point());

    for i in 0..n {
        let (a, b) = edge(i);
        if a.y == p.y {
            // Exactly on a corner
            if a.x == p.x {
                return true;
            }
            // Exactly on a horizontal edge
            if b.y == p.y && ((a.x <= p.x) ^ (b.x <= p.x)) {
                return true;
            }
        }
    }

    let mut crossings = 0;
    for i in 0..n {
        let (a, b) = edge(i);
        // One end above, one below the ray
        if (a.y < p.y) ^ (b.y < p.y) {
            let crosses = if a.x >= p.x && b.x >= p.x {
                true
            } else if a.x >= p.x {
                crosses_ahead(b, a, p)
            } else if b.x >= p.x {
                crosses_ahead(a, b, p)
            } else {
                false
            };
            if crosses {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

/// Whether the edge from `behind` (left of `p`) to `ahead` (right of `p`)
/// meets the ray right of `p`.
fn crosses_ahead(behind: Point, ahead: Point, p: Point) -> bool {
    let slope = ((ahead.y - behind.y) / (ahead.x - behind.x)).abs();
    slope != 0.0 && (p.x - behind.x) * slope < (p.y - behind.y).abs()
}

// ============================================================================
// Tests
// ============================================================================
