//! Points with polar state around a rotational center.
//!
//! A [`Coordinate`] can be described either by its cartesian position or by
//! its distance and angle relative to some center. Both views are kept so a
//! whole mask can be moved linearly without touching the polar state, and
//! rotated without recomputing radii.
//!
//! Angles are in degrees and measured from the vector pointing straight down
//! from the center (+y): 1° is slightly to the right, 359° slightly to the
//! left. Downstream rotation math depends on this zero direction.

use std::fmt;

use crate::types::{Angle, Point};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Coordinate {
    point: Point,
    /// Angle relative to the center, always in `[0, 360)`
    angle: Angle,
    /// Distance to the center
    radius: f64,
}

impl Coordinate {
    /// A coordinate with no polar state yet; call [`Coordinate::recompute_orbit`]
    /// before rotating it.
    pub fn new(point: Point) -> Self {
        Coordinate {
            point,
            angle: Angle::ZERO,
            radius: 0.0,
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn x(&self) -> f64 {
        self.point.x
    }

    pub fn y(&self) -> f64 {
        self.point.y
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Derive angle and radius from the current point.
    pub fn recompute_orbit(&mut self, center: Point) {
        let dx = self.point.x - center.x;
        let dy = self.point.y - center.y;

        self.radius = dx.hypot(dy);
        // atan2(dx, dy), not atan2(dy, dx): zero points down the y axis
        self.angle = Angle(dx.atan2(dy).to_degrees()).normalized();
    }

    /// Set a new angle and recompute the point from the unchanged radius.
    pub fn set_angle(&mut self, angle: Angle, center: Point) {
        self.angle = angle.normalized();

        let rad = self.angle.radians();
        self.point = Point::new(
            center.x + rad.sin() * self.radius,
            center.y + rad.cos() * self.radius,
        );
    }

    /// Rotate around `center` by `delta` degrees.
    pub fn rotate_by(&mut self, delta: Angle, center: Point) {
        self.set_angle(self.angle + delta, center);
    }

    /// Move linearly. The polar state is stale afterwards unless the center
    /// moved by the same delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.point = self.point.shifted(dx, dy);
    }

    /// Replace the point. The polar state is stale afterwards.
    pub fn set_point(&mut self, point: Point) {
        self.point = point;
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} r={}",
            self.point, self.angle, self.radius
        )
    }
}
