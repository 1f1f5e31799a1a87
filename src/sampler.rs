//! The boundary to the image statistics engine.
//!
//! The geometry engine never touches pixels itself. Everything it knows about
//! the image comes through [`RegionSampler::sample`], which is also the only
//! expensive call the search makes.

use serde::{Deserialize, Serialize};

use crate::shape::{Shape, ShapeKind};
use crate::types::Point;

/// Pixel statistics of one region
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub stddev: f64,
}

impl RegionStats {
    /// Statistics of a sequence of pixel values. The standard deviation is
    /// the sample deviation (`n - 1`). An empty sequence yields NaN for
    /// everything but the deviation.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            n += 1;
            sum += v;
            sum_sq += v * v;
            min = min.min(v);
            max = max.max(v);
        }

        if n == 0 {
            return Self {
                min: f64::NAN,
                mean: f64::NAN,
                max: f64::NAN,
                stddev: 0.0,
            };
        }

        let count = n as f64;
        let mean = sum / count;
        let stddev = if n > 1 {
            ((sum_sq - sum * sum / count) / (count - 1.0)).max(0.0).sqrt()
        } else {
            0.0
        };
        Self {
            min,
            mean,
            max,
            stddev,
        }
    }

    /// Shift every level down by `offset`; the spread is unchanged
    pub fn minus(self, offset: f64) -> Self {
        Self {
            min: self.min - offset,
            mean: self.mean - offset,
            max: self.max - offset,
            stddev: self.stddev,
        }
    }
}

/// Pixel statistics over an arbitrary mask region, given in the mask's
/// coordinate space
pub trait RegionSampler {
    fn sample(&self, region: &Shape) -> RegionStats;
}

impl<S: RegionSampler + ?Sized> RegionSampler for &S {
    fn sample(&self, region: &Shape) -> RegionStats {
        (**self).sample(region)
    }
}

/// Turns dark spots into bright ones for samplers over images whose signal
/// is low where material was printed
#[derive(Debug, Clone, Copy)]
pub struct Inverted<S> {
    pub inner: S,
    /// Highest representable pixel value
    pub white: f64,
}

impl<S: RegionSampler> RegionSampler for Inverted<S> {
    fn sample(&self, region: &Shape) -> RegionStats {
        let stats = self.inner.sample(region);
        RegionStats {
            min: self.white - stats.max,
            mean: self.white - stats.mean,
            max: self.white - stats.min,
            stddev: stats.stddev,
        }
    }
}

/// Integer pixel positions `(x, y)` covered by `region` inside an image of
/// `width` x `height` pixels, row by row.
///
/// Pixels are treated as points at their integer coordinates. A pixel on the
/// outline counts as covered on every side, unlike the pointer hit test of
/// [`Shape::contains_point`]; circles are sampled as true disks.
pub fn covered_pixels(region: &Shape, width: u32, height: u32) -> Vec<(u32, u32)> {
    if !region.is_enabled() || width == 0 || height == 0 {
        return Vec::new();
    }

    let center = region.center();
    let half = region.bounding_half_extents();
    let clamp = |v: f64, limit: u32| v.clamp(0.0, f64::from(limit - 1));
    let x0 = clamp((center.x - half.w).floor(), width) as u32;
    let x1 = clamp((center.x + half.w).ceil(), width) as u32;
    let y0 = clamp((center.y - half.h).floor(), height) as u32;
    let y1 = clamp((center.y + half.h).ceil(), height) as u32;

    let outline = region.points();
    let inside = |x: f64, y: f64| match (region.kind(), region.radius()) {
        (ShapeKind::Circle, Some(r)) => (x - center.x).powi(2) + (y - center.y).powi(2) <= r * r,
        _ => covers(&outline, Point::new(x, y)),
    };

    let mut pixels = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            if inside(f64::from(x), f64::from(y)) {
                pixels.push((x, y));
            }
        }
    }
    pixels
}

/// Closed point-in-polygon test: the outline itself counts as inside.
fn covers(outline: &[Point], p: Point) -> bool {
    let n = outline.len();
    let edges = || (0..n).map(|i| (outline[i], outline[(i + 1) % n]));

    let on_edge = edges().any(|(a, b)| {
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        cross.abs() <= EDGE_EPSILON
            && p.x >= a.x.min(b.x) - EDGE_EPSILON
            && p.x <= a.x.max(b.x) + EDGE_EPSILON
            && p.y >= a.y.min(b.y) - EDGE_EPSILON
            && p.y <= a.y.max(b.y) + EDGE_EPSILON
    });
    if on_edge {
        return true;
    }

    edges()
        .filter(|(a, b)| (a.y > p.y) != (b.y > p.y))
        .filter(|(a, b)| p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y))
        .count()
        % 2
        == 1
}

const EDGE_EPSILON: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ZLevel;
    use crate::types::Size;

    #[test]
    fn stats_of_values() {
        let stats = RegionStats::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 5.0);
        assert!((stats.stddev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn flat_values_have_no_spread() {
        let stats = RegionStats::from_values(std::iter::repeat_n(100.0, 25));
        assert_eq!(stats.mean, 100.0);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn empty_region_has_nan_mean() {
        let stats = RegionStats::from_values(std::iter::empty());
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn inverted_sampler_swaps_extremes() {
        struct Fixed;
        impl RegionSampler for Fixed {
            fn sample(&self, _: &Shape) -> RegionStats {
                RegionStats {
                    min: 10.0,
                    mean: 50.0,
                    max: 200.0,
                    stddev: 3.0,
                }
            }
        }
        let region = Shape::marker(Point::ORIGIN, ZLevel::MeasureField);
        let stats = Inverted {
            inner: Fixed,
            white: 255.0,
        }
        .sample(&region);
        assert_eq!(stats.min, 55.0);
        assert_eq!(stats.mean, 205.0);
        assert_eq!(stats.max, 245.0);
        assert_eq!(stats.stddev, 3.0);
    }

    #[test]
    fn rectangle_covers_its_pixels() {
        let region = Shape::from_cell(
            ShapeKind::Rectangle,
            Point::new(2.0, 3.0),
            Size::new(2.0, 1.0),
            ZLevel::MeasureField,
        );
        let pixels = covered_pixels(&region, 10, 10);
        assert_eq!(pixels, vec![(2, 3), (3, 3), (4, 3), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn square_covers_its_outline_on_every_side() {
        let region = Shape::from_cell(
            ShapeKind::Rectangle,
            Point::new(2.0, 2.0),
            Size::new(3.0, 3.0),
            ZLevel::MeasureField,
        );
        let pixels = covered_pixels(&region, 10, 10);
        let expected: Vec<_> = (2..=5).flat_map(|y| (2..=5).map(move |x| (x, y))).collect();
        assert_eq!(pixels, expected);
        // The pointer hit test still leaves the left edge out
        assert!(!region.contains_point(Point::new(2.0, 3.0)));
    }

    #[test]
    fn diamond_covers_a_symmetric_set() {
        let region = Shape::from_cell(
            ShapeKind::Diamond,
            Point::new(1.0, 1.0),
            Size::new(4.0, 4.0),
            ZLevel::MeasureField,
        );
        let pixels = covered_pixels(&region, 10, 10);
        assert_eq!(pixels.len(), 13);
        for &(x, y) in &pixels {
            assert!(pixels.contains(&(6 - x, y)), "({x}, {y}) has no mirror");
            assert!(pixels.contains(&(x, 6 - y)), "({x}, {y}) has no mirror");
        }
    }

    #[test]
    fn circle_covers_a_disk() {
        let region = Shape::circle(Point::new(5.0, 5.0), 1.0, ZLevel::MeasureField);
        let pixels = covered_pixels(&region, 10, 10);
        assert_eq!(pixels, vec![(5, 4), (4, 5), (5, 5), (6, 5), (5, 6)]);
    }

    #[test]
    fn pixels_are_clipped_to_the_image() {
        let region = Shape::from_cell(
            ShapeKind::Rectangle,
            Point::new(-3.0, -3.0),
            Size::new(4.0, 4.0),
            ZLevel::MeasureField,
        );
        let pixels = covered_pixels(&region, 10, 10);
        assert_eq!(pixels, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}
