//! Shared helpers for the integration tests: a pixel-backed sampler over
//! synthetic grayscale images and a few small mask layouts.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use spotmask::{MaskParams, MeasureShape, Point, RegionSampler, RegionStats, Shape, covered_pixels};

/// Samples a grayscale image at the pixels a region covers
pub struct ImageSampler {
    pub image: GrayImage,
}

impl ImageSampler {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    /// Uniform image of `level`
    pub fn flat(width: u32, height: u32, level: u8) -> Self {
        Self::new(GrayImage::from_pixel(width, height, Luma([level])))
    }

    /// Image whose value at `(x, y)` comes from `f`
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        Self::new(GrayImage::from_fn(width, height, |x, y| Luma([f(x, y)])))
    }
}

impl RegionSampler for ImageSampler {
    fn sample(&self, region: &Shape) -> RegionStats {
        let (width, height) = self.image.dimensions();
        RegionStats::from_values(
            covered_pixels(region, width, height)
                .into_iter()
                .map(|(x, y)| f64::from(self.image.get_pixel(x, y).0[0])),
        )
    }
}

/// One 40x40 spot field of 2x2 spots with circular 10px measure fields,
/// 10px from the slide's upper left corner
pub fn two_by_two() -> MaskParams {
    MaskParams {
        slide_width: 100.0,
        slide_height: 100.0,
        x_inset: 10.0,
        y_inset: 10.0,
        super_grid_cols: 1,
        super_grid_rows: 1,
        horizontal_spacing: Vec::new(),
        vertical_spacing: Vec::new(),
        spot_field_width: 40.0,
        spot_field_height: 40.0,
        spot_field_rows: 2,
        spot_field_cols: 2,
        measure_shape: MeasureShape::Circle,
        measure_width: 10.0,
        measure_height: 10.0,
        last_spot_index: 3,
    }
}

/// 3x3 spots of 11px with single-pixel square measure fields. The insets are
/// chosen so every measure field is centered on an integer pixel.
pub fn pixel_spots() -> MaskParams {
    MaskParams {
        slide_width: 60.0,
        slide_height: 60.0,
        x_inset: 10.5,
        y_inset: 10.5,
        super_grid_cols: 1,
        super_grid_rows: 1,
        horizontal_spacing: Vec::new(),
        vertical_spacing: Vec::new(),
        spot_field_width: 33.0,
        spot_field_height: 33.0,
        spot_field_rows: 3,
        spot_field_cols: 3,
        measure_shape: MeasureShape::Rectangle,
        measure_width: 1.0,
        measure_height: 1.0,
        last_spot_index: 8,
    }
}

pub fn assert_points_close(a: &[Point], b: &[Point]) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert!(
            p.distance_to(*q) < 1e-9,
            "points differ: ({}, {}) vs ({}, {})",
            p.x,
            p.y,
            q.x,
            q.y
        );
    }
}
