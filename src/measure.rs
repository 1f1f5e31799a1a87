//! Hand the finalized measure fields to the image statistics engine.

use crate::log::{debug, warn};
use crate::mask::SlideMask;
use crate::sampler::{RegionSampler, RegionStats};
use crate::shape::Shape;
use crate::types::{Point, Size};

/// Options for a measurement run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasureOptions {
    /// Subtract the mean level under the noise rectangles from every spot
    pub subtract_background: bool,
    /// Image size in pixels; noise rectangles reaching outside are ignored
    pub image_size: Size,
}

/// Statistics of one enabled spot
#[derive(Debug, Clone, PartialEq)]
pub struct SpotMeasurement {
    pub field: usize,
    pub row: usize,
    pub col: usize,
    /// The measured region
    pub shape: Shape,
    pub centroid: Point,
    pub stats: RegionStats,
}

/// Sample every enabled spot, ordered by spot field, row and column.
///
/// Regions without any pixel (NaN mean) are reported as zero min, mean and
/// max, also when the background is subtracted.
pub fn measure<S: RegionSampler + ?Sized>(
    mask: &SlideMask,
    sampler: &S,
    options: &MeasureOptions,
) -> Vec<SpotMeasurement> {
    let background = if options.subtract_background {
        let estimate = estimate_background(mask, sampler, options.image_size);
        if estimate.is_none() {
            warn!("no noise rectangle lies within the image, background not subtracted");
        }
        estimate
    } else {
        None
    };

    let last_index = mask.params().last_spot_index;
    let mut results = Vec::new();
    for (field, grid) in mask.measure_fields().iter().enumerate() {
        for (row, col, shape) in grid.iter_cells().take(last_index + 1) {
            let mut stats = sampler.sample(shape);
            if let Some(level) = background {
                stats = stats.minus(level);
            }
            if stats.mean.is_nan() {
                warn!(
                    field,
                    row,
                    col,
                    min = stats.min,
                    max = stats.max,
                    "measure field has no valid values, reporting zeros"
                );
                stats.min = 0.0;
                stats.mean = 0.0;
                stats.max = 0.0;
            }
            results.push(SpotMeasurement {
                field,
                row,
                col,
                shape: shape.clone(),
                centroid: shape.center(),
                stats,
            });
        }
    }
    results
}

/// Mean of the noise rectangle means for rectangles that lie fully within
/// an image of `image_size`. `None` if there are none.
pub fn estimate_background<S: RegionSampler + ?Sized>(
    mask: &SlideMask,
    sampler: &S,
    image_size: Size,
) -> Option<f64> {
    let inside = |p: &Point| p.x >= 0.0 && p.y >= 0.0 && p.x <= image_size.w && p.y <= image_size.h;

    let means: Vec<f64> = mask
        .background_regions()
        .filter(|region| region.points().iter().all(inside))
        .map(|region| sampler.sample(region).mean)
        .collect();
    if means.is_empty() {
        return None;
    }

    let level = means.iter().sum::<f64>() / means.len() as f64;
    debug!(rects = means.len(), level, "background estimated");
    Some(level)
}
