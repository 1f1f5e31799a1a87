//! Fit the default slide mask to a synthetic slide image and print the
//! per-spot statistics of the first rows.
//!
//! Run with: cargo run --example autofit --features tracing
//! Set RUST_LOG=info for the fit summary, RUST_LOG=spotmask=debug for search
//! progress.

use image::{GrayImage, Luma};
use spotmask::{
    MaskParams, MeasureOptions, RegionSampler, RegionStats, RotationInput, SearchOptions, Shape,
    Size, SlideMask, TransformMode, covered_pixels,
};
use tracing_subscriber::EnvFilter;

struct ImageSampler(GrayImage);

impl RegionSampler for ImageSampler {
    fn sample(&self, region: &Shape) -> RegionStats {
        let (w, h) = self.0.dimensions();
        RegionStats::from_values(
            covered_pixels(region, w, h)
                .into_iter()
                .map(|(x, y)| f64::from(self.0.get_pixel(x, y).0[0])),
        )
    }
}

/// Print the slide as printed: spots drift up to two pixels from the nominal
/// grid, the slide sits shifted by (12, 8) and turned half a degree.
fn printed_slide(params: &MaskParams) -> GrayImage {
    let mut reference = SlideMask::new(params.clone()).expect("default parameters are valid");
    reference.translate(12.0, 8.0, TransformMode::Record);
    reference.rotate(RotationInput::Degrees(0.5), TransformMode::Record);

    let spots: Vec<_> = reference
        .measure_fields()
        .iter()
        .flat_map(|grid| grid.centroids())
        .enumerate()
        .map(|(i, c)| {
            let jitter = (i as f64 * 0.7).sin() * 2.0;
            (c.x + jitter, c.y - jitter / 2.0)
        })
        .collect();

    let width = params.slide_width as u32 + 40;
    let height = params.slide_height as u32 + 40;
    let mut signal = vec![20.0f64; (width * height) as usize];
    for (sx, sy) in spots {
        let x0 = (sx - 12.0).max(0.0) as u32;
        let y0 = (sy - 12.0).max(0.0) as u32;
        for y in y0..(y0 + 24).min(height) {
            for x in x0..(x0 + 24).min(width) {
                let d2 = (f64::from(x) - sx).powi(2) + (f64::from(y) - sy).powi(2);
                signal[(y * width + x) as usize] += 180.0 * (-d2 / 20.0).exp();
            }
        }
    }
    GrayImage::from_fn(width, height, |x, y| {
        Luma([signal[(y * width + x) as usize].min(255.0) as u8])
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let params = MaskParams::default();
    let image = printed_slide(&params);
    let image_size = Size::new(f64::from(image.width()), f64::from(image.height()));
    let sampler = ImageSampler(image);

    let mut mask = match SlideMask::new(params) {
        Ok(mask) => mask,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };
    mask.translate(12.0, 8.0, TransformMode::Record);
    mask.rotate(RotationInput::Degrees(0.5), TransformMode::Record);

    let report = spotmask::autofit(&mut mask, &sampler, &SearchOptions::default());
    tracing::info!(
        moved = report.moved().count(),
        total = report.moves.len(),
        "autofit finished"
    );

    let options = MeasureOptions {
        subtract_background: true,
        image_size,
    };
    for spot in spotmask::measure(&mask, &sampler, &options).iter().take(8) {
        println!(
            "field {} spot ({:2}, {:2}) at {:.1}: mean {:6.1} sd {:5.1}",
            spot.field, spot.row, spot.col, spot.centroid, spot.stats.mean, spot.stats.stddev
        );
    }
}
