//! Slide mask geometry and spot autofit for microarray images.
//!
//! A [`SlideMask`] lays a parametric grid of measure regions over one printed
//! slide: the slide outline, spot fields arranged in a super grid, a measure
//! field per spot, label anchors and noise rectangles for background
//! estimation. All of it moves and rotates around one rotational center.
//!
//! [`autofit`] then moves every enabled measure field onto the local intensity
//! maximum inside its spot cell, and [`measure`] hands the final regions to a
//! [`RegionSampler`], the only place pixels are ever looked at.
//!
//! ```
//! use spotmask::{MaskParams, RegionSampler, RegionStats, SearchOptions, Shape, SlideMask};
//!
//! struct Flat;
//!
//! impl RegionSampler for Flat {
//!     fn sample(&self, _region: &Shape) -> RegionStats {
//!         RegionStats { min: 100.0, mean: 100.0, max: 100.0, stddev: 0.0 }
//!     }
//! }
//!
//! let mut mask = SlideMask::new(MaskParams::default())?;
//! let report = spotmask::autofit(&mut mask, &Flat, &SearchOptions::default());
//! assert_eq!(report.moved().count(), 0);
//! # Ok::<(), spotmask::MaskError>(())
//! ```

pub mod autofit;
pub mod coordinate;
pub mod errors;
pub mod grid;
pub mod log;
pub mod mask;
pub mod measure;
pub mod params;
pub mod sampler;
pub mod search;
pub mod shape;
pub mod types;

pub use autofit::{AutofitReport, FieldMove, autofit};
pub use coordinate::Coordinate;
pub use errors::MaskError;
pub use grid::{Grid, GridLayout};
pub use mask::{Element, GridRole, RotationInput, ShapeRef, SlideMask, TransformMode};
pub use measure::{MeasureOptions, SpotMeasurement, estimate_background, measure};
pub use params::{MaskParams, MeasureShape};
pub use sampler::{Inverted, RegionSampler, RegionStats, covered_pixels};
pub use search::{Climb, Direction, FieldState, Population, SearchArea, SearchField, SearchOptions};
pub use shape::{Geometry, Outline, Shape, ShapeKind, ZLevel};
pub use types::{Angle, NumericError, Offset, Point, Size};
