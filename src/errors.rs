//! Error types with diagnostics using miette
//!
//! The geometry engine itself signals combination failures with `Option`;
//! these errors cover parameter validation and explicit corner replacement.

use miette::Diagnostic;
use thiserror::Error;

use crate::shape::ShapeKind;
use crate::types::NumericError;

// ============================================================================
// Mask Errors
// ============================================================================

/// Errors raised while validating mask parameters or editing shapes
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum MaskError {
    #[error("invalid {name}: {source}")]
    #[diagnostic(code(spotmask::params::invalid_dimension))]
    InvalidDimension {
        name: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("{name} must be at least 1")]
    #[diagnostic(code(spotmask::params::zero_count))]
    ZeroCount { name: &'static str },

    #[error("expected {expected} {axis} spacing values, got {got}")]
    #[diagnostic(
        code(spotmask::params::spacing_count),
        help("there is one gap between every pair of neighbouring spot fields")
    )]
    SpacingCount {
        axis: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("content {axis} {content} exceeds slide {axis} {slide}")]
    #[diagnostic(
        code(spotmask::params::content_too_large),
        help("reduce the inset, the spot field size or the spacing")
    )]
    ContentTooLarge {
        axis: &'static str,
        content: f64,
        slide: f64,
    },

    #[error("measure field {axis} {measure} exceeds spot cell {axis} {cell}")]
    #[diagnostic(code(spotmask::params::measure_field_too_large))]
    MeasureFieldTooLarge {
        axis: &'static str,
        measure: f64,
        cell: f64,
    },

    #[error("last enabled spot index {index} is out of range for {count} spots")]
    #[diagnostic(code(spotmask::params::last_index_out_of_range))]
    LastIndexOutOfRange { index: usize, count: usize },

    #[error("{kind:?} shape needs {expected} corners, got {got}")]
    #[diagnostic(code(spotmask::shape::corner_count))]
    CornerCount {
        kind: ShapeKind,
        expected: usize,
        got: usize,
    },

    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    #[diagnostic(code(spotmask::grid::cell_out_of_range))]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}
