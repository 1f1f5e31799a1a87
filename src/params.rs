//! Mask parameters as stored in settings files.
//!
//! Storage, naming and versioning of masks belong to the caller; this module
//! only describes the flat parameter set and checks that the described mask is
//! physically possible.

use serde::{Deserialize, Serialize};

use crate::errors::MaskError;
use crate::shape::ShapeKind;
use crate::types::{NumericError, Size, check_positive};

/// Outline used for the measured region of every spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasureShape {
    Rectangle,
    Diamond,
    #[default]
    Circle,
}

impl MeasureShape {
    pub fn kind(self) -> ShapeKind {
        match self {
            MeasureShape::Rectangle => ShapeKind::Rectangle,
            MeasureShape::Diamond => ShapeKind::Diamond,
            MeasureShape::Circle => ShapeKind::Circle,
        }
    }
}

/// Everything needed to lay out a slide mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    pub slide_width: f64,
    pub slide_height: f64,
    /// Distance from the left slide edge to the first spot field
    pub x_inset: f64,
    /// Distance from the top slide edge to the first spot field
    pub y_inset: f64,
    pub super_grid_cols: usize,
    pub super_grid_rows: usize,
    /// Gaps between vertically neighbouring spot fields, one per super row gap
    #[serde(rename = "horizontal_spot_field_spacing")]
    pub horizontal_spacing: Vec<f64>,
    /// Gaps between horizontally neighbouring spot fields, one per super column gap
    #[serde(rename = "vertical_spot_field_spacing")]
    pub vertical_spacing: Vec<f64>,
    pub spot_field_width: f64,
    pub spot_field_height: f64,
    #[serde(rename = "spot_field_n_rows")]
    pub spot_field_rows: usize,
    #[serde(rename = "spot_field_n_columns")]
    pub spot_field_cols: usize,
    #[serde(rename = "measure_field_shape")]
    pub measure_shape: MeasureShape,
    #[serde(rename = "measure_field_width")]
    pub measure_width: f64,
    #[serde(rename = "measure_field_height")]
    pub measure_height: f64,
    /// Row-major index of the last spot that is measured in every spot field
    #[serde(rename = "spot_field_last_measurepoint_index")]
    pub last_spot_index: usize,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            slide_width: 2000.0,
            slide_height: 1000.0,
            x_inset: 50.0,
            y_inset: 60.0,
            super_grid_cols: 2,
            super_grid_rows: 1,
            horizontal_spacing: Vec::new(),
            vertical_spacing: vec![13.0],
            spot_field_width: 465.0,
            spot_field_height: 312.0,
            spot_field_rows: 16,
            spot_field_cols: 24,
            measure_shape: MeasureShape::Circle,
            measure_width: 14.0,
            measure_height: 14.0,
            last_spot_index: 16 * 24 - 1,
        }
    }
}

impl MaskParams {
    pub fn slide_size(&self) -> Size {
        Size::new(self.slide_width, self.slide_height)
    }

    pub fn spot_field_size(&self) -> Size {
        Size::new(self.spot_field_width, self.spot_field_height)
    }

    pub fn measure_size(&self) -> Size {
        Size::new(self.measure_width, self.measure_height)
    }

    /// Size of one spot inside a spot field
    pub fn spot_cell_size(&self) -> Size {
        Size::new(
            self.spot_field_width / self.spot_field_cols as f64,
            self.spot_field_height / self.spot_field_rows as f64,
        )
    }

    /// Number of spots per spot field
    pub fn spots_per_field(&self) -> usize {
        self.spot_field_rows * self.spot_field_cols
    }

    pub fn spot_field_count(&self) -> usize {
        self.super_grid_rows * self.super_grid_cols
    }

    /// Horizontal room taken up by inset, spot fields and gaps
    pub fn content_width(&self) -> f64 {
        self.x_inset
            + self.super_grid_cols as f64 * self.spot_field_width
            + self.vertical_spacing.iter().sum::<f64>()
    }

    /// Vertical room taken up by inset, spot fields and gaps
    pub fn content_height(&self) -> f64 {
        self.y_inset
            + self.super_grid_rows as f64 * self.spot_field_height
            + self.horizontal_spacing.iter().sum::<f64>()
    }

    /// Check that the parameters describe a mask that fits on its slide.
    pub fn validate(&self) -> Result<(), MaskError> {
        for (name, value) in [
            ("slide width", self.slide_width),
            ("slide height", self.slide_height),
            ("spot field width", self.spot_field_width),
            ("spot field height", self.spot_field_height),
            ("measure field width", self.measure_width),
            ("measure field height", self.measure_height),
        ] {
            positive(name, value)?;
        }
        non_negative("x inset", self.x_inset)?;
        non_negative("y inset", self.y_inset)?;
        for gap in self.horizontal_spacing.iter().chain(&self.vertical_spacing) {
            non_negative("spot field spacing", *gap)?;
        }

        for (name, count) in [
            ("super grid columns", self.super_grid_cols),
            ("super grid rows", self.super_grid_rows),
            ("spot field rows", self.spot_field_rows),
            ("spot field columns", self.spot_field_cols),
        ] {
            if count == 0 {
                return Err(MaskError::ZeroCount { name });
            }
        }

        check_spacing("vertical", self.super_grid_cols - 1, &self.vertical_spacing)?;
        check_spacing("horizontal", self.super_grid_rows - 1, &self.horizontal_spacing)?;

        fits("width", self.content_width(), self.slide_width)?;
        fits("height", self.content_height(), self.slide_height)?;

        let cell = self.spot_cell_size();
        if self.measure_width > cell.w {
            return Err(MaskError::MeasureFieldTooLarge {
                axis: "width",
                measure: self.measure_width,
                cell: cell.w,
            });
        }
        if self.measure_height > cell.h {
            return Err(MaskError::MeasureFieldTooLarge {
                axis: "height",
                measure: self.measure_height,
                cell: cell.h,
            });
        }

        let count = self.spots_per_field();
        if self.last_spot_index >= count {
            return Err(MaskError::LastIndexOutOfRange {
                index: self.last_spot_index,
                count,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), MaskError> {
    check_positive(value)
        .map(|_| ())
        .map_err(|source| MaskError::InvalidDimension { name, source })
}

fn non_negative(name: &'static str, value: f64) -> Result<(), MaskError> {
    match check_positive(value) {
        Ok(_) | Err(NumericError::Zero) => Ok(()),
        Err(source) => Err(MaskError::InvalidDimension { name, source }),
    }
}

fn check_spacing(axis: &'static str, expected: usize, spacing: &[f64]) -> Result<(), MaskError> {
    if spacing.len() != expected {
        return Err(MaskError::SpacingCount {
            axis,
            expected,
            got: spacing.len(),
        });
    }
    Ok(())
}

fn fits(axis: &'static str, content: f64, slide: f64) -> Result<(), MaskError> {
    if content > slide {
        return Err(MaskError::ContentTooLarge {
            axis,
            content,
            slide,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = MaskParams::default();
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.spots_per_field(), 384);
        assert_eq!(params.spot_cell_size(), Size::new(19.375, 19.5));
        assert_eq!(params.content_width(), 50.0 + 2.0 * 465.0 + 13.0);
    }

    #[test]
    fn rejects_negative_dimension() {
        let params = MaskParams {
            slide_width: -1.0,
            ..MaskParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(MaskError::InvalidDimension {
                name: "slide width",
                source: NumericError::Negative
            })
        );
    }

    #[test]
    fn zero_inset_is_allowed() {
        let params = MaskParams {
            x_inset: 0.0,
            y_inset: 0.0,
            ..MaskParams::default()
        };
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn rejects_wrong_spacing_count() {
        let params = MaskParams {
            vertical_spacing: vec![],
            ..MaskParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(MaskError::SpacingCount {
                axis: "vertical",
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn rejects_content_wider_than_slide() {
        let params = MaskParams {
            slide_width: 900.0,
            ..MaskParams::default()
        };
        let err = params.validate().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"content width 993 exceeds slide width 900");
    }

    #[test]
    fn rejects_measure_field_larger_than_cell() {
        let params = MaskParams {
            measure_height: 20.0,
            ..MaskParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(MaskError::MeasureFieldTooLarge { axis: "height", .. })
        ));
    }

    #[test]
    fn rejects_last_index_out_of_range() {
        let params = MaskParams {
            last_spot_index: 384,
            ..MaskParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(MaskError::LastIndexOutOfRange {
                index: 384,
                count: 384
            })
        );
    }

    #[test]
    fn rejects_empty_super_grid() {
        let params = MaskParams {
            super_grid_rows: 0,
            ..MaskParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(MaskError::ZeroCount {
                name: "super grid rows"
            })
        );
    }

    #[test]
    fn deserializes_stored_settings() {
        let json = r#"{
            "slide_width": 1000,
            "slide_height": 500,
            "x_inset": 10,
            "y_inset": 20,
            "super_grid_cols": 1,
            "super_grid_rows": 2,
            "horizontal_spot_field_spacing": [15],
            "vertical_spot_field_spacing": [],
            "spot_field_width": 400,
            "spot_field_height": 200,
            "spot_field_n_rows": 8,
            "spot_field_n_columns": 16,
            "measure_field_shape": "DIAMOND",
            "measure_field_width": 20,
            "measure_field_height": 20,
            "spot_field_last_measurepoint_index": 100
        }"#;
        let params: MaskParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.measure_shape, MeasureShape::Diamond);
        assert_eq!(params.horizontal_spacing, vec![15.0]);
        assert_eq!(params.spot_field_cols, 16);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let params: MaskParams = serde_json::from_str(r#"{"slide_width": 2500}"#).unwrap();
        assert_eq!(params.slide_width, 2500.0);
        assert_eq!(params.spot_field_rows, 16);
        assert_eq!(params.measure_shape, MeasureShape::Circle);
    }
}
