//! Snap every enabled measure field onto the brightest spot of its cell.

use crate::log::debug;
use crate::mask::SlideMask;
use crate::sampler::RegionSampler;
use crate::search::{SearchArea, SearchOptions};
use crate::types::{Offset, Size};

/// Where autofit moved one measure field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMove {
    pub field: usize,
    pub row: usize,
    pub col: usize,
    pub shift: Offset,
}

/// Every measure field autofit touched, in processing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutofitReport {
    pub moves: Vec<FieldMove>,
}

impl AutofitReport {
    /// Measure fields that actually moved
    pub fn moved(&self) -> impl Iterator<Item = &FieldMove> {
        self.moves.iter().filter(|m| !m.shift.is_zero())
    }
}

/// Move every enabled measure field onto the local intensity maximum inside
/// its spot cell.
///
/// Fields are processed spot field by spot field, row by row, column by
/// column, up to the last enabled spot index. The search template is the
/// first measure field of the first spot field, so all cells must share the
/// measure shape. After each spot field the orbits of its measure fields are
/// re-synced with the mask's rotational center.
///
/// The result only depends on the mask and the sampler, so running it twice
/// on unchanged input gives the same positions.
pub fn autofit<S: RegionSampler + ?Sized>(
    mask: &mut SlideMask,
    sampler: &S,
    options: &SearchOptions,
) -> AutofitReport {
    let mut report = AutofitReport::default();

    let Some(template) = mask
        .measure_fields()
        .first()
        .and_then(|grid| grid.cell(0, 0))
        .cloned()
    else {
        return report;
    };

    let params = mask.params();
    let measure = params.measure_size();
    let cell = params.spot_cell_size();
    let ratios = Size::new(cell.w / measure.w, cell.h / measure.h);
    let radius = measure.w / 2.0;
    let last_index = params.last_spot_index;
    let center = mask.rotational_center();

    for field in 0..mask.spot_fields().len() {
        let Some((spots, measures)) = mask.field_pair_mut(field) else {
            continue;
        };
        let cols = spots.cols();
        let count = spots.len().min(last_index + 1);

        for index in 0..count {
            let (row, col) = (index / cols, index % cols);
            let (Some(spot), Some(measure_cell)) = (spots.cell(row, col), measures.cell_mut(row, col))
            else {
                continue;
            };
            let Some(perimeter) = spot.shrink_by(measure_cell) else {
                continue;
            };

            let start = measure_cell.center();
            let mut area = SearchArea::new(sampler, perimeter, template.clone(), radius, ratios, options);
            let target = area.converge(start);
            measure_cell.move_to_center(target);

            report.moves.push(FieldMove {
                field,
                row,
                col,
                shift: target - start,
            });
        }

        measures.recompute_orbits(center);
        debug!(field, spots = count, "spot field fitted");
    }

    report
}
