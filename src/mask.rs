//! The slide mask: every shape laid over one slide, sharing one rotational
//! center.
//!
//! All owned geometry is built at the origin by [`SlideMask::setup_coordinates`]
//! and afterwards only ever moved through the mask, which keeps every orbit
//! consistent with the same center. Edits to layout parameters go through
//! [`SlideMask::reposition`]: zero, rebuild, replay the recorded translation
//! and rotation.

use crate::errors::MaskError;
use crate::grid::{Grid, GridLayout};
use crate::log::debug;
use crate::params::MaskParams;
use crate::shape::{Shape, ShapeKind, ZLevel};
use crate::types::{Angle, Offset, Point, Size};

/// Number of noise rectangles per spot field width
pub const NOISE_RECT_COLS: usize = 4;
/// Share of the free band a noise rectangle occupies; the rest is split
/// evenly above and below it
pub const NOISE_RECT_RATIO: f64 = 0.8;
/// Bands thinner than this get no noise rectangles
pub const MIN_NOISE_RECT_HEIGHT: f64 = 5.0;

/// Whether a transform becomes part of the mask's recorded position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// Apply and add to the recorded absolute translation/rotation
    Record,
    /// Apply on top of the recorded baseline without changing it
    Replay,
}

/// How a rotation was requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationInput {
    /// Signed delta in degrees
    Degrees(f64),
    /// A pointer drag from `from` to `to`, interpreted around `pivot`
    Drag { from: Point, to: Point, pivot: Point },
}

impl RotationInput {
    /// Signed rotation delta in degrees.
    ///
    /// For drags the sign depends on which quadrant around the pivot the
    /// gesture started in, the magnitude is the absolute change of the
    /// pointer's direction seen from the pivot.
    pub fn delta(self) -> f64 {
        match self {
            RotationInput::Degrees(delta) => delta,
            RotationInput::Drag { from, to, pivot } => {
                let dx = to.x - from.x;
                let dy = to.y - from.y;
                let direction = if from.x >= pivot.x && from.y <= pivot.y {
                    if dx + dy >= 0.0 { -1.0 } else { 1.0 }
                } else if from.x >= pivot.x && from.y >= pivot.y {
                    if -dx + dy >= 0.0 { -1.0 } else { 1.0 }
                } else if from.x <= pivot.x && from.y >= pivot.y {
                    if dx + dy >= 0.0 { 1.0 } else { -1.0 }
                } else if -dx + dy >= 0.0 {
                    1.0
                } else {
                    -1.0
                };

                let before = (from.y - pivot.y).atan2(from.x - pivot.x);
                let after = (to.y - pivot.y).atan2(to.x - pivot.x);
                direction * (after - before).to_degrees().abs()
            }
        }
    }
}

/// The grid collections a mask owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridRole {
    SpotField,
    MeasureField,
    ColumnLabels,
    RowLabels,
    TopNoise,
    BetweenNoise,
    BottomNoise,
}

impl GridRole {
    const NOISE: [GridRole; 3] = [GridRole::TopNoise, GridRole::BetweenNoise, GridRole::BottomNoise];
}

/// Stable handle to one shape owned by a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeRef {
    Slide,
    Divider(usize),
    /// Cell `index` (row-major) of grid `grid` in the collection `role`
    Cell {
        role: GridRole,
        grid: usize,
        index: usize,
    },
}

/// What a pointer press landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Nothing,
    Slide,
    NoiseRects(Vec<ShapeRef>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideMask {
    params: MaskParams,
    center: Point,
    translation: Offset,
    rotation: Angle,
    slide: Shape,
    /// Vertical dividers first, then horizontal ones
    dividers: Vec<Shape>,
    spot_fields: Vec<Grid>,
    measure_fields: Vec<Grid>,
    column_labels: Vec<Grid>,
    row_labels: Vec<Grid>,
    top_noise: Vec<Grid>,
    between_noise: Vec<Grid>,
    bottom_noise: Vec<Grid>,
    grabbed: Vec<ShapeRef>,
}

impl SlideMask {
    /// Validate `params` and build the mask at the origin.
    pub fn new(params: MaskParams) -> Result<Self, MaskError> {
        params.validate()?;
        let center = Point::new(params.slide_width / 2.0, params.slide_height / 2.0);
        let mut mask = Self {
            params,
            center,
            translation: Offset::ZERO,
            rotation: Angle::ZERO,
            slide: Shape::marker(Point::ORIGIN, ZLevel::Slide),
            dividers: Vec::new(),
            spot_fields: Vec::new(),
            measure_fields: Vec::new(),
            column_labels: Vec::new(),
            row_labels: Vec::new(),
            top_noise: Vec::new(),
            between_noise: Vec::new(),
            bottom_noise: Vec::new(),
            grabbed: Vec::new(),
        };
        mask.setup_coordinates();
        Ok(mask)
    }

    /// Rebuild every shape from the parameters with the slide's upper left
    /// corner at the origin, then recompute all orbits against the current
    /// rotational center.
    pub fn setup_coordinates(&mut self) {
        let p = &self.params;
        let slide_size = p.slide_size();
        let field = p.spot_field_size();
        let cell = p.spot_cell_size();
        let measure = p.measure_size();
        let (x_inset, y_inset) = (p.x_inset, p.y_inset);

        let slide = Shape::from_cell(ShapeKind::Rectangle, Point::ORIGIN, slide_size, ZLevel::Slide);

        let mut dividers = Vec::new();
        let mut gaps_so_far = 0.0;
        for (i, gap) in p.vertical_spacing.iter().enumerate() {
            let x = x_inset + gaps_so_far + field.w * (i + 1) as f64 + gap / 2.0;
            dividers.push(Shape::line(
                Point::new(x, 0.0),
                Point::new(x, slide_size.h),
                ZLevel::SpotField,
            ));
            gaps_so_far += gap;
        }
        gaps_so_far = 0.0;
        for (i, gap) in p.horizontal_spacing.iter().enumerate() {
            let y = y_inset + gaps_so_far + field.h * (i + 1) as f64 + gap / 2.0;
            dividers.push(Shape::line(
                Point::new(0.0, y),
                Point::new(slide_size.w, y),
                ZLevel::SpotField,
            ));
            gaps_so_far += gap;
        }

        let mut spot_fields = Vec::with_capacity(p.spot_field_count());
        let mut measure_fields = Vec::with_capacity(p.spot_field_count());
        let mut column_labels = Vec::with_capacity(p.spot_field_count());
        let mut row_labels = Vec::with_capacity(p.spot_field_count());

        let label_inset = Offset::new(cell.w / 2.0, cell.h / 2.0);
        let mut y = y_inset;
        for super_row in 0..p.super_grid_rows {
            let mut x = x_inset;
            for super_col in 0..p.super_grid_cols {
                let anchor = Point::new(x, y);

                let mut spots = Grid::new(GridLayout {
                    kind: ShapeKind::Rectangle,
                    z_level: ZLevel::SpotField,
                    cols: p.spot_field_cols,
                    rows: p.spot_field_rows,
                    anchor,
                    extents: field,
                    inset: Offset::ZERO,
                    cell_size: cell,
                });
                spots.enable_through(p.last_spot_index);
                spot_fields.push(spots);

                let mut measures = Grid::new(GridLayout {
                    kind: p.measure_shape.kind(),
                    z_level: ZLevel::MeasureField,
                    cols: p.spot_field_cols,
                    rows: p.spot_field_rows,
                    anchor,
                    extents: field,
                    inset: Offset::new((cell.w - measure.w) / 2.0, (cell.h - measure.h) / 2.0),
                    cell_size: measure,
                });
                measures.enable_through(p.last_spot_index);
                measure_fields.push(measures);

                column_labels.push(Grid::new(GridLayout {
                    kind: ShapeKind::Point,
                    z_level: ZLevel::SpotField,
                    cols: p.spot_field_cols,
                    rows: 1,
                    anchor: anchor.shifted(0.0, -cell.h),
                    extents: Size::new(field.w, cell.h),
                    inset: label_inset,
                    cell_size: Size::ZERO,
                }));
                row_labels.push(Grid::new(GridLayout {
                    kind: ShapeKind::Point,
                    z_level: ZLevel::SpotField,
                    cols: 1,
                    rows: p.spot_field_rows,
                    anchor: anchor.shifted(-cell.w, 0.0),
                    extents: Size::new(cell.w, field.h),
                    inset: label_inset,
                    cell_size: Size::ZERO,
                }));

                x += field.w + p.vertical_spacing.get(super_col).copied().unwrap_or(0.0);
            }
            y += field.h + p.horizontal_spacing.get(super_row).copied().unwrap_or(0.0);
        }

        let noise_band = |anchor: Point, height: f64| {
            Grid::new(GridLayout {
                kind: ShapeKind::Rectangle,
                z_level: ZLevel::NoiseRect,
                cols: NOISE_RECT_COLS,
                rows: 1,
                anchor,
                extents: Size::new(field.w, height),
                inset: Offset::ZERO,
                cell_size: Size::new(field.w / NOISE_RECT_COLS as f64, height),
            })
        };
        let band_margin = (1.0 - NOISE_RECT_RATIO) / 2.0;
        let column_x = |col: usize| spot_fields[col].layout().anchor.x;

        let mut top_noise = Vec::new();
        let mut bottom_noise = Vec::new();
        let top_height = y_inset * NOISE_RECT_RATIO;
        let top_y = spot_fields[0].layout().anchor.y - y_inset * band_margin - top_height;
        let bottom_space = slide_size.h - p.content_height();
        let bottom_height = bottom_space * NOISE_RECT_RATIO;
        let bottom_y = spot_fields[spot_fields.len() - 1].layout().anchor.y
            + field.h
            + bottom_space * band_margin;
        for col in 0..p.super_grid_cols {
            if top_height >= MIN_NOISE_RECT_HEIGHT {
                top_noise.push(noise_band(Point::new(column_x(col), top_y), top_height));
            }
            if bottom_height >= MIN_NOISE_RECT_HEIGHT {
                bottom_noise.push(noise_band(Point::new(column_x(col), bottom_y), bottom_height));
            }
        }

        let mut between_noise = Vec::new();
        for (row, gap) in p.horizontal_spacing.iter().enumerate() {
            let height = gap * NOISE_RECT_RATIO;
            if height < MIN_NOISE_RECT_HEIGHT {
                continue;
            }
            let next_row_y = spot_fields[(row + 1) * p.super_grid_cols].layout().anchor.y;
            let band_y = next_row_y - gap * band_margin - height;
            for col in 0..p.super_grid_cols {
                between_noise.push(noise_band(Point::new(column_x(col), band_y), height));
            }
        }

        debug!(
            spot_fields = spot_fields.len(),
            dividers = dividers.len(),
            top_noise = top_noise.len(),
            between_noise = between_noise.len(),
            bottom_noise = bottom_noise.len(),
            "mask geometry rebuilt"
        );

        self.slide = slide;
        self.dividers = dividers;
        self.spot_fields = spot_fields;
        self.measure_fields = measure_fields;
        self.column_labels = column_labels;
        self.row_labels = row_labels;
        self.top_noise = top_noise;
        self.between_noise = between_noise;
        self.bottom_noise = bottom_noise;
        self.grabbed.clear();

        self.recompute_all_orbits();
    }

    /// Re-derive the polar state of every owned shape against the current
    /// rotational center.
    pub fn recompute_all_orbits(&mut self) {
        let center = self.center;
        for shape in self.shapes_mut() {
            shape.recompute_orbits(center);
        }
    }

    /// Move every shape and the rotational center by `(dx, dy)`. Orbits stay
    /// valid since everything moves together.
    pub fn translate(&mut self, dx: f64, dy: f64, mode: TransformMode) {
        if mode == TransformMode::Record {
            self.translation = self.translation + Offset::new(dx, dy);
        }
        self.center = self.center.shifted(dx, dy);

        self.slide.translate(dx, dy);
        for line in &mut self.dividers {
            line.translate(dx, dy);
        }
        for grid in self.grids_mut() {
            grid.translate(dx, dy);
        }
    }

    /// Rotate every shape around the rotational center.
    pub fn rotate(&mut self, input: RotationInput, mode: TransformMode) {
        let delta = input.delta();
        if mode == TransformMode::Record {
            self.rotation = (self.rotation + Angle(delta)).normalized();
        }
        let center = self.center;
        for shape in self.shapes_mut() {
            shape.rotate_by(Angle(delta), center);
        }
    }

    /// Rebuild from the current parameters and restore the recorded position.
    pub fn reposition(&mut self) {
        let translation = self.translation;
        let rotation = self.rotation;

        self.center = self.center.offset_by(-translation);
        self.setup_coordinates();
        if !translation.is_zero() {
            self.translate(translation.dx, translation.dy, TransformMode::Replay);
        }
        if rotation != Angle::ZERO {
            self.rotate(RotationInput::Degrees(rotation.degrees()), TransformMode::Replay);
        }

        let slide = self.params.slide_size().half();
        self.center = Point::new(slide.w, slide.h).offset_by(translation);
        self.recompute_all_orbits();

        debug!(
            dx = translation.dx,
            dy = translation.dy,
            rotation = rotation.degrees(),
            "mask repositioned"
        );
    }

    /// Swap in new parameters and rebuild the mask where it was.
    pub fn set_params(&mut self, params: MaskParams) -> Result<(), MaskError> {
        params.validate()?;
        self.params = params;
        self.reposition();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Pointer interaction
    // ------------------------------------------------------------------------

    /// What lies under `p`. Noise rectangles are only considered when
    /// background subtraction is on, and when one is hit the slide is not.
    pub fn element_at(&self, p: Point, subtract_background: bool) -> Element {
        if subtract_background {
            let hits: Vec<_> = GridRole::NOISE
                .into_iter()
                .flat_map(|role| self.hits_in(role, p))
                .collect();
            if !hits.is_empty() {
                return Element::NoiseRects(hits);
            }
        }
        if self.slide.contains_point(p) {
            Element::Slide
        } else {
            Element::Nothing
        }
    }

    /// Enabled measure fields under `p`
    pub fn measure_fields_at(&self, p: Point) -> Vec<ShapeRef> {
        self.hits_in(GridRole::MeasureField, p).collect()
    }

    fn hits_in(&self, role: GridRole, p: Point) -> impl Iterator<Item = ShapeRef> + '_ {
        self.role_grids(role)
            .iter()
            .enumerate()
            .flat_map(move |(grid, cells)| {
                cells.hits(p).map(move |index| ShapeRef::Cell { role, grid, index })
            })
    }

    /// Start a drag gesture at `p`
    pub fn grab(&mut self, p: Point, subtract_background: bool) -> Element {
        let element = self.element_at(p, subtract_background);
        match &element {
            Element::Slide => self.grabbed.push(ShapeRef::Slide),
            Element::NoiseRects(hits) => self.grabbed.extend(hits),
            Element::Nothing => {}
        }
        element
    }

    /// Add measure fields under `p` to the current gesture
    pub fn grab_measure_fields(&mut self, p: Point) -> bool {
        let hits = self.measure_fields_at(p);
        let any = !hits.is_empty();
        self.grabbed.extend(hits);
        any
    }

    /// Shapes held by the current gesture
    pub fn grabbed(&self) -> &[ShapeRef] {
        &self.grabbed
    }

    /// Move the grabbed shapes on the highest z-level. If that is the slide
    /// the whole mask moves. Returns whether anything was grabbed.
    pub fn drag(&mut self, delta: Offset, mode: TransformMode) -> bool {
        let Some(top) = self
            .grabbed
            .iter()
            .filter_map(|r| self.shape(*r))
            .map(Shape::z_level)
            .max()
        else {
            return false;
        };

        if top == ZLevel::Slide {
            self.translate(delta.dx, delta.dy, mode);
        } else {
            let targets: Vec<_> = self
                .grabbed
                .iter()
                .copied()
                .filter(|r| self.shape(*r).is_some_and(|s| s.z_level() == top))
                .collect();
            for target in targets {
                self.move_shape(target, delta.dx, delta.dy);
            }
        }
        true
    }

    /// End the current gesture
    pub fn release(&mut self) {
        self.grabbed.clear();
    }

    /// Move a single shape and re-sync its orbits. The slide handle moves the
    /// whole mask. Returns `false` for a stale handle.
    pub fn move_shape(&mut self, target: ShapeRef, dx: f64, dy: f64) -> bool {
        if target == ShapeRef::Slide {
            self.translate(dx, dy, TransformMode::Record);
            return true;
        }
        let center = self.center;
        match self.shape_mut(target) {
            Some(shape) => {
                shape.translate(dx, dy);
                shape.recompute_orbits(center);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn params(&self) -> &MaskParams {
        &self.params
    }

    pub fn rotational_center(&self) -> Point {
        self.center
    }

    /// Recorded absolute translation
    pub fn translation(&self) -> Offset {
        self.translation
    }

    /// Recorded absolute rotation, in `[0, 360)`
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    pub fn slide(&self) -> &Shape {
        &self.slide
    }

    pub fn dividers(&self) -> &[Shape] {
        &self.dividers
    }

    pub fn spot_fields(&self) -> &[Grid] {
        &self.spot_fields
    }

    pub fn measure_fields(&self) -> &[Grid] {
        &self.measure_fields
    }

    pub fn column_labels(&self) -> &[Grid] {
        &self.column_labels
    }

    pub fn row_labels(&self) -> &[Grid] {
        &self.row_labels
    }

    pub fn top_noise(&self) -> &[Grid] {
        &self.top_noise
    }

    pub fn between_noise(&self) -> &[Grid] {
        &self.between_noise
    }

    pub fn bottom_noise(&self) -> &[Grid] {
        &self.bottom_noise
    }

    /// Every noise rectangle, used to estimate the background level
    pub fn background_regions(&self) -> impl Iterator<Item = &Shape> {
        GridRole::NOISE
            .into_iter()
            .flat_map(|role| self.role_grids(role))
            .flat_map(Grid::cells)
    }

    /// A spot field together with its paired measure field
    pub fn field_pair_mut(&mut self, field: usize) -> Option<(&Grid, &mut Grid)> {
        let spots = self.spot_fields.get(field)?;
        let measures = self.measure_fields.get_mut(field)?;
        Some((spots, measures))
    }

    pub fn shape(&self, target: ShapeRef) -> Option<&Shape> {
        match target {
            ShapeRef::Slide => Some(&self.slide),
            ShapeRef::Divider(i) => self.dividers.get(i),
            ShapeRef::Cell { role, grid, index } => {
                self.role_grids(role).get(grid)?.cells().get(index)
            }
        }
    }

    fn shape_mut(&mut self, target: ShapeRef) -> Option<&mut Shape> {
        match target {
            ShapeRef::Slide => Some(&mut self.slide),
            ShapeRef::Divider(i) => self.dividers.get_mut(i),
            ShapeRef::Cell { role, grid, index } => self
                .role_grids_mut(role)
                .get_mut(grid)?
                .cells_mut()
                .get_mut(index),
        }
    }

    fn role_grids(&self, role: GridRole) -> &[Grid] {
        match role {
            GridRole::SpotField => &self.spot_fields,
            GridRole::MeasureField => &self.measure_fields,
            GridRole::ColumnLabels => &self.column_labels,
            GridRole::RowLabels => &self.row_labels,
            GridRole::TopNoise => &self.top_noise,
            GridRole::BetweenNoise => &self.between_noise,
            GridRole::BottomNoise => &self.bottom_noise,
        }
    }

    fn role_grids_mut(&mut self, role: GridRole) -> &mut [Grid] {
        match role {
            GridRole::SpotField => &mut self.spot_fields,
            GridRole::MeasureField => &mut self.measure_fields,
            GridRole::ColumnLabels => &mut self.column_labels,
            GridRole::RowLabels => &mut self.row_labels,
            GridRole::TopNoise => &mut self.top_noise,
            GridRole::BetweenNoise => &mut self.between_noise,
            GridRole::BottomNoise => &mut self.bottom_noise,
        }
    }

    fn grids_mut(&mut self) -> impl Iterator<Item = &mut Grid> {
        self.spot_fields
            .iter_mut()
            .chain(&mut self.measure_fields)
            .chain(&mut self.column_labels)
            .chain(&mut self.row_labels)
            .chain(&mut self.top_noise)
            .chain(&mut self.between_noise)
            .chain(&mut self.bottom_noise)
    }

    /// Every owned shape: slide, dividers, then all grid cells
    fn shapes_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        let cells = self
            .spot_fields
            .iter_mut()
            .chain(&mut self.measure_fields)
            .chain(&mut self.column_labels)
            .chain(&mut self.row_labels)
            .chain(&mut self.top_noise)
            .chain(&mut self.between_noise)
            .chain(&mut self.bottom_noise)
            .flat_map(|grid| grid.cells_mut().iter_mut());
        std::iter::once(&mut self.slide)
            .chain(&mut self.dividers)
            .chain(cells)
    }
}
