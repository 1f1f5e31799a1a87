//! Rectangular arrays of shapes laid out at a fixed pitch.

use crate::errors::MaskError;
use crate::shape::{Shape, ShapeKind, ZLevel};
use crate::types::{Angle, Offset, Point, Size};

/// Construction parameters of a [`Grid`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub kind: ShapeKind,
    pub z_level: ZLevel,
    pub cols: usize,
    pub rows: usize,
    /// Upper left corner of the grid, insets not included
    pub anchor: Point,
    /// Total size of the grid, insets not included
    pub extents: Size,
    /// Offset of every shape inside its cell
    pub inset: Offset,
    /// Size of every shape
    pub cell_size: Size,
}

impl GridLayout {
    /// Distance between neighbouring cells
    pub fn pitch(&self) -> Size {
        Size::new(
            self.extents.w / self.cols as f64,
            self.extents.h / self.rows as f64,
        )
    }

    /// Upper left corner of the shape in cell `(row, col)`
    pub fn cell_origin(&self, row: usize, col: usize) -> Point {
        let pitch = self.pitch();
        self.anchor
            .shifted(col as f64 * pitch.w, row as f64 * pitch.h)
            .offset_by(self.inset)
    }
}

/// Shapes stored row-major. Bulk transforms always touch every cell, so the
/// geometry fixed at construction is preserved relative to the other cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    layout: GridLayout,
    cells: Vec<Shape>,
}

impl Grid {
    pub fn new(layout: GridLayout) -> Self {
        let cells = (0..layout.rows)
            .flat_map(|row| (0..layout.cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                Shape::from_cell(
                    layout.kind,
                    layout.cell_origin(row, col),
                    layout.cell_size,
                    layout.z_level,
                )
            })
            .collect();
        Self { layout, cells }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    pub fn kind(&self) -> ShapeKind {
        self.layout.kind
    }

    pub fn z_level(&self) -> ZLevel {
        self.layout.z_level
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows() && col < self.cols()).then(|| row * self.cols() + col)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Shape> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Shape> {
        self.index(row, col).map(move |i| &mut self.cells[i])
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Shape] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Shape] {
        &mut self.cells
    }

    /// `(row, col, shape)` in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &Shape)> {
        let cols = self.cols();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, shape)| (i / cols, i % cols, shape))
    }

    /// Center of every cell in row-major order
    pub fn centroids(&self) -> Vec<Point> {
        self.cells.iter().map(Shape::center).collect()
    }

    /// Row-major indices of enabled cells containing `p`
    pub fn hits(&self, p: Point) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, shape)| shape.contains_point(p))
            .map(|(i, _)| i)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.layout.anchor = self.layout.anchor.shifted(dx, dy);
        for shape in &mut self.cells {
            shape.translate(dx, dy);
        }
    }

    pub fn rotate_by(&mut self, delta: Angle, center: Point) {
        for shape in &mut self.cells {
            shape.rotate_by(delta, center);
        }
    }

    pub fn recompute_orbits(&mut self, center: Point) {
        for shape in &mut self.cells {
            shape.recompute_orbits(center);
        }
    }

    /// Enable cells `0..=last_index` in row-major order and disable the rest
    pub fn enable_through(&mut self, last_index: usize) {
        for (i, shape) in self.cells.iter_mut().enumerate() {
            shape.set_enabled(i <= last_index);
        }
    }

    /// Replace the corners of one cell
    pub fn set_cell_corners(
        &mut self,
        row: usize,
        col: usize,
        points: &[Point],
    ) -> Result<(), MaskError> {
        let (rows, cols) = (self.rows(), self.cols());
        let shape = self
            .cell_mut(row, col)
            .ok_or(MaskError::CellOutOfRange { row, col, rows, cols })?;
        shape.set_corners(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(kind: ShapeKind) -> GridLayout {
        GridLayout {
            kind,
            z_level: ZLevel::SpotField,
            cols: 3,
            rows: 2,
            anchor: Point::new(100.0, 50.0),
            extents: Size::new(30.0, 20.0),
            inset: Offset::new(1.0, 2.0),
            cell_size: Size::new(8.0, 6.0),
        }
    }

    #[test]
    fn cells_laid_out_row_major_at_pitch() {
        let grid = Grid::new(layout(ShapeKind::Rectangle));
        assert_eq!(grid.len(), 6);
        let (row, col, shape) = grid.iter_cells().nth(4).unwrap();
        assert_eq!((row, col), (1, 1));
        // anchor + (1 * 10, 1 * 10) + inset
        assert_eq!(shape.points()[0], Point::new(111.0, 62.0));
        assert_eq!(shape.points()[2], Point::new(119.0, 68.0));
    }

    #[test]
    fn point_cells_sit_on_inset_position() {
        let grid = Grid::new(layout(ShapeKind::Point));
        assert_eq!(grid.centroids()[0], Point::new(101.0, 52.0));
        assert_eq!(grid.centroids()[5], Point::new(121.0, 62.0));
    }

    #[test]
    fn circle_cells_are_inscribed() {
        let grid = Grid::new(layout(ShapeKind::Circle));
        let first = grid.cell(0, 0).unwrap();
        assert_eq!(first.center(), Point::new(105.0, 55.0));
        assert_eq!(first.radius(), Some(4.0));
    }

    #[test]
    fn out_of_range_cells() {
        let mut grid = Grid::new(layout(ShapeKind::Rectangle));
        assert!(grid.cell(2, 0).is_none());
        assert!(grid.cell(0, 3).is_none());
        let err = grid.set_cell_corners(5, 0, &[]).unwrap_err();
        assert_eq!(
            err,
            MaskError::CellOutOfRange {
                row: 5,
                col: 0,
                rows: 2,
                cols: 3
            }
        );
    }

    #[test]
    fn enable_through_is_row_major() {
        let mut grid = Grid::new(layout(ShapeKind::Rectangle));
        grid.enable_through(3);
        let enabled: Vec<_> = grid.cells().iter().map(Shape::is_enabled).collect();
        assert_eq!(enabled, vec![true, true, true, true, false, false]);
    }

    #[test]
    fn translate_moves_every_cell() {
        let mut grid = Grid::new(layout(ShapeKind::Diamond));
        let before = grid.centroids();
        grid.translate(-5.0, 7.5);
        for (a, b) in before.iter().zip(grid.centroids()) {
            assert_eq!(a.shifted(-5.0, 7.5), b);
        }
        assert_eq!(grid.layout().anchor, Point::new(95.0, 57.5));
    }

    #[test]
    fn rotate_keeps_relative_geometry() {
        let mut grid = Grid::new(layout(ShapeKind::Rectangle));
        let center = Point::new(115.0, 60.0);
        grid.recompute_orbits(center);
        grid.rotate_by(Angle(180.0), center);
        // A half turn mirrors the first cell onto the last
        let first = grid.cell(0, 0).unwrap().center();
        assert!((first.x - 125.0).abs() < 1e-9);
        assert!((first.y - 65.0).abs() < 1e-9);
    }

    #[test]
    fn hits_respect_enabled_state() {
        let mut grid = Grid::new(layout(ShapeKind::Rectangle));
        let p = Point::new(115.0, 65.0);
        assert_eq!(grid.hits(p).collect::<Vec<_>>(), vec![4]);
        grid.enable_through(3);
        assert_eq!(grid.hits(p).count(), 0);
    }
}
