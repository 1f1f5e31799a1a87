//! Mask layout and transform behavior through the public API.

mod common;

use common::{assert_points_close, two_by_two};
use spotmask::{
    Element, MaskParams, MeasureShape, Offset, Point, RotationInput, ShapeKind, SlideMask,
    TransformMode,
};

fn super_grid() -> MaskParams {
    MaskParams {
        slide_width: 500.0,
        slide_height: 500.0,
        x_inset: 20.0,
        y_inset: 20.0,
        super_grid_cols: 2,
        super_grid_rows: 2,
        horizontal_spacing: vec![10.0],
        vertical_spacing: vec![10.0],
        spot_field_width: 200.0,
        spot_field_height: 200.0,
        spot_field_rows: 4,
        spot_field_cols: 4,
        measure_shape: MeasureShape::Circle,
        measure_width: 20.0,
        measure_height: 20.0,
        last_spot_index: 15,
    }
}

/// Every point of every shape, in a fixed order
fn all_points(mask: &SlideMask) -> Vec<Point> {
    let mut points = mask.slide().points();
    for line in mask.dividers() {
        points.extend(line.points());
    }
    let grids = [
        mask.spot_fields(),
        mask.measure_fields(),
        mask.column_labels(),
        mask.row_labels(),
        mask.top_noise(),
        mask.between_noise(),
        mask.bottom_noise(),
    ];
    for grid in grids.into_iter().flatten() {
        for cell in grid.cells() {
            points.extend(cell.points());
        }
    }
    points
}

#[test]
fn two_by_two_super_grid_of_four_by_four_fields() {
    let mask = SlideMask::new(super_grid()).unwrap();

    assert_eq!(mask.spot_fields().len(), 4);
    assert!(mask.spot_fields().iter().all(|g| g.len() == 16));
    assert_eq!(mask.measure_fields().len(), 4);
    assert!(mask.measure_fields().iter().all(|g| g.len() == 16));
    assert!(
        mask.measure_fields()
            .iter()
            .all(|g| g.kind() == ShapeKind::Circle)
    );
    assert_eq!(mask.dividers().len(), (2 - 1) + (2 - 1));
}

#[test]
fn spot_fields_are_laid_out_row_by_row() {
    let mask = SlideMask::new(super_grid()).unwrap();
    let anchors: Vec<_> = mask.spot_fields().iter().map(|g| g.layout().anchor).collect();
    assert_eq!(
        anchors,
        vec![
            Point::new(20.0, 20.0),
            Point::new(230.0, 20.0),
            Point::new(20.0, 230.0),
            Point::new(230.0, 230.0),
        ]
    );
}

#[test]
fn measure_fields_are_centered_in_their_spots() {
    let mask = SlideMask::new(super_grid()).unwrap();
    for (spots, measures) in mask.spot_fields().iter().zip(mask.measure_fields()) {
        assert_points_close(&spots.centroids(), &measures.centroids());
    }
}

#[test]
fn translation_and_rotation_commute() {
    let mut a = SlideMask::new(super_grid()).unwrap();
    a.translate(17.0, -6.0, TransformMode::Record);
    a.rotate(RotationInput::Degrees(23.0), TransformMode::Record);

    let mut b = SlideMask::new(super_grid()).unwrap();
    b.rotate(RotationInput::Degrees(23.0), TransformMode::Record);
    b.translate(17.0, -6.0, TransformMode::Record);

    assert_points_close(&all_points(&a), &all_points(&b));
    assert_eq!(a.translation(), b.translation());
    assert_eq!(a.rotation(), b.rotation());
    assert_eq!(a.rotational_center(), Point::new(267.0, 244.0));
}

#[test]
fn full_turn_restores_every_shape() {
    let unturned = SlideMask::new(super_grid()).unwrap();
    let mut mask = unturned.clone();
    for _ in 0..4 {
        mask.rotate(RotationInput::Degrees(90.0), TransformMode::Record);
    }
    assert_points_close(&all_points(&unturned), &all_points(&mask));
    assert_eq!(mask.rotation().degrees(), 0.0);
}

#[test]
fn parameter_edit_keeps_the_mask_where_it_was() {
    let mut mask = SlideMask::new(two_by_two()).unwrap();
    mask.translate(5.0, 3.0, TransformMode::Record);
    mask.rotate(RotationInput::Degrees(10.0), TransformMode::Record);

    let mut params = two_by_two();
    params.spot_field_rows = 4;
    params.spot_field_cols = 4;
    params.last_spot_index = 15;
    mask.set_params(params.clone()).unwrap();

    let mut expected = SlideMask::new(params).unwrap();
    expected.translate(5.0, 3.0, TransformMode::Record);
    expected.rotate(RotationInput::Degrees(10.0), TransformMode::Record);

    assert_eq!(mask.spot_fields()[0].len(), 16);
    assert_points_close(&all_points(&mask), &all_points(&expected));
    assert_eq!(mask.translation(), Offset::new(5.0, 3.0));
}

#[test]
fn dragging_a_measure_field_moves_only_that_field() {
    let mut mask = SlideMask::new(two_by_two()).unwrap();
    let before = mask.measure_fields()[0].centroids();

    assert_eq!(mask.grab(Point::new(20.0, 20.0), false), Element::Slide);
    assert!(mask.grab_measure_fields(Point::new(20.0, 20.0)));
    assert!(mask.drag(Offset::new(2.0, -1.0), TransformMode::Record));
    mask.release();

    let after = mask.measure_fields()[0].centroids();
    assert_eq!(after[0], Point::new(22.0, 19.0));
    assert_eq!(after[1..], before[1..]);
    assert_eq!(mask.translation(), Offset::ZERO);
    assert!(mask.grabbed().is_empty());
}
