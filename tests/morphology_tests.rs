use ndarray::Array2;
use pretty_assertions::assert_eq;

use selection_filters::filters::*;
use selection_filters::selection::*;

/// Deterministic mask with scattered partial values.
fn noise_mask(height: usize, width: usize, seed: u32) -> Array2<u8> {
    let mut state = seed;
    Array2::from_shape_fn((height, width), |_| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        match state >> 29 {
            0..=2 => 0,
            3..=5 => 255,
            _ => (state >> 16) as u8,
        }
    })
}

#[test]
pub fn erode_is_dual_of_dilate() {
    let mask = noise_mask(17, 23, 7);
    let complement = mask.mapv(|v| 255 - v);

    let eroded = apply_to_array(&ErodeSelectionFilter, mask.view());
    let dilated = apply_to_array(&DilateSelectionFilter, complement.view());

    assert_eq!(eroded, dilated.mapv(|v| 255 - v));
}

#[test]
pub fn grow_single_pixel_makes_disk() {
    let mut mask = SelectionMask::new(Rect::new(0, 0, 11, 11));
    mask.set_pixel(5, 5, 255);

    GrowSelectionFilter::new(2, 2).process(&mut mask, Rect::new(3, 3, 5, 5));

    // compute_border(2, 2) = [1, 2, 2, 2, 1]
    for y in 0..11 {
        for x in 0..11 {
            let dx = (x - 5i32).abs();
            let dy = (y - 5i32).abs();
            let reach = match dx {
                0 | 1 => 2,
                2 => 1,
                _ => -1,
            };
            let expected = if dy <= reach { 255 } else { 0 };
            assert_eq!(mask.pixel(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
pub fn grow_contains_input_and_shrink_is_contained() {
    let mask = noise_mask(20, 20, 42);

    let grown = apply_to_array(&GrowSelectionFilter::new(3, 2), mask.view());
    let shrunk = apply_to_array(&ShrinkSelectionFilter::new(3, 2, false), mask.view());

    for ((m, g), s) in mask.iter().zip(grown.iter()).zip(shrunk.iter()) {
        assert!(g >= m);
        assert!(s <= m);
    }
}

#[test]
pub fn shrink_edge_lock_keeps_image_border() {
    let full = Array2::from_elem((12, 12), 255u8);

    let locked = apply_to_array(&ShrinkSelectionFilter::new(2, 2, true), full.view());
    assert!(locked.iter().all(|&v| v == 255));

    let unlocked = apply_to_array(&ShrinkSelectionFilter::new(2, 2, false), full.view());
    assert_eq!(unlocked[[0, 0]], 0);
    assert_eq!(unlocked[[6, 6]], 255);
}

#[test]
pub fn shrink_edge_lock_change_rect_is_image() {
    let bounds = DefaultBounds::new(Rect::new(0, 0, 200, 200));
    let rect = Rect::new(0, 0, 50, 50);

    assert_eq!(
        ShrinkSelectionFilter::new(4, 4, true).change_rect(rect, &bounds),
        Rect::new(0, 0, 200, 200)
    );
    assert_eq!(ShrinkSelectionFilter::new(4, 4, false).change_rect(rect, &bounds), rect);
}

#[test]
pub fn non_positive_radius_is_noop() {
    let mask = noise_mask(9, 13, 3);
    let configs = [
        r#"{"op": "grow", "x_radius": 0, "y_radius": 2}"#,
        r#"{"op": "shrink", "x_radius": 2, "y_radius": -1}"#,
        r#"{"op": "border", "x_radius": 0, "y_radius": 0}"#,
        r#"{"op": "feather", "radius": 0}"#,
    ];

    for json in configs {
        let filter = FilterConfig::from_json(json).unwrap().build(None).unwrap();
        assert_eq!(apply_to_array(filter.as_ref(), mask.view()), mask, "{}", json);
    }
}
