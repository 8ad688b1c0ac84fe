//! Invert: complement the selection.
//!
//! A selection lying inside the image is complemented sample by sample over
//! the image rectangle and then cropped to it, so everything outside the
//! image stays unselected. Anything else is inverted symbolically, which
//! flips the default pixel along with the stored samples.

use super::SelectionFilter;
use crate::selection::{DefaultBounds, PixelSelection, Rect, MAX_SELECTED};

#[derive(Debug, Clone, Copy, Default)]
pub struct InvertSelectionFilter;

impl SelectionFilter for InvertSelectionFilter {
    fn name(&self) -> &'static str {
        "Invert Selection"
    }

    fn change_rect(&self, _rect: Rect, default_bounds: &DefaultBounds) -> Rect {
        default_bounds.bounds()
    }

    fn process(&self, selection: &mut dyn PixelSelection, _rect: Rect) {
        let image_rect = selection.default_bounds().bounds();
        let selection_rect = selection.selected_exact_rect();

        if !image_rect.contains_rect(&selection_rect) {
            log::debug!("{}: symbolic invert of {:?}", self.name(), selection_rect);
            selection.invert();
            return;
        }

        log::debug!("{} over {:?}", self.name(), image_rect);
        let mut row = vec![0u8; image_rect.width as usize];
        for y in image_rect.top()..=image_rect.bottom() {
            selection.read_row(&mut row, image_rect.x, y, image_rect.width);
            for v in row.iter_mut() {
                *v = MAX_SELECTED - *v;
            }
            selection.write_row(&row, image_rect.x, y, image_rect.width);
        }
        selection.crop(image_rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMask;
    use ndarray::Array2;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contained_selection_inverts_in_place() {
        let input = Array2::from_shape_fn((4, 4), |(y, x)| if y == 1 && x >= 1 { 200 } else { 0 });
        let mut mask = SelectionMask::from_array(input.clone());
        let rect = mask.default_bounds().bounds();

        InvertSelectionFilter.process(&mut mask, rect);

        assert_eq!(mask.default_pixel(), 0);
        assert_eq!(mask.to_array(rect), input.mapv(|v| 255 - v));
        // Outside the image stays unselected.
        assert_eq!(mask.pixel(-1, -1), 0);
        assert_eq!(mask.pixel(4, 0), 0);
    }

    #[test]
    fn test_involution_inside_image() {
        let input = Array2::from_shape_fn((5, 6), |(y, x)| ((x * 40 + y * 7) % 256) as u8);
        let mut mask = SelectionMask::from_array(input.clone());
        mask.set_pixel(0, 0, 0);
        let expected = mask.to_array(Rect::new(0, 0, 6, 5));

        InvertSelectionFilter.process(&mut mask, Rect::default());
        InvertSelectionFilter.process(&mut mask, Rect::default());

        assert_eq!(mask.to_array(Rect::new(0, 0, 6, 5)), expected);
    }

    #[test]
    fn test_selection_outside_image_inverts_symbolically() {
        let mut mask = SelectionMask::new(Rect::new(0, 0, 4, 4));
        mask.set_pixel(10, 10, 255);

        InvertSelectionFilter.process(&mut mask, Rect::default());

        assert_eq!(mask.default_pixel(), 255);
        assert_eq!(mask.pixel(10, 10), 0);
        assert_eq!(mask.pixel(100, -100), 255);
    }

    #[test]
    fn test_change_rect_is_image_bounds() {
        let bounds = DefaultBounds::new(Rect::new(0, 0, 30, 20));
        assert_eq!(
            InvertSelectionFilter.change_rect(Rect::new(5, 5, 1, 1), &bounds),
            Rect::new(0, 0, 30, 20)
        );
    }
}
