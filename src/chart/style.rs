//! Colors and marker shapes for chart series.

use plotters::coord::CoordTranslate;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

/// Series colors, cycled by index. Even slots are reads, odd slots writes.
const COLORS: [RGBColor; 8] = [
    RGBColor(0xf1, 0x5a, 0x60),
    RGBColor(0x7a, 0xc3, 0x6a),
    RGBColor(0x5a, 0x9b, 0xd4),
    RGBColor(0xfa, 0xa7, 0x5b),
    RGBColor(0x9e, 0x67, 0xab),
    RGBColor(0xce, 0x70, 0x58),
    RGBColor(0xd7, 0x7f, 0xb4),
    RGBColor(0x73, 0x73, 0x73),
];

/// Color of the crisp per-point overlay drawn on write series
pub const OVERLAY_COLOR: RGBColor = BLACK;

pub fn color_for(index: usize) -> RGBColor {
    COLORS[index % COLORS.len()]
}

pub fn read_color(dataset: usize) -> RGBColor {
    color_for(dataset * 2)
}

pub fn write_color(dataset: usize) -> RGBColor {
    color_for(dataset * 2 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Ring,
    Square,
    Triangle,
    Plus,
    Disc,
    Cross,
    FilledTriangle,
    FilledSquare,
}

pub const SHAPES: [MarkerShape; 8] = [
    MarkerShape::Ring,
    MarkerShape::Square,
    MarkerShape::Triangle,
    MarkerShape::Plus,
    MarkerShape::Disc,
    MarkerShape::Cross,
    MarkerShape::FilledTriangle,
    MarkerShape::FilledSquare,
];

/// Shape for the value size at `rank` in ascending order
pub fn shape_for(rank: usize) -> MarkerShape {
    SHAPES[rank % SHAPES.len()]
}

/// Draw one marker centered on `at`, `size` pixels from center to edge.
pub fn draw_marker<DB, CT>(
    area: &DrawingArea<DB, CT>,
    at: CT::From,
    shape: MarkerShape,
    size: i32,
    color: RGBColor,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    CT: CoordTranslate,
{
    let outline = color.stroke_width(1);
    let filled = color.filled();
    let s = size;
    match shape {
        MarkerShape::Ring => area.draw(&(EmptyElement::at(at) + Circle::new((0, 0), s, outline))),
        MarkerShape::Disc => area.draw(&(EmptyElement::at(at) + Circle::new((0, 0), s, filled))),
        MarkerShape::Square => {
            area.draw(&(EmptyElement::at(at) + Rectangle::new([(-s, -s), (s, s)], outline)))
        }
        MarkerShape::FilledSquare => {
            area.draw(&(EmptyElement::at(at) + Rectangle::new([(-s, -s), (s, s)], filled)))
        }
        MarkerShape::Triangle => area.draw(
            &(EmptyElement::at(at)
                + PathElement::new(vec![(0, -s), (s, s), (-s, s), (0, -s)], outline)),
        ),
        MarkerShape::FilledTriangle => {
            area.draw(&(EmptyElement::at(at) + Polygon::new(vec![(0, -s), (s, s), (-s, s)], filled)))
        }
        MarkerShape::Plus => area.draw(
            &(EmptyElement::at(at)
                + PathElement::new(vec![(-s, 0), (s, 0)], outline)
                + PathElement::new(vec![(0, -s), (0, s)], outline)),
        ),
        MarkerShape::Cross => area.draw(
            &(EmptyElement::at(at)
                + PathElement::new(vec![(-s, -s), (s, s)], outline)
                + PathElement::new(vec![(-s, s), (s, -s)], outline)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_cycle_through_palette() {
        for rank in 0..40 {
            assert_eq!(shape_for(rank), shape_for(rank % SHAPES.len()));
        }
        assert_eq!(shape_for(0), MarkerShape::Ring);
        assert_eq!(shape_for(8), MarkerShape::Ring);
        assert_eq!(shape_for(13), MarkerShape::Cross);
    }

    #[test]
    fn palette_shapes_are_distinct() {
        for (i, a) in SHAPES.iter().enumerate() {
            for b in &SHAPES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn read_and_write_colors_differ_per_dataset() {
        for ds in 0..4 {
            assert_ne!(read_color(ds), write_color(ds));
            assert_ne!(read_color(ds), OVERLAY_COLOR);
            assert_ne!(write_color(ds), OVERLAY_COLOR);
        }
        assert_eq!(read_color(0), read_color(0));
        assert_eq!(color_for(3), color_for(3 + COLORS.len()));
    }
}
