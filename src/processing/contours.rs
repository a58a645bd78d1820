use image::imageops;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours as follow_borders};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::point::Point;

use crate::models::{BorderKind, Contour};

/// Outline color used when annotating the final image
pub const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outline width in pixels
pub const CONTOUR_THICKNESS: i32 = 2;

/// Find every outer and hole border in a binary mask (non-zero = foreground),
/// in discovery order. Pixels outside the image count as background, so
/// foreground touching the image edge is still enclosed by a border.
pub fn find_contours(mask: &GrayImage) -> Vec<Contour> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    follow_borders::<i32>(&padded)
        .into_iter()
        .enumerate()
        .map(|(index, border)| {
            let shifted: Vec<Point<i32>> = border
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            let points = compress_chain(&shifted);
            let area = polygon_area(&points);
            Contour {
                index,
                parent: border.parent,
                kind: match border.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
                points,
                area,
            }
        })
        .collect()
}

/// Drop the interior points of straight horizontal, vertical and diagonal
/// runs so only the segment end points remain
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: Point<i32>, to: Point<i32>| (to.x - from.x, to.y - from.y);

    let kept: Vec<Point<i32>> = points
        .iter()
        .enumerate()
        .filter(|&(i, &p)| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, p) != step(p, next)
        })
        .map(|(_, &p)| p)
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

/// Enclosed area of a closed polygon (shoelace formula)
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice.abs() as f64 / 2.0
}

/// Sort by enclosed area, largest first; equal areas keep discovery order
pub fn sort_by_area_desc(contours: &mut [Contour]) {
    contours.sort_by(|a, b| b.area.total_cmp(&a.area));
}

/// Draw every contour as a closed outline onto `canvas`
pub fn draw_contours(canvas: &mut RgbImage, contours: &[Contour], color: Rgb<u8>, thickness: i32) {
    let thickness = thickness.max(1);
    let lo = -(thickness / 2);
    let hi = thickness - thickness / 2;

    for contour in contours {
        let n = contour.points.len();
        for i in 0..n {
            let start = contour.points[i];
            let end = contour.points[(i + 1) % n];
            for dy in lo..hi {
                for dx in lo..hi {
                    draw_line_segment_mut(
                        canvas,
                        ((start.x + dx) as f32, (start.y + dy) as f32),
                        ((end.x + dx) as f32, (end.y + dy) as f32),
                        color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_chain(x0: i32, y0: i32, side: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in x0..x0 + side {
            pts.push(Point::new(x, y0));
        }
        for y in y0..y0 + side {
            pts.push(Point::new(x0 + side, y));
        }
        for x in (x0 + 1..=x0 + side).rev() {
            pts.push(Point::new(x, y0 + side));
        }
        for y in (y0 + 1..=y0 + side).rev() {
            pts.push(Point::new(x0, y));
        }
        pts
    }

    #[test]
    fn compression_keeps_only_corners() {
        let compressed = compress_chain(&square_chain(2, 2, 5));
        assert_eq!(
            compressed,
            vec![Point::new(2, 2), Point::new(7, 2), Point::new(7, 7), Point::new(2, 7)]
        );
    }

    #[test]
    fn compression_preserves_area() {
        let chain = square_chain(0, 0, 6);
        assert_eq!(polygon_area(&chain), 36.0);
        assert_eq!(polygon_area(&compress_chain(&chain)), 36.0);
    }

    #[test]
    fn degenerate_polygons_have_no_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Point::new(1, 1), Point::new(4, 1)]), 0.0);
    }

    #[test]
    fn sort_is_stable_for_equal_areas() {
        let make = |index: usize, area: f64| Contour {
            index,
            parent: None,
            kind: BorderKind::Outer,
            points: vec![],
            area,
        };
        let mut contours = vec![make(0, 4.0), make(1, 9.0), make(2, 4.0), make(3, 9.0)];
        sort_by_area_desc(&mut contours);
        let order: Vec<usize> = contours.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn filled_rectangle_gives_one_outer_border() {
        let mut mask = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 4..12 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].kind, BorderKind::Outer);
        assert_eq!(contours[0].points.len(), 4);
        assert_eq!(contours[0].area, 7.0 * 9.0);
    }

    #[test]
    fn outlines_land_on_the_canvas() {
        let contour = Contour {
            index: 0,
            parent: None,
            kind: BorderKind::Outer,
            points: vec![Point::new(3, 3), Point::new(10, 3), Point::new(10, 10), Point::new(3, 10)],
            area: 49.0,
        };
        let mut canvas = RgbImage::new(16, 16);
        draw_contours(&mut canvas, &[contour], CONTOUR_COLOR, CONTOUR_THICKNESS);
        assert_eq!(*canvas.get_pixel(6, 3), CONTOUR_COLOR);
        assert_eq!(*canvas.get_pixel(6, 2), CONTOUR_COLOR);
        assert_eq!(*canvas.get_pixel(6, 6), Rgb([0, 0, 0]));
    }
}
