//! Skew estimation and correction for binarized document images
//!
//! The dominant rotation is taken from the minimum-area bounding rectangle of
//! the foreground (dark) pixels. Only the leftmost and rightmost foreground
//! pixel of each row can lie on the convex hull, so those are the only points
//! collected.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp_with, Interpolation};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::debug;

/// Pixels darker than this count as foreground (text)
const FOREGROUND_LEVEL: u8 = 128;

/// Estimate the skew angle in degrees, normalized into (-45, 45].
///
/// Positive angles mean text lines descend to the right. Returns `None`
/// when the image has no foreground pixels.
pub fn estimate_skew_angle(image: &GrayImage) -> Option<f32> {
    let points = foreground_extremes(image);
    if points.is_empty() {
        return None;
    }

    // Corners run top-left, top-right, bottom-right, bottom-left; the longer
    // side is the text direction. Collinear input yields a degenerate rectangle.
    let rect = min_area_rect(&points);
    let top = edge(rect[0], rect[1]);
    let side = edge(rect[1], rect[2]);
    let (dx, dy) = if top.0.hypot(top.1) >= side.0.hypot(side.1) { top } else { side };

    Some(normalize_angle(dy.atan2(dx).to_degrees()) as f32)
}

fn edge(from: Point<i32>, to: Point<i32>) -> (f64, f64) {
    ((to.x - from.x) as f64, (to.y - from.y) as f64)
}

/// Rotate `image` about its center by `-angle` degrees, replicating edge
/// pixels instead of filling uncovered corners
pub fn rotate_replicate(image: &GrayImage, angle: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_x = width as f32 - 1.0;
    let max_y = height as f32 - 1.0;

    // Maps each output pixel back into the source; clamping is the replicate border.
    let mapping = move |x: f32, y: f32| {
        let dx = x - cx;
        let dy = y - cy;
        let sx = cx + dx * cos - dy * sin;
        let sy = cy + dx * sin + dy * cos;
        (sx.clamp(0.0, max_x), sy.clamp(0.0, max_y))
    };

    warp_with(image, mapping, Interpolation::Nearest, Luma([255u8]))
}

/// Estimate the skew and rotate it away. Angles within `tolerance` degrees
/// of zero, and images without foreground, are returned unchanged.
pub fn deskew(image: &GrayImage, tolerance: f32) -> (GrayImage, Option<f32>) {
    match estimate_skew_angle(image) {
        Some(angle) if angle.abs() > tolerance => {
            debug!("Deskewing by {:.2} degrees", angle);
            (rotate_replicate(image, angle), Some(angle))
        }
        Some(angle) => {
            debug!("Skew {:.2} degrees within tolerance, not rotating", angle);
            (image.clone(), Some(angle))
        }
        None => {
            debug!("No foreground pixels, skipping deskew");
            (image.clone(), None)
        }
    }
}

/// Fold an angle in degrees into (-45, 45]; a rectangle is unchanged by 90 degree turns
fn normalize_angle(degrees: f64) -> f64 {
    let mut angle = degrees % 90.0;
    if angle > 45.0 {
        angle -= 90.0;
    } else if angle <= -45.0 {
        angle += 90.0;
    }
    if angle == 0.0 {
        0.0
    } else {
        angle
    }
}

/// Leftmost and rightmost foreground pixel of every row
fn foreground_extremes(image: &GrayImage) -> Vec<Point<i32>> {
    let (width, height) = image.dimensions();
    let mut points = Vec::new();

    for y in 0..height {
        let mut first = None;
        let mut last = None;
        for x in 0..width {
            if image.get_pixel(x, y)[0] < FOREGROUND_LEVEL {
                if first.is_none() {
                    first = Some(x);
                }
                last = Some(x);
            }
        }
        if let (Some(first), Some(last)) = (first, last) {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White page with one dark filled rectangle rotated by `angle` degrees
    fn rotated_block(width: u32, height: u32, half_w: f32, half_h: f32, angle: f32) -> GrayImage {
        let (sin, cos) = angle.to_radians().sin_cos();
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        GrayImage::from_fn(width, height, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if u.abs() <= half_w && v.abs() <= half_h {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(90.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 0.0);
        assert_eq!(normalize_angle(180.0), 0.0);
        assert!((normalize_angle(80.0) - -10.0).abs() < 1e-9);
        assert!((normalize_angle(-80.0) - 10.0).abs() < 1e-9);
        assert_eq!(normalize_angle(45.0), 45.0);
        assert_eq!(normalize_angle(-45.0), 45.0);
    }

    #[test]
    fn test_upright_block_has_no_skew() {
        let image = rotated_block(200, 120, 70.0, 20.0, 0.0);
        let angle = estimate_skew_angle(&image).unwrap();
        assert!(angle.abs() < 0.5, "angle was {}", angle);

        let (out, _) = deskew(&image, 0.5);
        assert_eq!(out, image);
    }

    #[test]
    fn test_rotated_block_angle() {
        let image = rotated_block(300, 300, 100.0, 25.0, 10.0);
        let angle = estimate_skew_angle(&image).unwrap();
        assert!((angle - 10.0).abs() < 1.5, "angle was {}", angle);

        let image = rotated_block(300, 300, 100.0, 25.0, -8.0);
        let angle = estimate_skew_angle(&image).unwrap();
        assert!((angle + 8.0).abs() < 1.5, "angle was {}", angle);
    }

    #[test]
    fn test_deskew_straightens_block() {
        let image = rotated_block(300, 300, 100.0, 25.0, 12.0);
        let (straightened, applied) = deskew(&image, 0.5);
        assert!(applied.is_some());
        assert_eq!(straightened.dimensions(), image.dimensions());

        let residual = estimate_skew_angle(&straightened).unwrap();
        assert!(residual.abs() < 1.5, "residual skew {}", residual);
    }

    #[test]
    fn test_blank_image_skips_deskew() {
        let blank = GrayImage::from_pixel(50, 40, Luma([255]));
        assert_eq!(estimate_skew_angle(&blank), None);

        let (out, angle) = deskew(&blank, 0.5);
        assert_eq!(angle, None);
        assert_eq!(out, blank);
    }

    #[test]
    fn test_rotation_replicates_border() {
        // Uniform gray stays uniform: no black corners are introduced
        let image = GrayImage::from_pixel(40, 30, Luma([200]));
        let rotated = rotate_replicate(&image, 20.0);
        assert!(rotated.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn test_single_row_of_text() {
        let mut image = GrayImage::from_pixel(50, 20, Luma([255]));
        for x in 5..45 {
            image.put_pixel(x, 10, Luma([0]));
        }
        assert_eq!(estimate_skew_angle(&image), Some(0.0));
    }
}
