#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::homography::Homography;
use crate::image::{ImageRgb8, CHANNELS};

/// Warp `src` into a `width` x `height` canvas through `h` (source → canvas).
///
/// Each canvas pixel is pulled back through `h⁻¹` and sampled bilinearly;
/// anything that maps outside the source stays black. Returns `None` when
/// `h` is not invertible.
pub fn warp_perspective(
    src: &ImageRgb8,
    h: &Homography,
    width: u32,
    height: u32,
) -> Option<ImageRgb8> {
    let inv = h.inverse()?;
    let mut out = ImageRgb8::new(width, height);
    let row_len = out.row_len();
    if row_len == 0 {
        return Some(out);
    }

    #[cfg(feature = "parallel")]
    out.buf
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| warp_row(src, &inv, y as u32, row));

    #[cfg(not(feature = "parallel"))]
    out.buf
        .chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| warp_row(src, &inv, y as u32, row));

    Some(out)
}

fn warp_row(src: &ImageRgb8, inv: &Homography, y: u32, row: &mut [u8]) {
    let m = &inv.data;
    let fy = y as f64;
    for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
        let fx = x as f64;
        let w = m[2][0] * fx + m[2][1] * fy + m[2][2];
        if w.abs() < f64::EPSILON {
            continue;
        }
        let sx = (m[0][0] * fx + m[0][1] * fy + m[0][2]) / w;
        let sy = (m[1][0] * fx + m[1][1] * fy + m[1][2]) / w;

        // Fully outside, including the one-pixel fade band
        if sx <= -1.0 || sy <= -1.0 || sx >= src.width as f64 || sy >= src.height as f64 {
            continue;
        }

        let v = src.sample_bilinear(sx, sy);
        for c in 0..CHANNELS {
            px[c] = v[c].round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::homography::rect_corners;

    #[test]
    fn identity_warp_copies_image() {
        let mut src = ImageRgb8::new(8, 6);
        for y in 0..6 {
            for x in 0..8 {
                src.set(x, y, [(x * 30) as u8, (y * 40) as u8, 7]);
            }
        }
        let out = warp_perspective(&src, &Homography::IDENTITY, 8, 6).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn canvas_size_follows_request() {
        let src = ImageRgb8::filled(4, 4, [9, 9, 9]);
        let out = warp_perspective(&src, &Homography::IDENTITY, 10, 3).unwrap();
        assert_eq!((out.width, out.height), (10, 3));
        assert_eq!(out.get(2, 2), [9, 9, 9]);
        // Past the fade band everything is black
        assert_eq!(out.get(9, 0), [0, 0, 0]);
    }

    #[test]
    fn scaled_warp_fills_destination_quad() {
        let src = ImageRgb8::filled(100, 50, [10, 200, 30]);
        let dst = [[100.0, 100.0], [300.0, 100.0], [300.0, 300.0], [100.0, 300.0]];
        let h = Homography::from_point_pairs(&rect_corners(100, 50), &dst).unwrap();
        let out = warp_perspective(&src, &h, 640, 480).unwrap();

        assert_eq!(out.get(200, 200), [10, 200, 30]);
        assert_eq!(out.get(120, 150), [10, 200, 30]);
        assert_eq!(out.get(50, 50), [0, 0, 0]);
        assert_eq!(out.get(400, 200), [0, 0, 0]);
    }

    #[test]
    fn singular_homography_is_rejected() {
        let src = ImageRgb8::new(4, 4);
        let h = Homography {
            data: [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        };
        assert!(warp_perspective(&src, &h, 4, 4).is_none());
    }
}
