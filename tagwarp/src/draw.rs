//! Drawing detected markers onto a frame.

use crate::detection::MarkerDetection;
use crate::image::ImageRgb8;

pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];

/// Fill a disc of radius `r` centred on `c`.
pub fn fill_circle(img: &mut ImageRgb8, c: [i64; 2], r: i64, color: [u8; 3]) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                img.put(c[0] + dx, c[1] + dy, color);
            }
        }
    }
}

/// Draw a line segment `thickness` pixels wide (Bresenham, round brush).
pub fn draw_line(img: &mut ImageRgb8, a: [i64; 2], b: [i64; 2], color: [u8; 3], thickness: u32) {
    let r = (thickness as i64 - 1) / 2;
    let (mut x, mut y) = (a[0], a[1]);
    let dx = (b[0] - a[0]).abs();
    let dy = -(b[1] - a[1]).abs();
    let sx = if a[0] < b[0] { 1 } else { -1 };
    let sy = if a[1] < b[1] { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if r == 0 {
            img.put(x, y, color);
        } else {
            fill_circle(img, [x, y], r, color);
        }
        if x == b[0] && y == b[1] {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outline a marker in red and mark its centre in green.
pub fn annotate_marker(img: &mut ImageRgb8, marker: &MarkerDetection) {
    let pts = marker.corners.map(|p| [p[0] as i64, p[1] as i64]);
    for i in 0..4 {
        draw_line(img, pts[i], pts[(i + 1) % 4], RED, 3);
    }
    let c = marker.center();
    fill_circle(img, [c[0] as i64, c[1] as i64], 5, GREEN);
}
