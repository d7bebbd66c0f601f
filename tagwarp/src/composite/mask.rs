use crate::image::ImageU8;

/// Mask value: keep the frame pixel.
pub const KEEP: u8 = 255;
/// Mask value: the frame pixel is replaced by the warp.
pub const REPLACE: u8 = 0;

/// Fill a convex polygon with `value`, boundary pixels included.
///
/// Vertices are in pixel coordinates; the fill is clipped to the image.
pub fn fill_convex_poly(mask: &mut ImageU8, pts: &[[i32; 2]], value: u8) {
    if pts.is_empty() || mask.width == 0 || mask.height == 0 {
        return;
    }

    let ymin = pts.iter().map(|p| p[1]).min().unwrap_or(0).max(0);
    let ymax = pts
        .iter()
        .map(|p| p[1])
        .max()
        .unwrap_or(-1)
        .min(mask.height as i32 - 1);

    for y in ymin..=ymax {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for i in 0..pts.len() {
            let p = pts[i];
            let q = pts[(i + 1) % pts.len()];
            if y < p[1].min(q[1]) || y > p[1].max(q[1]) {
                continue;
            }
            if p[1] == q[1] {
                lo = lo.min(p[0].min(q[0]) as f64);
                hi = hi.max(p[0].max(q[0]) as f64);
            } else {
                let t = (y - p[1]) as f64 / (q[1] - p[1]) as f64;
                let x = p[0] as f64 + t * (q[0] - p[0]) as f64;
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
        if lo > hi {
            continue;
        }

        let x0 = (lo.round() as i64).max(0);
        let x1 = (hi.round() as i64).min(mask.width as i64 - 1);
        if x0 > x1 {
            continue;
        }
        mask.row_mut(y as u32)[x0 as usize..=x1 as usize].fill(value);
    }
}

/// Erode with a `kernel` x `kernel` rectangle, `iterations` times.
///
/// Each pass is a min filter; neighbours outside the image are ignored, so
/// the image border does not eat into the mask.
pub fn erode(mask: &ImageU8, kernel: u32, iterations: u32) -> ImageU8 {
    let r = (kernel / 2) as usize;
    let mut cur = mask.clone();
    if r == 0 {
        return cur;
    }
    let w = mask.width as usize;
    let h = mask.height as usize;

    for _ in 0..iterations {
        // Horizontal pass
        let mut tmp = cur.clone();
        for y in 0..h {
            let row = &cur.buf[y * w..(y + 1) * w];
            for x in 0..w {
                let lo = x.saturating_sub(r);
                let hi = (x + r).min(w - 1);
                tmp.buf[y * w + x] = row[lo..=hi].iter().copied().min().unwrap_or(KEEP);
            }
        }

        // Vertical pass
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r).min(h - 1);
            for x in 0..w {
                let mut m = u8::MAX;
                for yy in lo..=hi {
                    m = m.min(tmp.buf[yy * w + x]);
                }
                cur.buf[y * w + x] = m;
            }
        }
    }
    cur
}

/// Build the compositing mask for a destination quad.
///
/// KEEP everywhere, REPLACE inside the quad (corners truncated toward zero),
/// then eroded so the replaced region overlaps the warp's edge by a couple
/// of pixels.
pub fn overlay_mask(
    width: u32,
    height: u32,
    quad: &[[f64; 2]; 4],
    kernel: u32,
    iterations: u32,
) -> ImageU8 {
    let mut mask = ImageU8::filled(width, height, KEEP);
    let pts = quad.map(|p| [p[0] as i32, p[1] as i32]);
    fill_convex_poly(&mut mask, &pts, REPLACE);
    erode(&mask, kernel, iterations)
}
