/// A 3x3 homography matrix, row-major, normalised so `data[2][2] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub data: [[f64; 3]; 3],
}

impl Homography {
    pub const IDENTITY: Homography = Homography {
        data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Compute the homography mapping each `src[i]` onto `dst[i]`.
    ///
    /// Exact 4-point DLT with `h22` fixed to 1. Returns `None` when the
    /// correspondences are degenerate (coincident or collinear points).
    pub fn from_point_pairs(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Option<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return None;
        }

        // Build 8x9 DLT system
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (sx, sy) = (src[i][0], src[i][1]);
            let (dx, dy) = (dst[i][0], dst[i][1]);

            let row0 = i * 2;
            a[row0][0] = sx;
            a[row0][1] = sy;
            a[row0][2] = 1.0;
            a[row0][6] = -sx * dx;
            a[row0][7] = -sy * dx;
            a[row0][8] = dx;

            let row1 = i * 2 + 1;
            a[row1][3] = sx;
            a[row1][4] = sy;
            a[row1][5] = 1.0;
            a[row1][6] = -sx * dy;
            a[row1][7] = -sy * dy;
            a[row1][8] = dy;
        }

        // Pivot threshold relative to the largest coefficient, so pixel-scale
        // inputs are judged the same as unit-scale ones.
        let scale = a
            .iter()
            .flat_map(|row| row[..8].iter())
            .fold(0.0f64, |m, v| m.max(v.abs()));
        if scale == 0.0 {
            return None;
        }
        let eps = scale * 1e-12;

        // Gaussian elimination with partial pivoting (8x9 augmented)
        for col in 0..8 {
            let mut max_val = a[col][col].abs();
            let mut max_row = col;
            for row in (col + 1)..8 {
                let v = a[row][col].abs();
                if v > max_val {
                    max_val = v;
                    max_row = row;
                }
            }
            if max_val < eps {
                return None;
            }

            if max_row != col {
                a.swap(col, max_row);
            }

            let pivot = a[col][col];
            for row in (col + 1)..8 {
                let factor = a[row][col] / pivot;
                for c in col..9 {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }

        // Back-substitute (h[8] = 1, solve for h[0..8])
        let mut h = [0.0f64; 9];
        h[8] = 1.0;

        for row in (0..8).rev() {
            let mut sum = a[row][8];
            for c in (row + 1)..8 {
                sum -= a[row][c] * h[c];
            }
            h[row] = sum / a[row][row];
        }

        if h.iter().any(|v| !v.is_finite()) {
            return None;
        }

        Some(Homography {
            data: [
                [h[0], h[1], h[2]],
                [h[3], h[4], h[5]],
                [h[6], h[7], h[8]],
            ],
        })
    }

    /// Project a point through the homography.
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let h = &self.data;
        let xx = h[0][0] * x + h[0][1] * y + h[0][2];
        let yy = h[1][0] * x + h[1][1] * y + h[1][2];
        let zz = h[2][0] * x + h[2][1] * y + h[2][2];
        (xx / zz, yy / zz)
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Compute the inverse homography.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.data;
        let det = self.determinant();

        if det.abs() < 1e-10 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        let mut inv = [[0.0f64; 3]; 3];

        inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
        inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
        inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
        inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
        inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
        inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

        Some(Homography { data: inv })
    }
}

/// True if any three of the four points are (nearly) collinear.
///
/// The tolerance is relative to the squared extent of the point set.
fn has_collinear_triple(pts: &[[f64; 2]; 4]) -> bool {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let extent = (max_x - min_x).max(max_y - min_y);
    if !extent.is_finite() || extent == 0.0 {
        return true;
    }
    let tol = extent * extent * 1e-9;

    for [i, j, k] in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
        let (a, b, c) = (pts[i], pts[j], pts[k]);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if cross.abs() <= tol {
            return true;
        }
    }
    false
}

/// Corners of a `width` x `height` image in (x, y) order:
/// (0,0), (w,0), (w,h), (0,h).
pub fn rect_corners(width: u32, height: u32) -> [[f64; 2]; 4] {
    let (w, h) = (width as f64, height as f64);
    [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
}
