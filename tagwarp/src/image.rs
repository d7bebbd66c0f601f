/// Number of interleaved channels in an [`ImageRgb8`].
pub const CHANNELS: usize = 3;

/// Single-channel image with row-major pixel data.
///
/// Used for compositing masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageU8 {
    pub width: u32,
    pub height: u32,
    pub buf: Vec<u8>,
}

impl ImageU8 {
    /// Create an image with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let buf = vec![value; width as usize * height as usize];
        Self { width, height, buf }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.buf[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u8) {
        self.buf[y as usize * self.width as usize + x as usize] = val;
    }

    /// Mutable view of row `y`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.buf[start..start + w]
    }

    /// Number of pixels equal to `value`.
    pub fn count(&self, value: u8) -> usize {
        self.buf.iter().filter(|&&v| v == value).count()
    }
}

/// 8-bit, 3-channel image with interleaved row-major pixel data.
///
/// Channel order is whatever the caller loaded; nothing in this crate
/// interprets it beyond the drawing colours in [`crate::draw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRgb8 {
    pub width: u32,
    pub height: u32,
    pub buf: Vec<u8>,
}

impl ImageRgb8 {
    /// Create a new black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    /// Create an image with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: [u8; 3]) -> Self {
        let n = width as usize * height as usize;
        let mut buf = Vec::with_capacity(n * CHANNELS);
        for _ in 0..n {
            buf.extend_from_slice(&px);
        }
        Self { width, height, buf }
    }

    /// Wrap existing interleaved pixel data.
    ///
    /// Returns `None` if `buf` does not hold exactly `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, buf: Vec<u8>) -> Option<Self> {
        if buf.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self { width, height, buf })
    }

    /// Bytes per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.buf[i], self.buf[i + 1], self.buf[i + 2]]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, px: [u8; 3]) {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.buf[i..i + CHANNELS].copy_from_slice(&px);
    }

    /// Set a pixel given signed coordinates, ignoring anything off-image.
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, px: [u8; 3]) {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            self.set(x as u32, y as u32, px);
        }
    }

    /// Channel value with a constant black border outside the image.
    #[inline]
    fn channel_or_zero(&self, x: i64, y: i64, c: usize) -> f64 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.buf[(y as usize * self.width as usize + x as usize) * CHANNELS + c] as f64
    }

    /// Bilinear interpolation at sub-pixel coordinates.
    ///
    /// Pixel centres sit on integer coordinates. Neighbours outside the
    /// image contribute black, so samples fade out across the border.
    pub fn sample_bilinear(&self, px: f64, py: f64) -> [f64; 3] {
        let x0 = px.floor() as i64;
        let y0 = py.floor() as i64;
        let fx = px - x0 as f64;
        let fy = py - y0 as f64;

        let mut out = [0.0f64; 3];
        for (c, o) in out.iter_mut().enumerate() {
            let v00 = self.channel_or_zero(x0, y0, c);
            let v10 = self.channel_or_zero(x0 + 1, y0, c);
            let v01 = self.channel_or_zero(x0, y0 + 1, c);
            let v11 = self.channel_or_zero(x0 + 1, y0 + 1, c);
            *o = v00 * (1.0 - fx) * (1.0 - fy)
                + v10 * fx * (1.0 - fy)
                + v01 * (1.0 - fx) * fy
                + v11 * fx * fy;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_sets_every_pixel() {
        let img = ImageRgb8::filled(4, 3, [1, 2, 3]);
        assert_eq!(img.buf.len(), 36);
        assert_eq!(img.get(3, 2), [1, 2, 3]);
        assert_eq!(img.get(0, 0), [1, 2, 3]);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        assert!(ImageRgb8::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(ImageRgb8::from_raw(2, 2, vec![0; 12]).is_some());
    }

    #[test]
    fn get_set_pixel() {
        let mut img = ImageRgb8::new(4, 4);
        img.set(2, 3, [10, 20, 30]);
        assert_eq!(img.get(2, 3), [10, 20, 30]);
        assert_eq!(img.get(3, 2), [0, 0, 0]);
    }

    #[test]
    fn put_ignores_out_of_bounds() {
        let mut img = ImageRgb8::new(2, 2);
        img.put(-1, 0, [255, 255, 255]);
        img.put(0, 2, [255, 255, 255]);
        assert!(img.buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn sample_at_pixel_centre_is_exact() {
        let mut img = ImageRgb8::new(4, 4);
        img.set(1, 1, [100, 50, 25]);
        let v = img.sample_bilinear(1.0, 1.0);
        assert!((v[0] - 100.0).abs() < 1e-10);
        assert!((v[1] - 50.0).abs() < 1e-10);
        assert!((v[2] - 25.0).abs() < 1e-10);
    }

    #[test]
    fn sample_between_pixels() {
        let mut img = ImageRgb8::new(4, 4);
        img.set(1, 0, [100, 100, 100]);
        // Halfway between (0,0)=0 and (1,0)=100
        let v = img.sample_bilinear(0.5, 0.0);
        assert!((v[0] - 50.0).abs() < 1e-10);
    }

    #[test]
    fn sample_fades_to_black_outside() {
        let img = ImageRgb8::filled(2, 2, [200, 200, 200]);
        let v = img.sample_bilinear(-0.5, 0.0);
        assert!((v[0] - 100.0).abs() < 1e-10);
        let v = img.sample_bilinear(-3.0, -3.0);
        assert_eq!(v, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn mask_count_and_rows() {
        let mut m = ImageU8::filled(3, 2, 255);
        m.row_mut(1)[0] = 0;
        m.set(2, 0, 0);
        assert_eq!(m.count(0), 2);
        assert_eq!(m.get(0, 1), 0);
    }
}
