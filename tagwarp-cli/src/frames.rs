use std::path::Path;

use anyhow::{Context, Result};

use tagwarp::image::ImageRgb8;

pub fn load_image(path: &Path) -> Result<ImageRgb8> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?
        .into_rgb8();

    let width = img.width();
    let height = img.height();
    ImageRgb8::from_raw(width, height, img.into_raw())
        .with_context(|| format!("unexpected pixel layout in {}", path.display()))
}

pub fn save_image(img: &ImageRgb8, path: &Path) -> Result<()> {
    let out = image::RgbImage::from_raw(img.width, img.height, img.buf.clone())
        .context("image buffer does not match its dimensions")?;
    out.save(path)
        .with_context(|| format!("failed to write image: {}", path.display()))
}
