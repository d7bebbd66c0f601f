use log::debug;

use super::cache::ReferenceCache;
use super::homography::{rect_corners, Homography};
use super::mask::{overlay_mask, REPLACE};
use super::resolve::{resolve, ReferencePoints};
use super::warp::warp_perspective;
use crate::config::CompositorConfig;
use crate::detection::{DetectionResult, MarkerDetector};
use crate::error::{ConfigError, Skip};
use crate::image::{ImageRgb8, CHANNELS};

/// Composite `source` onto `frame` over the quad spanned by the anchors.
///
/// When the anchors cannot all be resolved and `config.use_cache` is set,
/// the cached reference points stand in. With caching enabled, whichever
/// set ends up in use is written back to `cache`. The frame itself is left
/// untouched; the composite is a new image.
pub fn composite_frame(
    frame: &ImageRgb8,
    source: &ImageRgb8,
    detections: &DetectionResult,
    cache: &mut ReferenceCache,
    config: &CompositorConfig,
) -> Result<ImageRgb8, Skip> {
    let found = resolve(detections, &config.anchors);

    let refs = match ReferencePoints::from_resolved(&found) {
        Some(refs) => refs,
        None => match cache.get() {
            Some(cached) if config.use_cache => {
                debug!(
                    "{} of 4 anchors resolved, using cached reference points",
                    found.len()
                );
                *cached
            }
            _ => return Err(Skip::InsufficientDetections { found: found.len() }),
        },
    };

    if config.use_cache {
        cache.store(refs);
    }

    let dst = refs.destination(config.corner_selection);
    let src = rect_corners(source.width, source.height);
    let h = Homography::from_point_pairs(&src, &dst).ok_or(Skip::DegenerateHomography)?;
    let warped = warp_perspective(source, &h, frame.width, frame.height)
        .ok_or(Skip::DegenerateHomography)?;

    let mask = overlay_mask(
        frame.width,
        frame.height,
        &dst,
        config.erode_kernel,
        config.erode_iterations,
    );

    // frame AND mask, then saturating add of the warp
    let mut out = warped;
    for (i, px) in out.buf.chunks_exact_mut(CHANNELS).enumerate() {
        if mask.buf[i] == REPLACE {
            continue;
        }
        let f = &frame.buf[i * CHANNELS..(i + 1) * CHANNELS];
        for c in 0..CHANNELS {
            px[c] = px[c].saturating_add(f[c]);
        }
    }
    Ok(out)
}

/// One overlay session: configuration plus its reference-point cache.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: CompositorConfig,
    cache: ReferenceCache,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cache: ReferenceCache::new(),
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Turn caching on or off for subsequent frames. The cached points are
    /// kept either way.
    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.config.use_cache = use_cache;
    }

    /// Drop the cached reference points.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Composite one frame, or `None` when there is nothing to overlay.
    pub fn find_and_warp(
        &mut self,
        frame: &ImageRgb8,
        source: &ImageRgb8,
        detections: &DetectionResult,
    ) -> Option<ImageRgb8> {
        match composite_frame(frame, source, detections, &mut self.cache, &self.config) {
            Ok(out) => Some(out),
            Err(skip) => {
                debug!("no overlay: {skip}");
                None
            }
        }
    }

    /// Like [`Compositor::find_and_warp`], running `detector` on the frame
    /// first.
    pub fn find_and_warp_with(
        &mut self,
        frame: &ImageRgb8,
        source: &ImageRgb8,
        detector: &dyn MarkerDetector,
    ) -> Option<ImageRgb8> {
        let detections = detector.detect(frame);
        self.find_and_warp(frame, source, &detections)
    }
}
