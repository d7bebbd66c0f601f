use thiserror::Error;

use crate::detection::MarkerId;

/// Setup-time errors. These are fatal to the session that hit them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected exactly 4 anchor ids (TL, TR, BR, BL), got {0}")]
    AnchorCount(usize),

    #[error("anchor id {0} appears more than once")]
    DuplicateAnchor(MarkerId),

    #[error("unknown marker dictionary '{0}'")]
    UnknownDictionary(String),

    #[error("erosion kernel must be odd and non-zero, got {0}")]
    InvalidKernel(u32),

    #[cfg(feature = "serde")]
    #[error("config error: {0}")]
    Toml(String),
}

/// Why a frame produced no overlay.
///
/// Missing markers are the steady state in live video, so this is a normal
/// outcome rather than a failure of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Skip {
    #[error("only {found} of 4 anchor markers resolved and no cached reference points")]
    InsufficientDetections { found: usize },

    #[error("destination quad is degenerate, no homography")]
    DegenerateHomography,
}
