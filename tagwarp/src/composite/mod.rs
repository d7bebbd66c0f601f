#[allow(clippy::needless_range_loop)]
pub mod homography;
pub mod warp;
pub mod mask;
pub mod resolve;
pub mod cache;
pub mod compositor;

pub use cache::ReferenceCache;
pub use compositor::{composite_frame, Compositor};
pub use resolve::{resolve, AnchorIds, CornerSelection, ReferencePoints, Role};
