use log::trace;
use smallvec::SmallVec;

use crate::detection::{quad_center, Corners, DetectionResult, MarkerId};
use crate::error::ConfigError;

/// Position of an anchor marker around the overlay region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Role {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The four anchor marker ids, in TL, TR, BR, BL order.
///
/// The order is fixed by the caller for the whole session; it is never
/// inferred from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<MarkerId>", into = "Vec<MarkerId>"))]
pub struct AnchorIds {
    ids: [MarkerId; 4],
}

impl AnchorIds {
    /// Anchors used by the stock video overlay setup.
    pub const DEFAULT: AnchorIds = AnchorIds {
        ids: [923, 1001, 241, 1007],
    };

    /// Build from a caller-supplied list. Anything other than four distinct
    /// ids is a configuration error.
    pub fn new(ids: &[MarkerId]) -> Result<Self, ConfigError> {
        let ids: [MarkerId; 4] = ids
            .try_into()
            .map_err(|_| ConfigError::AnchorCount(ids.len()))?;
        for i in 0..4 {
            if ids[i + 1..].contains(&ids[i]) {
                return Err(ConfigError::DuplicateAnchor(ids[i]));
            }
        }
        Ok(Self { ids })
    }

    pub fn ids(&self) -> [MarkerId; 4] {
        self.ids
    }

    pub fn id(&self, role: Role) -> MarkerId {
        self.ids[role.index()]
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.ids.contains(&id)
    }
}

impl Default for AnchorIds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<Vec<MarkerId>> for AnchorIds {
    type Error = ConfigError;

    fn try_from(ids: Vec<MarkerId>) -> Result<Self, Self::Error> {
        Self::new(&ids)
    }
}

impl From<AnchorIds> for Vec<MarkerId> {
    fn from(a: AnchorIds) -> Self {
        a.ids.to_vec()
    }
}

/// Resolve anchor corners from one frame's detections.
///
/// The detection is only trusted when exactly four markers were decoded in
/// total; any other count yields nothing, even if every anchor is present.
/// Otherwise each anchor id, in role order, contributes the corners of the
/// first marker carrying it.
pub fn resolve(detections: &DetectionResult, anchors: &AnchorIds) -> SmallVec<[Corners; 4]> {
    let mut found = SmallVec::new();
    if detections.len() != 4 {
        trace!("resolve: {} markers decoded, need exactly 4", detections.len());
        return found;
    }

    for id in anchors.ids() {
        if let Some(m) = detections.find(id) {
            found.push(m.corners);
        }
    }
    trace!("resolve: {} of 4 anchors found", found.len());
    found
}

/// Corners of the four anchor markers, indexed by [`Role`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoints {
    pub quads: [Corners; 4],
}

impl ReferencePoints {
    pub fn new(quads: [Corners; 4]) -> Self {
        Self { quads }
    }

    /// Complete set from a resolver result, or `None` if any anchor is
    /// missing.
    pub fn from_resolved(found: &[Corners]) -> Option<Self> {
        let quads: [Corners; 4] = found.try_into().ok()?;
        Some(Self { quads })
    }

    pub fn quad(&self, role: Role) -> &Corners {
        &self.quads[role.index()]
    }

    /// Destination quad for the homography, in TL, TR, BR, BL order.
    pub fn destination(&self, selection: CornerSelection) -> [[f64; 2]; 4] {
        match selection {
            CornerSelection::Diagonal => std::array::from_fn(|k| self.quads[k][k]),
            CornerSelection::Inner => self.by_distance_to_center(|d, best| d < best),
            CornerSelection::Outer => self.by_distance_to_center(|d, best| d > best),
        }
    }

    /// Per role, pick the corner whose squared distance to the centroid of
    /// the marker centres wins under `better`. Ties keep the lower index.
    fn by_distance_to_center(&self, better: impl Fn(f64, f64) -> bool) -> [[f64; 2]; 4] {
        let centers = self.quads.map(|q| quad_center(&q));
        let c = quad_center(&centers);

        let mut dst = [[0.0f64; 2]; 4];
        for (k, quad) in self.quads.iter().enumerate() {
            let dist = |p: &[f64; 2]| (p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2);
            let mut best = quad[0];
            let mut best_d = dist(&best);
            for p in &quad[1..] {
                let d = dist(p);
                if better(d, best_d) {
                    best = *p;
                    best_d = d;
                }
            }
            dst[k] = best;
        }
        dst
    }
}

/// Which corner of each anchor marker becomes a destination corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CornerSelection {
    /// Role `k` contributes its own corner `k`: TL's top-left, TR's
    /// top-right, and so on. Matches the established overlays, but only
    /// holds up while the markers are upright.
    #[default]
    Diagonal,
    /// Corner nearest the centre of the four markers (TL's bottom-right for
    /// an upright board). Independent of marker rotation.
    Inner,
    /// Corner farthest from the centre of the four markers. Equals
    /// `Diagonal` for upright markers, and stays correct when they rotate.
    Outer,
}
