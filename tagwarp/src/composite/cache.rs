use super::resolve::ReferencePoints;

/// Last known good reference points, bridging frames where the anchors are
/// not all detected.
///
/// Single slot: empty on construction, overwritten on every successful
/// frame, never cleared by a failed one.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    slot: Option<ReferencePoints>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&ReferencePoints> {
        self.slot.as_ref()
    }

    pub fn store(&mut self, refs: ReferencePoints) {
        self.slot = Some(refs);
    }

    pub fn is_warm(&self) -> bool {
        self.slot.is_some()
    }

    /// Forget the cached points, e.g. when the scene changes.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
