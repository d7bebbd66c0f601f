use crate::image::ImageRgb8;

/// Marker identifier as decoded by the detector.
pub type MarkerId = i32;

/// Four marker corners in frame pixels, in detector order
/// (top-left, top-right, bottom-right, bottom-left of the marker itself).
pub type Corners = [[f64; 2]; 4];

/// One decoded marker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerDetection {
    pub id: MarkerId,
    pub corners: Corners,
}

impl MarkerDetection {
    pub fn new(id: MarkerId, corners: Corners) -> Self {
        Self { id, corners }
    }

    /// Mean of the four corners.
    pub fn center(&self) -> [f64; 2] {
        quad_center(&self.corners)
    }
}

/// Everything a detector reported for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub markers: Vec<MarkerDetection>,
    /// Candidate quads that failed to decode. Carried through, never used
    /// for compositing.
    pub rejected: Vec<Corners>,
}

impl DetectionResult {
    pub fn new(markers: Vec<MarkerDetection>) -> Self {
        Self {
            markers,
            rejected: Vec::new(),
        }
    }

    /// Number of decoded markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Decoded ids in detector order.
    pub fn ids(&self) -> Vec<MarkerId> {
        self.markers.iter().map(|m| m.id).collect()
    }

    /// First marker carrying `id`.
    pub fn find(&self, id: MarkerId) -> Option<&MarkerDetection> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Keep only markers whose id satisfies `keep`.
    pub fn filter_ids(&self, keep: impl Fn(MarkerId) -> bool) -> Self {
        Self {
            markers: self.markers.iter().filter(|m| keep(m.id)).cloned().collect(),
            rejected: self.rejected.clone(),
        }
    }
}

/// Source of marker detections for a frame.
///
/// Decoding lives outside this crate; anything that can turn a frame into a
/// [`DetectionResult`] plugs in here.
pub trait MarkerDetector {
    fn detect(&self, frame: &ImageRgb8) -> DetectionResult;
}

impl<F> MarkerDetector for F
where
    F: Fn(&ImageRgb8) -> DetectionResult,
{
    fn detect(&self, frame: &ImageRgb8) -> DetectionResult {
        self(frame)
    }
}

pub(crate) fn quad_center(q: &Corners) -> [f64; 2] {
    let x = (q[0][0] + q[1][0] + q[2][0] + q[3][0]) / 4.0;
    let y = (q[0][1] + q[1][1] + q[2][1] + q[3][1]) / 4.0;
    [x, y]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64) -> Corners {
        [[x, y], [x + 10.0, y], [x + 10.0, y + 10.0], [x, y + 10.0]]
    }

    #[test]
    fn center_is_corner_mean() {
        let m = MarkerDetection::new(7, square(0.0, 0.0));
        assert_eq!(m.center(), [5.0, 5.0]);
    }

    #[test]
    fn find_returns_first_match() {
        let det = DetectionResult::new(vec![
            MarkerDetection::new(3, square(0.0, 0.0)),
            MarkerDetection::new(3, square(50.0, 0.0)),
        ]);
        assert_eq!(det.find(3).unwrap().corners[0], [0.0, 0.0]);
        assert!(det.find(4).is_none());
    }

    #[test]
    fn filter_keeps_rejected() {
        let mut det = DetectionResult::new(vec![
            MarkerDetection::new(1, square(0.0, 0.0)),
            MarkerDetection::new(2, square(20.0, 0.0)),
        ]);
        det.rejected.push(square(40.0, 40.0));
        let only_two = det.filter_ids(|id| id == 2);
        assert_eq!(only_two.ids(), vec![2]);
        assert_eq!(only_two.rejected.len(), 1);
    }

    #[test]
    fn closures_are_detectors() {
        let fixed = DetectionResult::new(vec![MarkerDetection::new(9, square(1.0, 1.0))]);
        let detector = move |_: &ImageRgb8| fixed.clone();
        let frame = ImageRgb8::new(4, 4);
        assert_eq!(detector.detect(&frame).ids(), vec![9]);
    }
}
