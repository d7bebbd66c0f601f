//! Recorded detections, one JSON object per image as written by
//! `apriltag-detect`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use tagwarp::detection::{Corners, DetectionResult, MarkerDetection};
use tagwarp::dictionary::Dictionary;

#[derive(Debug, Deserialize)]
pub struct DetectionRecord {
    pub file: String,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
    pub detections: Vec<RecordedDetection>,
    /// Undecoded candidate quads, if the detector reported them.
    #[serde(default)]
    pub rejected: Vec<Corners>,
}

#[derive(Debug, Deserialize)]
pub struct RecordedDetection {
    pub family: String,
    pub id: i32,
    #[serde(default)]
    pub hamming: i32,
    #[serde(default)]
    pub decision_margin: f32,
    pub corners: Corners,
}

impl DetectionRecord {
    /// Detections for the compositor, optionally restricted to one dictionary.
    pub fn to_result(&self, dictionary: Option<Dictionary>) -> DetectionResult {
        let markers = self
            .detections
            .iter()
            .filter(|d| dictionary.is_none_or(|dict| dict.matches_family(&d.family)))
            .map(|d| MarkerDetection::new(d.id, d.corners))
            .collect();
        DetectionResult {
            markers,
            rejected: self.rejected.clone(),
        }
    }
}

/// Read every record in `path`. Accepts JSON lines as well as a single
/// pretty-printed object.
pub fn load_records(path: &Path) -> Result<Vec<DetectionRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read detections: {}", path.display()))?;
    serde_json::Deserializer::from_str(&text)
        .into_iter::<DetectionRecord>()
        .enumerate()
        .map(|(i, rec)| {
            rec.with_context(|| {
                format!("bad detection record #{} in {}", i + 1, path.display())
            })
        })
        .collect()
}

/// Records keyed by image path, with a file-name fallback so detections
/// recorded from another directory still line up.
pub struct RecordIndex {
    by_path: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    records: Vec<DetectionRecord>,
}

impl RecordIndex {
    pub fn new(records: Vec<DetectionRecord>) -> Self {
        let mut by_path = HashMap::new();
        let mut by_name = HashMap::new();
        for (i, rec) in records.iter().enumerate() {
            by_path.insert(rec.file.clone(), i);
            if let Some(name) = file_name(&rec.file) {
                by_name.insert(name, i);
            }
        }
        Self {
            by_path,
            by_name,
            records,
        }
    }

    pub fn get(&self, image: &str) -> Option<&DetectionRecord> {
        self.by_path
            .get(image)
            .or_else(|| file_name(image).and_then(|n| self.by_name.get(&n)))
            .map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn file_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}
