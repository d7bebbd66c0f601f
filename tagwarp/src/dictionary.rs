//! Names of the predefined marker dictionaries.
//!
//! One static table replaces the per-tool name maps; decoding against the
//! dictionaries themselves belongs to the detector.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A predefined ArUco / AprilTag dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dictionary {
    Dict4x4_50,
    Dict4x4_100,
    Dict4x4_250,
    Dict4x4_1000,
    Dict5x5_50,
    Dict5x5_100,
    Dict5x5_250,
    Dict5x5_1000,
    Dict6x6_50,
    Dict6x6_100,
    Dict6x6_250,
    Dict6x6_1000,
    Dict7x7_50,
    Dict7x7_100,
    Dict7x7_250,
    Dict7x7_1000,
    #[default]
    ArucoOriginal,
    AprilTag16h5,
    AprilTag25h9,
    AprilTag36h10,
    AprilTag36h11,
}

struct Entry {
    dict: Dictionary,
    name: &'static str,
    /// Inner bits per side.
    bits: u32,
    /// Number of ids.
    size: u32,
    /// Matching AprilTag family name, where there is one.
    family: Option<&'static str>,
}

#[rustfmt::skip]
const TABLE: [Entry; 21] = [
    Entry { dict: Dictionary::Dict4x4_50, name: "DICT_4X4_50", bits: 4, size: 50, family: None },
    Entry { dict: Dictionary::Dict4x4_100, name: "DICT_4X4_100", bits: 4, size: 100, family: None },
    Entry { dict: Dictionary::Dict4x4_250, name: "DICT_4X4_250", bits: 4, size: 250, family: None },
    Entry { dict: Dictionary::Dict4x4_1000, name: "DICT_4X4_1000", bits: 4, size: 1000, family: None },
    Entry { dict: Dictionary::Dict5x5_50, name: "DICT_5X5_50", bits: 5, size: 50, family: None },
    Entry { dict: Dictionary::Dict5x5_100, name: "DICT_5X5_100", bits: 5, size: 100, family: None },
    Entry { dict: Dictionary::Dict5x5_250, name: "DICT_5X5_250", bits: 5, size: 250, family: None },
    Entry { dict: Dictionary::Dict5x5_1000, name: "DICT_5X5_1000", bits: 5, size: 1000, family: None },
    Entry { dict: Dictionary::Dict6x6_50, name: "DICT_6X6_50", bits: 6, size: 50, family: None },
    Entry { dict: Dictionary::Dict6x6_100, name: "DICT_6X6_100", bits: 6, size: 100, family: None },
    Entry { dict: Dictionary::Dict6x6_250, name: "DICT_6X6_250", bits: 6, size: 250, family: None },
    Entry { dict: Dictionary::Dict6x6_1000, name: "DICT_6X6_1000", bits: 6, size: 1000, family: None },
    Entry { dict: Dictionary::Dict7x7_50, name: "DICT_7X7_50", bits: 7, size: 50, family: None },
    Entry { dict: Dictionary::Dict7x7_100, name: "DICT_7X7_100", bits: 7, size: 100, family: None },
    Entry { dict: Dictionary::Dict7x7_250, name: "DICT_7X7_250", bits: 7, size: 250, family: None },
    Entry { dict: Dictionary::Dict7x7_1000, name: "DICT_7X7_1000", bits: 7, size: 1000, family: None },
    Entry { dict: Dictionary::ArucoOriginal, name: "DICT_ARUCO_ORIGINAL", bits: 5, size: 1024, family: None },
    Entry { dict: Dictionary::AprilTag16h5, name: "DICT_APRILTAG_16h5", bits: 4, size: 30, family: Some("tag16h5") },
    Entry { dict: Dictionary::AprilTag25h9, name: "DICT_APRILTAG_25h9", bits: 5, size: 35, family: Some("tag25h9") },
    Entry { dict: Dictionary::AprilTag36h10, name: "DICT_APRILTAG_36h10", bits: 6, size: 2320, family: Some("tag36h10") },
    Entry { dict: Dictionary::AprilTag36h11, name: "DICT_APRILTAG_36h11", bits: 6, size: 587, family: Some("tag36h11") },
];

impl Dictionary {
    /// Every dictionary, in table order.
    pub const ALL: [Dictionary; 21] = [
        Dictionary::Dict4x4_50,
        Dictionary::Dict4x4_100,
        Dictionary::Dict4x4_250,
        Dictionary::Dict4x4_1000,
        Dictionary::Dict5x5_50,
        Dictionary::Dict5x5_100,
        Dictionary::Dict5x5_250,
        Dictionary::Dict5x5_1000,
        Dictionary::Dict6x6_50,
        Dictionary::Dict6x6_100,
        Dictionary::Dict6x6_250,
        Dictionary::Dict6x6_1000,
        Dictionary::Dict7x7_50,
        Dictionary::Dict7x7_100,
        Dictionary::Dict7x7_250,
        Dictionary::Dict7x7_1000,
        Dictionary::ArucoOriginal,
        Dictionary::AprilTag16h5,
        Dictionary::AprilTag25h9,
        Dictionary::AprilTag36h10,
        Dictionary::AprilTag36h11,
    ];

    fn entry(self) -> &'static Entry {
        // TABLE and ALL share the enum's declaration order.
        &TABLE[self as usize]
    }

    /// Canonical name, e.g. `DICT_6X6_250`.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Look up a dictionary by its canonical name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        TABLE
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.dict)
            .ok_or_else(|| ConfigError::UnknownDictionary(name.to_string()))
    }

    /// Inner data bits per marker side.
    pub fn marker_bits(self) -> u32 {
        self.entry().bits
    }

    /// Number of distinct ids in the dictionary.
    pub fn size(self) -> u32 {
        self.entry().size
    }

    /// AprilTag family name (`tag36h11`, ...) for the AprilTag dictionaries.
    pub fn apriltag_family(self) -> Option<&'static str> {
        self.entry().family
    }

    /// Whether a detector family label refers to this dictionary.
    ///
    /// Accepts both the canonical name and, for AprilTag dictionaries, the
    /// family name detectors report.
    pub fn matches_family(self, label: &str) -> bool {
        label == self.name() || self.apriltag_family() == Some(label)
    }

    /// Dictionary a detector family label belongs to, if any.
    pub fn for_family(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.matches_family(label))
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dictionary {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
