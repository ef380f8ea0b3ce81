//! External provider abstractions
//!
//! The pipeline treats neural segmentation and object detection as opaque
//! collaborators behind these traits. Absence or failure of a provider is
//! never a hard error: the pipeline falls back to its local heuristic path.

use crate::{
    config::Quality,
    error::Result,
    types::{PixelBuffer, SoftMask},
};
use serde::{Deserialize, Serialize};

/// Trait for external segmentation providers
///
/// A provider receives the working-resolution buffer and returns a per-pixel
/// foreground-probability map with matching dimensions. The quality level is
/// an advisory model hint only.
pub trait SegmentationProvider: Send + Sync {
    /// Whether the provider has finished loading and can accept requests
    fn is_ready(&self) -> bool;

    /// Produce a foreground-probability mask for the buffer
    ///
    /// # Errors
    /// - Provider not ready or model unavailable
    /// - Inference failures
    fn segment(&self, buffer: &PixelBuffer, quality: Quality) -> Result<SoftMask>;

    /// Provider name for logging
    fn name(&self) -> &str {
        "segmentation-provider"
    }
}

/// A detected object reported by an external detection provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label as reported by the provider
    pub label: String,
    /// Confidence in [0,1]
    pub confidence: f32,
    /// Bounding box as (x, y, width, height) in pixels
    pub bbox: (f32, f32, f32, f32),
}

/// Trait for external object-detection providers
///
/// Advisory only: detections feed display categorization and never influence
/// the pixel pipeline.
pub trait DetectionProvider: Send + Sync {
    /// Detect objects in the buffer
    ///
    /// # Errors
    /// - Provider not ready or model unavailable
    /// - Inference failures
    fn detect(&self, buffer: &PixelBuffer) -> Result<Vec<Detection>>;
}

/// Display category derived from detection labels by keyword matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectCategory {
    Human,
    Animal,
    Fruit,
    Vehicle,
    Furniture,
    Electronic,
    /// Something was detected but matched no bucket
    Object,
    /// Nothing detected, or detection unavailable
    Unknown,
}

const HUMAN_KEYWORDS: &[&str] = &["person", "man", "woman", "child", "baby", "boy", "girl"];

const ANIMAL_KEYWORDS: &[&str] = &[
    "animal", "cat", "dog", "bird", "horse", "elephant", "tiger", "lion", "bear", "zebra",
    "giraffe", "fish", "shark", "dolphin", "whale", "monkey", "snake", "turtle", "rabbit", "pig",
    "cow", "sheep", "chicken", "duck", "frog", "butterfly", "insect", "spider",
];

const FRUIT_KEYWORDS: &[&str] = &[
    "fruit",
    "apple",
    "orange",
    "banana",
    "strawberry",
    "grape",
    "watermelon",
    "pineapple",
    "pear",
    "peach",
    "mango",
    "kiwi",
    "lemon",
    "lime",
    "cherry",
    "blueberry",
    "raspberry",
    "avocado",
    "coconut",
    "pomegranate",
];

const VEHICLE_KEYWORDS: &[&str] = &[
    "vehicle",
    "car",
    "truck",
    "bus",
    "motorcycle",
    "bicycle",
    "airplane",
    "helicopter",
    "boat",
    "ship",
    "train",
    "submarine",
    "rocket",
];

const FURNITURE_KEYWORDS: &[&str] = &[
    "furniture", "chair", "couch", "sofa", "bed", "table", "desk", "cabinet", "shelf", "stool",
    "bench", "wardrobe", "dresser",
];

const ELECTRONIC_KEYWORDS: &[&str] = &[
    "electronic",
    "tv",
    "television",
    "laptop",
    "computer",
    "monitor",
    "keyboard",
    "mouse",
    "phone",
    "smartphone",
    "tablet",
    "camera",
    "headphones",
    "speaker",
];

impl SubjectCategory {
    /// Pick a display category from detection labels
    ///
    /// Buckets are checked in priority order; a label matches a bucket when
    /// it contains any of the bucket's keywords (case-insensitive). An empty
    /// detection list yields `Unknown`; detections matching no bucket yield
    /// `Object`.
    #[must_use]
    pub fn from_detections(detections: &[Detection]) -> Self {
        if detections.is_empty() {
            return Self::Unknown;
        }

        let labels: Vec<String> = detections
            .iter()
            .map(|d| d.label.to_ascii_lowercase())
            .collect();

        let buckets: &[(&[&str], Self)] = &[
            (HUMAN_KEYWORDS, Self::Human),
            (ANIMAL_KEYWORDS, Self::Animal),
            (FRUIT_KEYWORDS, Self::Fruit),
            (VEHICLE_KEYWORDS, Self::Vehicle),
            (FURNITURE_KEYWORDS, Self::Furniture),
            (ELECTRONIC_KEYWORDS, Self::Electronic),
        ];

        for (keywords, category) in buckets {
            if labels
                .iter()
                .any(|label| keywords.iter().any(|kw| label.contains(kw)))
            {
                return *category;
            }
        }

        Self::Object
    }
}

impl std::fmt::Display for SubjectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Human => "human",
            Self::Animal => "animal",
            Self::Fruit => "fruit",
            Self::Vehicle => "vehicle",
            Self::Furniture => "furniture",
            Self::Electronic => "electronic",
            Self::Object => "object",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}
