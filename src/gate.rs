use crate::models::{CanonicalLabel, RawDetection};

/// Threshold used for any label missing from [`MIN_CONFIDENCE`].
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Detector class names that stand in for a canonical label.
pub const CLASS_TO_LABEL: &[(&str, CanonicalLabel)] = &[
    ("book", CanonicalLabel::Books),
    ("cup", CanonicalLabel::Matcha),
    ("camera", CanonicalLabel::Camera),
    ("teddy bear", CanonicalLabel::Plushie),
];

/// Per-label admission floor. Generic stand-in classes ("cup") sit higher.
pub const MIN_CONFIDENCE: &[(CanonicalLabel, f64)] = &[
    (CanonicalLabel::Books, 0.6),
    (CanonicalLabel::Matcha, 0.7),
    (CanonicalLabel::Camera, 0.55),
    (CanonicalLabel::Plushie, 0.5),
    (CanonicalLabel::WiredEarphones, 0.7),
];

pub fn label_for_class(class_name: &str) -> Option<CanonicalLabel> {
    CLASS_TO_LABEL
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, label)| *label)
}

pub fn min_confidence(label: CanonicalLabel) -> f64 {
    MIN_CONFIDENCE
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, threshold)| *threshold)
        .unwrap_or(DEFAULT_MIN_CONFIDENCE)
}

/// Resolve the label of a raw detection and check it clears the floor.
pub fn admit(raw: &RawDetection) -> Option<CanonicalLabel> {
    let label = label_for_class(&raw.class_name)?;
    if (raw.confidence as f64) >= min_confidence(label) {
        Some(label)
    } else {
        None
    }
}
