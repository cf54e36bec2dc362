use std::collections::BTreeMap;

use crate::models::{CanonicalLabel, Detection};

/// Highest confidence per label; repeated boxes of one label collapse.
pub fn best_per_label(detected: &[Detection]) -> BTreeMap<CanonicalLabel, f64> {
    let mut best: BTreeMap<CanonicalLabel, f64> = BTreeMap::new();
    for detection in detected {
        best.entry(detection.label)
            .and_modify(|c| *c = c.max(detection.confidence))
            .or_insert(detection.confidence);
    }
    best
}

/// Each distinct label adds its best confidence, scaled to 0–100 and capped.
pub fn score(detected: &[Detection]) -> u8 {
    let raw: f64 = best_per_label(detected).values().sum();
    (raw * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Sorted, de-duplicated labels of the admitted detections.
pub fn labels(detected: &[Detection]) -> Vec<CanonicalLabel> {
    best_per_label(detected).into_keys().collect()
}
