mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from vibecheck for tests
pub use vibecheck::{
    Analyzer, BoundingBox, CanonicalLabel, Detection, DetectorOutcome, DetectorState,
    EarbudCandidate, EarphoneDetector, EarphoneParams, ObjectDetector, RawDetection,
    ResultRecord, WireCandidate,
};
