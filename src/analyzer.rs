use image::RgbImage;
use log::debug;

use crate::decode;
use crate::detection::{EarphoneDetection, EarphoneDetector};
use crate::error::DecodeError;
use crate::gate;
use crate::models::{CanonicalLabel, Detection, RawDetection, ResultRecord};
use crate::objects::{DetectorOutcome, DetectorState};
use crate::scoring;
use crate::suggestions;
use crate::validators;

/// Raw name reported for heuristic earphone detections.
pub const EARPHONES_NAME: &str = "wired earphones";

/// Full frame analysis: model detections, the earphone heuristic, scoring
/// and suggestions.
///
/// Holds only load-once state, so one analyzer can serve any number of
/// concurrent requests by shared reference.
#[derive(Debug)]
pub struct Analyzer {
    state: DetectorState,
    earphones: EarphoneDetector,
}

impl Analyzer {
    pub fn new(state: DetectorState) -> Self {
        Self {
            state,
            earphones: EarphoneDetector::new(),
        }
    }

    pub fn with_earphone_detector(mut self, earphones: EarphoneDetector) -> Self {
        self.earphones = earphones;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Analyze a data-URL or bare base64 payload.
    pub fn analyze_payload(&self, payload: &[u8]) -> Result<ResultRecord, DecodeError> {
        let frame = decode::decode_payload(payload)?;
        Ok(self.analyze(&frame))
    }

    /// Analyze raw encoded image bytes.
    pub fn analyze_image_bytes(&self, bytes: &[u8]) -> Result<ResultRecord, DecodeError> {
        let frame = decode::decode_image_bytes(bytes)?;
        Ok(self.analyze(&frame))
    }

    /// Analyze an already decoded frame.
    pub fn analyze(&self, frame: &RgbImage) -> ResultRecord {
        let outcome = self.state.detect(frame);
        if let DetectorOutcome::Failed(reason) = &outcome {
            debug!("Continuing heuristic-only after model failure: {}", reason);
        }

        let mut detected = admit_detections(frame, outcome.detections());

        let earphones = self.earphones.detect(frame);
        if let Some(detection) = earphone_detection(&earphones) {
            detected.push(detection);
        }

        build_record(detected, self.state.is_ready())
    }
}

/// Gate and validate raw model detections, in model order.
pub fn admit_detections(frame: &RgbImage, raw: &[RawDetection]) -> Vec<Detection> {
    raw.iter()
        .filter_map(|r| {
            let label = gate::admit(r)?;
            if !validators::passes(label, frame, &r.bbox) {
                return None;
            }
            Some(Detection::new(r.class_name.clone(), label, r.confidence as f64))
        })
        .collect()
}

/// Heuristic result as a detection, if it clears the earphone threshold.
pub fn earphone_detection(result: &EarphoneDetection) -> Option<Detection> {
    let label = CanonicalLabel::WiredEarphones;
    (result.detected && result.confidence >= gate::min_confidence(label))
        .then(|| Detection::new(EARPHONES_NAME, label, result.confidence))
}

/// Score, label set and suggestions are all derived from `detected`.
pub fn build_record(detected: Vec<Detection>, ready: bool) -> ResultRecord {
    let labels = scoring::labels(&detected);
    let score = scoring::score(&detected);
    let suggestions = suggestions::suggest(&labels);

    ResultRecord {
        detected,
        labels,
        score,
        suggestions,
        ready,
    }
}
