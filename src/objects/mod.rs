//! Adapter around the pretrained object detector.
//!
//! The detector is loaded once at startup into a [`DetectorState`]. A missing
//! model or a failing inference call never fails a request: the state reports
//! `ready = false` or the outcome says why there are no detections, and the
//! rest of the pipeline carries on with the heuristic alone.

mod backend;
pub mod coco;
pub mod yolo;

use image::RgbImage;
use log::{info, warn};

pub use backend::ObjectDetector;
pub use yolo::YoloDetector;

use crate::config::AnalyzerConfig;
use crate::models::RawDetection;

/// Result of asking the detector about one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    /// Inference ran; the list may be empty.
    Detections(Vec<RawDetection>),
    /// No model was loaded at startup.
    Unavailable,
    /// Inference raised; the reason is kept for logging.
    Failed(String),
}

impl DetectorOutcome {
    /// Raw detections, empty for degraded runs.
    pub fn detections(&self) -> &[RawDetection] {
        match self {
            DetectorOutcome::Detections(detections) => detections,
            DetectorOutcome::Unavailable | DetectorOutcome::Failed(_) => &[],
        }
    }

    /// True when the model did not contribute to this run.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, DetectorOutcome::Detections(_))
    }
}

/// Immutable load-once detector state shared by every request.
pub struct DetectorState {
    detector: Option<Box<dyn ObjectDetector>>,
}

impl DetectorState {
    /// State with no model: every request runs heuristic-only.
    pub fn unavailable() -> Self {
        Self { detector: None }
    }

    pub fn with_detector<D: ObjectDetector + 'static>(detector: D) -> Self {
        Self {
            detector: Some(Box::new(detector)),
        }
    }

    /// Load the configured model. A load failure is logged and yields an
    /// unavailable state rather than an error.
    pub fn load(config: &AnalyzerConfig) -> Self {
        let Some(model_path) = &config.model_path else {
            info!("No detection model configured; running heuristic-only");
            return Self::unavailable();
        };
        if let Err(e) = config.validate() {
            warn!("Detection model unavailable: {:#}", e);
            return Self::unavailable();
        }

        match YoloDetector::load(model_path, config.input_size) {
            Ok(detector) => Self::with_detector(
                detector
                    .with_score_floor(config.score_floor)
                    .with_nms_iou(config.nms_iou),
            ),
            Err(e) => {
                warn!("Detection model unavailable: {:#}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.detector.is_some()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.detector.as_ref().map(|d| d.name())
    }

    pub fn detect(&self, frame: &RgbImage) -> DetectorOutcome {
        let Some(detector) = &self.detector else {
            return DetectorOutcome::Unavailable;
        };

        match detector.detect(frame) {
            Ok(detections) => DetectorOutcome::Detections(detections),
            Err(e) => {
                warn!("Object detection failed: {:#}", e);
                DetectorOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}

impl std::fmt::Debug for DetectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorState")
            .field("backend", &self.backend_name())
            .field("ready", &self.is_ready())
            .finish()
    }
}
