pub mod analyzer;
pub mod config;
pub mod debug;
pub mod decode;
pub mod detection;
pub mod error;
pub mod gate;
pub mod models;
pub mod objects;
pub mod scoring;
pub mod suggestions;
pub mod validators;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use detection::{EarphoneDetection, EarphoneDetector, EarphoneParams};
pub use error::DecodeError;
pub use models::{
    BoundingBox, CanonicalLabel, Detection, EarbudCandidate, RawDetection, Response,
    ResultRecord, WireCandidate,
};
pub use objects::{DetectorOutcome, DetectorState, ObjectDetector};
