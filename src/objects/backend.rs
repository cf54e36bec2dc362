use anyhow::Result;
use image::RgbImage;

use crate::models::RawDetection;

/// Pretrained object detector seen as a black box.
///
/// Implementations are loaded once and then shared read-only between
/// requests, so `detect` takes `&self` and must not keep per-call state.
pub trait ObjectDetector: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame. Boxes are in frame pixels.
    fn detect(&self, frame: &RgbImage) -> Result<Vec<RawDetection>>;
}
